use std::io;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

use cmdcache::cli::Cli;
use cmdcache::cli_utils::error_message;
use cmdcache::commands::run::Outcome;
use cmdcache::config::CacheConfig;
use cmdcache::{commands, logging};

fn main() -> ExitCode {
    // Initialize structured logging
    logging::init();

    // Parse CLI arguments
    let cli = Cli::parse();

    match run(&cli) {
        Ok(outcome) => {
            tracing::debug!(?outcome, "done");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}", error_message(&e));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<Outcome> {
    let config = CacheConfig::from_cli(cli).context("Failed to build configuration")?;

    let stdout = io::stdout();
    let mut output = stdout.lock();

    commands::run::run(&config, &mut output).with_context(|| {
        format!(
            "Failed to produce output for {}",
            config.commands_file.display()
        )
    })
}
