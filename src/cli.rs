use clap::Parser;
use std::path::PathBuf;

/// cmdcache - Cache the output of shell commands
///
/// Runs every command listed in COMMANDS_FILE, streaming their standard output
/// while saving it to CACHE_FILE. Later runs replay CACHE_FILE instead, until
/// the commands file or one of the command executables is modified.
#[derive(Parser, Debug)]
#[command(name = "cmdcache")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Cache the results of command output", long_about = None)]
pub struct Cli {
    /// File listing one shell command per line
    #[arg(value_name = "COMMANDS_FILE")]
    pub commands_file: PathBuf,

    /// File the combined command output is cached in
    #[arg(value_name = "CACHE_FILE")]
    pub cache_file: PathBuf,
}
