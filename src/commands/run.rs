/// `cmdcache <COMMANDS_FILE> <CACHE_FILE>` implementation
///
/// Rebuilds the cache when it is stale, otherwise replays it.
use std::io::Write;

use tracing::debug;

use crate::cache::{
    replay, CommandExecutor, ExecutableResolver, RebuildSummary, Staleness, StalenessEvaluator,
};
use crate::config::CacheConfig;
use crate::error::Result;

/// Which path an invocation took
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Rebuilt(RebuildSummary),
    Replayed { size_bytes: u64 },
}

pub fn run<W: Write + ?Sized>(config: &CacheConfig, output: &mut W) -> Result<Outcome> {
    debug!(
        commands = %config.commands_file.display(),
        cache = %config.cache_file.display(),
        "starting"
    );

    let evaluator = StalenessEvaluator::new(ExecutableResolver::from_config(config));
    let evaluation = evaluator.evaluate(config)?;

    match evaluation.staleness {
        Staleness::Stale(_) => {
            let summary = CommandExecutor::new(evaluator.resolver()).rebuild(
                &evaluation.spec,
                &config.cache_file,
                output,
            )?;
            Ok(Outcome::Rebuilt(summary))
        }
        Staleness::Fresh => {
            let size_bytes = replay(&config.cache_file, output)?;
            Ok(Outcome::Replayed { size_bytes })
        }
    }
}
