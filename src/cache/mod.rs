/// Command output caching
///
/// A commands file lists shell commands, one per line. Their combined stdout
/// is cached in a single file that is replayed until the commands file or one
/// of the command executables is modified after it.
///
/// # Flow
///
/// 1. `spec` loads and tokenizes the commands file
/// 2. `staleness` compares modification times
/// 3. `executor` reruns the commands, teeing stdout into the cache, or
///    `replay` streams the existing cache
pub mod executor;
pub mod replay;
pub mod resolve;
pub mod spec;
pub mod staleness;
pub mod tee;

#[cfg(all(test, unix))]
pub(crate) mod test_support;

pub use executor::{CommandExecutor, RebuildSummary};
pub use replay::replay;
pub use resolve::ExecutableResolver;
pub use spec::{CommandLine, CommandSpec};
pub use staleness::{Evaluation, StaleReason, Staleness, StalenessEvaluator};
