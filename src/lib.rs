// Library interface for cmdcache
// The binary and the integration tests both go through these modules

pub mod cache;
pub mod cli;
pub mod cli_utils;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;

// Re-export commonly used types
pub use cache::{CommandSpec, Staleness, StalenessEvaluator};
pub use config::CacheConfig;
pub use error::CacheError;
