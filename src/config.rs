use std::env;
use std::ffi::OsString;
use std::path::PathBuf;

use crate::cli::Cli;
use crate::error::{CacheError, Result};

/// Everything a single cmdcache invocation needs
///
/// Built once at the entry point and passed down by reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// File listing the commands to run, one per line
    pub commands_file: PathBuf,

    /// File holding the cached output
    pub cache_file: PathBuf,

    /// Executable search path (`PATH`); `None` defers to the process environment
    pub search_path: Option<OsString>,

    /// Directory that relative command paths are resolved against
    pub working_dir: PathBuf,
}

impl CacheConfig {
    /// Create a configuration using the current process environment
    pub fn new(commands_file: impl Into<PathBuf>, cache_file: impl Into<PathBuf>) -> Result<Self> {
        let working_dir = env::current_dir().map_err(CacheError::WorkingDirectory)?;

        Ok(Self {
            commands_file: commands_file.into(),
            cache_file: cache_file.into(),
            search_path: env::var_os("PATH"),
            working_dir,
        })
    }

    pub fn from_cli(cli: &Cli) -> Result<Self> {
        Self::new(&cli.commands_file, &cli.cache_file)
    }

    pub fn with_search_path(mut self, search_path: impl Into<OsString>) -> Self {
        self.search_path = Some(search_path.into());
        self
    }

    pub fn with_working_dir(mut self, working_dir: impl Into<PathBuf>) -> Self {
        self.working_dir = working_dir.into();
        self
    }
}
