/// Executable lookup on the search path
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::spec::{CommandLine, CommandSpec};
use crate::config::CacheConfig;
use crate::error::{CacheError, Result};

/// Resolves program names the same way a shell would before running them
#[derive(Debug, Clone)]
pub struct ExecutableResolver {
    search_path: Option<OsString>,
    working_dir: PathBuf,
}

impl ExecutableResolver {
    pub fn new(search_path: Option<OsString>, working_dir: PathBuf) -> Self {
        Self {
            search_path,
            working_dir,
        }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(config.search_path.clone(), config.working_dir.clone())
    }

    /// Resolve a program name to the executable that would run
    ///
    /// Names containing a path separator are resolved against the working
    /// directory instead of the search path.
    pub fn resolve(&self, program: &str) -> Result<PathBuf> {
        let resolved = match &self.search_path {
            Some(paths) => which::which_in(program, Some(paths), &self.working_dir),
            None => which::which(program),
        }
        .map_err(|source| CacheError::CommandNotFound {
            program: program.to_string(),
            source,
        })?;

        debug!(program, path = %resolved.display(), "resolved executable");
        Ok(resolved)
    }

    /// Resolve every command in order, failing on the first unknown program
    pub fn resolve_all<'a>(&self, spec: &'a CommandSpec) -> Result<Vec<ResolvedCommand<'a>>> {
        spec.iter()
            .map(|command| {
                self.resolve(command.program())
                    .map(|executable| ResolvedCommand {
                        command,
                        executable,
                    })
            })
            .collect()
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }
}

/// A command paired with the executable it resolved to
#[derive(Debug, Clone)]
pub struct ResolvedCommand<'a> {
    pub command: &'a CommandLine,
    pub executable: PathBuf,
}
