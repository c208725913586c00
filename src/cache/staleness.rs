/// Cache staleness evaluation
///
/// The cache is stale when it is missing, or when the commands file or any
/// command executable was modified after it. Only modification times are
/// compared; file contents are never hashed.
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracing::{debug, info};

use super::resolve::ExecutableResolver;
use super::spec::CommandSpec;
use crate::config::CacheConfig;
use crate::error::{CacheError, Result};
use crate::logging::{operations, status};

/// Why a cache has to be rebuilt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StaleReason {
    MissingCache,
    CommandsFileNewer,
    ExecutableNewer { program: String, path: PathBuf },
}

impl fmt::Display for StaleReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingCache => write!(f, "cache file does not exist"),
            Self::CommandsFileNewer => write!(f, "commands file is newer than cache"),
            Self::ExecutableNewer { program, path } => {
                write!(f, "{} ({}) is newer than cache", program, path.display())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Staleness {
    Fresh,
    Stale(StaleReason),
}

impl Staleness {
    pub fn is_stale(&self) -> bool {
        matches!(self, Self::Stale(_))
    }
}

/// Result of evaluating a commands file against its cache
#[derive(Debug, Clone)]
pub struct Evaluation {
    pub spec: CommandSpec,
    pub staleness: Staleness,
}

pub struct StalenessEvaluator {
    resolver: ExecutableResolver,
}

impl StalenessEvaluator {
    pub fn new(resolver: ExecutableResolver) -> Self {
        Self { resolver }
    }

    pub fn resolver(&self) -> &ExecutableResolver {
        &self.resolver
    }

    /// Load the commands file and decide whether the cache is stale
    ///
    /// Checks run cheapest first and stop at the first one that marks the
    /// cache stale, so executables after a stale one are never resolved.
    pub fn evaluate(&self, config: &CacheConfig) -> Result<Evaluation> {
        let spec = CommandSpec::load(&config.commands_file)?;
        let staleness = self.staleness(&spec, &config.commands_file, &config.cache_file)?;

        match &staleness {
            Staleness::Fresh => info!(
                operation = operations::EVALUATE,
                status = status::FRESH,
                cache = %config.cache_file.display(),
                "cache is fresh"
            ),
            Staleness::Stale(reason) => info!(
                operation = operations::EVALUATE,
                status = status::STALE,
                cache = %config.cache_file.display(),
                %reason,
                "cache is stale"
            ),
        }

        Ok(Evaluation { spec, staleness })
    }

    fn staleness(
        &self,
        spec: &CommandSpec,
        commands_file: &Path,
        cache_file: &Path,
    ) -> Result<Staleness> {
        let commands_mtime = modified(commands_file)?;

        let cache_mtime = match fs::metadata(cache_file) {
            Ok(metadata) => metadata.modified().map_err(|source| CacheError::Metadata {
                path: cache_file.to_path_buf(),
                source,
            })?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Ok(Staleness::Stale(StaleReason::MissingCache));
            }
            Err(source) => {
                return Err(CacheError::Metadata {
                    path: cache_file.to_path_buf(),
                    source,
                });
            }
        };

        if commands_mtime > cache_mtime {
            return Ok(Staleness::Stale(StaleReason::CommandsFileNewer));
        }

        for command in spec {
            let executable = self.resolver.resolve(command.program())?;
            let executable_mtime = modified(&executable)?;

            debug!(
                program = command.program(),
                newer = executable_mtime > cache_mtime,
                "checked executable"
            );

            if executable_mtime > cache_mtime {
                return Ok(Staleness::Stale(StaleReason::ExecutableNewer {
                    program: command.program().to_string(),
                    path: executable,
                }));
            }
        }

        Ok(Staleness::Fresh)
    }
}

fn modified(path: &Path) -> Result<SystemTime> {
    fs::metadata(path)
        .and_then(|metadata| metadata.modified())
        .map_err(|source| CacheError::Metadata {
            path: path.to_path_buf(),
            source,
        })
}
