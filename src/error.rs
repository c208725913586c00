use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

use crate::cache::tee::TeeError;

/// Every way a cmdcache invocation can fail.
///
/// All variants are fatal: nothing is retried and nothing is rolled back.
#[derive(Error, Debug)]
pub enum CacheError {
    // I/O
    #[error("failed to read commands file {}", .path.display())]
    ReadCommands {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read metadata of {}", .path.display())]
    Metadata {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to create cache file {}", .path.display())]
    CreateCache {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to open cache file {}", .path.display())]
    OpenCache {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to replay cache file {}", .path.display())]
    Replay {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to determine the current working directory")]
    WorkingDirectory(#[source] io::Error),

    // Parse
    #[error("invalid command on line {line} of {}", .path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        #[source]
        source: shell_words::ParseError,
    },

    // Resolution
    #[error("command not found: {program:?}")]
    CommandNotFound {
        program: String,
        #[source]
        source: which::Error,
    },

    // Execution
    #[error("failed to start `{command}`")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("failed while streaming output of `{command}`")]
    Stream {
        command: String,
        #[source]
        source: TeeError,
    },

    #[error("failed to wait for `{command}`")]
    Wait {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("`{command}` failed: {status}")]
    CommandFailed { command: String, status: ExitStatus },
}

pub type Result<T, E = CacheError> = std::result::Result<T, E>;
