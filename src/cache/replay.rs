use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use tracing::info;

use crate::error::{CacheError, Result};
use crate::logging::{operations, status};

/// Stream the cache file to `output` byte for byte
pub fn replay<W: Write + ?Sized>(cache_path: &Path, output: &mut W) -> Result<u64> {
    let mut cache = File::open(cache_path).map_err(|source| CacheError::OpenCache {
        path: cache_path.to_path_buf(),
        source,
    })?;

    let size = io::copy(&mut cache, output)
        .and_then(|size| output.flush().map(|_| size))
        .map_err(|source| CacheError::Replay {
            path: cache_path.to_path_buf(),
            source,
        })?;

    info!(
        operation = operations::REPLAY,
        status = status::SUCCESS,
        cache = %cache_path.display(),
        size_bytes = size,
        "replayed cache"
    );

    Ok(size)
}
