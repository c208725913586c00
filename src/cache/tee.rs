/// Tee copy: duplicate one stream into two sinks as bytes arrive
use std::io::{self, ErrorKind, Read, Write};

use thiserror::Error;

const CHUNK_SIZE: usize = 8 * 1024;

/// Which side of the tee failed
#[derive(Error, Debug)]
pub enum TeeError {
    #[error("failed to read command output")]
    Read(#[source] io::Error),

    #[error("failed to write to cache file")]
    Cache(#[source] io::Error),

    #[error("failed to write to output")]
    Output(#[source] io::Error),
}

/// Copy `reader` to both `cache` and `output` until end of stream
///
/// Each chunk is written to the cache first, then to the output, which is
/// flushed so the caller sees it immediately. The first error from any side
/// stops the copy; nothing further is read.
pub fn tee_copy<R, C, O>(reader: &mut R, cache: &mut C, output: &mut O) -> Result<u64, TeeError>
where
    R: Read + ?Sized,
    C: Write + ?Sized,
    O: Write + ?Sized,
{
    let mut buf = [0u8; CHUNK_SIZE];
    let mut copied = 0u64;

    loop {
        let len = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(len) => len,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(TeeError::Read(e)),
        };

        let chunk = &buf[..len];
        cache.write_all(chunk).map_err(TeeError::Cache)?;
        output
            .write_all(chunk)
            .and_then(|_| output.flush())
            .map_err(TeeError::Output)?;

        copied += len as u64;
    }

    cache.flush().map_err(TeeError::Cache)?;
    Ok(copied)
}
