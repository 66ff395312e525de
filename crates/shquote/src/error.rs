use std::io;

use thiserror::Error;

/// Fatal engine failures.
///
/// Malformed byte sequences are deliberately absent: the UTF-8 source
/// recovers from them locally by re-emitting raw bytes, so decoding never
/// fails the run. All operations are single-shot; there are no retries.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Reading from the input stream failed.
    #[error("error reading input: {0}")]
    Read(#[source] io::Error),

    /// Writing to the output sink failed. Output already flushed is not
    /// retracted.
    #[error("error writing output: {0}")]
    Write(#[source] io::Error),
}
