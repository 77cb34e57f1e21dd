use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CompressError {
    #[error("compressor has already been disposed")]
    ObjectDisposed,

    #[error("compression failed: {reason}")]
    CompressionFailed { reason: String },

    #[error("invalid argument: {reason}")]
    InvalidArgument { reason: String },

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl CompressError {
    pub fn compression_failed<S: ToString>(str: S) -> Self {
        Self::CompressionFailed { reason: str.to_string() }
    }

    pub fn invalid_argument<S: ToString>(str: S) -> Self {
        Self::InvalidArgument { reason: str.to_string() }
    }

    pub fn io<E: Into<io::Error>>(e: E) -> Self {
        Self::Io { source: e.into() }
    }

    pub fn is_disposed(&self) -> bool {
        matches!(self, Self::ObjectDisposed)
    }
}

impl From<CompressError> for io::Error {
    fn from(e: CompressError) -> Self {
        match e {
            CompressError::Io { source } => source,
            CompressError::ObjectDisposed => io::Error::other(e),
            CompressError::InvalidArgument { .. } => io::Error::new(io::ErrorKind::InvalidInput, e),
            CompressError::CompressionFailed { .. } => io::Error::new(io::ErrorKind::InvalidData, e),
        }
    }
}
