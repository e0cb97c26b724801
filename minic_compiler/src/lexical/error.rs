use crate::logging::codes;
use std::io;
use std::path::PathBuf;

/// I/O-tier scanner failures.
///
/// Malformed input never produces an error; it becomes an ILLEGAL token.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("Cannot open source file {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to read source at line {line}, column {column}: {source}")]
    Read {
        line: u32,
        column: u32,
        #[source]
        source: io::Error,
    },
}

impl ScanError {
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            ScanError::Open { .. } => codes::source::SOURCE_OPEN_FAILED,
            ScanError::Read { source, .. } if source.kind() == io::ErrorKind::InvalidData => {
                codes::source::INVALID_ENCODING
            }
            ScanError::Read { .. } => codes::source::SOURCE_READ_FAILED,
        }
    }

    /// Underlying I/O error
    pub fn io_error(&self) -> &io::Error {
        match self {
            ScanError::Open { source, .. } | ScanError::Read { source, .. } => source,
        }
    }
}
