use crate::lexical::ScanError;
use crate::logging::codes;
use std::io;
use std::path::PathBuf;

/// Token dump failures
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    #[error("Cannot open source file {path}: {source}")]
    OpenSource {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to scan source: {source}")]
    ReadSource {
        #[source]
        source: ScanError,
    },

    #[error("Cannot create destination {path}: {source}")]
    CreateDestination {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write token dump: {source}")]
    WriteDestination {
        #[source]
        source: io::Error,
    },

    #[error("Failed to serialize token: {source}")]
    Serialize {
        #[source]
        source: serde_json::Error,
    },

    #[error("Source contains {count} illegal token(s)")]
    IllegalTokens { count: usize },
}

impl DriverError {
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            DriverError::OpenSource { .. } => codes::source::SOURCE_OPEN_FAILED,
            DriverError::ReadSource { source } => source.error_code(),
            DriverError::CreateDestination { .. } => codes::driver::DESTINATION_CREATE_FAILED,
            DriverError::WriteDestination { .. } => codes::driver::DESTINATION_WRITE_FAILED,
            DriverError::Serialize { .. } => codes::driver::SERIALIZATION_FAILED,
            DriverError::IllegalTokens { .. } => codes::driver::ILLEGAL_TOKENS_PRESENT,
        }
    }
}

impl From<ScanError> for DriverError {
    fn from(error: ScanError) -> Self {
        match error {
            ScanError::Open { path, source } => DriverError::OpenSource { path, source },
            read @ ScanError::Read { .. } => DriverError::ReadSource { source: read },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_scan_errors_map_to_distinct_variants() {
        let open = DriverError::from(ScanError::Open {
            path: PathBuf::from("in.mc"),
            source: io::Error::new(io::ErrorKind::NotFound, "gone"),
        });
        assert_matches!(open, DriverError::OpenSource { ref path, .. } if path.ends_with("in.mc"));
        assert_eq!(open.error_code(), codes::source::SOURCE_OPEN_FAILED);

        let read = DriverError::from(ScanError::Read {
            line: 4,
            column: 2,
            source: io::Error::new(io::ErrorKind::InvalidData, "bad"),
        });
        assert_matches!(read, DriverError::ReadSource { .. });
        assert_eq!(read.error_code(), codes::source::INVALID_ENCODING);
    }

    #[test]
    fn test_destination_errors_have_driver_codes() {
        let error = DriverError::IllegalTokens { count: 2 };
        assert_eq!(error.error_code(), codes::driver::ILLEGAL_TOKENS_PRESENT);
        assert_eq!(error.to_string(), "Source contains 2 illegal token(s)");

        let write = DriverError::WriteDestination {
            source: io::Error::new(io::ErrorKind::Other, "disk full"),
        };
        assert_eq!(write.error_code(), codes::driver::DESTINATION_WRITE_FAILED);
    }
}
