use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("{0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Error creating compressed file {}: {source}", .path.display())]
    Compression {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Error deleting file {}: {source}", .path.display())]
    Deletion {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Unable to send report: {0}")]
    Delivery(String),

    #[error("Unable to inspect open files: {0}")]
    ProcessInspection(String),
}

impl Error {
    /// Process exit code for an error that ends the daemon.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Compression { .. } => 2,
            Error::Deletion { .. } => 3,
            _ => 1,
        }
    }

    /// Whether the error breaks the compress-then-delete sequence.
    pub fn is_transition_failure(&self) -> bool {
        matches!(self, Error::Compression { .. } | Error::Deletion { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        let compression = Error::Compression {
            path: PathBuf::from("/tmp/a.txt.gz"),
            source: io::Error::new(io::ErrorKind::Other, "disk full"),
        };
        let deletion = Error::Deletion {
            path: PathBuf::from("/tmp/a.txt"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(compression.exit_code(), 2);
        assert_eq!(deletion.exit_code(), 3);
        assert_eq!(Error::Validation("bad".into()).exit_code(), 1);
        assert_eq!(Error::Delivery("refused".into()).exit_code(), 1);
        assert!(compression.is_transition_failure());
        assert!(!Error::Delivery("refused".into()).is_transition_failure());
    }
}
