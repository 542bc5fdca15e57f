//! Download error types

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::fsutil::is_lock_violation;

/// Why writing the downloaded data to disk failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteFailure {
    PermissionDenied,
    DiskFull,
    /// Another process holds the destination open
    Locked,
    Other,
}

impl WriteFailure {
    pub fn classify(err: &io::Error) -> Self {
        if is_lock_violation(err) {
            return Self::Locked;
        }
        match err.kind() {
            io::ErrorKind::PermissionDenied | io::ErrorKind::ReadOnlyFilesystem => {
                Self::PermissionDenied
            }
            io::ErrorKind::StorageFull | io::ErrorKind::QuotaExceeded => Self::DiskFull,
            _ => Self::Other,
        }
    }
}

#[derive(Error, Debug)]
pub enum DownloadError {
    #[error("Resource not found: {url}")]
    NotFound { url: String },
    #[error("Server returned HTTP {status} for {url}")]
    Status { url: String, status: u16 },
    #[error("Network error while downloading {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("Failed to write {} ({kind:?}): {source}", .path.display())]
    Write {
        path: PathBuf,
        kind: WriteFailure,
        #[source]
        source: io::Error,
    },
    #[error("Incomplete download of {url}: expected {expected} bytes, received {received}")]
    Incomplete {
        url: String,
        expected: u64,
        received: u64,
    },
    #[error("Failed to create HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

impl DownloadError {
    /// True for failures caused by the remote side rather than local disk.
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. } | Self::Status { .. } | Self::Transport { .. }
        )
    }

    pub(crate) fn write(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Write {
            path: path.into(),
            kind: WriteFailure::classify(&source),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_write_failures() {
        assert_eq!(
            WriteFailure::classify(&io::Error::from(io::ErrorKind::PermissionDenied)),
            WriteFailure::PermissionDenied
        );
        assert_eq!(
            WriteFailure::classify(&io::Error::from(io::ErrorKind::StorageFull)),
            WriteFailure::DiskFull
        );
        assert_eq!(
            WriteFailure::classify(&io::Error::from(io::ErrorKind::ResourceBusy)),
            WriteFailure::Locked
        );
        assert_eq!(
            WriteFailure::classify(&io::Error::from(io::ErrorKind::InvalidData)),
            WriteFailure::Other
        );
    }

    #[test]
    fn test_write_error_carries_kind() {
        let err = DownloadError::write(
            "/tmp/x.zip",
            io::Error::from(io::ErrorKind::PermissionDenied),
        );
        assert!(matches!(
            err,
            DownloadError::Write {
                kind: WriteFailure::PermissionDenied,
                ..
            }
        ));
        assert!(!err.is_network());
        assert!(
            DownloadError::NotFound {
                url: "http://x.invalid/a".into()
            }
            .is_network()
        );
    }
}
