use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::process::{CapturedOutput, exit_label};

#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("Unsupported archive type: {}", .path.display())]
    Unsupported { path: PathBuf },
    #[error("Archive not found: {}", .path.display())]
    Missing { path: PathBuf },
    /// Another process (often antivirus) holds the archive open.
    #[error("Archive is locked by another process: {}", .path.display())]
    Locked {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to create extraction directory {}: {source}", .path.display())]
    CreateDestination {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("No bundled extraction utility for host architecture '{arch}'")]
    UnsupportedArchitecture { arch: String },
    #[error("Extraction utility not found (searched: {})", format_searched(.searched))]
    UtilityMissing { searched: Vec<PathBuf> },
    #[error("Extraction failed with {}: {command} ({output})", exit_label(.code))]
    UtilityFailed {
        command: String,
        code: Option<i32>,
        output: CapturedOutput,
    },
    #[error("Failed to decode {}: {source}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ArchiveError {
    /// Failures the user can fix by simply trying again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Locked { .. })
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

fn format_searched(searched: &[PathBuf]) -> String {
    if searched.is_empty() {
        return "nothing".to_string();
    }
    searched
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
