use thiserror::Error;

use crate::archive::ArchiveError;
use crate::download::{DownloadError, WriteFailure};
use crate::launch::LaunchError;
use crate::target::ResolveError;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Emulator '{name}' is not configured for system '{system}'")]
    UnknownEmulator { system: String, name: String },
    #[error(transparent)]
    Download(#[from] DownloadError),
    #[error(transparent)]
    Archive(#[from] ArchiveError),
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error(transparent)]
    Launch(#[from] LaunchError),
    #[error("Operation canceled")]
    Canceled,
}

impl PipelineError {
    pub fn is_canceled(&self) -> bool {
        matches!(self, Self::Canceled)
    }

    /// Short message for the user; details go to the log.
    pub fn user_message(&self) -> String {
        match self {
            Self::UnknownEmulator { system, name } => {
                format!("No emulator named '{}' for {}.", name, system)
            }
            Self::Canceled => "Canceled.".to_string(),
            Self::Download(err) => download_message(err),
            Self::Archive(err) => archive_message(err),
            Self::Resolve(ResolveError::Missing { path }) => {
                format!("File not found: {}", path.display())
            }
            Self::Resolve(ResolveError::ExtractionFailed { source, .. }) => {
                archive_message(source)
            }
            Self::Resolve(ResolveError::NoPayload { extensions, .. }) => format!(
                "Nothing to launch in the archive. Check the system's launch extensions ({}).",
                extensions.join(", ")
            ),
            Self::Launch(err) => launch_message(err),
        }
    }
}

fn download_message(err: &DownloadError) -> String {
    match err {
        DownloadError::NotFound { .. } => "The package was not found on the server.".to_string(),
        DownloadError::Status { status, .. } => {
            format!("The server refused the download (HTTP {}).", status)
        }
        DownloadError::Transport { .. } | DownloadError::Client(_) => {
            "Network error while downloading. Check your connection.".to_string()
        }
        DownloadError::Write { kind, .. } => match kind {
            WriteFailure::PermissionDenied => "Permission denied while saving the download.",
            WriteFailure::DiskFull => "Not enough disk space for the download.",
            WriteFailure::Locked => "The download file is in use by another program.",
            WriteFailure::Other => "Could not save the download.",
        }
        .to_string(),
        DownloadError::Incomplete { .. } => "The download was incomplete. Try again.".to_string(),
    }
}

fn archive_message(err: &ArchiveError) -> String {
    match err {
        ArchiveError::Unsupported { .. } => "Unsupported archive type.".to_string(),
        ArchiveError::Missing { path } => format!("Archive not found: {}", path.display()),
        ArchiveError::Locked { .. } => {
            "The archive is in use by another program (antivirus?). Try again in a moment."
                .to_string()
        }
        ArchiveError::CreateDestination { path, .. } => {
            format!("Cannot write to {}", path.display())
        }
        ArchiveError::UnsupportedArchitecture { arch } => {
            format!("Archive extraction is not available on {} systems.", arch)
        }
        ArchiveError::UtilityMissing { .. } => {
            "7-Zip was not found. Install it or set extraction.seven_zip_path.".to_string()
        }
        ArchiveError::UtilityFailed { .. } | ArchiveError::Decode { .. } => {
            "Extraction failed. The archive may be damaged.".to_string()
        }
        ArchiveError::Io { .. } => "Extraction failed due to a file error.".to_string(),
    }
}

fn launch_message(err: &LaunchError) -> String {
    match err {
        LaunchError::NoEmulator { .. } => "No emulator is configured for this system.".to_string(),
        LaunchError::Spawn { .. } => "The program could not be started.".to_string(),
        LaunchError::Exit { code, .. } => {
            format!("The program exited with an error (code {}).", code)
        }
        LaunchError::Terminated { .. } => "The program was terminated.".to_string(),
    }
}
