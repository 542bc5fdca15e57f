//! Archive extraction
//!
//! Archives are extracted in one of two modes:
//!
//! - **Temporary**: into a fresh staging directory owned by the
//!   [`StagingArena`], for a single play session.
//! - **Permanent**: into a caller-supplied directory, overwriting what is
//!   already there (emulator packages, cores, asset packs).
//!
//! Zip archives are decoded in-process. 7z and rar archives go through the
//! external 7-Zip utility.

mod decoder;
mod error;
mod seven_zip;
mod staging;


use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use romhub_shared::extension_of;
use tracing::{debug, info, warn};

use crate::fsutil::{ensure_writable_dir, is_lock_violation, check_exclusive_open};

pub use decoder::{DecodeSummary, extract_zip};
pub use error::ArchiveError;
pub use seven_zip::{HostArch, SevenZip};
pub use staging::StagingArena;

/// Archive formats the extractor understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArchiveKind {
    Zip,
    SevenZip,
    Rar,
}

impl ArchiveKind {
    /// Detect the kind from the file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Option<Self> {
        match extension_of(path)?.as_str() {
            "zip" => Some(Self::Zip),
            "7z" => Some(Self::SevenZip),
            "rar" => Some(Self::Rar),
            _ => None,
        }
    }

    pub fn is_archive(path: &Path) -> bool {
        Self::from_path(path).is_some()
    }

    /// Decoded without an external utility.
    pub fn is_in_process(self) -> bool {
        self == Self::Zip
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractMode {
    /// Fresh staging directory, disposed after the session
    Temporary,
    /// Caller-supplied directory with overwrite semantics
    Permanent,
}

/// A single extraction: what, where, and how.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveJob {
    pub archive: PathBuf,
    pub destination: PathBuf,
    pub kind: ArchiveKind,
    pub mode: ExtractMode,
}

/// How the external utility is obtained.
#[derive(Debug, Clone)]
enum UtilitySource {
    /// Located on first use (configured path, bundle, `PATH`)
    Lookup(Option<PathBuf>),
    Fixed(SevenZip),
}

/// Extracts archives into staging or installation directories.
#[derive(Debug)]
pub struct ArchiveExtractor {
    staging: Arc<StagingArena>,
    utility: UtilitySource,
}

impl ArchiveExtractor {
    /// Create an extractor; `seven_zip_path` overrides utility discovery.
    pub fn new(staging: Arc<StagingArena>, seven_zip_path: Option<PathBuf>) -> Self {
        Self {
            staging,
            utility: UtilitySource::Lookup(seven_zip_path),
        }
    }

    /// Create an extractor bound to a specific utility.
    pub fn with_utility(staging: Arc<StagingArena>, utility: SevenZip) -> Self {
        Self {
            staging,
            utility: UtilitySource::Fixed(utility),
        }
    }

    pub fn staging(&self) -> &Arc<StagingArena> {
        &self.staging
    }

    /// Extract `archive` into a new staging directory and return its path.
    ///
    /// On failure the staging directory is disposed before returning.
    pub async fn extract_to_temporary(&self, archive: &Path) -> Result<PathBuf, ArchiveError> {
        let kind = require_kind(archive)?;
        check_readable(archive)?;

        let label = archive
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let staging = self
            .staging
            .allocate(&label)
            .map_err(|source| ArchiveError::CreateDestination {
                path: self.staging.root().to_path_buf(),
                source,
            })?;

        let job = ArchiveJob {
            archive: archive.to_path_buf(),
            destination: staging.clone(),
            kind,
            mode: ExtractMode::Temporary,
        };
        match self.run(&job).await {
            Ok(()) => Ok(staging),
            Err(e) => {
                if let Err(dispose_err) = self.staging.dispose(&staging) {
                    warn!(
                        "Failed to dispose staging directory {}: {}",
                        staging.display(),
                        dispose_err
                    );
                }
                Err(e)
            }
        }
    }

    /// Extract `archive` into `destination`, creating it if needed and
    /// overwriting existing files.
    pub async fn extract_to_destination(
        &self,
        archive: &Path,
        destination: &Path,
    ) -> Result<(), ArchiveError> {
        let kind = require_kind(archive)?;
        check_readable(archive)?;

        let job = ArchiveJob {
            archive: archive.to_path_buf(),
            destination: destination.to_path_buf(),
            kind,
            mode: ExtractMode::Permanent,
        };
        self.run(&job).await
    }

    async fn run(&self, job: &ArchiveJob) -> Result<(), ArchiveError> {
        ensure_writable_dir(&job.destination).map_err(|source| {
            ArchiveError::CreateDestination {
                path: job.destination.clone(),
                source,
            }
        })?;

        info!(
            "Extracting {} ({:?}, {:?}) -> {}",
            job.archive.display(),
            job.kind,
            job.mode,
            job.destination.display()
        );

        if job.kind.is_in_process() {
            let archive = job.archive.clone();
            let destination = job.destination.clone();
            let summary = tokio::task::spawn_blocking(move || extract_zip(&archive, &destination))
                .await
                .map_err(|e| ArchiveError::io(&job.archive, io::Error::other(e)))??;
            debug!("{:?}", summary);
            return Ok(());
        }

        let utility = self.utility()?;
        utility.extract(&job.archive, &job.destination).await
    }

    fn utility(&self) -> Result<SevenZip, ArchiveError> {
        match &self.utility {
            UtilitySource::Fixed(utility) => Ok(utility.clone()),
            UtilitySource::Lookup(configured) => SevenZip::locate(configured.as_deref()),
        }
    }
}

fn require_kind(archive: &Path) -> Result<ArchiveKind, ArchiveError> {
    ArchiveKind::from_path(archive).ok_or_else(|| ArchiveError::Unsupported {
        path: archive.to_path_buf(),
    })
}

/// Make sure the archive exists and no other process holds it locked.
fn check_readable(archive: &Path) -> Result<(), ArchiveError> {
    check_exclusive_open(archive).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            ArchiveError::Missing {
                path: archive.to_path_buf(),
            }
        } else if is_lock_violation(&source) {
            warn!("{} is locked by another process", archive.display());
            ArchiveError::Locked {
                path: archive.to_path_buf(),
                source,
            }
        } else {
            ArchiveError::io(archive, source)
        }
    })
}
