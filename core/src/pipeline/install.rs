//! Package installation: download, extract permanently, clean up.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use romhub_shared::sanitize_path_component;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::PipelineError;
use crate::archive::{ArchiveError, ArchiveExtractor, ArchiveKind};
use crate::download::{DownloadManager, DownloadOutcome, ProgressSender};
use crate::fsutil::remove_file_if_exists;

const MAX_ARTIFACT_NAME_CHARS: usize = 96;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallReport {
    pub url: String,
    pub install_dir: PathBuf,
    /// Size of the downloaded archive
    pub bytes: u64,
}

/// Installs emulator packages, cores and asset packs from a URL.
#[derive(Debug, Clone)]
pub struct PackageInstaller {
    downloads: DownloadManager,
    extractor: Arc<ArchiveExtractor>,
    downloads_dir: PathBuf,
}

impl PackageInstaller {
    pub fn new(
        downloads: DownloadManager,
        extractor: Arc<ArchiveExtractor>,
        downloads_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            downloads,
            extractor,
            downloads_dir: downloads_dir.into(),
        }
    }

    /// Download `url` and extract it into `install_dir`.
    ///
    /// The downloaded archive is deleted afterwards whether or not extraction
    /// succeeded; nothing half-downloaded is ever left behind.
    pub async fn install(
        &self,
        url: &str,
        install_dir: &Path,
        cancel: CancellationToken,
        progress: Option<ProgressSender>,
    ) -> Result<InstallReport, PipelineError> {
        let artifact = self.downloads_dir.join(artifact_name(url));
        // Reject unknown formats before spending bandwidth on them
        if ArchiveKind::from_path(&artifact).is_none() {
            return Err(ArchiveError::Unsupported { path: artifact }.into());
        }

        let report = match self
            .downloads
            .download(url, &artifact, cancel, progress)
            .await?
        {
            DownloadOutcome::Completed(report) => report,
            DownloadOutcome::Canceled => return Err(PipelineError::Canceled),
        };

        let extracted = self
            .extractor
            .extract_to_destination(&artifact, install_dir)
            .await;
        if let Err(e) = remove_file_if_exists(&artifact).await {
            warn!("Failed to remove {}: {}", artifact.display(), e);
        }
        extracted?;

        info!("Installed {} into {}", url, install_dir.display());
        Ok(InstallReport {
            url: url.to_string(),
            install_dir: install_dir.to_path_buf(),
            bytes: report.bytes,
        })
    }
}

/// A unique local file name for the artifact at `url`.
///
/// Keeps the last path segment (and so the extension) so the archive kind can
/// be detected; a random prefix keeps concurrent installs apart.
pub(crate) fn artifact_name(url: &str) -> String {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let segment = path.rsplit('/').next().unwrap_or(path);
    let name = sanitize_path_component(segment, MAX_ARTIFACT_NAME_CHARS, "package");
    format!("{:08x}-{}", rand::random::<u32>(), name)
}
