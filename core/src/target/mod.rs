//! Launch target resolution
//!
//! Decides which file is actually handed to the launcher: the selected file
//! itself, or the payload found inside a freshly extracted archive.


use std::path::{Path, PathBuf};
use std::sync::Arc;

use romhub_shared::{SystemLaunchConfig, extension_of, normalize_extension};
use thiserror::Error;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::archive::{ArchiveError, ArchiveExtractor, ArchiveKind};

/// The file to launch and, when extraction happened, where it lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTarget {
    pub payload: PathBuf,
    /// Staging directory to dispose once the session ends
    pub staging: Option<PathBuf>,
}

impl ResolvedTarget {
    pub fn direct(path: impl Into<PathBuf>) -> Self {
        Self {
            payload: path.into(),
            staging: None,
        }
    }

    pub fn is_extracted(&self) -> bool {
        self.staging.is_some()
    }
}

#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("File not found: {}", .path.display())]
    Missing { path: PathBuf },
    #[error("Failed to extract {}: {source}", .path.display())]
    ExtractionFailed {
        path: PathBuf,
        #[source]
        source: ArchiveError,
    },
    #[error(
        "No file matching [{}] found in {}; check the system's launch extensions",
        .extensions.join(", "),
        .archive.display()
    )]
    NoPayload {
        archive: PathBuf,
        staging: PathBuf,
        extensions: Vec<String>,
    },
}

/// Resolves launch targets, extracting archives when a system asks for it.
#[derive(Debug, Clone)]
pub struct TargetResolver {
    extractor: Arc<ArchiveExtractor>,
    recursive: bool,
}

impl TargetResolver {
    pub fn new(extractor: Arc<ArchiveExtractor>) -> Self {
        Self {
            extractor,
            recursive: false,
        }
    }

    /// Also search subdirectories of the staging directory.
    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    pub async fn resolve(
        &self,
        file: &Path,
        system: &SystemLaunchConfig,
    ) -> Result<ResolvedTarget, ResolveError> {
        if !file.exists() {
            return Err(ResolveError::Missing {
                path: file.to_path_buf(),
            });
        }

        if !system.extract_before_launch || !ArchiveKind::is_archive(file) {
            debug!("Launching {} directly", file.display());
            return Ok(ResolvedTarget::direct(file));
        }

        let staging = self
            .extractor
            .extract_to_temporary(file)
            .await
            .map_err(|source| ResolveError::ExtractionFailed {
                path: file.to_path_buf(),
                source,
            })?;

        match find_payload(&staging, &system.launch_extensions, self.recursive) {
            Some(payload) => {
                info!("Resolved {} -> {}", file.display(), payload.display());
                Ok(ResolvedTarget {
                    payload,
                    staging: Some(staging),
                })
            }
            None => {
                warn!(
                    "No payload with extensions {:?} in {} (system '{}')",
                    system.launch_extensions,
                    staging.display(),
                    system.name
                );
                if let Err(e) = self.extractor.staging().dispose(&staging) {
                    warn!("Failed to dispose {}: {}", staging.display(), e);
                }
                Err(ResolveError::NoPayload {
                    archive: file.to_path_buf(),
                    staging,
                    extensions: system.launch_extensions.clone(),
                })
            }
        }
    }
}

/// Find the launch payload in `dir`.
///
/// Extensions are tried in order; the first extension with any match wins,
/// and ties within one extension go to the smallest file name.
pub fn find_payload<S: AsRef<str>>(
    dir: &Path,
    extensions: &[S],
    recursive: bool,
) -> Option<PathBuf> {
    let max_depth = if recursive { usize::MAX } else { 1 };
    let mut files: Vec<(String, PathBuf)> = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(max_depth)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| {
            let path = entry.into_path();
            extension_of(&path).map(|ext| (ext, path))
        })
        .collect();
    files.sort_by(|a, b| a.1.file_name().cmp(&b.1.file_name()).then(a.1.cmp(&b.1)));

    extensions.iter().find_map(|wanted| {
        let wanted = normalize_extension(wanted.as_ref());
        files
            .iter()
            .find(|(ext, _)| *ext == wanted)
            .map(|(_, path)| path.clone())
    })
}
