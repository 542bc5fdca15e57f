//! In-process zip decoding.

use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;

use tracing::{debug, warn};

use super::ArchiveError;

/// Entries written and entries skipped by a zip extraction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeSummary {
    pub files: usize,
    pub skipped: usize,
}

/// Extract every entry of `archive` under `destination`, overwriting files
/// that already exist.
///
/// Entry names that would escape `destination` (absolute paths, `..`) are
/// skipped. Blocking; run it on the blocking pool.
pub fn extract_zip(archive: &Path, destination: &Path) -> Result<DecodeSummary, ArchiveError> {
    let file = File::open(archive).map_err(|e| ArchiveError::io(archive, e))?;
    let mut zip = zip::ZipArchive::new(BufReader::new(file)).map_err(|source| {
        ArchiveError::Decode {
            path: archive.to_path_buf(),
            source,
        }
    })?;

    let mut summary = DecodeSummary::default();
    for index in 0..zip.len() {
        let mut entry = zip.by_index(index).map_err(|source| ArchiveError::Decode {
            path: archive.to_path_buf(),
            source,
        })?;

        let Some(relative) = entry.enclosed_name() else {
            warn!(
                "Skipping unsafe entry '{}' in {}",
                entry.name(),
                archive.display()
            );
            summary.skipped += 1;
            continue;
        };
        let out_path = destination.join(relative);

        if entry.is_dir() {
            std::fs::create_dir_all(&out_path).map_err(|e| ArchiveError::io(&out_path, e))?;
            continue;
        }

        if let Some(parent) = out_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ArchiveError::io(parent, e))?;
        }
        let mut out = File::create(&out_path).map_err(|e| ArchiveError::io(&out_path, e))?;
        io::copy(&mut entry, &mut out).map_err(|e| ArchiveError::io(&out_path, e))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            // Keep executables runnable (AppImages, shell launchers)
            if let Some(mode) = entry.unix_mode().map(|m| m & 0o777)
                && mode != 0
                && let Err(e) =
                    std::fs::set_permissions(&out_path, std::fs::Permissions::from_mode(mode))
            {
                debug!("Could not set mode on {}: {}", out_path.display(), e);
            }
        }

        summary.files += 1;
    }

    debug!(
        "Decoded {} files from {} ({} skipped)",
        summary.files,
        archive.display(),
        summary.skipped
    );
    Ok(summary)
}
