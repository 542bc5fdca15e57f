//! Content folder scanning

use std::path::{Path, PathBuf};

use romhub_shared::SystemLaunchConfig;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// A launchable file in a system's content folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameEntry {
    /// Display title (file name without extension)
    pub title: String,
    pub path: PathBuf,
    /// Owning system name
    pub system: String,
    pub size_bytes: u64,
}

/// List the content files of `system`, sorted by title.
///
/// Only the top level of the content folder is scanned; games that need
/// several files ship as archives or cue sheets. A missing folder yields an
/// empty list.
pub fn scan_system(system: &SystemLaunchConfig) -> Vec<GameEntry> {
    scan_folder(&system.rom_folder, system)
}

fn scan_folder(folder: &Path, system: &SystemLaunchConfig) -> Vec<GameEntry> {
    if !folder.is_dir() {
        warn!(
            "Content folder for '{}' does not exist: {}",
            system.name,
            folder.display()
        );
        return Vec::new();
    }

    let mut games: Vec<GameEntry> = WalkDir::new(folder)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file() && system.is_content_file(entry.path()))
        .map(|entry| {
            let size_bytes = entry.metadata().map(|m| m.len()).unwrap_or(0);
            let path = entry.into_path();
            let title = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            GameEntry {
                title,
                path,
                system: system.name.clone(),
                size_bytes,
            }
        })
        .collect();

    games.sort_by(|a, b| {
        a.title
            .to_lowercase()
            .cmp(&b.title.to_lowercase())
            .then_with(|| a.path.cmp(&b.path))
    });
    debug!("Found {} games for '{}'", games.len(), system.name);
    games
}
