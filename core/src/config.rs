//! Configuration management (config.toml)
//!
//! Handles loading, saving, and providing defaults for launcher settings.
//! Settings are stored in TOML format in the platform-specific config directory.
//! System definitions live in the same file as `[[systems]]` tables.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use romhub_shared::{MAX_CONFIG_BYTES, SystemLaunchConfig, read_to_string_with_limit};

/// Directory name used under the system temp dir and in platform paths.
pub const APP_DIR_NAME: &str = "romhub";

/// Launcher configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    /// Filesystem locations
    #[serde(default)]
    pub paths: PathsConfig,
    /// Package download settings
    #[serde(default)]
    pub download: DownloadConfig,
    /// Archive extraction settings
    #[serde(default)]
    pub extraction: ExtractionConfig,
    /// Configured systems
    #[serde(default)]
    pub systems: Vec<SystemLaunchConfig>,
}

/// Filesystem locations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PathsConfig {
    /// Root for download artifacts and staging directories
    /// (default: `<system temp>/romhub`)
    #[serde(default)]
    pub temp_root: Option<PathBuf>,
    /// Where emulator packages are installed (default: `<data dir>/emulators`)
    #[serde(default)]
    pub install_root: Option<PathBuf>,
}

/// Package download settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadConfig {
    /// Write buffer size in bytes (default: 64 KiB)
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,
    /// Progress channel capacity (default: 32)
    #[serde(default = "default_progress_capacity")]
    pub progress_capacity: usize,
    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Optional bearer token for authenticated package hosts
    #[serde(default)]
    pub auth_token: Option<String>,
}

/// Archive extraction settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ExtractionConfig {
    /// Explicit path to a 7-Zip executable (default: bundled, then PATH)
    #[serde(default)]
    pub seven_zip_path: Option<PathBuf>,
    /// Keep staging directories after a play session (default: false)
    #[serde(default)]
    pub keep_staging: bool,
    /// Search staging directories recursively for the payload (default: false)
    #[serde(default)]
    pub recursive_payload_search: bool,
}

fn default_buffer_size() -> usize {
    64 * 1024
}
fn default_progress_capacity() -> usize {
    32
}
fn default_user_agent() -> String {
    format!("{}/{}", APP_DIR_NAME, env!("CARGO_PKG_VERSION"))
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            buffer_size: default_buffer_size(),
            progress_capacity: default_progress_capacity(),
            user_agent: default_user_agent(),
            auth_token: None,
        }
    }
}

impl PathsConfig {
    /// Resolved temp root.
    pub fn temp_root(&self) -> PathBuf {
        self.temp_root.clone().unwrap_or_else(default_temp_root)
    }

    /// Directory for download artifacts.
    pub fn downloads_dir(&self) -> PathBuf {
        self.temp_root().join("downloads")
    }

    /// Directory holding staging directories.
    pub fn staging_dir(&self) -> PathBuf {
        self.temp_root().join("staging")
    }

    /// Resolved install root, if one can be determined.
    pub fn install_root(&self) -> Option<PathBuf> {
        self.install_root
            .clone()
            .or_else(|| data_dir().map(|dir| dir.join("emulators")))
    }
}

/// Returns the platform-specific configuration directory.
///
/// On Windows: `%APPDATA%\romhub\config`
/// On macOS: `~/Library/Application Support/io.romhub.romhub`
/// On Linux: `~/.config/romhub`
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("io", "romhub", APP_DIR_NAME)
        .map(|dirs| dirs.config_dir().to_path_buf())
}

/// Returns the platform-specific data directory.
pub fn data_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("io", "romhub", APP_DIR_NAME)
        .map(|dirs| dirs.data_dir().to_path_buf())
}

/// Process-wide temp root: `<system temp>/romhub`.
pub fn default_temp_root() -> PathBuf {
    std::env::temp_dir().join(APP_DIR_NAME)
}

/// Path of the default config file, if the platform has a config dir.
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.toml"))
}

/// Loads the configuration from disk.
///
/// Returns default values if the file doesn't exist or cannot be parsed.
pub fn load() -> Config {
    let Some(path) = config_path() else {
        return Config::default();
    };
    if !path.exists() {
        return Config::default();
    }
    match load_from(&path) {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!("Ignoring unreadable config {}: {:#}", path.display(), e);
            Config::default()
        }
    }
}

/// Loads the configuration from an explicit path, reporting every failure.
pub fn load_from(path: &Path) -> Result<Config> {
    let content = read_to_string_with_limit(path, MAX_CONFIG_BYTES)?;
    toml::from_str(&content).with_context(|| format!("Invalid config file: {}", path.display()))
}

/// Saves the configuration to the platform config directory.
pub fn save(config: &Config) -> std::io::Result<()> {
    match config_path() {
        Some(path) => save_to(config, &path),
        None => Ok(()),
    }
}

/// Saves the configuration to `path`, creating parent directories.
pub fn save_to(config: &Config, path: &Path) -> std::io::Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let content = toml::to_string_pretty(config).map_err(std::io::Error::other)?;
    std::fs::write(path, content)
}

/// Check the system definitions for mistakes the pipeline would trip over.
///
/// Returns a list of warning messages; an empty list means the config is usable.
pub fn validate(config: &Config) -> Vec<String> {
    let mut warnings = Vec::new();
    let mut names: HashSet<&str> = HashSet::new();

    for system in &config.systems {
        if !names.insert(system.name.as_str()) {
            warnings.push(format!("system '{}' is defined more than once", system.name));
        }
        if system.extract_before_launch && system.launch_extensions.is_empty() {
            warnings.push(format!(
                "system '{}' extracts before launch but has no launch_extensions",
                system.name
            ));
        }
        let mut emulator_names: HashSet<&str> = HashSet::new();
        for emulator in &system.emulators {
            if emulator.executable.as_os_str().is_empty() {
                warnings.push(format!(
                    "emulator '{}' of system '{}' has no executable",
                    emulator.name, system.name
                ));
            }
            if !emulator_names.insert(emulator.name.as_str()) {
                warnings.push(format!(
                    "emulator '{}' is defined more than once for system '{}'",
                    emulator.name, system.name
                ));
            }
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use romhub_shared::EmulatorDefinition;
    use tempfile::TempDir;

    // =============================================================
    // Default value tests
    // =============================================================

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.download.buffer_size, 64 * 1024);
        assert_eq!(config.download.progress_capacity, 32);
        assert!(config.download.user_agent.starts_with("romhub/"));
        assert!(config.download.auth_token.is_none());
        assert!(!config.extraction.keep_staging);
        assert!(!config.extraction.recursive_payload_search);
        assert!(config.systems.is_empty());
    }

    #[test]
    fn test_default_temp_root_under_system_temp() {
        let paths = PathsConfig::default();
        assert_eq!(paths.temp_root(), std::env::temp_dir().join("romhub"));
        assert_eq!(paths.staging_dir(), paths.temp_root().join("staging"));
        assert_eq!(paths.downloads_dir(), paths.temp_root().join("downloads"));
    }

    // =============================================================
    // TOML tests
    // =============================================================

    #[test]
    fn test_config_deserialize_empty() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_config_deserialize_partial() {
        let toml_str = r#"
[paths]
temp_root = "/tmp/custom"

[extraction]
keep_staging = true

[[systems]]
name = "gba"
rom_folder = "/games/gba"
search_extensions = ["gba", "zip"]
extract_before_launch = true
launch_extensions = ["gba"]

[[systems.emulators]]
name = "mgba"
executable = "/usr/bin/mgba"
arguments = "-f %ROM%"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.paths.temp_root(), PathBuf::from("/tmp/custom"));
        assert!(config.extraction.keep_staging);
        assert_eq!(config.download.buffer_size, 64 * 1024); // default
        assert_eq!(config.systems.len(), 1);
        assert_eq!(config.systems[0].name, "gba");
        assert_eq!(config.systems[0].emulators[0].arguments, "-f %ROM%");
    }

    #[test]
    fn test_save_and_load_roundtrip_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.download.auth_token = Some("secret".into());
        let mut system = SystemLaunchConfig::new("nes", "/games/nes");
        system
            .emulators
            .push(EmulatorDefinition::new("fceux", "/usr/bin/fceux"));
        config.systems.push(system);

        save_to(&config, &path).unwrap();
        let loaded = load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_from_invalid_toml() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[[systems]\nname=").unwrap();

        let err = load_from(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("Invalid config file"));
    }

    // =============================================================
    // Validation tests
    // =============================================================

    #[test]
    fn test_validate_clean_config() {
        let mut config = Config::default();
        let mut system = SystemLaunchConfig::new("psx", "/games/psx");
        system.extract_before_launch = true;
        system.launch_extensions = vec!["cue".into()];
        system
            .emulators
            .push(EmulatorDefinition::new("duckstation", "/opt/duckstation"));
        config.systems.push(system);

        assert!(validate(&config).is_empty());
    }

    #[test]
    fn test_validate_reports_problems() {
        let mut config = Config::default();
        let mut psx = SystemLaunchConfig::new("psx", "/games/psx");
        psx.extract_before_launch = true;
        psx.emulators.push(EmulatorDefinition::new("a", ""));
        psx.emulators.push(EmulatorDefinition::new("a", "/bin/a"));
        config.systems.push(psx.clone());
        config.systems.push(psx);

        let warnings = validate(&config);
        assert!(warnings.iter().any(|w| w.contains("defined more than once for system")));
        assert!(warnings.iter().any(|w| w.contains("no launch_extensions")));
        assert!(warnings.iter().any(|w| w.contains("has no executable")));
        assert!(warnings.iter().any(|w| w.contains("system 'psx' is defined more than once")));
    }
}
