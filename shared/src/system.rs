//! System and emulator definitions.
//!
//! A `SystemLaunchConfig` is the immutable snapshot the launch pipeline works
//! from: where content lives, which files count as content, whether content
//! must be extracted first, and which emulators can run it.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::ext::has_extension;

/// Placeholder in an emulator argument template that is replaced by the
/// resolved payload path. Templates without it get the path appended.
pub const ROM_PLACEHOLDER: &str = "%ROM%";

/// Exit codes treated as a normal emulator shutdown by default.
///
/// `0xC000013A` (STATUS_CONTROL_C_EXIT) is reported by several Windows
/// emulators when their console window is closed.
pub const DEFAULT_BENIGN_EXIT_CODES: &[i32] = &[-1073741510];

fn default_benign_exit_codes() -> Vec<i32> {
    DEFAULT_BENIGN_EXIT_CODES.to_vec()
}

/// An external emulator able to run a system's content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmulatorDefinition {
    /// Display name, also used to pick an emulator from the CLI
    pub name: String,
    /// Path to the emulator executable
    pub executable: PathBuf,
    /// Argument template; `%ROM%` is replaced by the payload path
    #[serde(default)]
    pub arguments: String,
    /// Non-zero exit codes that still count as a successful session
    #[serde(default = "default_benign_exit_codes")]
    pub benign_exit_codes: Vec<i32>,
}

impl EmulatorDefinition {
    pub fn new(name: impl Into<String>, executable: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            executable: executable.into(),
            arguments: String::new(),
            benign_exit_codes: default_benign_exit_codes(),
        }
    }

    /// Set the argument template.
    pub fn arguments(mut self, template: impl Into<String>) -> Self {
        self.arguments = template.into();
        self
    }

    /// Replace the benign exit code set.
    pub fn benign_exit_codes(mut self, codes: impl Into<Vec<i32>>) -> Self {
        self.benign_exit_codes = codes.into();
        self
    }

    /// Returns true if `code` is a benign shutdown for this emulator.
    pub fn is_benign_exit(&self, code: i32) -> bool {
        self.benign_exit_codes.contains(&code)
    }
}

/// Launch configuration for one system (console, computer, arcade board...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemLaunchConfig {
    /// Unique system name
    pub name: String,
    /// Folder holding the system's content files
    pub rom_folder: PathBuf,
    /// Extensions listed when browsing the content folder
    #[serde(default)]
    pub search_extensions: Vec<String>,
    /// Extract archives into a staging directory before launching
    #[serde(default)]
    pub extract_before_launch: bool,
    /// Ordered extensions of the file to launch after extraction
    #[serde(default)]
    pub launch_extensions: Vec<String>,
    /// Emulators in order of preference
    #[serde(default)]
    pub emulators: Vec<EmulatorDefinition>,
}

impl SystemLaunchConfig {
    pub fn new(name: impl Into<String>, rom_folder: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            rom_folder: rom_folder.into(),
            search_extensions: Vec::new(),
            extract_before_launch: false,
            launch_extensions: Vec::new(),
            emulators: Vec::new(),
        }
    }

    /// Returns true if `path` is browsable content for this system.
    pub fn is_content_file(&self, path: &Path) -> bool {
        has_extension(path, &self.search_extensions)
    }

    /// Look up an emulator by exact name, or the preferred one if `name` is `None`.
    pub fn emulator(&self, name: Option<&str>) -> Option<&EmulatorDefinition> {
        match name {
            Some(name) => self.emulators.iter().find(|e| e.name == name),
            None => self.emulators.first(),
        }
    }
}
