//! Shared types for the romhub launcher.
//!
//! System and emulator definitions are produced by the configuration layer and
//! consumed read-only by the acquisition/extraction/launch pipeline in
//! `romhub-core`.

pub mod ext;
pub mod fs;
pub mod ids;
pub mod system;

pub use ext::{extension_of, has_extension, normalize_extension};
pub use fs::{MAX_CONFIG_BYTES, read_to_string_with_limit};
pub use ids::{is_safe_path_component, sanitize_path_component};
pub use system::{
    DEFAULT_BENIGN_EXIT_CODES, EmulatorDefinition, ROM_PLACEHOLDER, SystemLaunchConfig,
};
