//! File extension helpers.
//!
//! Extensions in configuration may be written as `bin`, `.bin` or `.BIN`.
//! Everything is compared in normalized form: lowercase, without the dot.

use std::path::Path;

/// Normalize a configured extension (`".BIN"` -> `"bin"`).
pub fn normalize_extension(ext: &str) -> String {
    ext.trim().trim_start_matches('.').to_ascii_lowercase()
}

/// Returns the normalized extension of `path`, if it has one.
pub fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(normalize_extension)
        .filter(|e| !e.is_empty())
}

/// Returns true if `path` has one of the given extensions.
///
/// `extensions` may be in any configured form.
pub fn has_extension<S: AsRef<str>>(path: &Path, extensions: &[S]) -> bool {
    let Some(ext) = extension_of(path) else {
        return false;
    };
    extensions
        .iter()
        .any(|candidate| normalize_extension(candidate.as_ref()) == ext)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_extension() {
        assert_eq!(normalize_extension(".BIN"), "bin");
        assert_eq!(normalize_extension("cue"), "cue");
        assert_eq!(normalize_extension(" .Zip "), "zip");
        assert_eq!(normalize_extension(""), "");
    }

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of(Path::new("game.SFC")), Some("sfc".to_string()));
        assert_eq!(extension_of(Path::new("dir/game.tar.7z")), Some("7z".to_string()));
        assert_eq!(extension_of(Path::new("README")), None);
    }

    #[test]
    fn test_has_extension_mixed_forms() {
        let exts = [".bin", "CUE"];
        assert!(has_extension(Path::new("disc.BIN"), &exts));
        assert!(has_extension(Path::new("disc.cue"), &exts));
        assert!(!has_extension(Path::new("disc.iso"), &exts));
        assert!(!has_extension(Path::new("disc"), &exts));
    }
}
