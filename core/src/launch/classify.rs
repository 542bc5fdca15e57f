use std::path::Path;

use romhub_shared::extension_of;

/// How a payload is started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LaunchKind {
    /// Batch, PowerShell or shell script run through its interpreter
    Script,
    /// Desktop shortcut opened through the platform shell
    Shortcut,
    /// Directly executable program
    NativeExecutable,
    /// Content file run by a configured emulator
    EmulatorManaged,
}

impl LaunchKind {
    pub const SCRIPT_EXTENSIONS: &'static [&'static str] = &["bat", "cmd", "ps1", "sh"];
    pub const SHORTCUT_EXTENSIONS: &'static [&'static str] = &["lnk", "url", "desktop"];
    pub const NATIVE_EXTENSIONS: &'static [&'static str] = &["exe", "appimage"];

    /// Whether an emulator definition is needed to start this kind.
    pub fn needs_emulator(self) -> bool {
        self == Self::EmulatorManaged
    }

    /// Whether the configured benign exit codes apply.
    pub fn accepts_benign_exit(self) -> bool {
        self == Self::EmulatorManaged
    }
}

/// Classify a payload by extension alone.
pub fn classify(path: &Path) -> LaunchKind {
    let Some(ext) = extension_of(path) else {
        return LaunchKind::EmulatorManaged;
    };
    let ext = ext.as_str();
    if LaunchKind::SCRIPT_EXTENSIONS.contains(&ext) {
        LaunchKind::Script
    } else if LaunchKind::SHORTCUT_EXTENSIONS.contains(&ext) {
        LaunchKind::Shortcut
    } else if LaunchKind::NATIVE_EXTENSIONS.contains(&ext) {
        LaunchKind::NativeExecutable
    } else {
        LaunchKind::EmulatorManaged
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_by_extension() {
        assert_eq!(classify(Path::new("setup.BAT")), LaunchKind::Script);
        assert_eq!(classify(Path::new("run.ps1")), LaunchKind::Script);
        assert_eq!(classify(Path::new("start.sh")), LaunchKind::Script);
        assert_eq!(classify(Path::new("Game.lnk")), LaunchKind::Shortcut);
        assert_eq!(classify(Path::new("game.desktop")), LaunchKind::Shortcut);
        assert_eq!(classify(Path::new("game.exe")), LaunchKind::NativeExecutable);
        assert_eq!(
            classify(Path::new("Game-x86_64.AppImage")),
            LaunchKind::NativeExecutable
        );
        assert_eq!(classify(Path::new("game.sfc")), LaunchKind::EmulatorManaged);
        assert_eq!(classify(Path::new("README")), LaunchKind::EmulatorManaged);
    }

    #[test]
    fn test_only_emulator_kind_needs_emulator() {
        assert!(LaunchKind::EmulatorManaged.needs_emulator());
        assert!(LaunchKind::EmulatorManaged.accepts_benign_exit());
        for kind in [
            LaunchKind::Script,
            LaunchKind::Shortcut,
            LaunchKind::NativeExecutable,
        ] {
            assert!(!kind.needs_emulator());
            assert!(!kind.accepts_benign_exit());
        }
    }
}
