//! External 7-Zip utility: discovery and invocation.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use tracing::{debug, error, info};

use super::ArchiveError;
use crate::process::{CapturedOutput, display_command};

/// Host architectures with a bundled utility build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostArch {
    X64,
    Arm64,
}

impl HostArch {
    /// Map a Rust target architecture name to a bundle directory.
    pub fn from_target(arch: &str) -> Result<Self, ArchiveError> {
        match arch {
            "x86_64" => Ok(Self::X64),
            "aarch64" => Ok(Self::Arm64),
            other => Err(ArchiveError::UnsupportedArchitecture {
                arch: other.to_string(),
            }),
        }
    }

    pub fn current() -> Result<Self, ArchiveError> {
        Self::from_target(std::env::consts::ARCH)
    }

    pub fn dir_name(self) -> &'static str {
        match self {
            Self::X64 => "x64",
            Self::Arm64 => "arm64",
        }
    }
}

/// Executable names tried on `PATH`, in order.
const PATH_CANDIDATES: &[&str] = &["7z", "7za", "7zz"];

fn bundled_file_name() -> &'static str {
    if cfg!(windows) { "7z.exe" } else { "7z" }
}

/// A located 7-Zip executable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SevenZip {
    program: PathBuf,
}

impl SevenZip {
    /// Use `program` without any lookup.
    pub fn at(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Find the utility for this host.
    ///
    /// Order: `configured` path, the bundle next to the running executable
    /// (`tools/7zip/<arch>/`), then `PATH`. An unsupported host architecture
    /// fails before anything is searched.
    pub fn locate(configured: Option<&Path>) -> Result<Self, ArchiveError> {
        let arch = HostArch::current()?;
        let exe_dir = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf));
        Self::locate_in(configured, exe_dir.as_deref(), arch)
    }

    pub(crate) fn locate_in(
        configured: Option<&Path>,
        exe_dir: Option<&Path>,
        arch: HostArch,
    ) -> Result<Self, ArchiveError> {
        let mut searched = Vec::new();

        if let Some(path) = configured {
            if path.is_file() {
                return Ok(Self::at(path));
            }
            searched.push(path.to_path_buf());
        }

        if let Some(dir) = exe_dir {
            let bundled = dir
                .join("tools")
                .join("7zip")
                .join(arch.dir_name())
                .join(bundled_file_name());
            if bundled.is_file() {
                return Ok(Self::at(bundled));
            }
            searched.push(bundled);
        }

        for name in PATH_CANDIDATES {
            if let Ok(found) = which::which(name) {
                return Ok(Self::at(found));
            }
            searched.push(PathBuf::from(name));
        }

        Err(ArchiveError::UtilityMissing { searched })
    }

    /// Arguments for a full extraction with overwrite.
    pub fn extract_args(archive: &Path, destination: &Path) -> Vec<OsString> {
        let mut out_flag = OsString::from("-o");
        out_flag.push(destination.as_os_str());
        vec![
            OsString::from("x"),
            archive.as_os_str().to_os_string(),
            out_flag,
            OsString::from("-y"),
        ]
    }

    /// Run `<utility> x <archive> -o<destination> -y` and wait for it.
    pub async fn extract(&self, archive: &Path, destination: &Path) -> Result<(), ArchiveError> {
        let args = Self::extract_args(archive, destination);
        let command = display_command(self.program.as_os_str(), &args);
        debug!("Running {}", command);

        let output = tokio::process::Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| {
                error!("Failed to start {}: {}", command, e);
                if e.kind() == std::io::ErrorKind::NotFound {
                    ArchiveError::UtilityMissing {
                        searched: vec![self.program.clone()],
                    }
                } else {
                    ArchiveError::io(&self.program, e)
                }
            })?;

        let captured = CapturedOutput::from_output(&output);
        if output.status.success() {
            info!("Extracted {} to {}", archive.display(), destination.display());
            return Ok(());
        }

        let code = output.status.code();
        error!("{} failed ({:?}): {}", command, code, captured);
        Err(ArchiveError::UtilityFailed {
            command,
            code,
            output: captured,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_host_arch_mapping() {
        assert_eq!(HostArch::from_target("x86_64").unwrap(), HostArch::X64);
        assert_eq!(HostArch::from_target("aarch64").unwrap(), HostArch::Arm64);
        assert_eq!(HostArch::X64.dir_name(), "x64");
        assert_eq!(HostArch::Arm64.dir_name(), "arm64");

        let err = HostArch::from_target("riscv64").unwrap_err();
        assert!(matches!(
            err,
            ArchiveError::UnsupportedArchitecture { ref arch } if arch == "riscv64"
        ));
    }

    #[test]
    fn test_extract_args_shape() {
        let args = SevenZip::extract_args(Path::new("/t/pkg.7z"), Path::new("/t/out dir"));
        assert_eq!(
            args,
            vec![
                OsString::from("x"),
                OsString::from("/t/pkg.7z"),
                OsString::from("-o/t/out dir"),
                OsString::from("-y"),
            ]
        );
    }

    #[test]
    fn test_locate_prefers_configured() {
        let temp_dir = TempDir::new().unwrap();
        let configured = temp_dir.path().join("my7z");
        std::fs::write(&configured, b"").unwrap();

        let found = SevenZip::locate_in(Some(&configured), None, HostArch::X64).unwrap();
        assert_eq!(found.program(), configured);
    }

    #[test]
    fn test_locate_uses_bundle_for_arch() {
        let temp_dir = TempDir::new().unwrap();
        let bundle = temp_dir
            .path()
            .join("tools")
            .join("7zip")
            .join("arm64");
        std::fs::create_dir_all(&bundle).unwrap();
        let program = bundle.join(bundled_file_name());
        std::fs::write(&program, b"").unwrap();

        let missing = temp_dir.path().join("nope");
        let found =
            SevenZip::locate_in(Some(&missing), Some(temp_dir.path()), HostArch::Arm64).unwrap();
        assert_eq!(found.program(), program);
    }

    #[test]
    fn test_locate_reports_searched_paths() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("nope");

        match SevenZip::locate_in(Some(&missing), Some(temp_dir.path()), HostArch::X64) {
            // A system-wide 7-Zip satisfies the lookup on some machines
            Ok(found) => assert_ne!(found.program(), missing),
            Err(ArchiveError::UtilityMissing { searched }) => {
                assert_eq!(searched[0], missing);
                let bundled = Path::new("tools/7zip/x64").join(bundled_file_name());
                assert!(searched[1].ends_with(bundled));
                assert!(searched.len() >= 3);
            }
            Err(other) => panic!("unexpected error: {other}"),
        }
    }
}
