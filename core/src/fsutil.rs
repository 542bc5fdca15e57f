//! Filesystem helpers shared by the downloader and the extractor.

use std::io;
use std::path::Path;

/// Windows `ERROR_SHARING_VIOLATION`.
const ERROR_SHARING_VIOLATION: i32 = 32;
/// Windows `ERROR_LOCK_VIOLATION`.
const ERROR_LOCK_VIOLATION: i32 = 33;

/// Returns true if `err` means another process holds the file open or locked.
pub fn is_lock_violation(err: &io::Error) -> bool {
    if err.kind() == io::ErrorKind::ResourceBusy {
        return true;
    }
    cfg!(windows)
        && matches!(
            err.raw_os_error(),
            Some(ERROR_SHARING_VIOLATION | ERROR_LOCK_VIOLATION)
        )
}

/// Open `path` for reading without sharing it.
///
/// On Windows the exclusive open fails while protective software (or anything
/// else) has the file open, which is exactly the condition we need to report
/// before handing a fresh download to an extractor.
pub fn check_exclusive_open(path: &Path) -> io::Result<()> {
    let mut options = std::fs::OpenOptions::new();
    options.read(true);
    #[cfg(windows)]
    {
        use std::os::windows::fs::OpenOptionsExt;
        options.share_mode(0);
    }
    options.open(path).map(drop)
}

/// Create `dir` (and parents) and prove it accepts new files.
pub fn ensure_writable_dir(dir: &Path) -> io::Result<()> {
    std::fs::create_dir_all(dir)?;
    let scratch = dir.join(format!(".romhub-write-check-{:08x}", rand::random::<u32>()));
    std::fs::write(&scratch, b"")?;
    std::fs::remove_file(&scratch)
}

/// Remove a file, treating "already gone" as success.
pub async fn remove_file_if_exists(path: &Path) -> io::Result<()> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}
