//! Staging directories for single-session extraction.
//!
//! Every temporary extraction gets its own directory under the staging root.
//! The arena remembers which directories this process created so they can be
//! disposed explicitly once a play session ends.
//!
//! Each directory `<name>` has a sibling owner marker `<name>.owner` holding
//! the PID of the process that allocated it. The marker is created
//! exclusively before the directory, so it also claims the name. Sweeping
//! only removes directories whose owner is gone, which keeps the sessions of
//! other running launchers intact.

use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use romhub_shared::sanitize_path_component;
use sysinfo::{Pid, ProcessesToUpdate, System};
use tracing::{debug, warn};

/// Longest label kept in a staging directory name.
const MAX_LABEL_CHARS: usize = 48;

/// Attempts before giving up on finding an unused name.
const MAX_ALLOCATE_ATTEMPTS: usize = 16;

const OWNER_SUFFIX: &str = ".owner";

#[derive(Debug)]
pub struct StagingArena {
    root: PathBuf,
    live: Mutex<HashSet<PathBuf>>,
}

impl StagingArena {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            live: Mutex::new(HashSet::new()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create a fresh, uniquely named directory for `label`.
    ///
    /// Uniqueness comes from a random suffix plus an exclusive create of the
    /// owner marker; a name collision just rolls a new suffix.
    pub fn allocate(&self, label: &str) -> io::Result<PathBuf> {
        std::fs::create_dir_all(&self.root)?;
        let label = sanitize_path_component(label, MAX_LABEL_CHARS, "archive");

        for _ in 0..MAX_ALLOCATE_ATTEMPTS {
            let dir = self
                .root
                .join(format!("{}-{:016x}", label, rand::random::<u64>()));
            match claim(&dir) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e),
            }
            match std::fs::create_dir(&dir) {
                Ok(()) => {
                    debug!("Allocated staging directory {}", dir.display());
                    self.lock().insert(dir.clone());
                    return Ok(dir);
                }
                Err(e) => {
                    remove_marker(&dir);
                    if e.kind() == io::ErrorKind::AlreadyExists {
                        continue;
                    }
                    return Err(e);
                }
            }
        }

        Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("no unused staging name under {}", self.root.display()),
        ))
    }

    /// Whether `dir` was allocated by this arena and not yet disposed.
    pub fn is_live(&self, dir: &Path) -> bool {
        self.lock().contains(dir)
    }

    /// Directories currently owned by this arena.
    pub fn live(&self) -> Vec<PathBuf> {
        let mut dirs: Vec<PathBuf> = self.lock().iter().cloned().collect();
        dirs.sort();
        dirs
    }

    /// Delete a staging directory this arena allocated.
    ///
    /// Returns `Ok(false)` for paths the arena does not own; those are never
    /// touched.
    pub fn dispose(&self, dir: &Path) -> io::Result<bool> {
        if !self.lock().remove(dir) {
            return Ok(false);
        }
        match std::fs::remove_dir_all(dir) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => {
                // Still ours; a later dispose_all can retry
                self.lock().insert(dir.to_path_buf());
                return Err(e);
            }
        }
        remove_marker(dir);
        debug!("Disposed staging directory {}", dir.display());
        Ok(true)
    }

    /// Dispose every live directory, returning how many were removed.
    pub fn dispose_all(&self) -> usize {
        let mut removed = 0;
        for dir in self.live() {
            match self.dispose(&dir) {
                Ok(true) => removed += 1,
                Ok(false) => {}
                Err(e) => warn!("Failed to dispose staging directory {}: {}", dir.display(), e),
            }
        }
        removed
    }

    /// Remove staging directories whose owning process has exited.
    ///
    /// Directories of running processes (this one included) are kept, as are
    /// marker-less entries that are not staging directories. Returns how many
    /// directories were removed.
    pub fn sweep_orphans(&self) -> io::Result<usize> {
        let entries = match std::fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e),
        };

        let live = self.lock().clone();
        let mut system = System::new();
        let mut removed = 0;
        for entry in entries {
            let path = entry?.path();
            if !path.is_dir() || live.contains(&path) {
                continue;
            }
            match read_owner(&path) {
                Some(pid) if process_is_running(&mut system, pid) => {
                    debug!("Keeping {} (owned by running process {})", path.display(), pid);
                    continue;
                }
                _ => {}
            }
            match std::fs::remove_dir_all(&path) {
                Ok(()) => {
                    remove_marker(&path);
                    removed += 1;
                }
                Err(e) => warn!("Failed to sweep {}: {}", path.display(), e),
            }
        }
        if removed > 0 {
            debug!("Swept {} orphaned staging directories", removed);
        }
        Ok(removed)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashSet<PathBuf>> {
        self.live.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn marker_path(dir: &Path) -> PathBuf {
    let mut name = dir.as_os_str().to_os_string();
    name.push(OWNER_SUFFIX);
    PathBuf::from(name)
}

/// Exclusively create the owner marker for `dir`.
fn claim(dir: &Path) -> io::Result<()> {
    use std::io::Write;

    let mut marker = std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(marker_path(dir))?;
    write!(marker, "{}", std::process::id())
}

fn remove_marker(dir: &Path) {
    if let Err(e) = std::fs::remove_file(marker_path(dir))
        && e.kind() != io::ErrorKind::NotFound
    {
        warn!("Failed to remove owner marker for {}: {}", dir.display(), e);
    }
}

fn read_owner(dir: &Path) -> Option<u32> {
    std::fs::read_to_string(marker_path(dir))
        .ok()?
        .trim()
        .parse()
        .ok()
}

fn process_is_running(system: &mut System, pid: u32) -> bool {
    if pid == std::process::id() {
        return true;
    }
    let pid = Pid::from_u32(pid);
    system.refresh_processes(ProcessesToUpdate::Some(&[pid]), true);
    system.process(pid).is_some()
}
