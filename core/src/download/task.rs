//! Download task state and progress types

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Lifecycle of a single download.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadState {
    Pending,
    InProgress,
    Completed,
    Canceled,
    Failed,
}

impl DownloadState {
    /// Returns true once the task can no longer change state.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Canceled | Self::Failed)
    }
}

/// Progress update sent after every chunk written to disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DownloadProgress {
    pub bytes_transferred: u64,
    /// Server-reported length, if any
    pub total_bytes: Option<u64>,
}

impl DownloadProgress {
    /// Fraction complete in `0.0..=1.0`, when the total is known.
    pub fn ratio(&self) -> Option<f64> {
        match self.total_bytes {
            Some(0) => Some(1.0),
            Some(total) => Some((self.bytes_transferred as f64 / total as f64).min(1.0)),
            None => None,
        }
    }
}

pub type ProgressSender = mpsc::Sender<DownloadProgress>;
pub type ProgressReceiver = mpsc::Receiver<DownloadProgress>;

/// Create a bounded progress stream.
///
/// The download waits for room in the channel, so the receiver must be
/// drained (or dropped) while the download runs.
pub fn progress_channel(capacity: usize) -> (ProgressSender, ProgressReceiver) {
    mpsc::channel(capacity.max(1))
}

/// Point-in-time view of a task, for UI polling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DownloadSnapshot {
    pub state: DownloadState,
    pub bytes_transferred: u64,
    pub total_bytes: Option<u64>,
}

#[derive(Debug)]
struct TaskStatus {
    state: DownloadState,
    total_bytes: Option<u64>,
}

/// One download request: where from, where to, and how far along it is.
///
/// The task is shared by reference between the download loop and whoever
/// displays it; cancellation goes through the task's token.
#[derive(Debug)]
pub struct DownloadTask {
    url: String,
    destination: PathBuf,
    cancel: CancellationToken,
    transferred: AtomicU64,
    status: Mutex<TaskStatus>,
}

impl DownloadTask {
    pub fn new(url: impl Into<String>, destination: impl Into<PathBuf>) -> Self {
        Self::with_cancel(url, destination, CancellationToken::new())
    }

    /// Create a task driven by an existing cancellation token.
    pub fn with_cancel(
        url: impl Into<String>,
        destination: impl Into<PathBuf>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            url: url.into(),
            destination: destination.into(),
            cancel,
            transferred: AtomicU64::new(0),
            status: Mutex::new(TaskStatus {
                state: DownloadState::Pending,
                total_bytes: None,
            }),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// Token that cancels this task when triggered.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Request cooperative cancellation.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_canceled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn state(&self) -> DownloadState {
        self.lock_status().state
    }

    pub fn bytes_transferred(&self) -> u64 {
        self.transferred.load(Ordering::Acquire)
    }

    pub fn total_bytes(&self) -> Option<u64> {
        self.lock_status().total_bytes
    }

    pub fn snapshot(&self) -> DownloadSnapshot {
        let status = self.lock_status();
        DownloadSnapshot {
            state: status.state,
            bytes_transferred: self.bytes_transferred(),
            total_bytes: status.total_bytes,
        }
    }

    pub(crate) fn progress(&self) -> DownloadProgress {
        DownloadProgress {
            bytes_transferred: self.bytes_transferred(),
            total_bytes: self.total_bytes(),
        }
    }

    pub(crate) fn set_state(&self, state: DownloadState) {
        self.lock_status().state = state;
    }

    pub(crate) fn set_total(&self, total: Option<u64>) {
        self.lock_status().total_bytes = total;
    }

    pub(crate) fn add_transferred(&self, bytes: u64) -> u64 {
        self.transferred.fetch_add(bytes, Ordering::AcqRel) + bytes
    }

    pub(crate) fn cancelled(&self) -> tokio_util::sync::WaitForCancellationFuture<'_> {
        self.cancel.cancelled()
    }

    fn lock_status(&self) -> std::sync::MutexGuard<'_, TaskStatus> {
        self.status.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
