//! Package downloads with progress reporting and cooperative cancellation.
//!
//! A download streams one HTTP GET into a local file. The destination either
//! ends at exactly the advertised size or is removed; cancellation, transport
//! errors, write errors and short bodies all delete the partial file.

mod error;
mod task;


use std::path::{Path, PathBuf};

use reqwest::StatusCode;
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::DownloadConfig;
use crate::fsutil::remove_file_if_exists;

pub use error::{DownloadError, WriteFailure};
pub use task::{
    DownloadProgress, DownloadSnapshot, DownloadState, DownloadTask, ProgressReceiver,
    ProgressSender, progress_channel,
};

/// A finished download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadReport {
    pub path: PathBuf,
    pub bytes: u64,
    pub total_bytes: Option<u64>,
}

/// How a download ended when it did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    Completed(DownloadReport),
    /// Stopped through the cancellation token; the partial file is gone
    Canceled,
}

impl DownloadOutcome {
    pub fn is_canceled(&self) -> bool {
        matches!(self, Self::Canceled)
    }

    /// The report of a completed download.
    pub fn completed(self) -> Option<DownloadReport> {
        match self {
            Self::Completed(report) => Some(report),
            Self::Canceled => None,
        }
    }
}

pub type DownloadResult = Result<DownloadOutcome, DownloadError>;

/// Internal early exit from the transfer loop.
enum Stop {
    Canceled,
    Failed(DownloadError),
}

impl From<DownloadError> for Stop {
    fn from(err: DownloadError) -> Self {
        Self::Failed(err)
    }
}

/// Streams remote resources to disk.
#[derive(Debug, Clone)]
pub struct DownloadManager {
    client: reqwest::Client,
    config: DownloadConfig,
}

impl DownloadManager {
    pub fn new(config: DownloadConfig) -> Result<Self, DownloadError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(DownloadError::Client)?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &DownloadConfig {
        &self.config
    }

    /// Download `url` to `destination`.
    ///
    /// Progress is sent after every chunk written; a closed receiver is
    /// ignored. The call waits for room in the progress channel, but always
    /// gives way to cancellation.
    pub async fn download(
        &self,
        url: &str,
        destination: &Path,
        cancel: CancellationToken,
        progress: Option<ProgressSender>,
    ) -> DownloadResult {
        let task = DownloadTask::with_cancel(url, destination, cancel);
        self.run(&task, progress).await
    }

    /// Drive `task` to a terminal state.
    ///
    /// A partial file is removed on failure or cancellation, but only once
    /// this transfer has created it; an existing file at the destination is
    /// left alone when the request never got that far.
    pub async fn run(
        &self,
        task: &DownloadTask,
        progress: Option<ProgressSender>,
    ) -> DownloadResult {
        info!("Downloading {} -> {}", task.url(), task.destination().display());
        task.set_state(DownloadState::InProgress);

        let mut created = false;
        match self.transfer(task, progress.as_ref(), &mut created).await {
            Ok(report) => {
                task.set_state(DownloadState::Completed);
                info!(
                    "Downloaded {} ({} bytes) to {}",
                    task.url(),
                    report.bytes,
                    report.path.display()
                );
                Ok(DownloadOutcome::Completed(report))
            }
            Err(Stop::Canceled) => {
                if created {
                    discard_partial(task.destination()).await;
                }
                task.set_state(DownloadState::Canceled);
                info!(
                    "Download of {} canceled after {} bytes",
                    task.url(),
                    task.bytes_transferred()
                );
                Ok(DownloadOutcome::Canceled)
            }
            Err(Stop::Failed(err)) => {
                if created {
                    discard_partial(task.destination()).await;
                }
                task.set_state(DownloadState::Failed);
                error!("Download of {} failed: {}", task.url(), err);
                Err(err)
            }
        }
    }

    async fn transfer(
        &self,
        task: &DownloadTask,
        progress: Option<&ProgressSender>,
        created: &mut bool,
    ) -> Result<DownloadReport, Stop> {
        if task.is_canceled() {
            return Err(Stop::Canceled);
        }

        let url = task.url();
        let mut request = self.client.get(url);
        if let Some(token) = &self.config.auth_token {
            request = request.bearer_auth(token);
        }

        let mut response = tokio::select! {
            biased;
            _ = task.cancelled() => return Err(Stop::Canceled),
            sent = request.send() => sent.map_err(|source| DownloadError::Transport {
                url: url.to_string(),
                source,
            })?,
        };

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(DownloadError::NotFound {
                url: url.to_string(),
            }
            .into());
        }
        if !status.is_success() {
            return Err(DownloadError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            }
            .into());
        }

        let total = response.content_length();
        task.set_total(total);
        debug!("{} reports {:?} bytes", url, total);

        let destination = task.destination();
        if let Some(parent) = destination.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| DownloadError::write(parent, e))?;
        }
        let file = tokio::fs::File::create(destination)
            .await
            .map_err(|e| DownloadError::write(destination, e))?;
        *created = true;
        let mut writer = BufWriter::with_capacity(self.config.buffer_size.max(1), file);

        loop {
            let chunk = tokio::select! {
                biased;
                _ = task.cancelled() => return Err(Stop::Canceled),
                chunk = response.chunk() => chunk.map_err(|source| DownloadError::Transport {
                    url: url.to_string(),
                    source,
                })?,
            };
            let Some(chunk) = chunk else {
                break;
            };

            writer
                .write_all(&chunk)
                .await
                .map_err(|e| DownloadError::write(destination, e))?;
            task.add_transferred(chunk.len() as u64);

            if let Some(sender) = progress {
                tokio::select! {
                    biased;
                    _ = task.cancelled() => return Err(Stop::Canceled),
                    // A dropped receiver only means nobody is watching
                    _ = sender.send(task.progress()) => {}
                }
            }

            if task.is_canceled() {
                return Err(Stop::Canceled);
            }
        }

        writer
            .flush()
            .await
            .map_err(|e| DownloadError::write(destination, e))?;
        writer
            .into_inner()
            .sync_all()
            .await
            .map_err(|e| DownloadError::write(destination, e))?;

        let received = task.bytes_transferred();
        verify_length(url, total, received)?;

        Ok(DownloadReport {
            path: destination.to_path_buf(),
            bytes: received,
            total_bytes: total,
        })
    }
}

/// A known total must match the received byte count exactly.
fn verify_length(url: &str, total: Option<u64>, received: u64) -> Result<(), DownloadError> {
    match total {
        Some(expected) if expected != received => Err(DownloadError::Incomplete {
            url: url.to_string(),
            expected,
            received,
        }),
        _ => Ok(()),
    }
}

async fn discard_partial(path: &Path) {
    if let Err(e) = remove_file_if_exists(path).await {
        warn!("Failed to remove partial download {}: {}", path.display(), e);
    }
}
