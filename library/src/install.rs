//! Install command - download a package and extract it
//!
//! Emulators, cores and asset packs are installed from a URL into the
//! configured install root. Ctrl-C cancels the download and removes the
//! partial file.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use romhub_core::config::Config;
use romhub_core::download::{DownloadManager, ProgressReceiver, progress_channel};
use romhub_core::pipeline::{PackageInstaller, extractor_from_config};
use romhub_shared::sanitize_path_component;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::output::{format_bytes, pipeline_error};

const MAX_PACKAGE_NAME_CHARS: usize = 64;

/// Arguments for the install command
#[derive(Args, Debug)]
pub struct InstallArgs {
    /// Package URL (.zip, .7z or .rar)
    pub url: String,

    /// Install directory (defaults to <install root>/<package name>)
    #[arg(short, long)]
    pub dest: Option<PathBuf>,
}

/// Execute the install command
pub async fn execute(args: InstallArgs, config: Config) -> Result<()> {
    let install_dir = match args.dest {
        Some(dest) => dest,
        None => config
            .paths
            .install_root()
            .context("No install root available; pass --dest")?
            .join(package_name(&args.url)),
    };

    let downloads = DownloadManager::new(config.download.clone())
        .context("Failed to create HTTP client")?;
    let installer = PackageInstaller::new(
        downloads,
        extractor_from_config(&config),
        config.paths.downloads_dir(),
    );

    let cancel = CancellationToken::new();
    let ctrl_c = tokio::spawn(cancel_on_ctrl_c(cancel.clone()));
    let (progress_tx, progress_rx) = progress_channel(config.download.progress_capacity);
    let printer = tokio::spawn(print_progress(progress_rx));

    let result = installer
        .install(&args.url, &install_dir, cancel, Some(progress_tx))
        .await;
    ctrl_c.abort();
    // The sender is gone once install returns, which ends the printer
    let _ = printer.await;
    eprintln!();

    let report = result.map_err(pipeline_error)?;
    info!("Installed {} into {}", report.url, report.install_dir.display());
    println!(
        "Installed {} ({}) into {}",
        report.url,
        format_bytes(report.bytes),
        report.install_dir.display()
    );

    Ok(())
}

async fn cancel_on_ctrl_c(cancel: CancellationToken) {
    if tokio::signal::ctrl_c().await.is_ok() {
        eprintln!("\nCanceling...");
        cancel.cancel();
    }
}

async fn print_progress(mut progress: ProgressReceiver) {
    while let Some(update) = progress.recv().await {
        let line = match (update.ratio(), update.total_bytes) {
            (Some(ratio), Some(total)) => format!(
                "\r{:>5.1}%  {} / {}",
                ratio * 100.0,
                format_bytes(update.bytes_transferred),
                format_bytes(total)
            ),
            _ => format!("\r{}", format_bytes(update.bytes_transferred)),
        };
        let mut stderr = std::io::stderr().lock();
        let _ = stderr.write_all(line.as_bytes());
        let _ = stderr.flush();
    }
}

/// Directory name for a package: the last URL segment without its extension.
fn package_name(url: &str) -> String {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let segment = path.trim_end_matches('/').rsplit('/').next().unwrap_or(path);
    let stem = segment.split('.').next().unwrap_or(segment);
    sanitize_path_component(stem, MAX_PACKAGE_NAME_CHARS, "package")
}
