//! Romhub Core - acquisition, extraction and launch pipeline
//!
//! This crate turns a library entry into a running game session and fetches
//! packages (emulators, cores, asset packs) from the network.
//!
//! # Architecture
//!
//! - [`DownloadManager`] - Cancellable streaming downloads with progress
//! - [`ArchiveExtractor`] - Zip/7z/rar extraction into staging or install dirs
//! - [`TargetResolver`] - Picks the launchable payload for a library entry
//! - [`LaunchOrchestrator`] - Runs scripts, shortcuts, executables and emulators
//! - [`InputCoordinator`] - Releases input devices while an external program runs
//! - [`LaunchPipeline`] / [`PackageInstaller`] - The end-to-end flows

pub mod archive;
pub mod config;
pub mod download;
pub mod fsutil;
pub mod input;
pub mod launch;
pub mod library;
pub mod pipeline;
pub mod process;
pub mod target;

pub use archive::{ArchiveError, ArchiveExtractor, ArchiveKind, ExtractMode, StagingArena};
pub use config::Config;
pub use download::{
    DownloadError, DownloadManager, DownloadOutcome, DownloadProgress, DownloadReport,
    DownloadTask,
};
pub use input::{DeviceListener, InputCoordinator, SuspendGuard};
pub use launch::{LaunchError, LaunchKind, LaunchOrchestrator, LaunchReport};
pub use pipeline::{InstallReport, LaunchPipeline, PackageInstaller, PipelineError};
pub use process::CapturedOutput;
pub use target::{ResolveError, ResolvedTarget, TargetResolver};
