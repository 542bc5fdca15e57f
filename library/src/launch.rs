//! Launch and resolve commands
//!
//! Both take a system and a game. The game is either a path to a content file
//! or a title from the system's ROM folder.

use std::path::{Path, PathBuf};
use std::sync::Arc;
#[cfg(feature = "gamepad")]
use std::time::Duration;

use anyhow::{Result, bail};
use clap::Args;
use romhub_core::config::Config;
use romhub_core::input::{InputCoordinator, InputEvent};
use romhub_core::library::{resolve_emulator, resolve_game, resolve_system, scan_system};
use romhub_core::{LaunchPipeline, LaunchReport};
use romhub_shared::SystemLaunchConfig;
use tracing::{debug, info, warn};

use crate::output::{lookup_error, pipeline_error};

#[cfg(feature = "gamepad")]
const INPUT_POLL_INTERVAL: Duration = Duration::from_millis(16);

/// Arguments for the launch command
#[derive(Args, Debug)]
pub struct LaunchArgs {
    /// System name (case-insensitive, unique prefixes accepted)
    pub system: String,

    /// Content file path, or a title from the system's ROM folder
    pub game: String,

    /// Emulator to use instead of the system's preferred one
    #[arg(short, long)]
    pub emulator: Option<String>,

    /// Leave the extracted files in place after the session
    #[arg(long)]
    pub keep_staging: bool,
}

/// Arguments for the resolve command
#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// System name (case-insensitive, unique prefixes accepted)
    pub system: String,

    /// Content file path, or a title from the system's ROM folder
    pub game: String,
}

/// Execute the launch command
pub async fn execute(args: LaunchArgs, mut config: Config) -> Result<()> {
    if args.keep_staging {
        config.extraction.keep_staging = true;
    }

    let system = resolve_system(&args.system, &config.systems).map_err(lookup_error)?;
    let emulator = match &args.emulator {
        Some(query) => Some(
            resolve_emulator(query, system)
                .map_err(lookup_error)?
                .name
                .as_str(),
        ),
        None => None,
    };
    let file = content_path(&args.game, system)?;

    // Menu events are unused here; the receiver keeps the listener polling
    let (input, _events) = input_coordinator();
    let pipeline = LaunchPipeline::new(&config, input);
    sweep_staging(&pipeline);

    info!("Launching {} ({})", file.display(), system.name);
    let report = pipeline
        .play(&file, system, emulator)
        .await
        .map_err(pipeline_error)?;
    print_report(&report);

    Ok(())
}

/// Execute the resolve command
///
/// Prints the payload that would be launched. Extracted files stay in the
/// staging directory until the next launch sweeps them.
pub async fn resolve(args: ResolveArgs, config: Config) -> Result<()> {
    let system = resolve_system(&args.system, &config.systems).map_err(lookup_error)?;
    let file = content_path(&args.game, system)?;

    let pipeline = LaunchPipeline::new(&config, InputCoordinator::detached());
    let target = pipeline
        .resolve(&file, system)
        .await
        .map_err(pipeline_error)?;

    println!("{}", target.payload.display());
    if let Some(staging) = &target.staging {
        eprintln!("Extracted into {}", staging.display());
    }

    Ok(())
}

/// Turn the game argument into a file path.
fn content_path(query: &str, system: &SystemLaunchConfig) -> Result<PathBuf> {
    let path = Path::new(query);
    if path.is_file() {
        return Ok(path.to_path_buf());
    }

    let games = scan_system(system);
    if games.is_empty() {
        bail!(
            "No games found for {} in {}",
            system.name,
            system.rom_folder.display()
        );
    }
    let game = resolve_game(query, &games).map_err(lookup_error)?;
    Ok(game.path.clone())
}

/// Remove extraction leftovers from earlier sessions.
fn sweep_staging(pipeline: &LaunchPipeline) {
    match pipeline.staging().sweep_orphans() {
        Ok(0) => {}
        Ok(removed) => debug!("Removed {} stale staging directories", removed),
        Err(e) => warn!(
            "Failed to sweep staging root {}: {}",
            pipeline.staging().root().display(),
            e
        ),
    }
}

fn print_report(report: &LaunchReport) {
    if report.benign
        && let Some(code) = report.exit_code
    {
        println!(
            "Session ended after {}s (exit code {} treated as normal)",
            report.elapsed.as_secs(),
            code
        );
    } else {
        println!("Session ended after {}s", report.elapsed.as_secs());
    }
    if !report.output.is_empty() {
        debug!("Program output:\n{}", report.output);
    }
}

#[cfg(feature = "gamepad")]
fn input_coordinator() -> (
    Arc<InputCoordinator>,
    Option<std::sync::mpsc::Receiver<InputEvent>>,
) {
    use romhub_core::input::{GamepadPoller, PollingListener};

    let (sender, receiver) = std::sync::mpsc::channel();
    let listener = PollingListener::spawn(GamepadPoller::new, INPUT_POLL_INTERVAL, sender);
    (InputCoordinator::new(Arc::new(listener)), Some(receiver))
}

#[cfg(not(feature = "gamepad"))]
fn input_coordinator() -> (
    Arc<InputCoordinator>,
    Option<std::sync::mpsc::Receiver<InputEvent>>,
) {
    (InputCoordinator::detached(), None)
}
