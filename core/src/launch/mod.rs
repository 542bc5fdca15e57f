//! Process launch orchestration
//!
//! A payload is classified by extension, turned into an [`Invocation`], and
//! run to completion while the input listener is suspended. The listener is
//! released on every path, including spawn failures.

mod classify;
mod command;
mod error;

#[cfg(test)]
mod tests;

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use romhub_shared::EmulatorDefinition;
use tracing::{error, info, warn};

use crate::input::InputCoordinator;
use crate::process::{CapturedOutput, exit_label};

pub use classify::{LaunchKind, classify};
pub use command::{Invocation, build_invocation, expand_arguments, split_arguments};
pub use error::LaunchError;

/// A finished, successful launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchReport {
    pub kind: LaunchKind,
    pub command: String,
    pub exit_code: Option<i32>,
    /// Exited with a configured benign code rather than 0
    pub benign: bool,
    pub output: CapturedOutput,
    pub elapsed: Duration,
}

/// Starts payloads and supervises them until they exit.
#[derive(Debug, Clone)]
pub struct LaunchOrchestrator {
    input: Arc<InputCoordinator>,
}

impl LaunchOrchestrator {
    pub fn new(input: Arc<InputCoordinator>) -> Self {
        Self { input }
    }

    pub fn input(&self) -> &Arc<InputCoordinator> {
        &self.input
    }

    /// Launch `path`, using `emulator` for content files.
    pub async fn launch(
        &self,
        path: &Path,
        emulator: Option<&EmulatorDefinition>,
    ) -> Result<LaunchReport, LaunchError> {
        let kind = classify(path);
        let invocation = build_invocation(path, kind, emulator)?;
        let command = invocation.command_line();
        info!("Launching {:?}: {}", kind, command);

        let _suspended = self.input.suspend();
        let started = Instant::now();

        let output = match invocation.to_command().output().await {
            Ok(output) => output,
            Err(source) => {
                error!("Failed to start {}: {}", command, source);
                return Err(LaunchError::Spawn { command, source });
            }
        };
        let elapsed = started.elapsed();
        let captured = CapturedOutput::from_output(&output);
        let code = output.status.code();
        info!("{} finished after {:.1?} with {}", command, elapsed, exit_label(&code));

        let Some(code) = code else {
            error!("{} was terminated: {}", command, captured);
            return Err(LaunchError::Terminated {
                command,
                output: captured,
            });
        };

        let benign = code != 0
            && kind.accepts_benign_exit()
            && emulator.is_some_and(|e| e.is_benign_exit(code));
        if code != 0 && !benign {
            error!("{} failed with exit code {}: {}", command, code, captured);
            return Err(LaunchError::Exit {
                command,
                code,
                output: captured,
            });
        }
        if benign {
            warn!("{} exited with benign code {}", command, code);
        }

        Ok(LaunchReport {
            kind,
            command,
            exit_code: Some(code),
            benign,
            output: captured,
            elapsed,
        })
    }
}
