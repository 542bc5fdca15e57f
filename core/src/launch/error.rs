use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::process::CapturedOutput;

#[derive(Error, Debug)]
pub enum LaunchError {
    #[error("No emulator configured to run {}", .path.display())]
    NoEmulator { path: PathBuf },
    #[error("Failed to start {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },
    #[error("{command} exited with code {code} ({output})")]
    Exit {
        command: String,
        code: i32,
        output: CapturedOutput,
    },
    #[error("{command} was terminated without an exit code ({output})")]
    Terminated {
        command: String,
        output: CapturedOutput,
    },
}

impl LaunchError {
    /// The command line that was attempted, if any.
    pub fn command(&self) -> Option<&str> {
        match self {
            Self::NoEmulator { .. } => None,
            Self::Spawn { command, .. }
            | Self::Exit { command, .. }
            | Self::Terminated { command, .. } => Some(command),
        }
    }

    /// The process exit code, for failures that have one.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Self::Exit { code, .. } => Some(*code),
            _ => None,
        }
    }
}
