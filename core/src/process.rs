//! Helpers for describing and capturing child processes.

use std::ffi::OsStr;
use std::fmt;
use std::process::Output;

/// Maximum characters of each stream kept for diagnostics.
const MAX_CAPTURED_CHARS: usize = 16 * 1024;

/// Standard output and error captured from a finished child process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapturedOutput {
    pub stdout: String,
    pub stderr: String,
}

impl CapturedOutput {
    pub fn from_output(output: &Output) -> Self {
        Self {
            stdout: capture_stream(&output.stdout),
            stderr: capture_stream(&output.stderr),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.stdout.is_empty() && self.stderr.is_empty()
    }
}

/// Keep the tail of a stream; errors are usually printed last.
fn capture_stream(bytes: &[u8]) -> String {
    let text = String::from_utf8_lossy(bytes);
    let text = text.trim();
    let count = text.chars().count();
    if count <= MAX_CAPTURED_CHARS {
        return text.to_string();
    }
    let tail: String = text.chars().skip(count - MAX_CAPTURED_CHARS).collect();
    format!("...{}", tail)
}

impl fmt::Display for CapturedOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "<no output>");
        }
        if !self.stdout.is_empty() {
            write!(f, "stdout: {}", self.stdout)?;
        }
        if !self.stderr.is_empty() {
            if !self.stdout.is_empty() {
                write!(f, "; ")?;
            }
            write!(f, "stderr: {}", self.stderr)?;
        }
        Ok(())
    }
}

/// Render a program and its arguments as a single, copy-pasteable line.
pub fn display_command<I, S>(program: &OsStr, args: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut line = quote_arg(program);
    for arg in args {
        line.push(' ');
        line.push_str(&quote_arg(arg.as_ref()));
    }
    line
}

fn quote_arg(arg: &OsStr) -> String {
    let arg = arg.to_string_lossy();
    if arg.is_empty() {
        return "\"\"".to_string();
    }
    if arg.chars().any(|c| c.is_whitespace() || c == '"' || c == '\'') {
        format!("\"{}\"", arg.replace('"', "\\\""))
    } else {
        arg.into_owned()
    }
}

/// Human-readable exit status for logs and error messages.
pub fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "no exit code (terminated by signal)".to_string(),
    }
}
