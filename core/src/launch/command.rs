//! Building the command line for a launch.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use romhub_shared::{EmulatorDefinition, ROM_PLACEHOLDER, extension_of};

use super::{LaunchError, LaunchKind};
use crate::process::display_command;

/// A fully resolved process invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: PathBuf,
    pub args: Vec<OsString>,
    pub working_dir: Option<PathBuf>,
}

impl Invocation {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            working_dir: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn working_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.working_dir = dir;
        self
    }

    /// The exact command line, quoted for display.
    pub fn command_line(&self) -> String {
        display_command(self.program.as_os_str(), &self.args)
    }

    /// A command with captured output and no stdin.
    pub fn to_command(&self) -> tokio::process::Command {
        let mut command = tokio::process::Command::new(&self.program);
        command
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &self.working_dir {
            command.current_dir(dir);
        }
        command
    }
}

/// Split an argument template into tokens.
///
/// Whitespace separates tokens; double or single quotes group text that
/// contains whitespace and are removed. An unterminated quote runs to the end.
pub fn split_arguments(template: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut quote: Option<char> = None;

    for c in template.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => current.push(c),
            None if c == '"' || c == '\'' => {
                quote = Some(c);
                in_token = true;
            }
            None if c.is_whitespace() => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            None => {
                current.push(c);
                in_token = true;
            }
        }
    }
    if in_token {
        tokens.push(current);
    }
    tokens
}

/// Expand an emulator argument template for `payload`.
///
/// Every `%ROM%` is replaced by the payload path. A template without the
/// placeholder gets the path appended as the last argument.
pub fn expand_arguments(template: &str, payload: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = Vec::new();
    let mut substituted = false;

    for token in split_arguments(template) {
        if token == ROM_PLACEHOLDER {
            args.push(payload.as_os_str().to_os_string());
            substituted = true;
        } else if token.contains(ROM_PLACEHOLDER) {
            args.push(token.replace(ROM_PLACEHOLDER, &payload.to_string_lossy()).into());
            substituted = true;
        } else {
            args.push(token.into());
        }
    }

    if !substituted {
        args.push(payload.as_os_str().to_os_string());
    }
    args
}

fn parent_dir(path: &Path) -> Option<PathBuf> {
    path.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
}

/// Resolve a relative path against the launcher's working directory.
///
/// Children run from their own directory, where relative paths would point
/// somewhere else.
fn anchored(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Like [`anchored`], but bare program names stay as they are for `PATH`
/// lookup.
fn anchored_program(program: &Path) -> PathBuf {
    if program.components().count() > 1 {
        anchored(program)
    } else {
        program.to_path_buf()
    }
}

/// Build the invocation for `path` of the given kind.
///
/// Relative paths are made absolute first, since the child's working
/// directory is changed.
pub fn build_invocation(
    path: &Path,
    kind: LaunchKind,
    emulator: Option<&EmulatorDefinition>,
) -> Result<Invocation, LaunchError> {
    let path = &anchored(path);
    match kind {
        LaunchKind::EmulatorManaged => {
            let emulator = emulator.ok_or_else(|| LaunchError::NoEmulator {
                path: path.to_path_buf(),
            })?;
            let program = anchored_program(&emulator.executable);
            Ok(Invocation {
                args: expand_arguments(&emulator.arguments, path),
                working_dir: parent_dir(&program),
                program,
            })
        }
        LaunchKind::NativeExecutable => {
            Ok(Invocation::new(path).working_dir(parent_dir(path)))
        }
        LaunchKind::Script => Ok(script_invocation(path)),
        LaunchKind::Shortcut => Ok(shortcut_invocation(path)),
    }
}

fn script_invocation(path: &Path) -> Invocation {
    let invocation = match extension_of(path).as_deref() {
        Some("bat" | "cmd") => Invocation::new("cmd").arg("/C").arg(path),
        Some("ps1") => Invocation::new(if cfg!(windows) { "powershell" } else { "pwsh" })
            .arg("-NoProfile")
            .arg("-ExecutionPolicy")
            .arg("Bypass")
            .arg("-File")
            .arg(path),
        _ => Invocation::new("sh").arg(path),
    };
    invocation.working_dir(parent_dir(path))
}

fn shortcut_invocation(path: &Path) -> Invocation {
    if cfg!(windows) {
        // `start` needs an explicit (empty) window title before the target
        return Invocation::new("cmd")
            .arg("/C")
            .arg("start")
            .arg("/wait")
            .arg("")
            .arg(path);
    }
    if cfg!(target_os = "macos") {
        return Invocation::new("open").arg("-W").arg(path);
    }
    if extension_of(path).as_deref() == Some("desktop") {
        return Invocation::new("gio").arg("launch").arg(path);
    }
    Invocation::new("xdg-open").arg(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    // =============================================================
    // Template tokenizing
    // =============================================================

    #[test]
    fn test_split_plain_and_quoted() {
        assert_eq!(
            split_arguments(r#"-L "cores/snes core.so" --fullscreen"#),
            vec!["-L", "cores/snes core.so", "--fullscreen"]
        );
        assert_eq!(split_arguments("  a   b  "), vec!["a", "b"]);
        assert_eq!(split_arguments("'single quoted' x"), vec!["single quoted", "x"]);
        assert!(split_arguments("   ").is_empty());
    }

    #[test]
    fn test_split_empty_quotes_and_unterminated() {
        assert_eq!(split_arguments(r#"a "" b"#), vec!["a", "", "b"]);
        assert_eq!(split_arguments(r#"-f "open end"#), vec!["-f", "open end"]);
        assert_eq!(split_arguments(r#"--rom="%ROM%""#), vec!["--rom=%ROM%"]);
    }

    #[test]
    fn test_expand_substitutes_placeholder() {
        let rom = Path::new("/games/Super Game (USA).sfc");
        let args = expand_arguments("-f %ROM% --verbose", rom);
        assert_eq!(
            args,
            vec![
                OsString::from("-f"),
                OsString::from("/games/Super Game (USA).sfc"),
                OsString::from("--verbose"),
            ]
        );

        let args = expand_arguments("--rom=%ROM%", rom);
        assert_eq!(args, vec![OsString::from("--rom=/games/Super Game (USA).sfc")]);
    }

    #[test]
    fn test_expand_appends_without_placeholder() {
        let rom = Path::new("/games/game.gba");
        assert_eq!(
            expand_arguments("-f", rom),
            vec![OsString::from("-f"), OsString::from("/games/game.gba")]
        );
        assert_eq!(expand_arguments("", rom), vec![OsString::from("/games/game.gba")]);
    }

    // =============================================================
    // Invocations
    // =============================================================

    #[test]
    fn test_emulator_invocation() {
        let emulator = EmulatorDefinition::new("mgba", "/opt/mgba/mgba").arguments("-f \"%ROM%\"");
        let invocation = build_invocation(
            Path::new("/games/a b.gba"),
            LaunchKind::EmulatorManaged,
            Some(&emulator),
        )
        .unwrap();

        assert_eq!(invocation.program, PathBuf::from("/opt/mgba/mgba"));
        assert_eq!(invocation.working_dir, Some(PathBuf::from("/opt/mgba")));
        assert_eq!(invocation.command_line(), "/opt/mgba/mgba -f \"/games/a b.gba\"");
    }

    #[test]
    fn test_emulator_kind_without_emulator() {
        let err = build_invocation(Path::new("game.sfc"), LaunchKind::EmulatorManaged, None)
            .unwrap_err();
        assert!(matches!(err, LaunchError::NoEmulator { .. }));
    }

    #[test]
    fn test_relative_paths_are_anchored_at_launcher_dir() {
        let cwd = std::env::current_dir().unwrap();
        let emulator = EmulatorDefinition::new("snes9x", "emulators/snes9x/snes9x");
        let invocation = build_invocation(
            Path::new("roms/game.sfc"),
            LaunchKind::EmulatorManaged,
            Some(&emulator),
        )
        .unwrap();

        assert_eq!(invocation.program, cwd.join("emulators/snes9x/snes9x"));
        assert_eq!(invocation.working_dir, Some(cwd.join("emulators/snes9x")));
        assert_eq!(invocation.args, vec![cwd.join("roms/game.sfc").into_os_string()]);

        let script =
            build_invocation(Path::new("games/run.sh"), LaunchKind::Script, None).unwrap();
        assert_eq!(script.args, vec![cwd.join("games/run.sh").into_os_string()]);
        assert_eq!(script.working_dir, Some(cwd.join("games")));
    }

    #[test]
    fn test_bare_program_name_is_left_for_path_lookup() {
        let emulator = EmulatorDefinition::new("mednafen", "mednafen");
        let invocation = build_invocation(
            Path::new("/games/game.cue"),
            LaunchKind::EmulatorManaged,
            Some(&emulator),
        )
        .unwrap();

        assert_eq!(invocation.program, PathBuf::from("mednafen"));
        assert_eq!(invocation.working_dir, None);
    }

    #[test]
    fn test_native_invocation_runs_in_own_dir() {
        let invocation = build_invocation(
            Path::new("/opt/game/game.exe"),
            LaunchKind::NativeExecutable,
            None,
        )
        .unwrap();
        assert_eq!(invocation.program, PathBuf::from("/opt/game/game.exe"));
        assert!(invocation.args.is_empty());
        assert_eq!(invocation.working_dir, Some(PathBuf::from("/opt/game")));
    }

    #[test]
    fn test_script_invocations() {
        let bat = build_invocation(Path::new("/g/run.bat"), LaunchKind::Script, None).unwrap();
        assert_eq!(bat.command_line(), "cmd /C /g/run.bat");

        let sh = build_invocation(Path::new("/g/run.sh"), LaunchKind::Script, None).unwrap();
        assert_eq!(sh.command_line(), "sh /g/run.sh");
        assert_eq!(sh.working_dir, Some(PathBuf::from("/g")));

        let ps = build_invocation(Path::new("/g/run.ps1"), LaunchKind::Script, None).unwrap();
        assert!(ps.command_line().ends_with("-NoProfile -ExecutionPolicy Bypass -File /g/run.ps1"));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_shortcut_invocations_linux() {
        let desktop =
            build_invocation(Path::new("/g/game.desktop"), LaunchKind::Shortcut, None).unwrap();
        assert_eq!(desktop.command_line(), "gio launch /g/game.desktop");

        let url = build_invocation(Path::new("/g/game.url"), LaunchKind::Shortcut, None).unwrap();
        assert_eq!(url.command_line(), "xdg-open /g/game.url");
    }
}
