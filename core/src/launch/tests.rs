//! Launch tests using real child processes

use super::*;
use crate::input::DeviceListener;
use crate::input::tests::CountingListener;
use tempfile::TempDir;

fn orchestrator() -> (LaunchOrchestrator, Arc<CountingListener>) {
    let listener = CountingListener::running();
    let coordinator = InputCoordinator::new(listener.clone());
    (LaunchOrchestrator::new(coordinator), listener)
}

fn sh_emulator(script: &str) -> EmulatorDefinition {
    EmulatorDefinition::new("sh", "/bin/sh").arguments(format!("-c '{}'", script))
}

#[cfg(unix)]
fn write_executable(path: &Path, body: &str) {
    use std::os::unix::fs::PermissionsExt;
    std::fs::write(path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).unwrap();
}

// =============================================================
// Emulator-managed launches
// =============================================================

#[cfg(unix)]
#[tokio::test]
async fn test_emulator_exit_zero_succeeds() {
    let (orchestrator, listener) = orchestrator();
    let emulator = sh_emulator("echo started; exit 0");

    let report = orchestrator
        .launch(Path::new("/games/game.sfc"), Some(&emulator))
        .await
        .unwrap();

    assert_eq!(report.kind, LaunchKind::EmulatorManaged);
    assert_eq!(report.exit_code, Some(0));
    assert!(!report.benign);
    assert_eq!(report.output.stdout, "started");
    assert!(report.command.ends_with("/games/game.sfc"));
    assert_eq!(listener.stops(), 1);
    assert_eq!(listener.starts(), 1);
}

#[cfg(unix)]
#[tokio::test]
async fn test_emulator_benign_exit_succeeds() {
    let (orchestrator, _listener) = orchestrator();
    let emulator = sh_emulator("exit 3").benign_exit_codes(vec![3]);

    let report = orchestrator
        .launch(Path::new("/games/game.sfc"), Some(&emulator))
        .await
        .unwrap();

    assert_eq!(report.exit_code, Some(3));
    assert!(report.benign);
}

#[cfg(unix)]
#[tokio::test]
async fn test_emulator_exit_one_fails_with_detail() {
    let (orchestrator, listener) = orchestrator();
    let emulator = sh_emulator("echo bad rom >&2; exit 1");

    let err = orchestrator
        .launch(Path::new("/games/game.sfc"), Some(&emulator))
        .await
        .unwrap_err();

    match &err {
        LaunchError::Exit {
            command,
            code,
            output,
        } => {
            assert_eq!(*code, 1);
            assert!(command.starts_with("/bin/sh -c"));
            assert!(command.ends_with("/games/game.sfc"));
            assert_eq!(output.stderr, "bad rom");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(err.exit_code(), Some(1));
    assert!(err.to_string().contains("exited with code 1"));
    // Released even on failure
    assert_eq!(listener.starts(), 1);
}

#[cfg(unix)]
#[tokio::test]
async fn test_signal_termination_is_failure() {
    let (orchestrator, listener) = orchestrator();
    let emulator = sh_emulator("kill -9 $$");

    let err = orchestrator
        .launch(Path::new("/games/game.sfc"), Some(&emulator))
        .await
        .unwrap_err();

    assert!(matches!(err, LaunchError::Terminated { .. }));
    assert_eq!(listener.starts(), 1);
}

#[tokio::test]
async fn test_missing_emulator_does_not_suspend() {
    let (orchestrator, listener) = orchestrator();

    let err = orchestrator
        .launch(Path::new("/games/game.sfc"), None)
        .await
        .unwrap_err();

    assert!(matches!(err, LaunchError::NoEmulator { .. }));
    assert!(err.command().is_none());
    assert_eq!(listener.stops(), 0);
}

// =============================================================
// Direct launches
// =============================================================

#[cfg(unix)]
#[tokio::test]
async fn test_native_exe_suspends_and_resumes_once() {
    let temp_dir = TempDir::new().unwrap();
    let exe = temp_dir.path().join("game.exe");
    write_executable(&exe, "pwd");
    let (orchestrator, listener) = orchestrator();

    let report = orchestrator.launch(&exe, None).await.unwrap();

    assert_eq!(report.kind, LaunchKind::NativeExecutable);
    assert_eq!(report.exit_code, Some(0));
    // Runs from its own directory
    let cwd = std::fs::canonicalize(report.output.stdout.trim()).unwrap();
    assert_eq!(cwd, std::fs::canonicalize(temp_dir.path()).unwrap());
    assert_eq!(listener.stops(), 1);
    assert_eq!(listener.starts(), 1);
    assert!(listener.is_running());
}

#[tokio::test]
async fn test_spawn_failure_still_resumes() {
    let temp_dir = TempDir::new().unwrap();
    let missing = temp_dir.path().join("missing.exe");
    let (orchestrator, listener) = orchestrator();

    let err = orchestrator.launch(&missing, None).await.unwrap_err();

    match &err {
        LaunchError::Spawn { command, .. } => assert!(command.contains("missing.exe")),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(listener.stops(), 1);
    assert_eq!(listener.starts(), 1);
    assert_eq!(orchestrator.input().outstanding(), 0);
}

#[cfg(unix)]
#[tokio::test]
async fn test_shell_script_runs_through_interpreter() {
    let temp_dir = TempDir::new().unwrap();
    let script = temp_dir.path().join("start.sh");
    // Not executable; the interpreter runs it
    std::fs::write(&script, "echo from script\nexit 0\n").unwrap();
    let (orchestrator, _listener) = orchestrator();

    let report = orchestrator.launch(&script, None).await.unwrap();

    assert_eq!(report.kind, LaunchKind::Script);
    assert_eq!(report.output.stdout, "from script");
    assert!(report.command.starts_with("sh "));
}

#[cfg(unix)]
#[tokio::test]
async fn test_script_exit_code_is_not_benign() {
    let temp_dir = TempDir::new().unwrap();
    let script = temp_dir.path().join("start.sh");
    std::fs::write(&script, "exit 3\n").unwrap();
    let (orchestrator, _listener) = orchestrator();
    // Benign codes only apply to emulator launches
    let emulator = sh_emulator("").benign_exit_codes(vec![3]);

    let err = orchestrator
        .launch(&script, Some(&emulator))
        .await
        .unwrap_err();

    assert_eq!(err.exit_code(), Some(3));
}

#[cfg(unix)]
#[tokio::test]
async fn test_relative_paths_survive_working_dir_change() {
    // A relative directory, as a path typed on the command line would be
    let temp_dir = TempDir::new_in(".").unwrap();
    let relative = temp_dir.path();
    assert!(relative.is_relative());
    std::fs::write(relative.join("game.sfc"), b"rom").unwrap();
    std::fs::write(relative.join("run.sh"), "exit 0\n").unwrap();
    let (orchestrator, _listener) = orchestrator();

    let emulator = sh_emulator(r#"test -f "$0""#);
    let report = orchestrator
        .launch(&relative.join("game.sfc"), Some(&emulator))
        .await
        .unwrap();
    assert_eq!(report.exit_code, Some(0));

    let report = orchestrator
        .launch(&relative.join("run.sh"), None)
        .await
        .unwrap();
    assert_eq!(report.kind, LaunchKind::Script);
}
