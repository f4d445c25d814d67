//! Integration tests for the Supervisor using a fake emulator executable.

#![cfg(unix)]

use std::os::unix::fs::PermissionsExt;
use std::time::Duration;

use stepfn_config::EmulatorConfig;
use stepfn_supervisor::{LaunchError, Supervisor, SupervisorState};

/// Write an executable shell script standing in for the emulator jar runner.
/// The script ignores the `-jar` argument vector.
fn fake_emulator(dir: &tempfile::TempDir, script: &str) -> EmulatorConfig {
  let path = dir.path().join("fake-emulator.sh");
  std::fs::write(&path, format!("#!/bin/sh\n{script}\n")).expect("failed to write script");
  let mut perms = std::fs::metadata(&path).expect("failed to stat script").permissions();
  perms.set_mode(0o755);
  std::fs::set_permissions(&path, perms).expect("failed to chmod script");

  EmulatorConfig {
    install_path: dir.path().to_path_buf(),
    java_path: path.to_string_lossy().into_owned(),
    ..Default::default()
  }
}

async fn wait_for_state(supervisor: &Supervisor, predicate: impl Fn(&SupervisorState) -> bool) {
  for _ in 0..250 {
    if predicate(&supervisor.state()) {
      return;
    }
    tokio::time::sleep(Duration::from_millis(20)).await;
  }
  panic!(
    "timed out waiting for state, last seen: {:?}",
    supervisor.state()
  );
}

#[tokio::test]
async fn test_start_publishes_handle_and_runs() {
  let dir = tempfile::tempdir().expect("failed to create temp dir");
  let config = fake_emulator(&dir, "sleep 30");
  let supervisor = Supervisor::new();

  let handle = supervisor.start(&config).await.expect("start failed");

  assert!(handle.pid > 0);
  assert_eq!(handle.port, 8083);
  assert_eq!(handle.endpoint(), "http://localhost:8083");
  assert!(matches!(supervisor.state(), SupervisorState::Running(_)));
  assert!(supervisor.check_healthy().is_ok());

  supervisor.stop();
  wait_for_state(&supervisor, |s| matches!(s, SupervisorState::Stopped)).await;
}

#[tokio::test]
async fn test_double_start_returns_existing_handle() {
  let dir = tempfile::tempdir().expect("failed to create temp dir");
  let config = fake_emulator(&dir, "sleep 30");
  let supervisor = Supervisor::new();

  let first = supervisor.start(&config).await.expect("first start failed");
  let second = supervisor.start(&config).await.expect("second start failed");

  // Same process, no duplicate listener
  assert_eq!(first, second);
  assert!(matches!(supervisor.state(), SupervisorState::Running(_)));

  supervisor.stop();
  wait_for_state(&supervisor, |s| matches!(s, SupervisorState::Stopped)).await;
}

#[tokio::test]
async fn test_missing_executable_is_executable_not_found() {
  let dir = tempfile::tempdir().expect("failed to create temp dir");
  let config = EmulatorConfig {
    install_path: dir.path().to_path_buf(),
    java_path: "definitely-not-a-real-java-runtime".to_string(),
    ..Default::default()
  };
  let supervisor = Supervisor::new();

  let result = supervisor.start(&config).await;

  assert!(matches!(result, Err(LaunchError::ExecutableNotFound)));
  assert!(matches!(
    supervisor.state(),
    SupervisorState::Faulted { .. }
  ));
}

#[tokio::test]
async fn test_unexpected_exit_is_observed_as_fault() {
  let dir = tempfile::tempdir().expect("failed to create temp dir");
  let config = fake_emulator(&dir, "exit 7");
  let supervisor = Supervisor::new();

  // Launch succeeds optimistically even though the process dies right away
  supervisor.start(&config).await.expect("start failed");

  wait_for_state(&supervisor, |s| matches!(s, SupervisorState::Faulted { .. })).await;

  assert_eq!(
    supervisor.state(),
    SupervisorState::Faulted { code: Some(7) }
  );
  assert!(matches!(
    supervisor.check_healthy(),
    Err(LaunchError::RuntimeFault { code: Some(7) })
  ));
}

#[tokio::test]
async fn test_stop_is_idempotent_even_without_start() {
  let supervisor = Supervisor::new();

  supervisor.stop();
  supervisor.stop();

  assert_eq!(supervisor.state(), SupervisorState::Stopped);
}

#[tokio::test]
async fn test_stop_after_process_exit_stays_faulted() {
  let dir = tempfile::tempdir().expect("failed to create temp dir");
  let config = fake_emulator(&dir, "exit 1");
  let supervisor = Supervisor::new();

  supervisor.start(&config).await.expect("start failed");
  wait_for_state(&supervisor, |s| matches!(s, SupervisorState::Faulted { .. })).await;

  // A late stop must not blow up or mask the fault
  supervisor.stop();

  assert!(matches!(
    supervisor.state(),
    SupervisorState::Faulted { .. }
  ));
}
