//! Emulator process supervision.
//!
//! The [`Supervisor`] struct exclusively owns the emulator process for its
//! lifetime. No other component signals or reparents it; dependents receive a
//! [`ProcessHandle`] and talk to the published endpoint.

use std::io;
use std::sync::{Arc, Mutex};

use stepfn_config::EmulatorConfig;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, Command};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::error::LaunchError;

/// A running emulator instance.
///
/// Created on successful launch; invalidated (but not destroyed) when the
/// supervisor stops or the process exits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessHandle {
  pub pid: u32,
  pub port: u16,
}

impl ProcessHandle {
  /// The endpoint the emulator listens on.
  pub fn endpoint(&self) -> String {
    format!("http://localhost:{}", self.port)
  }
}

/// Lifecycle state of the supervised process.
///
/// `Stopped` and `Faulted` are terminal for a process instance; a fresh
/// `start` transitions out of them by spawning a new one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorState {
  NotStarted,
  Starting,
  Running(ProcessHandle),
  Stopped,
  Faulted { code: Option<i32> },
}

/// Owns the emulator process: spawn, output forwarding, exit watching, and
/// termination.
///
/// State transitions are single-writer behind a mutex, so a concurrent
/// `stop` and a late-arriving process exit cannot race into inconsistent
/// state.
pub struct Supervisor {
  state: Arc<Mutex<SupervisorState>>,
  /// Stop signal for the current process instance. Replaced on restart, since
  /// a cancelled token would kill a fresh child immediately.
  cancel: Mutex<CancellationToken>,
}

impl Supervisor {
  pub fn new() -> Self {
    Self {
      state: Arc::new(Mutex::new(SupervisorState::NotStarted)),
      cancel: Mutex::new(CancellationToken::new()),
    }
  }

  /// Launch the emulator process.
  ///
  /// Returns optimistically once the spawn succeeds; the listening port may
  /// not be connection-ready yet and callers should retry downstream calls.
  /// Calling `start` while already `Running` returns the existing handle and
  /// never spawns a duplicate listener on the same port.
  pub async fn start(&self, config: &EmulatorConfig) -> Result<ProcessHandle, LaunchError> {
    let mut state = self.state.lock().unwrap();

    match *state {
      SupervisorState::Running(handle) => {
        warn!(pid = handle.pid, "emulator already running, returning existing handle");
        return Ok(handle);
      }
      SupervisorState::Starting => {
        // start() holds the state lock for its whole critical section, so a
        // lingering Starting means a previous attempt died mid-transition.
        warn!("found stale starting state, relaunching");
      }
      SupervisorState::NotStarted | SupervisorState::Stopped | SupervisorState::Faulted { .. } => {}
    }

    *state = SupervisorState::Starting;

    let cancel = {
      let mut slot = self.cancel.lock().unwrap();
      if slot.is_cancelled() {
        *slot = CancellationToken::new();
      }
      slot.clone()
    };

    let args = build_args(config);
    info!(
      java = %config.java_path,
      cwd = %config.install_path.display(),
      args = ?args,
      "starting emulator"
    );

    let spawned = Command::new(&config.java_path)
      .args(&args)
      .current_dir(&config.install_path)
      .stdout(std::process::Stdio::piped())
      .stderr(std::process::Stdio::piped())
      .kill_on_drop(true)
      .spawn();

    let mut child = match spawned {
      Ok(child) => child,
      Err(e) => {
        let launch_error = classify_spawn_error(e);
        error!(error = %launch_error, "emulator launch failed");
        *state = SupervisorState::Faulted { code: None };
        return Err(launch_error);
      }
    };

    let handle = ProcessHandle {
      pid: child.id().unwrap_or(0),
      port: config.port,
    };

    forward_output(&mut child);
    spawn_exit_watcher(Arc::clone(&self.state), cancel, child);

    *state = SupervisorState::Running(handle);
    info!(pid = handle.pid, port = handle.port, "emulator started");

    Ok(handle)
  }

  /// Request termination of the emulator process.
  ///
  /// Best-effort and non-blocking: the exit watcher delivers the kill signal
  /// and records the `Stopped` state. Safe to call at any point, including
  /// before `start` or after the process already exited.
  pub fn stop(&self) {
    {
      let mut state = self.state.lock().unwrap();
      match *state {
        SupervisorState::NotStarted => {
          // Nothing was ever launched; the session is simply over.
          *state = SupervisorState::Stopped;
          return;
        }
        SupervisorState::Stopped | SupervisorState::Faulted { .. } => {
          debug!("stop requested but emulator is not running");
          return;
        }
        SupervisorState::Starting | SupervisorState::Running(_) => {}
      }
    }

    info!("stopping emulator");
    self.cancel.lock().unwrap().cancel();
  }

  /// Snapshot of the current lifecycle state.
  pub fn state(&self) -> SupervisorState {
    *self.state.lock().unwrap()
  }

  /// Surface an asynchronous process fault, if one has been observed.
  ///
  /// This is the channel through which an exit after launch is reported; it
  /// is never retried because the emulator is a singleton dependency for the
  /// session.
  pub fn check_healthy(&self) -> Result<(), LaunchError> {
    match self.state() {
      SupervisorState::Faulted { code } => Err(LaunchError::RuntimeFault { code }),
      _ => Ok(()),
    }
  }
}

impl Default for Supervisor {
  fn default() -> Self {
    Self::new()
  }
}

/// Build the emulator argument vector.
///
/// The order is fixed: the emulator's flag parser is positional-sensitive for
/// some flags, so `-jar` and `-lambdaEndpoint` always come first and extra
/// args are appended verbatim.
fn build_args(config: &EmulatorConfig) -> Vec<String> {
  let mut args = vec![
    "-jar".to_string(),
    config.jar.clone(),
    "-lambdaEndpoint".to_string(),
    config.lambda_endpoint.clone(),
  ];
  args.extend(config.extra_args.iter().cloned());
  args
}

/// Watch for process exit or a stop request, whichever comes first.
fn spawn_exit_watcher(
  state: Arc<Mutex<SupervisorState>>,
  cancel: CancellationToken,
  mut child: Child,
) {
  tokio::spawn(async move {
    tokio::select! {
      status = child.wait() => {
        let mut state = state.lock().unwrap();
        if cancel.is_cancelled() {
          // Exit arrived after stop was requested: a normal shutdown.
          info!("emulator exited after stop request");
          *state = SupervisorState::Stopped;
        } else {
          let code = status.ok().and_then(|s| s.code());
          error!(code = ?code, "emulator exited unexpectedly");
          *state = SupervisorState::Faulted { code };
        }
      }
      _ = cancel.cancelled() => {
        if let Err(e) = child.start_kill() {
          debug!(error = %e, "emulator already exited before kill");
        }
        let _ = child.wait().await;
        *state.lock().unwrap() = SupervisorState::Stopped;
        info!("emulator stopped");
      }
    }
  });
}

fn classify_spawn_error(e: io::Error) -> LaunchError {
  if e.kind() == io::ErrorKind::NotFound {
    LaunchError::ExecutableNotFound
  } else {
    LaunchError::SpawnFailed { source: e }
  }
}

/// Forward the child's stdout and stderr line-by-line to tracing without
/// blocking the caller.
fn forward_output(child: &mut Child) {
  if let Some(stdout) = child.stdout.take() {
    tokio::spawn(async move {
      let mut lines = BufReader::new(stdout).lines();
      while let Ok(Some(line)) = lines.next_line().await {
        info!(target: "stepfn_supervisor::emulator", "{}", line);
      }
    });
  }
  if let Some(stderr) = child.stderr.take() {
    tokio::spawn(async move {
      let mut lines = BufReader::new(stderr).lines();
      while let Ok(Some(line)) = lines.next_line().await {
        warn!(target: "stepfn_supervisor::emulator", "{}", line);
      }
    });
  }
}
