//! Launch error types.

/// Errors that can occur launching or running the emulator process.
///
/// All of these are fatal to the session and never retried automatically; the
/// emulator is a required singleton dependency.
#[derive(Debug, thiserror::Error)]
pub enum LaunchError {
  /// The configured executable could not be located.
  #[error("emulator executable not found; make sure a java runtime is on your PATH")]
  ExecutableNotFound,

  /// The OS refused to create the process.
  #[error("failed to spawn emulator process: {source}")]
  SpawnFailed {
    #[source]
    source: std::io::Error,
  },

  /// The process exited on its own after launch.
  #[error("emulator process exited unexpectedly (exit code {code:?})")]
  RuntimeFault { code: Option<i32> },
}
