//! Stepfn Supervisor
//!
//! This crate owns the Step Functions Local emulator process for a session:
//! it builds the launch argument vector, spawns the jar, forwards its output,
//! watches for unexpected exits, and terminates it on shutdown.
//!
//! Readiness is optimistic. The emulator exposes no synchronous ready check,
//! so [`Supervisor::start`] returns as soon as the spawn succeeds and callers
//! must retry downstream calls until the listening port accepts connections.

mod error;
mod supervisor;

pub use error::LaunchError;
pub use supervisor::{ProcessHandle, Supervisor, SupervisorState};
