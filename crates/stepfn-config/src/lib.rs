//! Stepfn Config
//!
//! This crate contains the serializable configuration types for stepfn-local.
//! These types describe how the Step Functions Local emulator is launched and
//! which state machine definitions are seeded into it once it is up.
//!
//! Configuration can be loaded from:
//! - A JSON project file (via CLI with `--config=stepfunctions.json`)
//! - CLI flag overrides merged on top of the stored settings
//!
//! The emulator settings are merged once per session (defaults, then stored
//! config, then CLI overrides) and never mutated after the process is spawned.

mod emulator;
mod project;

pub use emulator::{EMULATOR_DOWNLOAD_URL, EmulatorConfig, EmulatorOverrides};
pub use project::{ProjectConfig, StateMachineDef};
