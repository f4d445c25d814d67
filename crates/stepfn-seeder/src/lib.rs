//! Stepfn Seeder
//!
//! Submits resolved state machine definitions to a running emulator so they
//! exist for local invocation. All submissions fan out concurrently and are
//! joined before the overall outcome is reported; "already exists" responses
//! are tolerated so repeated local sessions can reseed the same machines.
//!
//! Once the fan-out begins, in-flight submissions are not cancelled — a
//! caller wanting early abort must be prepared for them to complete. Partial
//! seeding has no destructive effect that would need rollback.

mod error;
mod seeder;

pub use error::{SeedError, SubmitError};
pub use seeder::{DUMMY_ROLE_ARN, Seeder};
