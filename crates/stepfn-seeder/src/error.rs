//! Seeding error types.

/// Failure of a single state machine submission.
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
  /// The request never got a usable response.
  #[error("request to emulator failed: {source}")]
  Http {
    #[source]
    source: reqwest::Error,
  },

  /// The emulator answered with an error other than "already exists".
  #[error("emulator rejected creation ({status}): {kind}: {message}")]
  Rejected {
    status: u16,
    kind: String,
    message: String,
  },
}

/// Errors reported after a best-effort seeding pass.
///
/// The whole batch always runs to completion; the first non-tolerated
/// failure is what gets reported.
#[derive(Debug, thiserror::Error)]
pub enum SeedError {
  /// A submission failed for a reason other than "already exists".
  #[error("failed to seed state machine '{name}': {source}")]
  SubmissionFailed {
    name: String,
    #[source]
    source: SubmitError,
  },

  /// A submission task could not be joined.
  #[error("submission task failed: {message}")]
  Task { message: String },
}
