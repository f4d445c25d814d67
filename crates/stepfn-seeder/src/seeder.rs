//! Concurrent state machine seeding.

use std::collections::HashMap;
use std::time::Duration;

use futures::future::join_all;
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info, warn};

use stepfn_config::StateMachineDef;
use stepfn_resolver::resolve;

use crate::error::{SeedError, SubmitError};

/// Placeholder execution role. Local emulation does not enforce real
/// authorization; the emulator only needs a syntactically valid ARN.
pub const DUMMY_ROLE_ARN: &str = "arn:aws:iam::012345678901:role/DummyRole";

const AMZ_TARGET: &str = "AWSStepFunctions.CreateStateMachine";
const AMZ_JSON_CONTENT_TYPE: &str = "application/x-amz-json-1.0";
const ALREADY_EXISTS_KIND: &str = "StateMachineAlreadyExists";

/// Launch readiness is optimistic, so the first submissions may land before
/// the emulator accepts connections.
const CONNECT_ATTEMPTS: u32 = 5;
const CONNECT_RETRY_DELAY: Duration = Duration::from_millis(300);

/// Seeds state machine definitions into a running emulator.
pub struct Seeder {
  endpoint: String,
  client: reqwest::Client,
}

impl Seeder {
  /// Create a seeder targeting the emulator at `endpoint`.
  pub fn new(endpoint: impl Into<String>) -> Self {
    Self {
      endpoint: endpoint.into(),
      client: reqwest::Client::new(),
    }
  }

  /// Resolve and submit every definition, concurrently.
  ///
  /// The batch always runs to completion: one rejected machine does not stop
  /// the others from being submitted. "Already exists" responses count as
  /// success so reseeding across sessions stays idempotent. The first
  /// non-tolerated failure is what the returned error reports.
  pub async fn seed(
    &self,
    machines: &HashMap<String, StateMachineDef>,
  ) -> Result<(), SeedError> {
    info!(count = machines.len(), endpoint = %self.endpoint, "seeding state machines");

    let mut handles = Vec::with_capacity(machines.len());
    for machine in machines.values() {
      let resolved = resolve(&machine.definition);
      let client = self.client.clone();
      let endpoint = self.endpoint.clone();
      let name = machine.name.clone();

      handles.push(tokio::spawn(async move {
        let result =
          create_state_machine(&client, &endpoint, &name, resolved.to_json_string()).await;
        (name, result)
      }));
    }

    let mut first_failure = None;
    for joined in join_all(handles).await {
      match joined {
        Ok((name, Ok(()))) => {
          info!(name = %name, "state machine seeded");
        }
        Ok((name, Err(e))) => {
          error!(name = %name, error = %e, "state machine submission failed");
          if first_failure.is_none() {
            first_failure = Some(SeedError::SubmissionFailed { name, source: e });
          }
        }
        Err(e) => {
          error!(error = %e, "submission task could not be joined");
          if first_failure.is_none() {
            first_failure = Some(SeedError::Task {
              message: e.to_string(),
            });
          }
        }
      }
    }

    match first_failure {
      Some(e) => Err(e),
      None => Ok(()),
    }
  }
}

/// Structured error body of the emulator's AWS-JSON protocol.
#[derive(Debug, Default, Deserialize)]
struct AwsErrorBody {
  #[serde(rename = "__type", default)]
  kind: Option<String>,
  #[serde(default)]
  message: Option<String>,
}

fn parse_error_body(body: &str) -> AwsErrorBody {
  serde_json::from_str(body).unwrap_or_default()
}

fn is_already_exists(error: &AwsErrorBody) -> bool {
  error
    .kind
    .as_deref()
    .is_some_and(|kind| kind.contains(ALREADY_EXISTS_KIND))
}

/// Submit a single CreateStateMachine call, tolerating "already exists".
async fn create_state_machine(
  client: &reqwest::Client,
  endpoint: &str,
  name: &str,
  definition: String,
) -> Result<(), SubmitError> {
  let payload = json!({
    "name": name,
    "definition": definition,
    "roleArn": DUMMY_ROLE_ARN,
  })
  .to_string();

  let response = send_with_retry(client, endpoint, payload).await?;
  let status = response.status();
  if status.is_success() {
    return Ok(());
  }

  let body = response.text().await.unwrap_or_default();
  let parsed = parse_error_body(&body);
  if is_already_exists(&parsed) {
    info!(name = %name, "state machine already exists, treating as success");
    return Ok(());
  }

  Err(SubmitError::Rejected {
    status: status.as_u16(),
    kind: parsed.kind.unwrap_or_else(|| "UnknownError".to_string()),
    message: parsed.message.unwrap_or(body),
  })
}

/// Send the creation request, retrying only while the listener refuses
/// connections.
async fn send_with_retry(
  client: &reqwest::Client,
  endpoint: &str,
  payload: String,
) -> Result<reqwest::Response, SubmitError> {
  let mut attempt = 0;
  loop {
    attempt += 1;
    let result = client
      .post(endpoint)
      .header("x-amz-target", AMZ_TARGET)
      .header("content-type", AMZ_JSON_CONTENT_TYPE)
      .body(payload.clone())
      .send()
      .await;

    match result {
      Ok(response) => return Ok(response),
      Err(e) if e.is_connect() && attempt < CONNECT_ATTEMPTS => {
        warn!(attempt, error = %e, "emulator not reachable yet, retrying");
        tokio::time::sleep(CONNECT_RETRY_DELAY).await;
      }
      Err(e) => return Err(SubmitError::Http { source: e }),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_already_exists_recognized_with_full_type_prefix() {
    let parsed = parse_error_body(
      r#"{"__type":"com.amazonaws.swf.service.v2.model#StateMachineAlreadyExists","message":"State Machine Already Exists"}"#,
    );

    assert!(is_already_exists(&parsed));
  }

  #[test]
  fn test_already_exists_recognized_bare() {
    let parsed = parse_error_body(r#"{"__type":"StateMachineAlreadyExists"}"#);

    assert!(is_already_exists(&parsed));
  }

  #[test]
  fn test_other_errors_are_not_tolerated() {
    let parsed = parse_error_body(r#"{"__type":"InvalidDefinition","message":"bad"}"#);

    assert!(!is_already_exists(&parsed));
    assert_eq!(parsed.message.as_deref(), Some("bad"));
  }

  #[test]
  fn test_unparseable_body_is_not_tolerated() {
    let parsed = parse_error_body("definitely not json");

    assert!(!is_already_exists(&parsed));
    assert!(parsed.kind.is_none());
  }
}
