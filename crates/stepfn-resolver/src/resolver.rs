use serde_json::{Map, Value};
use tracing::debug;

use stepfn_definition::{ResourceRef, StateNode};

/// A definition with every symbolic reference replaced by a literal string.
///
/// Only constructed by [`resolve`]; holding one means the document contains no
/// symbolic-reference nodes. Ephemeral: built per seeding pass and discarded
/// after submission.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedDefinition(Value);

impl ResolvedDefinition {
  pub fn as_json(&self) -> &Value {
    &self.0
  }

  /// Serialize the document as text, the form the emulator's creation API
  /// expects.
  pub fn to_json_string(&self) -> String {
    self.0.to_string()
  }
}

/// Resolve every symbolic resource reference in `definition`.
///
/// Depth-first over the typed node shapes: nested state collections and
/// iterator sub-workflows are recursed into, `GetAtt` resources are rewritten
/// to deterministic local Lambda ARNs, and everything else is returned
/// unchanged.
pub fn resolve(definition: &Value) -> ResolvedDefinition {
  ResolvedDefinition(resolve_node(definition))
}

/// The concrete identifier synthesized for a logical resource name.
///
/// The emulator only needs a stable reference to route invocations, so a fixed
/// templated ARN is enough; it is deterministic for a given input and distinct
/// for distinct logical names.
pub fn lambda_arn(logical_id: &str) -> String {
  format!("arn:aws:lambda:us-east-1:123456789012:function:{logical_id}")
}

fn resolve_node(value: &Value) -> Value {
  match StateNode::decode(value) {
    StateNode::SubWorkflow { states, rest } => StateNode::SubWorkflow {
      states: resolve_states(&states),
      rest,
    }
    .encode(),
    StateNode::Iterator {
      states,
      iterator_rest,
      rest,
    } => StateNode::Iterator {
      states: resolve_states(&states),
      iterator_rest,
      rest,
    }
    .encode(),
    StateNode::Task {
      resource: ResourceRef::GetAtt { logical_id, .. },
      rest,
    } => {
      let arn = lambda_arn(&logical_id);
      debug!(logical_id = %logical_id, arn = %arn, "resolved resource reference");
      StateNode::Task {
        resource: ResourceRef::Literal(arn),
        rest,
      }
      .encode()
    }
    // Literal resources, opaque resources, and unrecognized nodes all pass
    // through untouched.
    StateNode::Task { .. } | StateNode::Opaque(_) => value.clone(),
  }
}

fn resolve_states(states: &Map<String, Value>) -> Map<String, Value> {
  states
    .iter()
    .map(|(name, state)| (name.clone(), resolve_node(state)))
    .collect()
}
