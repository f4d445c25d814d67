use serde_json::{Map, Value};

use crate::resource::ResourceRef;

/// A single node of a state machine document, classified by shape.
///
/// Classification precedence is `States`, then `Iterator`, then `Resource`;
/// the first matching key wins and the node's remaining fields are carried in
/// `rest` untouched. The top-level definition itself decodes as
/// [`StateNode::SubWorkflow`] since it carries a `States` mapping.
#[derive(Debug, Clone, PartialEq)]
pub enum StateNode {
  /// A node holding a nested collection of named child states.
  SubWorkflow {
    states: Map<String, Value>,
    rest: Map<String, Value>,
  },
  /// A Map state whose `Iterator` carries its own nested `States`.
  Iterator {
    states: Map<String, Value>,
    /// The iterator's fields other than `States`.
    iterator_rest: Map<String, Value>,
    /// The node's fields other than `Iterator`.
    rest: Map<String, Value>,
  },
  /// A node carrying a `Resource` field.
  Task {
    resource: ResourceRef,
    rest: Map<String, Value>,
  },
  /// Any other value, including non-objects and malformed nested shapes.
  /// Re-encodes byte-identically.
  Opaque(Value),
}

impl StateNode {
  /// Decode a raw document node. Never fails; unrecognized shapes become
  /// [`StateNode::Opaque`].
  pub fn decode(value: &Value) -> Self {
    let Some(obj) = value.as_object() else {
      return StateNode::Opaque(value.clone());
    };

    if obj.contains_key("States") {
      let Some(states) = obj.get("States").and_then(Value::as_object) else {
        // "States" that is not an object: pass through untouched
        return StateNode::Opaque(value.clone());
      };
      return StateNode::SubWorkflow {
        states: states.clone(),
        rest: without_key(obj, "States"),
      };
    }

    if obj.contains_key("Iterator") {
      let nested = obj
        .get("Iterator")
        .and_then(Value::as_object)
        .and_then(|iterator| {
          iterator
            .get("States")
            .and_then(Value::as_object)
            .map(|states| (iterator, states))
        });
      let Some((iterator, states)) = nested else {
        // An iterator without a nested States object: pass through untouched
        return StateNode::Opaque(value.clone());
      };
      return StateNode::Iterator {
        states: states.clone(),
        iterator_rest: without_key(iterator, "States"),
        rest: without_key(obj, "Iterator"),
      };
    }

    if let Some(resource) = obj.get("Resource") {
      return StateNode::Task {
        resource: ResourceRef::decode(resource),
        rest: without_key(obj, "Resource"),
      };
    }

    StateNode::Opaque(value.clone())
  }

  /// Encode back to the raw JSON form. Inverse of [`StateNode::decode`].
  pub fn encode(&self) -> Value {
    match self {
      StateNode::SubWorkflow { states, rest } => {
        let mut obj = rest.clone();
        obj.insert("States".to_string(), Value::Object(states.clone()));
        Value::Object(obj)
      }
      StateNode::Iterator {
        states,
        iterator_rest,
        rest,
      } => {
        let mut iterator = iterator_rest.clone();
        iterator.insert("States".to_string(), Value::Object(states.clone()));
        let mut obj = rest.clone();
        obj.insert("Iterator".to_string(), Value::Object(iterator));
        Value::Object(obj)
      }
      StateNode::Task { resource, rest } => {
        let mut obj = rest.clone();
        obj.insert("Resource".to_string(), resource.encode());
        Value::Object(obj)
      }
      StateNode::Opaque(value) => value.clone(),
    }
  }
}

fn without_key(obj: &Map<String, Value>, key: &str) -> Map<String, Value> {
  obj
    .iter()
    .filter(|(k, _)| k.as_str() != key)
    .map(|(k, v)| (k.clone(), v.clone()))
    .collect()
}
