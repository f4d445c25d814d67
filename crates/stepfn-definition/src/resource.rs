use serde_json::{Map, Value, json};

/// Surface form a `GetAtt` reference was written in.
///
/// Both forms appear in real project files; the shorthand survives YAML
/// round-trips that keep the `!GetAtt` tag as a plain object key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GetAttForm {
  /// `{"Fn::GetAtt": ["LogicalId", "Arn"]}`
  Full,
  /// `{"!GetAtt": ["LogicalId", "Arn"]}`
  Shorthand,
}

impl GetAttForm {
  pub fn key(&self) -> &'static str {
    match self {
      GetAttForm::Full => "Fn::GetAtt",
      GetAttForm::Shorthand => "!GetAtt",
    }
  }
}

/// The `Resource` field of a task state.
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceRef {
  /// An already-concrete identifier string. Never treated as a reference.
  Literal(String),
  /// A symbolic "attribute of a logical resource" reference, to be rewritten
  /// into a concrete identifier at seed time.
  GetAtt {
    logical_id: String,
    attribute: String,
    form: GetAttForm,
  },
  /// Anything else. Passed through untouched.
  Opaque(Value),
}

impl ResourceRef {
  /// Decode a raw `Resource` value. Unrecognized shapes become [`ResourceRef::Opaque`].
  pub fn decode(value: &Value) -> Self {
    match value {
      Value::String(s) => ResourceRef::Literal(s.clone()),
      Value::Object(obj) => {
        for form in [GetAttForm::Full, GetAttForm::Shorthand] {
          if let Some(args) = obj.get(form.key()) {
            return parse_get_att(args, form).unwrap_or_else(|| ResourceRef::Opaque(value.clone()));
          }
        }
        ResourceRef::Opaque(value.clone())
      }
      _ => ResourceRef::Opaque(value.clone()),
    }
  }

  /// Encode back to the raw JSON form. Inverse of [`ResourceRef::decode`] for
  /// anything decode produced.
  pub fn encode(&self) -> Value {
    match self {
      ResourceRef::Literal(s) => Value::String(s.clone()),
      ResourceRef::GetAtt {
        logical_id,
        attribute,
        form,
      } => {
        let mut obj = Map::new();
        obj.insert(form.key().to_string(), json!([logical_id, attribute]));
        Value::Object(obj)
      }
      ResourceRef::Opaque(v) => v.clone(),
    }
  }

  /// Whether this reference still needs resolution.
  pub fn is_symbolic(&self) -> bool {
    matches!(self, ResourceRef::GetAtt { .. })
  }
}

fn parse_get_att(args: &Value, form: GetAttForm) -> Option<ResourceRef> {
  let items = args.as_array()?;
  let logical_id = items.first()?.as_str()?.to_string();
  let attribute = items
    .get(1)
    .and_then(Value::as_str)
    .unwrap_or("Arn")
    .to_string();

  Some(ResourceRef::GetAtt {
    logical_id,
    attribute,
    form,
  })
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_decode_literal() {
    let resource = ResourceRef::decode(&json!("arn:aws:lambda:us-east-1:123:function:Fn"));

    assert_eq!(
      resource,
      ResourceRef::Literal("arn:aws:lambda:us-east-1:123:function:Fn".to_string())
    );
    assert!(!resource.is_symbolic());
  }

  #[test]
  fn test_decode_get_att_full_form() {
    let resource = ResourceRef::decode(&json!({ "Fn::GetAtt": ["MyFunction", "Arn"] }));

    assert_eq!(
      resource,
      ResourceRef::GetAtt {
        logical_id: "MyFunction".to_string(),
        attribute: "Arn".to_string(),
        form: GetAttForm::Full,
      }
    );
    assert!(resource.is_symbolic());
  }

  #[test]
  fn test_decode_get_att_shorthand_form() {
    let resource = ResourceRef::decode(&json!({ "!GetAtt": ["MyFunction", "Arn"] }));

    assert!(matches!(
      resource,
      ResourceRef::GetAtt {
        form: GetAttForm::Shorthand,
        ..
      }
    ));
  }

  #[test]
  fn test_decode_get_att_without_attribute_defaults_to_arn() {
    let resource = ResourceRef::decode(&json!({ "Fn::GetAtt": ["MyFunction"] }));

    match resource {
      ResourceRef::GetAtt { attribute, .. } => assert_eq!(attribute, "Arn"),
      other => panic!("expected GetAtt, got {:?}", other),
    }
  }

  #[test]
  fn test_malformed_get_att_is_opaque() {
    // Args not an array
    let raw = json!({ "Fn::GetAtt": "MyFunction" });
    let resource = ResourceRef::decode(&raw);

    assert_eq!(resource, ResourceRef::Opaque(raw.clone()));
    assert_eq!(resource.encode(), raw);

    // Empty args
    let raw = json!({ "Fn::GetAtt": [] });
    assert_eq!(ResourceRef::decode(&raw), ResourceRef::Opaque(raw));
  }

  #[test]
  fn test_unrecognized_object_is_opaque() {
    let raw = json!({ "Ref": "MyFunction" });
    let resource = ResourceRef::decode(&raw);

    assert_eq!(resource, ResourceRef::Opaque(raw.clone()));
    assert_eq!(resource.encode(), raw);
  }

  #[test]
  fn test_encode_round_trips_both_forms() {
    for raw in [
      json!({ "Fn::GetAtt": ["MyFunction", "Arn"] }),
      json!({ "!GetAtt": ["MyFunction", "Arn"] }),
    ] {
      assert_eq!(ResourceRef::decode(&raw).encode(), raw);
    }
  }
}
