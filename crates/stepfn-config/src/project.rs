use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::emulator::EmulatorConfig;

/// A named state machine definition to seed into the emulator.
///
/// The definition document is kept as raw JSON here; reference resolution
/// happens at seed time and never mutates this stored form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateMachineDef {
  /// Name the state machine is created under.
  pub name: String,
  /// The Amazon States Language document, possibly containing symbolic
  /// resource references (`Fn::GetAtt` / `!GetAtt`).
  pub definition: serde_json::Value,
}

/// The project file consumed by stepfn-local.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectConfig {
  /// Emulator launch settings; everything is defaulted so a project file can
  /// omit the section entirely.
  #[serde(default)]
  pub emulator: EmulatorConfig,
  /// State machines to seed, keyed by their config-file identifier.
  #[serde(default)]
  pub state_machines: HashMap<String, StateMachineDef>,
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn test_parse_project_file() {
    let raw = json!({
      "emulator": { "port": 8090 },
      "state_machines": {
        "hello": {
          "name": "HelloMachine",
          "definition": {
            "StartAt": "Greet",
            "States": {
              "Greet": {
                "Type": "Task",
                "Resource": { "Fn::GetAtt": ["GreetFunction", "Arn"] },
                "End": true
              }
            }
          }
        }
      }
    });

    let project: ProjectConfig = serde_json::from_value(raw).unwrap();

    assert_eq!(project.emulator.port, 8090);
    assert_eq!(project.state_machines.len(), 1);
    assert_eq!(project.state_machines["hello"].name, "HelloMachine");
  }

  #[test]
  fn test_empty_project_file() {
    let project: ProjectConfig = serde_json::from_str("{}").unwrap();

    assert_eq!(project.emulator, EmulatorConfig::default());
    assert!(project.state_machines.is_empty());
  }
}
