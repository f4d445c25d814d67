use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Where the emulator archive can be downloaded from.
///
/// Downloading is not handled here; the install hook points users at this URL
/// when the jar is missing.
pub const EMULATOR_DOWNLOAD_URL: &str =
  "https://docs.aws.amazon.com/ja_jp/step-functions/latest/dg/samples/StepFunctionsLocal.tar.gz";

/// Launch settings for the Step Functions Local emulator process.
///
/// Built once per session from defaults, the stored project config, and CLI
/// overrides. Immutable after the process is spawned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmulatorConfig {
  /// Working directory for the emulator process; also where the jar lives.
  pub install_path: PathBuf,
  /// Executable used to run the jar.
  pub java_path: String,
  /// Jar file name, relative to `install_path`.
  pub jar: String,
  /// Port the emulator listens on.
  pub port: u16,
  /// Callback endpoint the emulator uses to invoke local functions.
  pub lambda_endpoint: String,
  /// Extra arguments appended verbatim after the fixed argument vector.
  pub extra_args: Vec<String>,
}

impl Default for EmulatorConfig {
  fn default() -> Self {
    Self {
      install_path: PathBuf::from(".stepfunctions"),
      java_path: "java".to_string(),
      jar: "StepFunctionsLocal.jar".to_string(),
      port: 8083,
      lambda_endpoint: "http://localhost:3002".to_string(),
      extra_args: Vec::new(),
    }
  }
}

impl EmulatorConfig {
  /// The endpoint the emulator will be reachable at once it is listening.
  pub fn endpoint(&self) -> String {
    format!("http://localhost:{}", self.port)
  }

  /// Absolute or config-relative path to the emulator jar.
  pub fn jar_path(&self) -> PathBuf {
    self.install_path.join(&self.jar)
  }

  /// Merge CLI overrides on top of the stored settings. Overrides win.
  pub fn apply(mut self, overrides: &EmulatorOverrides) -> Self {
    if let Some(install_path) = &overrides.install_path {
      self.install_path = install_path.clone();
    }
    if let Some(java_path) = &overrides.java_path {
      self.java_path = java_path.clone();
    }
    if let Some(port) = overrides.port {
      self.port = port;
    }
    if let Some(lambda_endpoint) = &overrides.lambda_endpoint {
      self.lambda_endpoint = lambda_endpoint.clone();
    }
    self
  }
}

/// Optional per-invocation overrides, sourced from CLI flags.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmulatorOverrides {
  pub install_path: Option<PathBuf>,
  pub java_path: Option<String>,
  pub port: Option<u16>,
  pub lambda_endpoint: Option<String>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_defaults() {
    let config = EmulatorConfig::default();

    assert_eq!(config.port, 8083);
    assert_eq!(config.jar, "StepFunctionsLocal.jar");
    assert_eq!(config.java_path, "java");
    assert_eq!(config.endpoint(), "http://localhost:8083");
  }

  #[test]
  fn test_apply_overrides() {
    let config = EmulatorConfig::default();
    let overrides = EmulatorOverrides {
      port: Some(9999),
      lambda_endpoint: Some("http://localhost:4000".to_string()),
      ..Default::default()
    };

    let merged = config.apply(&overrides);

    assert_eq!(merged.port, 9999);
    assert_eq!(merged.lambda_endpoint, "http://localhost:4000");
    // Untouched fields keep their stored values
    assert_eq!(merged.jar, "StepFunctionsLocal.jar");
  }

  #[test]
  fn test_partial_config_file_falls_back_to_defaults() {
    let config: EmulatorConfig = serde_json::from_str(r#"{ "port": 8084 }"#).unwrap();

    assert_eq!(config.port, 8084);
    assert_eq!(config.java_path, "java");
    assert_eq!(config.jar_path(), PathBuf::from(".stepfunctions/StepFunctionsLocal.jar"));
  }
}
