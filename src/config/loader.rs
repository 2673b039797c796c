// Copyright 2025 The Drasi Authors.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Configuration loading from files and strings.
//!
//! This module decodes YAML or JSON text into a generic value tree and hands
//! it to the schema resolver. Decoding failures (`ReadError`, `YamlError`,
//! `JsonError`, `ParseError`) are reported separately from resolution
//! failures (`ResolutionError`).

use super::environment::{Environment, ProcessEnvironment};
use super::resolver::ResolveError;
use super::Config;
use log::{debug, info};
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Unified error type for configuration operations.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Unsupported configuration input: expected a mapping at the top level, got {kind}")]
    UnsupportedInput { kind: &'static str },

    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to write config file '{path}': {source}")]
    WriteError {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Failed to parse config file '{path}': YAML error: {yaml_err}, JSON error: {json_err}")]
    ParseError {
        path: String,
        yaml_err: String,
        json_err: String,
    },

    #[error("Configuration resolution failed: {0}")]
    ResolutionError(#[from] ResolveError),

    #[error("Failed to decode value at '{key}': {source}")]
    DecodeError {
        key: String,
        source: serde_json::Error,
    },
}

impl ConfigError {
    /// True when the raw tree could not be obtained or decoded, so resolution
    /// never started.
    pub fn is_source_error(&self) -> bool {
        matches!(
            self,
            ConfigError::ReadError { .. }
                | ConfigError::YamlError(_)
                | ConfigError::JsonError(_)
                | ConfigError::ParseError { .. }
        )
    }
}

/// Decode JSON text into a generic value tree.
pub fn parse_json_str(s: &str) -> Result<Value, ConfigError> {
    Ok(serde_json::from_str(s)?)
}

/// Decode YAML text into a generic value tree.
///
/// Since YAML is a superset of JSON, this also accepts JSON documents with
/// `#` comments.
pub fn parse_yaml_str(s: &str) -> Result<Value, ConfigError> {
    Ok(serde_yaml::from_str(s)?)
}

/// Read and decode a configuration file without resolving it.
///
/// `.json` files are decoded as JSON, `.yaml`/`.yml` files as YAML. Any other
/// extension is tried as YAML first, then as JSON.
pub fn read_config_file<P: AsRef<Path>>(path: P) -> Result<Value, ConfigError> {
    let path_ref = path.as_ref();
    info!("Loading configuration from {}", path_ref.display());

    let content = fs::read_to_string(path_ref).map_err(|source| ConfigError::ReadError {
        path: path_ref.display().to_string(),
        source,
    })?;

    let extension = path_ref
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("json") => parse_json_str(&content),
        Some("yaml") | Some("yml") => parse_yaml_str(&content),
        _ => {
            debug!(
                "Unknown config extension for {}, trying YAML then JSON",
                path_ref.display()
            );
            match serde_yaml::from_str::<Value>(&content) {
                Ok(value) => Ok(value),
                Err(yaml_err) => match serde_json::from_str::<Value>(&content) {
                    Ok(value) => Ok(value),
                    Err(json_err) => Err(ConfigError::ParseError {
                        path: path_ref.display().to_string(),
                        yaml_err: yaml_err.to_string(),
                        json_err: json_err.to_string(),
                    }),
                },
            }
        }
    }
}

/// Resolve a JSON configuration against the process environment.
///
/// # Examples
///
/// ```
/// use config_master::config::loader::from_json_str;
///
/// let config = from_json_str(r#"{"log": {"level": {"default": "info", "format": ["debug", "info"]}}}"#).unwrap();
/// assert_eq!(config.get("log.level").and_then(|v| v.as_str()), Some("info"));
/// ```
pub fn from_json_str(s: &str) -> Result<Config, ConfigError> {
    from_json_str_with_env(s, &ProcessEnvironment)
}

/// Resolve a JSON configuration against an explicit environment.
pub fn from_json_str_with_env<E: Environment + ?Sized>(
    s: &str,
    env: &E,
) -> Result<Config, ConfigError> {
    Config::from_value_with_env(&parse_json_str(s)?, env)
}

/// Resolve a YAML configuration against the process environment.
///
/// # Examples
///
/// ```
/// use config_master::config::loader::from_yaml_str;
///
/// let yaml = r#"
/// server:
///   host:
///     default: 0.0.0.0
///   port:
///     default: 8080
///     format: int
/// "#;
///
/// let config = from_yaml_str(yaml).unwrap();
/// assert_eq!(config.get_as::<u16>("server.port").unwrap(), Some(8080));
/// ```
pub fn from_yaml_str(s: &str) -> Result<Config, ConfigError> {
    from_yaml_str_with_env(s, &ProcessEnvironment)
}

/// Resolve a YAML configuration against an explicit environment.
pub fn from_yaml_str_with_env<E: Environment + ?Sized>(
    s: &str,
    env: &E,
) -> Result<Config, ConfigError> {
    Config::from_value_with_env(&parse_yaml_str(s)?, env)
}

/// Load and resolve a configuration file against the process environment.
///
/// # Examples
///
/// ```no_run
/// use config_master::config::loader::load_config_file;
///
/// let config = load_config_file("config/app.yaml").unwrap();
/// println!("Listening on port {:?}", config.get("server.port"));
/// ```
pub fn load_config_file<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    load_config_file_with_env(path, &ProcessEnvironment)
}

/// Load and resolve a configuration file against an explicit environment.
pub fn load_config_file_with_env<P: AsRef<Path>, E: Environment + ?Sized>(
    path: P,
    env: &E,
) -> Result<Config, ConfigError> {
    let raw = read_config_file(path)?;
    Config::from_value_with_env(&raw, env)
}

/// Save a resolved configuration, as JSON for `.json` paths and YAML otherwise.
///
/// Note: schema directives are NOT preserved. The file holds the resolved
/// values, so loading it again yields the same tree.
pub fn save_config_file<P: AsRef<Path>>(config: &Config, path: P) -> Result<(), ConfigError> {
    let path_ref = path.as_ref();
    let is_json = path_ref
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    let content = if is_json {
        serde_json::to_string_pretty(config)?
    } else {
        serde_yaml::to_string(config)?
    };

    fs::write(path_ref, content).map_err(|source| ConfigError::WriteError {
        path: path_ref.display().to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn no_env() -> HashMap<String, String> {
        HashMap::new()
    }

    fn write_file(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_from_json_str_simple() {
        let config = from_json_str_with_env(r#"{"foo": {"default": "bar"}}"#, &no_env()).unwrap();
        assert_eq!(config.get("foo"), Some(&json!("bar")));
    }

    #[test]
    fn test_from_yaml_str_with_env() {
        let env: HashMap<String, String> = [("TEST_API_KEY".to_string(), "secret".to_string())].into();
        let yaml = r#"
api:
  key:
    env: TEST_API_KEY
  timeout: 30
"#;
        let config = from_yaml_str_with_env(yaml, &env).unwrap();
        assert_eq!(config.get("api.key"), Some(&json!("secret")));
        assert_eq!(config.get("api.timeout"), Some(&json!(30)));
    }

    #[test]
    fn test_malformed_json_is_source_error() {
        let err = from_json_str_with_env("{not json", &no_env()).unwrap_err();
        assert!(matches!(err, ConfigError::JsonError(_)));
        assert!(err.is_source_error());
    }

    #[test]
    fn test_non_mapping_root_is_unsupported_input() {
        let err = from_json_str_with_env("[1, 2, 3]", &no_env()).unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedInput { kind: "sequence" }));
        assert!(!err.is_source_error());
    }

    #[test]
    fn test_format_violation_is_resolution_error() {
        let err = from_json_str_with_env(
            r#"{"foo": {"format": ["a", "b"], "default": "c"}}"#,
            &no_env(),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::ResolutionError(_)));
        assert!(!err.is_source_error());
    }

    #[test]
    fn test_load_json_file() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "config.json", r#"{"foo": "bar"}"#);

        let config = load_config_file_with_env(&path, &no_env()).unwrap();
        assert_eq!(config.get("foo"), Some(&json!("bar")));
    }

    #[test]
    fn test_load_yaml_file_with_comments() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "config.yml",
            "# service settings\nservice:\n  name:\n    default: api # inline\n",
        );

        let config = load_config_file_with_env(&path, &no_env()).unwrap();
        assert_eq!(config.get("service.name"), Some(&json!("api")));
    }

    #[test]
    fn test_unknown_extension_falls_back() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "config.conf", r#"{"foo": {"default": 1}}"#);

        let config = load_config_file_with_env(&path, &no_env()).unwrap();
        assert_eq!(config.get("foo"), Some(&json!(1)));
    }

    #[test]
    fn test_unknown_extension_reports_both_errors() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "config.conf", "foo: [unclosed\n");

        let err = load_config_file_with_env(&path, &no_env()).unwrap_err();
        match err {
            ConfigError::ParseError { path: p, .. } => assert!(p.ends_with("config.conf")),
            other => panic!("expected ParseError, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing.json");

        let err = load_config_file_with_env(&missing, &no_env()).unwrap_err();
        assert!(matches!(err, ConfigError::ReadError { .. }));
        assert!(err.to_string().contains("missing.json"));
    }

    #[test]
    fn test_save_and_load_resolved_config() {
        let dir = TempDir::new().unwrap();
        let env: HashMap<String, String> = [("TEST_HOST".to_string(), "db.internal".to_string())].into();
        let config = from_json_str_with_env(
            r#"{"db": {"host": {"env": "TEST_HOST", "default": "localhost"}, "port": 5432}}"#,
            &env,
        )
        .unwrap();

        for name in ["saved.yaml", "saved.json"] {
            let path = dir.path().join(name);
            save_config_file(&config, &path).unwrap();

            let loaded = load_config_file_with_env(&path, &no_env()).unwrap();
            assert_eq!(loaded, config);
        }
    }
}
