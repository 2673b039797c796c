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

//! Declarative configuration resolution.
//!
//! A configuration tree mixes literal values with *schema leaves*, which are
//! mappings that describe how to derive a value:
//!
//! ```yaml
//! server:
//!   host:
//!     env: SERVER_HOST
//!     default: 0.0.0.0
//!   port:
//!     env: SERVER_PORT
//!     default: "8080"
//!   log_level:
//!     env: LOG_LEVEL
//!     default: info
//!     format: [debug, info, warn, error]
//! features: [metrics, tracing]
//! ```
//!
//! Resolution replaces every schema leaf with its value: the environment
//! variable when set, else the default, else an empty string. The value is
//! then checked against `format`. The result is an immutable [`Config`]
//! that can be queried with flat or dotted keys.
//!
//! # Examples
//!
//! ```no_run
//! use config_master::config;
//!
//! let config = config::load_config_file("config/app.yaml").unwrap();
//! let level = config.get("server.log_level");
//! ```

pub mod accessor;
pub mod environment;
pub mod format;
pub mod loader;
pub mod resolver;

pub use environment::{Environment, ProcessEnvironment};
pub use format::{Format, FormatError, TypeTag};
pub use loader::{
    from_json_str, from_json_str_with_env, from_yaml_str, from_yaml_str_with_env,
    load_config_file, load_config_file_with_env, save_config_file, ConfigError,
};
pub use resolver::{ResolveError, SchemaResolver};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

/// Where a configuration comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigInput {
    /// A YAML or JSON file to read and decode.
    Path(PathBuf),
    /// An already decoded tree. Must be a mapping.
    Tree(Value),
}

impl From<PathBuf> for ConfigInput {
    fn from(path: PathBuf) -> Self {
        ConfigInput::Path(path)
    }
}

impl From<&Path> for ConfigInput {
    fn from(path: &Path) -> Self {
        ConfigInput::Path(path.to_path_buf())
    }
}

impl From<&str> for ConfigInput {
    fn from(path: &str) -> Self {
        ConfigInput::Path(PathBuf::from(path))
    }
}

impl From<Value> for ConfigInput {
    fn from(tree: Value) -> Self {
        ConfigInput::Tree(tree)
    }
}

impl From<Map<String, Value>> for ConfigInput {
    fn from(tree: Map<String, Value>) -> Self {
        ConfigInput::Tree(Value::Object(tree))
    }
}

/// A fully resolved configuration.
///
/// The tree is resolved once at construction and never changes afterwards,
/// so a `Config` can be shared between threads freely. Reloading means
/// building a new `Config` and swapping it in.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Config {
    data: Map<String, Value>,
}

impl Config {
    /// Build a configuration from a file path or a decoded tree, resolving
    /// against the process environment.
    pub fn new(input: impl Into<ConfigInput>) -> Result<Self, ConfigError> {
        Self::new_with_env(input, &ProcessEnvironment)
    }

    pub fn new_with_env<E: Environment + ?Sized>(
        input: impl Into<ConfigInput>,
        env: &E,
    ) -> Result<Self, ConfigError> {
        match input.into() {
            ConfigInput::Path(path) => load_config_file_with_env(path, env),
            ConfigInput::Tree(tree) => Self::from_value_with_env(&tree, env),
        }
    }

    pub fn from_value(tree: &Value) -> Result<Self, ConfigError> {
        Self::from_value_with_env(tree, &ProcessEnvironment)
    }

    /// Resolve a decoded tree. The root must be a mapping.
    pub fn from_value_with_env<E: Environment + ?Sized>(
        tree: &Value,
        env: &E,
    ) -> Result<Self, ConfigError> {
        match tree {
            Value::Object(map) => Self::from_map_with_env(map, env),
            other => Err(ConfigError::UnsupportedInput {
                kind: value_kind(other),
            }),
        }
    }

    pub fn from_map(tree: &Map<String, Value>) -> Result<Self, ConfigError> {
        Self::from_map_with_env(tree, &ProcessEnvironment)
    }

    pub fn from_map_with_env<E: Environment + ?Sized>(
        tree: &Map<String, Value>,
        env: &E,
    ) -> Result<Self, ConfigError> {
        let data = SchemaResolver::new(env).resolve(tree)?;
        Ok(Self { data })
    }

    /// Look up a flat or dotted key. See [`accessor::get`].
    pub fn get(&self, key: &str) -> Option<&Value> {
        accessor::get(&self.data, key)
    }

    /// Look up a key and deserialize the value into `T`.
    ///
    /// Returns `Ok(None)` when the key is absent.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, ConfigError> {
        self.get(key)
            .map(|value| {
                T::deserialize(value).map_err(|source| ConfigError::DecodeError {
                    key: key.to_string(),
                    source,
                })
            })
            .transpose()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// The resolved tree.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.data
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.data
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.data.clone())
    }
}

/// Human-readable name of a value's dynamic type, for error messages.
pub(crate) fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "sequence",
        Value::Object(_) => "mapping",
    }
}
