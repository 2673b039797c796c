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

//! Recursive resolution of schema leaves in a configuration tree.
//!
//! A mapping is a **container** when at least one of its direct values is a
//! mapping; containers are rebuilt key by key from their resolved children.
//! Any other mapping is a **candidate leaf**. A candidate leaf holding at
//! least one of the `env`, `default` or `format` directives is replaced by a
//! derived value:
//!
//! 1. the named environment variable, if `env` is a string and the variable is set
//! 2. otherwise `default`, as-is
//! 3. otherwise the empty string
//!
//! and the value is then checked against `format` if one is declared. A
//! candidate leaf without directives passes through unchanged, and directive
//! keys on a container are treated as ordinary entries.
//!
//! Sequences are walked element by element: mapping elements are resolved the
//! same way, everything else (including nested sequences) is copied.
//!
//! The root mapping is always a container. Resolution stops at the first
//! format violation and no partial tree is returned.

use super::environment::Environment;
use super::format::{validate, FormatError};
use log::{debug, warn};
use serde_json::{Map, Value};

pub const ENV_KEY: &str = "env";
pub const DEFAULT_KEY: &str = "default";
pub const FORMAT_KEY: &str = "format";

const DIRECTIVE_KEYS: [&str; 3] = [ENV_KEY, DEFAULT_KEY, FORMAT_KEY];

/// Errors that abort resolution of a configuration tree.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ResolveError {
    #[error("invalid value for '{path}': {source}")]
    Format { path: String, source: FormatError },
}

impl ResolveError {
    /// Dotted path of the leaf that failed, e.g. `servers[1].port`.
    pub fn path(&self) -> &str {
        match self {
            ResolveError::Format { path, .. } => path,
        }
    }

    /// True when the leaf's `format` entry itself was malformed, as opposed
    /// to the value not matching a well-formed format.
    pub fn is_invalid_specifier(&self) -> bool {
        matches!(
            self,
            ResolveError::Format {
                source: FormatError::InvalidSpecifier(_),
                ..
            }
        )
    }
}

/// True iff some direct value of `map` is itself a mapping.
pub fn is_container(map: &Map<String, Value>) -> bool {
    map.values().any(Value::is_object)
}

/// True iff `map` is a candidate leaf carrying at least one directive key.
pub fn is_schema_leaf(map: &Map<String, Value>) -> bool {
    !is_container(map) && DIRECTIVE_KEYS.iter().any(|key| map.contains_key(*key))
}

/// Walks a decoded configuration tree and resolves every schema leaf.
///
/// The input is only borrowed; the resolved tree is newly allocated.
///
/// # Examples
///
/// ```
/// use config_master::config::resolver::SchemaResolver;
/// use serde_json::json;
/// use std::collections::HashMap;
///
/// let env: HashMap<String, String> = [("PORT".to_string(), "9090".to_string())].into();
/// let tree = json!({
///     "server": {
///         "host": { "default": "0.0.0.0" },
///         "port": { "env": "PORT", "default": "8080" }
///     }
/// });
///
/// let resolved = SchemaResolver::new(&env)
///     .resolve(tree.as_object().unwrap())
///     .unwrap();
/// assert_eq!(
///     serde_json::Value::Object(resolved),
///     json!({ "server": { "host": "0.0.0.0", "port": "9090" } })
/// );
/// ```
pub struct SchemaResolver<'a, E: Environment + ?Sized> {
    env: &'a E,
}

impl<'a, E: Environment + ?Sized> SchemaResolver<'a, E> {
    pub fn new(env: &'a E) -> Self {
        Self { env }
    }

    /// Resolve a whole tree. The root is always treated as a container.
    pub fn resolve(&self, root: &Map<String, Value>) -> Result<Map<String, Value>, ResolveError> {
        self.resolve_container(root, "")
    }

    fn resolve_container(
        &self,
        map: &Map<String, Value>,
        path: &str,
    ) -> Result<Map<String, Value>, ResolveError> {
        let mut resolved = Map::with_capacity(map.len());

        for (key, value) in map {
            let child_path = join_key(path, key);
            let value = match value {
                Value::Object(child) => self.resolve_mapping(child, &child_path)?,
                Value::Array(items) => Value::Array(self.resolve_sequence(items, &child_path)?),
                other => other.clone(),
            };
            resolved.insert(key.clone(), value);
        }

        Ok(resolved)
    }

    fn resolve_mapping(&self, map: &Map<String, Value>, path: &str) -> Result<Value, ResolveError> {
        if is_container(map) {
            Ok(Value::Object(self.resolve_container(map, path)?))
        } else {
            self.resolve_leaf(map, path)
        }
    }

    fn resolve_sequence(&self, items: &[Value], path: &str) -> Result<Vec<Value>, ResolveError> {
        items
            .iter()
            .enumerate()
            .map(|(index, item)| match item {
                Value::Object(map) => self.resolve_mapping(map, &format!("{path}[{index}]")),
                other => Ok(other.clone()),
            })
            .collect()
    }

    fn resolve_leaf(&self, leaf: &Map<String, Value>, path: &str) -> Result<Value, ResolveError> {
        if !is_schema_leaf(leaf) {
            return Ok(Value::Object(leaf.clone()));
        }

        let value = self.derive_value(leaf, path);

        if let Some(format) = leaf.get(FORMAT_KEY) {
            validate(&value, format).map_err(|source| ResolveError::Format {
                path: path.to_string(),
                source,
            })?;
        }

        Ok(value)
    }

    fn derive_value(&self, leaf: &Map<String, Value>, path: &str) -> Value {
        let env_name = match leaf.get(ENV_KEY) {
            Some(Value::String(name)) => Some(name.as_str()),
            Some(other) => {
                warn!("Ignoring non-string env directive at '{path}': {other}");
                None
            }
            None => None,
        };

        // Log variable names only, never values.
        if let Some(name) = env_name {
            if let Some(value) = self.env.lookup(name) {
                debug!("Resolved '{path}' from environment variable '{name}'");
                return Value::String(value);
            }
        }

        if let Some(default) = leaf.get(DEFAULT_KEY) {
            debug!("Resolved '{path}' from its default");
            return default.clone();
        }

        warn!("No environment value or default for '{path}', resolving to an empty string");
        Value::String(String::new())
    }
}

fn join_key(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{parent}.{key}")
    }
}
