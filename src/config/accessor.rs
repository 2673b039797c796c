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

//! Dotted-key lookup over a resolved configuration tree.

use serde_json::{Map, Value};

/// Separator between the segments of a nested key.
pub const KEY_SEPARATOR: char = '.';

/// Look up `key` in `tree`.
///
/// A key without separators is looked up at the top level. A dotted key such as
/// `database.primary.host` walks one mapping per segment. The lookup returns
/// `None` when a segment is missing, when an intermediate value is not a
/// mapping, or when the value found is `null`. It never fails otherwise.
///
/// # Examples
///
/// ```
/// use config_master::config::accessor::get;
/// use serde_json::json;
///
/// let tree = json!({"database": {"host": "localhost", "port": 5432}});
/// let tree = tree.as_object().unwrap();
///
/// assert_eq!(get(tree, "database.port"), Some(&json!(5432)));
/// assert_eq!(get(tree, "database.host.name"), None);
/// assert_eq!(get(tree, "missing"), None);
/// ```
pub fn get<'a>(tree: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    if !key.contains(KEY_SEPARATOR) {
        return tree.get(key).filter(|value| !value.is_null());
    }

    let mut parts = key.split(KEY_SEPARATOR);
    let first = parts.next()?;
    let mut current = tree.get(first)?;

    for part in parts {
        if current.is_null() {
            return None;
        }
        current = current.as_object()?.get(part)?;
    }

    if current.is_null() {
        None
    } else {
        Some(current)
    }
}
