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

//! Format validation for resolved configuration values.
//!
//! A `format` directive is either an enumeration of accepted values or a
//! primitive type tag:
//!
//! ```json
//! { "format": ["debug", "info", "warn"] }
//! { "format": "int" }
//! ```
//!
//! Enumeration membership is structural equality, with numbers compared by
//! numeric value. Type tags are matched case-insensitively and never coerce:
//! the string `"true"` is not a `bool`.

use serde_json::{Number, Value};
use std::fmt;

/// Errors produced when a value fails its declared format.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FormatError {
    #[error("value {value} is not in the expected format. Expected one of: {expected}")]
    NotInSet { value: Value, expected: Value },

    #[error("value {value} is not a {expected}")]
    WrongType { value: Value, expected: TypeTag },

    #[error("invalid format specifier {0}: expected a list of values or one of \"string\", \"bool\", \"float64\", \"int\"")]
    InvalidSpecifier(Value),
}

/// Primitive type a `format` tag can require.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeTag {
    String,
    Bool,
    Float64,
    Int,
}

impl TypeTag {
    /// Parse a type tag, ignoring ASCII case.
    pub fn parse(tag: &str) -> Option<Self> {
        match tag.to_ascii_lowercase().as_str() {
            "string" => Some(Self::String),
            "bool" => Some(Self::Bool),
            "float64" => Some(Self::Float64),
            "int" => Some(Self::Int),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Bool => "bool",
            Self::Float64 => "float64",
            Self::Int => "int",
        }
    }

    /// Whether `value` already has this primitive type.
    ///
    /// `float64` accepts every number, since JSON numbers are float64 in the
    /// generic decoded form. `int` requires an integral representation.
    pub fn matches(&self, value: &Value) -> bool {
        match (self, value) {
            (Self::String, Value::String(_)) => true,
            (Self::Bool, Value::Bool(_)) => true,
            (Self::Float64, Value::Number(_)) => true,
            (Self::Int, Value::Number(n)) => n.is_i64() || n.is_u64(),
            _ => false,
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed `format` directive.
#[derive(Debug, Clone, PartialEq)]
pub enum Format {
    /// The value must equal one of these.
    OneOf(Vec<Value>),
    /// The value must have this primitive type.
    Type(TypeTag),
}

impl Format {
    /// Interpret the raw `format` entry of a schema leaf.
    pub fn from_value(format: &Value) -> Result<Self, FormatError> {
        match format {
            Value::Array(accepted) => Ok(Self::OneOf(accepted.clone())),
            Value::String(tag) => TypeTag::parse(tag)
                .map(Self::Type)
                .ok_or_else(|| FormatError::InvalidSpecifier(format.clone())),
            _ => Err(FormatError::InvalidSpecifier(format.clone())),
        }
    }

    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            Self::OneOf(accepted) => accepted.iter().any(|a| values_equal(a, value)),
            Self::Type(tag) => tag.matches(value),
        }
    }

    /// Check `value`, returning an error that names the accepted set or type.
    pub fn check(&self, value: &Value) -> Result<(), FormatError> {
        if self.accepts(value) {
            return Ok(());
        }
        Err(match self {
            Self::OneOf(accepted) => FormatError::NotInSet {
                value: value.clone(),
                expected: Value::Array(accepted.clone()),
            },
            Self::Type(tag) => FormatError::WrongType {
                value: value.clone(),
                expected: *tag,
            },
        })
    }
}

/// Validate `value` against a raw `format` entry.
///
/// # Examples
///
/// ```
/// use config_master::config::format::validate;
/// use serde_json::json;
///
/// assert!(validate(&json!("info"), &json!(["debug", "info"])).is_ok());
/// assert!(validate(&json!("trace"), &json!(["debug", "info"])).is_err());
/// assert!(validate(&json!(8080), &json!("INT")).is_ok());
/// ```
pub fn validate(value: &Value, format: &Value) -> Result<(), FormatError> {
    Format::from_value(format)?.check(value)
}

/// Structural equality where numbers compare by numeric value.
fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => numbers_equal(x, y),
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(l, r)| values_equal(l, r))
        }
        (Value::Object(x), Value::Object(y)) => {
            x.len() == y.len()
                && x.iter()
                    .all(|(k, l)| y.get(k).is_some_and(|r| values_equal(l, r)))
        }
        _ => a == b,
    }
}

fn numbers_equal(x: &Number, y: &Number) -> bool {
    if let (Some(l), Some(r)) = (x.as_i64(), y.as_i64()) {
        return l == r;
    }
    if let (Some(l), Some(r)) = (x.as_u64(), y.as_u64()) {
        return l == r;
    }
    match (x.as_f64(), y.as_f64()) {
        (Some(l), Some(r)) => l == r,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_enumeration_accepts_member() {
        let format = json!(["bar", "baz", "foo"]);
        assert!(validate(&json!("baz"), &format).is_ok());
    }

    #[test]
    fn test_enumeration_rejects_non_member() {
        let format = json!(["bar", "baz", "foo"]);
        let err = validate(&json!("bar test"), &format).unwrap_err();

        assert!(matches!(err, FormatError::NotInSet { .. }));
        let message = err.to_string();
        assert!(message.contains("\"bar test\""));
        assert!(message.contains(r#"["bar","baz","foo"]"#));
    }

    #[test]
    fn test_enumeration_ignores_order_and_duplicates() {
        assert!(validate(&json!("a"), &json!(["b", "a", "a"])).is_ok());
        assert!(validate(&json!("a"), &json!(["a"])).is_ok());
    }

    #[test]
    fn test_empty_enumeration_rejects_everything() {
        assert!(validate(&json!(""), &json!([])).is_err());
        assert!(validate(&Value::Null, &json!([])).is_err());
    }

    #[test]
    fn test_enumeration_compares_numbers_by_value() {
        assert!(validate(&json!(1), &json!([1.0, 2.0])).is_ok());
        assert!(validate(&json!(2.5), &json!([1, 2])).is_err());
    }

    #[test]
    fn test_enumeration_with_structured_members() {
        let format = json!([{"host": "a", "port": 1}, [1, 2]]);
        assert!(validate(&json!({"port": 1, "host": "a"}), &format).is_ok());
        assert!(validate(&json!([1, 2]), &format).is_ok());
        assert!(validate(&json!([2, 1]), &format).is_err());
    }

    #[test]
    fn test_enumeration_does_not_coerce_strings() {
        assert!(validate(&json!("1"), &json!([1, 2])).is_err());
    }

    #[test]
    fn test_string_tag() {
        assert!(validate(&json!("hello"), &json!("string")).is_ok());
        assert!(validate(&json!(1), &json!("string")).is_err());
    }

    #[test]
    fn test_bool_tag_rejects_string_true() {
        assert!(validate(&json!(true), &json!("bool")).is_ok());
        let err = validate(&json!("true"), &json!("bool")).unwrap_err();
        assert_eq!(
            err,
            FormatError::WrongType {
                value: json!("true"),
                expected: TypeTag::Bool
            }
        );
        assert_eq!(err.to_string(), r#"value "true" is not a bool"#);
    }

    #[test]
    fn test_float64_tag_accepts_any_number() {
        assert!(validate(&json!(1.5), &json!("float64")).is_ok());
        assert!(validate(&json!(3), &json!("float64")).is_ok());
        assert!(validate(&json!("1.5"), &json!("float64")).is_err());
    }

    #[test]
    fn test_int_tag_requires_integral_number() {
        assert!(validate(&json!(8080), &json!("int")).is_ok());
        assert!(validate(&json!(-1), &json!("int")).is_ok());
        assert!(validate(&json!(1.5), &json!("int")).is_err());
        assert!(validate(&json!("8080"), &json!("int")).is_err());
    }

    #[test]
    fn test_type_tags_are_case_insensitive() {
        assert!(validate(&json!("x"), &json!("STRING")).is_ok());
        assert!(validate(&json!(false), &json!("Bool")).is_ok());
        assert!(validate(&json!(2), &json!("Float64")).is_ok());
    }

    #[test]
    fn test_unknown_tag_is_invalid_specifier() {
        let err = validate(&json!("x"), &json!("uuid")).unwrap_err();
        assert_eq!(err, FormatError::InvalidSpecifier(json!("uuid")));
    }

    #[test]
    fn test_object_format_is_invalid_specifier() {
        let err = validate(&json!("x"), &json!({"type": "string"})).unwrap_err();
        assert!(matches!(err, FormatError::InvalidSpecifier(_)));

        assert!(matches!(
            validate(&json!("x"), &json!(7)).unwrap_err(),
            FormatError::InvalidSpecifier(_)
        ));
    }

    #[test]
    fn test_parsed_format_is_reusable() {
        let format = Format::from_value(&json!(["a", "b"])).unwrap();
        assert!(format.accepts(&json!("a")));
        assert!(!format.accepts(&json!("c")));
        assert_eq!(Format::from_value(&json!("int")).unwrap(), Format::Type(TypeTag::Int));
    }
}
