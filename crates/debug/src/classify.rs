//! Shallow classification of runtime values.

use std::sync::LazyLock;

use flowscope_value::Value;
use regex::Regex;

static ERROR_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("(?i)error").expect("valid pattern"));

/// The branch a value takes through the encoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Category {
    /// A real error value.
    Error,
    /// Raw bytes.
    Binary,
    /// An object (or array) whose type name mentions "error".
    ErrorLike(String),
    /// An array.
    Array,
    /// A plain key/value object.
    PlainObject,
    /// An instance of some other class.
    OpaqueObject(String),
    /// A boolean.
    Boolean,
    /// A number, zero included.
    Number,
    /// Explicit null.
    Null,
    /// No value.
    Undefined,
    /// Text.
    String,
}

/// Resolved type name of an object or array.
///
/// Constructors that are anonymous or cannot be inspected resolve to
/// `"Object"`.
pub fn type_name(value: &Value) -> Option<String> {
    match value {
        Value::Array(_) => Some("Array".to_owned()),
        Value::Object(object) => Some(
            object
                .class()
                .name()
                .ok()
                .flatten()
                .unwrap_or("Object")
                .to_owned(),
        ),
        _ => None,
    }
}

/// Assign `value` exactly one [`Category`].
///
/// Only the value itself is examined, never its members.
pub fn classify(value: &Value) -> Category {
    match value {
        Value::Error(_) => Category::Error,
        Value::Bytes(_) => Category::Binary,
        Value::Array(_) | Value::Object(_) => {
            let name = type_name(value).unwrap_or_else(|| "Object".to_owned());
            if ERROR_NAME.is_match(&name) {
                Category::ErrorLike(name)
            } else if matches!(value, Value::Array(_)) {
                Category::Array
            } else if name == "Object" {
                Category::PlainObject
            } else {
                Category::OpaqueObject(name)
            }
        }
        Value::Bool(_) => Category::Boolean,
        Value::Number(_) => Category::Number,
        Value::Null => Category::Null,
        Value::Undefined => Category::Undefined,
        Value::String(_) => Category::String,
    }
}
