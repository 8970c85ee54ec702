//! The `Value` enum.

use std::collections::HashSet;

use bytes::Bytes;

use crate::array::ArrayRef;
use crate::error::{ErrorValue, NotPrintable};
use crate::number::format_number;
use crate::object::{Class, ObjectRef};

/// Any value a flow node can emit.
///
/// The variant set is closed: consumers match on it exhaustively.
/// `Array` and `Object` are shared handles (see [`ArrayRef`] and
/// [`ObjectRef`]), everything else is owned data.
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// No value at all (a missing property, an empty slot).
    #[default]
    Undefined,
    /// An explicit null.
    Null,
    /// Boolean.
    Bool(bool),
    /// Number (IEEE-754 double).
    Number(f64),
    /// UTF-8 text.
    String(String),
    /// Raw bytes.
    Bytes(Bytes),
    /// Ordered collection.
    Array(ArrayRef),
    /// Keyed object.
    Object(ObjectRef),
    /// An error carried as data.
    Error(ErrorValue),
}

impl Value {
    /// Build an array value.
    pub fn array(items: impl IntoIterator<Item = Value>) -> Self {
        Self::Array(items.into_iter().collect())
    }

    /// Build a plain object value.
    pub fn object<K: Into<String>>(fields: impl IntoIterator<Item = (K, Value)>) -> Self {
        Self::Object(fields.into_iter().collect())
    }

    /// Build a bytes value.
    pub fn bytes(data: impl Into<Bytes>) -> Self {
        Self::Bytes(data.into())
    }

    /// Whether this is [`Value::Undefined`].
    #[inline]
    pub fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined)
    }

    /// Whether this is [`Value::Null`].
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// The string slice, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// The number, if this is a number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// The boolean, if this is a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// The object handle, if this is an object.
    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Self::Object(o) => Some(o),
            _ => None,
        }
    }

    /// The array handle, if this is an array.
    pub fn as_array(&self) -> Option<&ArrayRef> {
        match self {
            Self::Array(a) => Some(a),
            _ => None,
        }
    }

    /// Best-effort conversion to a string, as string concatenation would do.
    ///
    /// Arrays join their elements with `,`; an array met again while it is
    /// being joined contributes an empty string. Fails only when some
    /// object along the way refuses conversion.
    pub fn to_display_string(&self) -> Result<String, NotPrintable> {
        let mut joining = HashSet::new();
        display_into(self, &mut joining)
    }
}

fn display_into(value: &Value, joining: &mut HashSet<usize>) -> Result<String, NotPrintable> {
    Ok(match value {
        Value::Undefined => "undefined".to_owned(),
        Value::Null => "null".to_owned(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => format_number(*n),
        Value::String(s) => s.clone(),
        Value::Bytes(b) => String::from_utf8_lossy(b).into_owned(),
        Value::Error(e) => e.to_string(),
        Value::Object(o) => o.to_display_string()?,
        Value::Array(a) => {
            if !joining.insert(a.identity()) {
                return Ok(String::new());
            }
            let mut parts = Vec::with_capacity(a.len());
            for item in a.read().iter() {
                parts.push(match item {
                    Value::Undefined | Value::Null => String::new(),
                    other => display_into(other, joining)?,
                });
            }
            joining.remove(&a.identity());
            parts.join(",")
        }
    })
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

macro_rules! from_number {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Self::Number(v as f64)
                }
            }
        )*
    };
}

from_number!(u8, i32, i64, u32, u64, usize, f32);

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<ErrorValue> for Value {
    fn from(v: ErrorValue) -> Self {
        Self::Error(v)
    }
}

impl From<ArrayRef> for Value {
    fn from(v: ArrayRef) -> Self {
        Self::Array(v)
    }
}

impl From<ObjectRef> for Value {
    fn from(v: ObjectRef) -> Self {
        Self::Object(v)
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => Self::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Self::String(s),
            serde_json::Value::Array(items) => Self::array(items.into_iter().map(Self::from)),
            serde_json::Value::Object(fields) => {
                let object = ObjectRef::new(Class::Plain);
                for (key, value) in fields {
                    object.insert(key, Self::from(value));
                }
                Self::Object(object)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::Repr;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn default_is_undefined() {
        assert!(Value::default().is_undefined());
    }

    #[test]
    fn from_json_builds_plain_objects() {
        let value = Value::from(json!({"a": [1, "two", null], "b": true}));
        let obj = value.as_object().unwrap();
        assert_eq!(obj.class(), &Class::Plain);
        let a = obj.get("a").unwrap();
        let a = a.as_array().unwrap();
        assert_eq!(a.len(), 3);
        assert_eq!(a.get(0).unwrap().as_f64(), Some(1.0));
        assert!(a.get(2).unwrap().is_null());
        assert_eq!(obj.get("b").unwrap().as_bool(), Some(true));
    }

    #[test]
    fn display_string_of_scalars() {
        assert_eq!(Value::Undefined.to_display_string().unwrap(), "undefined");
        assert_eq!(Value::Null.to_display_string().unwrap(), "null");
        assert_eq!(Value::from(0).to_display_string().unwrap(), "0");
        assert_eq!(Value::from(false).to_display_string().unwrap(), "false");
        assert_eq!(Value::bytes(&b"hi"[..]).to_display_string().unwrap(), "hi");
    }

    #[test]
    fn display_string_joins_arrays() {
        let value = Value::array([Value::from(1), Value::Null, Value::from("x")]);
        assert_eq!(value.to_display_string().unwrap(), "1,,x");
    }

    #[test]
    fn display_string_of_cyclic_array_terminates() {
        let arr = ArrayRef::new(vec![Value::from(1)]);
        arr.push(Value::Array(arr.clone()));
        assert_eq!(Value::Array(arr).to_display_string().unwrap(), "1,");
    }

    #[test]
    fn unprintable_object_propagates() {
        let obj = ObjectRef::with_repr(Class::Named("Weird".into()), Repr::Unprintable);
        let value = Value::array([Value::from(1), Value::Object(obj)]);
        assert_eq!(value.to_display_string(), Err(NotPrintable));
    }
}
