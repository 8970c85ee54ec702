//! Bounded encoding of classified values.

use flowscope_value::{ErrorValue, Value, format_number};
use serde::Serialize;
use serde_json::Value as Json;
use serde_json::ser::PrettyFormatter;

use crate::classify::{Category, classify};
use crate::redact::Redactor;
use crate::settings::DebugSettings;

/// Payload of values that are null or undefined.
pub const UNDEFINED_PAYLOAD: &str = "(undefined)";
/// Payload of objects whose string conversion fails.
pub const NOT_PRINTABLE: &str = "[Type not printable]";

/// A format label and a bounded, display-safe payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedValue {
    /// Type descriptor, e.g. `string[12]` or `Object`.
    pub format: String,
    /// The encoded value.
    pub payload: String,
}

impl EncodedValue {
    fn new(format: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            format: format.into(),
            payload: payload.into(),
        }
    }
}

#[derive(Serialize)]
struct ErrorPayload<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    message: String,
}

/// Turns any [`Value`] into an [`EncodedValue`] under a size bound.
///
/// # Examples
///
/// ```
/// use flowscope_debug::{BoundedEncoder, DebugSettings};
/// use flowscope_value::Value;
///
/// let encoder = BoundedEncoder::new(DebugSettings::default().with_max_length(3));
/// let encoded = encoder.encode_value(&Value::from("abcdef"));
/// assert_eq!(encoded.format, "string[6]");
/// assert_eq!(encoded.payload, "abc...");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct BoundedEncoder {
    settings: DebugSettings,
}

impl BoundedEncoder {
    /// Encoder using `settings`.
    #[must_use]
    pub const fn new(settings: DebugSettings) -> Self {
        Self { settings }
    }

    /// Active settings.
    #[must_use]
    pub const fn settings(&self) -> &DebugSettings {
        &self.settings
    }

    fn redactor(&self) -> Redactor {
        Redactor::new(self.settings.max_length)
    }

    /// Classify and encode in one step.
    pub fn encode_value(&self, value: &Value) -> EncodedValue {
        self.encode(&classify(value), value)
    }

    /// Encode `value` along the branch `category` selects.
    ///
    /// A category that does not describe `value` is ignored and the value is
    /// classified afresh.
    pub fn encode(&self, category: &Category, value: &Value) -> EncodedValue {
        let max = self.settings.max_length;
        match (category, value) {
            (Category::Error, Value::Error(error)) => {
                EncodedValue::new("error", self.error_payload(error))
            }
            (Category::Binary, Value::Bytes(bytes)) => {
                let take = bytes.len().min(max.div_ceil(2));
                let mut payload = hex::encode(&bytes[..take]);
                payload.truncate(max);
                EncodedValue::new(format!("buffer[{}]", bytes.len()), payload)
            }
            (Category::ErrorLike(name), Value::Object(object)) => {
                let json = self.redactor().redact_fields(object, &["name", "message"]);
                EncodedValue::new(name.clone(), json.to_string())
            }
            (Category::Array, Value::Array(array)) => EncodedValue::new(
                format!("array[{}]", array.len()),
                self.structured(value),
            ),
            (Category::PlainObject, Value::Object(_)) => {
                EncodedValue::new("Object", self.structured(value))
            }
            (Category::OpaqueObject(name), Value::Object(object)) => {
                let payload = object
                    .to_display_string()
                    .map_or_else(|_| NOT_PRINTABLE.to_owned(), |s| self.redactor().truncate(&s));
                EncodedValue::new(name.clone(), payload)
            }
            (Category::Boolean, Value::Bool(b)) => EncodedValue::new("boolean", b.to_string()),
            (Category::Number, Value::Number(n)) => EncodedValue::new("number", format_number(*n)),
            (Category::Null, Value::Null) => EncodedValue::new("null", UNDEFINED_PAYLOAD),
            (Category::Undefined, Value::Undefined) => {
                EncodedValue::new("undefined", UNDEFINED_PAYLOAD)
            }
            (Category::String, Value::String(s)) => EncodedValue::new(
                format!("string[{}]", s.chars().count()),
                self.redactor().truncate(s),
            ),
            (_, value) => self.encode_value(value),
        }
    }

    fn error_payload(&self, error: &ErrorValue) -> String {
        let redactor = self.redactor();
        let payload = ErrorPayload {
            name: error.name.as_deref().filter(|n| !n.is_empty()),
            message: redactor.truncate(&error.message.clone().unwrap_or_else(|| error.to_string())),
        };
        serde_json::to_string(&payload).unwrap_or_else(|_| redactor.truncate(&error.to_string()))
    }

    /// Redacted, single-space-indented JSON, or the string form if rendering
    /// fails.
    fn structured(&self, value: &Value) -> String {
        let json = self.redactor().redact(value);
        render_pretty(&json).unwrap_or_else(|_| {
            value
                .to_display_string()
                .map_or_else(|_| NOT_PRINTABLE.to_owned(), |s| self.redactor().truncate(&s))
        })
    }
}

fn render_pretty(json: &Json) -> Result<String, serde_json::Error> {
    let mut out = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(b" "));
    json.serialize(&mut serializer)?;
    Ok(String::from_utf8_lossy(&out).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowscope_value::{ArrayRef, Class, ObjectRef, Repr};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn encoder(max: usize) -> BoundedEncoder {
        BoundedEncoder::new(DebugSettings::default().with_max_length(max))
    }

    #[rstest]
    #[case(Value::from(0), "number", "0")]
    #[case(Value::from(-0.0), "number", "0")]
    #[case(Value::from(1.5), "number", "1.5")]
    #[case(Value::Number(f64::NEG_INFINITY), "number", "-Infinity")]
    #[case(Value::from(true), "boolean", "true")]
    #[case(Value::Null, "null", "(undefined)")]
    #[case(Value::Undefined, "undefined", "(undefined)")]
    #[case(Value::from("hi"), "string[2]", "hi")]
    #[case(Value::from(""), "string[0]", "")]
    fn scalars(#[case] value: Value, #[case] format: &str, #[case] payload: &str) {
        assert_eq!(encoder(1000).encode_value(&value), EncodedValue::new(format, payload));
    }

    #[test]
    fn error_with_message() {
        let encoded = encoder(1000).encode_value(&Value::from(ErrorValue::new("boom")));
        assert_eq!(encoded, EncodedValue::new("error", r#"{"name":"Error","message":"boom"}"#));
    }

    #[test]
    fn error_without_message_uses_string_form() {
        let error = ErrorValue::new("ignored").with_name("AbortError").without_message();
        let encoded = encoder(1000).encode_value(&Value::from(error));
        assert_eq!(encoded.payload, r#"{"name":"AbortError","message":"AbortError"}"#);
    }

    #[test]
    fn error_with_empty_name_omits_it() {
        let error = ErrorValue::new("x").with_name("");
        let encoded = encoder(1000).encode_value(&Value::from(error));
        assert_eq!(encoded.payload, r#"{"message":"x"}"#);
    }

    #[test]
    fn buffer_is_hex_cut_by_characters() {
        let encoded = encoder(3).encode_value(&Value::bytes(vec![0xab_u8, 0xcd, 0xef]));
        assert_eq!(encoded, EncodedValue::new("buffer[3]", "abc"));
        let whole = encoder(10).encode_value(&Value::bytes(vec![0x01_u8, 0xff]));
        assert_eq!(whole, EncodedValue::new("buffer[2]", "01ff"));
    }

    #[test]
    fn error_like_object_keeps_name_and_message() {
        let object = ObjectRef::new(Class::Named("ValidationError".into()));
        object.insert("name", Value::from("ValidationError"));
        object.insert("message", Value::from("bad input"));
        object.insert("details", Value::array([Value::from(1)]));
        let encoded = encoder(1000).encode_value(&Value::Object(object));
        assert_eq!(
            encoded,
            EncodedValue::new(
                "ValidationError",
                r#"{"name":"ValidationError","message":"bad input"}"#
            )
        );
    }

    #[test]
    fn error_like_object_without_fields() {
        let object = ObjectRef::new(Class::Named("ErrorBag".into()));
        assert_eq!(encoder(1000).encode_value(&Value::Object(object)).payload, "{}");
    }

    #[test]
    fn array_is_pretty_printed_with_single_space_indent() {
        let value = Value::array([Value::from(1), Value::from("a")]);
        assert_eq!(
            encoder(1000).encode_value(&value),
            EncodedValue::new("array[2]", "[\n 1,\n \"a\"\n]")
        );
    }

    #[test]
    fn object_is_pretty_printed_in_insertion_order() {
        let value = Value::object([("b", Value::from(1)), ("a", Value::object([("c", Value::Null)]))]);
        assert_eq!(
            encoder(1000).encode_value(&value),
            EncodedValue::new("Object", "{\n \"b\": 1,\n \"a\": {\n  \"c\": null\n }\n}")
        );
    }

    #[test]
    fn empty_containers() {
        assert_eq!(encoder(10).encode_value(&Value::array([])).payload, "[]");
        assert_eq!(encoder(10).encode_value(&Value::Object(ObjectRef::plain())).payload, "{}");
    }

    #[rstest]
    #[case(Repr::Default, "[object Object]")]
    #[case(Repr::Text("2024-01-01".into()), "2024-01-01")]
    #[case(Repr::Text("0123456789abcdefghijk".into()), "0123456789abcdefghij...")]
    #[case(Repr::Unprintable, "[Type not printable]")]
    fn opaque_objects_use_string_form(#[case] repr: Repr, #[case] payload: &str) {
        let object = ObjectRef::with_repr(Class::Named("Date".into()), repr);
        assert_eq!(
            encoder(20).encode_value(&Value::Object(object)),
            EncodedValue::new("Date", payload)
        );
    }

    #[test]
    fn mismatched_category_is_reclassified() {
        let encoded = encoder(10).encode(&Category::Error, &Value::from(5));
        assert_eq!(encoded, EncodedValue::new("number", "5"));
    }

    #[test]
    fn error_like_category_on_an_array_is_reclassified() {
        let value = Value::array([Value::from(1)]);
        let encoded = encoder(10).encode(&Category::ErrorLike("ErrorList".into()), &value);
        assert_eq!(encoded, EncodedValue::new("array[1]", "[\n 1\n]"));
    }

    #[test]
    fn cyclic_array_terminates() {
        let array = ArrayRef::new(vec![Value::from(1)]);
        array.push(Value::Array(array.clone()));
        let encoded = encoder(10).encode_value(&Value::Array(array));
        assert_eq!(encoded.format, "array[2]");
        assert_eq!(encoded.payload, "[\n 1,\n \"[Circular ~]\"\n]");
    }
}
