//! Property lookup by path.
//!
//! Paths use dot notation with optional bracket segments:
//! `payload.items[0].name`, `payload["key with spaces"]`, `payload.0`.
//! A leading `msg.` is accepted and ignored.

use crate::Value;

/// Errors from resolving a property path.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    /// The path is empty or malformed.
    #[error("invalid property path {path:?}: {reason}")]
    Syntax {
        /// The offending path.
        path: String,
        /// What is wrong with it.
        reason: &'static str,
    },
    /// An intermediate segment resolved to null or undefined.
    #[error("cannot read property {segment:?} of {parent}")]
    NotTraversable {
        /// The segment that could not be read.
        segment: String,
        /// `null` or `undefined`.
        parent: &'static str,
    },
}

/// Split a path into its segments.
pub fn parse_path(path: &str) -> Result<Vec<String>, PathError> {
    let syntax = |reason| PathError::Syntax {
        path: path.to_owned(),
        reason,
    };

    let trimmed = path.trim();
    let body = trimmed.strip_prefix("msg.").unwrap_or(trimmed);
    if body.is_empty() {
        return Err(syntax("empty path"));
    }

    let mut segments = Vec::new();
    let mut chars = body.chars().peekable();
    let mut current = String::new();
    let mut after_bracket = false;

    while let Some(c) = chars.next() {
        match c {
            '.' => {
                if current.is_empty() && !after_bracket {
                    return Err(syntax("empty segment"));
                }
                if !current.is_empty() {
                    segments.push(std::mem::take(&mut current));
                }
                after_bracket = false;
                if chars.peek().is_none() {
                    return Err(syntax("trailing dot"));
                }
            }
            '[' => {
                if !current.is_empty() {
                    segments.push(std::mem::take(&mut current));
                }
                let segment = match chars.peek().copied() {
                    Some(quote @ ('"' | '\'')) => {
                        chars.next();
                        let mut key = String::new();
                        loop {
                            match chars.next() {
                                Some(ch) if ch == quote => break,
                                Some(ch) => key.push(ch),
                                None => return Err(syntax("unterminated quote")),
                            }
                        }
                        key
                    }
                    _ => {
                        let mut index = String::new();
                        while let Some(&ch) = chars.peek() {
                            if ch == ']' {
                                break;
                            }
                            index.push(ch);
                            chars.next();
                        }
                        if index.is_empty() || !index.bytes().all(|b| b.is_ascii_digit()) {
                            return Err(syntax("bracket index must be a number or quoted key"));
                        }
                        index
                    }
                };
                if chars.next() != Some(']') {
                    return Err(syntax("missing closing bracket"));
                }
                segments.push(segment);
                after_bracket = true;
            }
            ']' => return Err(syntax("unexpected closing bracket")),
            _ => {
                if after_bracket {
                    return Err(syntax("expected '.' or '[' after ']'"));
                }
                current.push(c);
            }
        }
    }
    if !current.is_empty() {
        segments.push(current);
    }
    Ok(segments)
}

/// Resolve `path` against `root`.
///
/// A missing final property yields [`Value::Undefined`]; reading through a
/// null or undefined intermediate is an error.
pub fn get_property(root: &Value, path: &str) -> Result<Value, PathError> {
    let segments = parse_path(path)?;
    let mut current = root.clone();
    for segment in segments {
        current = step(&current, &segment)?;
    }
    Ok(current)
}

fn step(current: &Value, segment: &str) -> Result<Value, PathError> {
    let not_traversable = |parent| PathError::NotTraversable {
        segment: segment.to_owned(),
        parent,
    };
    let index = || segment.parse::<usize>().ok();

    Ok(match current {
        Value::Undefined => return Err(not_traversable("undefined")),
        Value::Null => return Err(not_traversable("null")),
        Value::Object(object) => object.get(segment).unwrap_or_default(),
        Value::Array(array) => match segment {
            "length" => Value::from(array.len()),
            _ => index().and_then(|i| array.get(i)).unwrap_or_default(),
        },
        Value::String(s) => match segment {
            "length" => Value::from(s.chars().count()),
            _ => index()
                .and_then(|i| s.chars().nth(i))
                .map_or(Value::Undefined, |c| Value::String(c.to_string())),
        },
        Value::Bytes(b) => match segment {
            "length" => Value::from(b.len()),
            _ => index()
                .and_then(|i| b.get(i).copied())
                .map_or(Value::Undefined, Value::from),
        },
        Value::Error(e) => match segment {
            "name" => e.name.clone().map_or(Value::Undefined, Value::String),
            "message" => e.message.clone().map_or(Value::Undefined, Value::String),
            _ => Value::Undefined,
        },
        Value::Bool(_) | Value::Number(_) => Value::Undefined,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorValue;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    fn message() -> Value {
        Value::from(json!({
            "payload": {
                "items": [{"name": "first"}, {"name": "second"}],
                "key with spaces": 7,
                "text": "héllo"
            },
            "topic": "t"
        }))
    }

    #[rstest]
    #[case("payload", &["payload"])]
    #[case("msg.payload", &["payload"])]
    #[case("payload.items[1].name", &["payload", "items", "1", "name"])]
    #[case("payload[\"key with spaces\"]", &["payload", "key with spaces"])]
    #[case("payload['a.b']", &["payload", "a.b"])]
    #[case("a[0][1]", &["a", "0", "1"])]
    fn parses_paths(#[case] path: &str, #[case] expected: &[&str]) {
        assert_eq!(parse_path(path).unwrap(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("a..b")]
    #[case("a.")]
    #[case(".a")]
    #[case("a[")]
    #[case("a[x]")]
    #[case("a[\"x]")]
    #[case("a]")]
    #[case("a[0]b")]
    fn rejects_malformed_paths(#[case] path: &str) {
        assert!(matches!(parse_path(path), Err(PathError::Syntax { .. })));
    }

    #[test]
    fn resolves_nested_properties() {
        let msg = message();
        let name = get_property(&msg, "payload.items[1].name").unwrap();
        assert_eq!(name.as_str(), Some("second"));
        let spaced = get_property(&msg, "payload[\"key with spaces\"]").unwrap();
        assert_eq!(spaced.as_f64(), Some(7.0));
        let dotted_index = get_property(&msg, "payload.items.0.name").unwrap();
        assert_eq!(dotted_index.as_str(), Some("first"));
    }

    #[test]
    fn missing_leaf_is_undefined() {
        let msg = message();
        assert!(get_property(&msg, "payload.nope").unwrap().is_undefined());
        assert!(get_property(&msg, "payload.items[9]").unwrap().is_undefined());
        assert!(get_property(&msg, "topic.foo").unwrap().is_undefined());
    }

    #[test]
    fn reading_through_undefined_fails() {
        let msg = message();
        let err = get_property(&msg, "payload.nope.deeper").unwrap_err();
        assert_eq!(
            err,
            PathError::NotTraversable {
                segment: "deeper".into(),
                parent: "undefined"
            }
        );
    }

    #[test]
    fn string_length_and_index_count_chars() {
        let msg = message();
        assert_eq!(get_property(&msg, "payload.text.length").unwrap().as_f64(), Some(5.0));
        assert_eq!(get_property(&msg, "payload.text[1]").unwrap().as_str(), Some("é"));
    }

    #[test]
    fn error_fields_are_readable() {
        let root = Value::object([("err", Value::from(ErrorValue::new("boom")))]);
        assert_eq!(get_property(&root, "err.message").unwrap().as_str(), Some("boom"));
        assert_eq!(get_property(&root, "err.name").unwrap().as_str(), Some("Error"));
    }
}
