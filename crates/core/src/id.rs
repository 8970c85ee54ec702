//! Identifiers for nodes and flows.
//!
//! Flow engines hand out short opaque string ids (for example
//! `"a1b2c3d4.e5f607"`). Both id types here wrap such a string after
//! validating it, so an id that made it into a type is always safe to
//! embed in a URL path segment or a log field.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Maximum allowed length of an id.
pub const ID_MAX_LEN: usize = 64;

/// Errors from parsing an id.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdError {
    /// The input was empty or contained only whitespace.
    #[error("id cannot be empty or whitespace")]
    Empty,
    /// The id contains characters outside `A-Z a-z 0-9 . _ -`.
    #[error("id contains invalid character {0:?}")]
    InvalidCharacter(char),
    /// The id exceeds [`ID_MAX_LEN`] characters.
    #[error("id exceeds maximum length of {ID_MAX_LEN} characters")]
    TooLong,
}

fn validate(raw: &str) -> Result<String, IdError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(IdError::Empty);
    }
    if let Some(bad) = trimmed
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')))
    {
        return Err(IdError::InvalidCharacter(bad));
    }
    if trimmed.len() > ID_MAX_LEN {
        return Err(IdError::TooLong);
    }
    Ok(trimmed.to_owned())
}

/// Random id in the engine's `xxxxxxxx.xxxxxx` style.
fn generate() -> String {
    let raw = uuid::Uuid::new_v4();
    let bytes = raw.as_bytes();
    format!("{}.{}", hex::encode(&bytes[..4]), hex::encode(&bytes[4..7]))
}

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Parse and validate an id.
            pub fn new(raw: &str) -> Result<Self, IdError> {
                validate(raw).map(Self)
            }

            /// Generate a fresh random id.
            #[must_use]
            pub fn generate() -> Self {
                Self(generate())
            }

            /// The id as a string slice.
            #[inline]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl FromStr for $name {
            type Err = IdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }

        impl TryFrom<String> for $name {
            type Error = IdError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(&value)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl std::borrow::Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(
    /// Identity of a node inside a flow.
    NodeId
);

string_id!(
    /// Identity of the flow a node belongs to.
    FlowId
);
