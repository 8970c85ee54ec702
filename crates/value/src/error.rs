//! Errors carried as values.

use std::fmt;

/// An error travelling through a flow as ordinary data.
///
/// Both fields are optional because an upstream error object may lack
/// either one. The string form follows the engine's convention:
/// `name` defaults to `Error`, and the `": "` separator is only used when
/// both parts are non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorValue {
    /// Error class name, e.g. `TypeError`.
    pub name: Option<String>,
    /// Human readable message.
    pub message: Option<String>,
}

impl ErrorValue {
    /// A plain `Error` with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            name: Some("Error".to_owned()),
            message: Some(message.into()),
        }
    }

    /// Replace the error name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Drop the message field entirely.
    #[must_use]
    pub fn without_message(mut self) -> Self {
        self.message = None;
        self
    }

    /// Capture a Rust error as a value.
    pub fn from_error(err: &(dyn std::error::Error + 'static)) -> Self {
        Self::new(err.to_string())
    }
}

impl fmt::Display for ErrorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.name.as_deref().unwrap_or("Error");
        let message = self.message.as_deref().unwrap_or("");
        match (name.is_empty(), message.is_empty()) {
            (true, _) => f.write_str(message),
            (false, true) => f.write_str(name),
            (false, false) => write!(f, "{name}: {message}"),
        }
    }
}

/// A value refused string conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("value is not printable")]
pub struct NotPrintable;
