#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! # Flowscope Debug
//!
//! Turns arbitrary flow values into bounded, displayable debug records and
//! publishes them to observers.
//!
//! This crate provides:
//! - [`classify`] -- shallow, total categorisation of a [`Value`](flowscope_value::Value)
//! - [`BoundedEncoder`] -- category-specific encoding with a size bound
//! - [`Redactor`] -- cycle-safe structured rendering with truncation
//! - [`DebugPublisher`] -- encode and hand envelopes to a [`Publish`] sink
//! - [`LogBridge`] -- forwards WARN/ERROR log records as debug records
//! - [`DebugNode`] / [`DebugNodeRegistry`] -- per-node behaviour and the
//!   set of nodes the control endpoint can toggle
//! - [`Inspector`] -- console rendering for mirrored values
//!
//! ```rust
//! use flowscope_debug::{BoundedEncoder, DebugSettings};
//! use flowscope_value::Value;
//!
//! let encoder = BoundedEncoder::new(DebugSettings::default().with_max_length(4));
//! let encoded = encoder.encode_value(&Value::from("hello world"));
//! assert_eq!(encoded.format, "string[11]");
//! assert_eq!(encoded.payload, "hell...");
//! ```

pub mod bridge;
pub mod classify;
pub mod encode;
pub mod envelope;
pub mod error;
pub mod inspect;
pub mod node;
pub mod publish;
pub mod redact;
pub mod registry;
pub mod settings;

pub use bridge::LogBridge;
pub use classify::{Category, classify, type_name};
pub use encode::{BoundedEncoder, EncodedValue};
pub use envelope::{CommsMessage, DebugEnvelope, PublishContext};
pub use error::DebugError;
pub use inspect::Inspector;
pub use node::{Complete, DebugNode, DebugNodeConfig};
pub use publish::{DEBUG_TOPIC, DebugPublisher, Publish};
pub use redact::Redactor;
pub use registry::DebugNodeRegistry;
pub use settings::{DEFAULT_MAX_LENGTH, DebugSettings};
