#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! # Flowscope Value
//!
//! The runtime value model for data flowing between flow nodes.
//!
//! This crate provides:
//! - [`Value`] -- a closed tagged union over every category a node can emit
//! - [`ArrayRef`] / [`ObjectRef`] -- shared, identity-carrying containers,
//!   so a value graph may reference itself
//! - [`ErrorValue`] -- an error carried as data
//! - [`Class`] / [`Repr`] -- what can (and cannot) be learned about an object
//! - [`get_property`] -- dotted-path property lookup
//!
//! ```rust
//! use flowscope_value::{Value, ObjectRef};
//!
//! let msg = ObjectRef::plain();
//! msg.insert("payload", Value::from(42));
//! msg.insert("topic", Value::from("sensors"));
//!
//! let value = Value::Object(msg);
//! let payload = flowscope_value::get_property(&value, "payload").unwrap();
//! assert_eq!(payload.as_f64(), Some(42.0));
//! ```

pub mod array;
pub mod error;
pub mod number;
pub mod object;
pub mod path;
pub mod value;

pub use array::ArrayRef;
pub use error::{ErrorValue, NotPrintable};
pub use number::{format_number, number_to_json};
pub use object::{Class, IntrospectionError, ObjectRef, Repr};
pub use path::{PathError, get_property};
pub use value::Value;
