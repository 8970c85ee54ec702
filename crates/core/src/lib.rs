#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! # Flowscope Core
//!
//! Identifiers shared by every flowscope crate.
//!
//! - [`NodeId`] -- identity of a node inside a flow
//! - [`FlowId`] -- identity of the flow (tab) a node lives on
//!
//! ```rust
//! use flowscope_core::NodeId;
//!
//! let id: NodeId = "a1b2c3d4.e5f607".parse().unwrap();
//! assert_eq!(id.as_str(), "a1b2c3d4.e5f607");
//! ```

pub mod id;

pub use id::{FlowId, IdError, NodeId};
