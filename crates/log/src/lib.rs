#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! # Flowscope Log
//!
//! Logger initialisation and log-record fan-out for Flowscope.
//!
//! This crate provides:
//! - [`Config`] -- level, format and display options, with presets
//! - [`LoggerBuilder`] / [`LoggerGuard`] -- installs the global subscriber
//! - [`LogHandler`] / [`HandlerRegistry`] -- receive every [`LogRecord`]
//!   the process emits, as plain data
//! - [`NodeContext`] -- scoped node identity attached to records
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use flowscope_log::{LogHandler, LogRecord};
//!
//! struct Printer;
//!
//! impl LogHandler for Printer {
//!     fn handle(&self, record: &LogRecord) {
//!         eprintln!("{}: {}", record.level, record.message);
//!     }
//! }
//!
//! let guard = flowscope_log::auto_init().expect("logger");
//! guard.handlers().register(Arc::new(Printer));
//! tracing::warn!("disk almost full");
//! ```

pub mod builder;
pub mod config;
pub mod context;
pub mod error;
pub mod handler;
pub mod layer;

pub use builder::{LoggerBuilder, LoggerGuard};
pub use config::{Config, DisplayConfig, Format, Writer};
pub use context::NodeContext;
pub use error::{LogError, LogResult};
pub use handler::{HandlerRegistry, LogHandler, LogLevel, LogRecord};
pub use layer::HandlerLayer;

/// Initialise logging from the environment ([`Config::from_env`]).
///
/// # Errors
///
/// Fails if the filter does not parse or a global subscriber is already set.
pub fn auto_init() -> LogResult<LoggerGuard> {
    init_with(Config::from_env())
}

/// Initialise logging with an explicit configuration.
///
/// # Errors
///
/// Fails if the filter does not parse or a global subscriber is already set.
pub fn init_with(config: Config) -> LogResult<LoggerGuard> {
    LoggerBuilder::from_config(config).build()
}
