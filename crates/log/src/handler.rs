//! Log records as data, and the handlers that receive them.

use std::cell::Cell;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::SystemTime;

use parking_lot::RwLock;
use serde::Serialize;

use crate::context::NodeContext;

/// Severity of a [`LogRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Failures.
    Error,
    /// Recoverable problems.
    Warn,
    /// Normal operation.
    Info,
    /// Diagnostics.
    Debug,
    /// Very verbose diagnostics.
    Trace,
}

impl LogLevel {
    /// Numeric severity as used by flow-engine log consumers.
    #[must_use]
    pub const fn severity(self) -> u8 {
        match self {
            Self::Error => 20,
            Self::Warn => 30,
            Self::Info => 40,
            Self::Debug => 50,
            Self::Trace => 60,
        }
    }

    /// Whether this is [`LogLevel::Warn`] or [`LogLevel::Error`].
    #[must_use]
    pub const fn is_warn_or_error(self) -> bool {
        matches!(self, Self::Warn | Self::Error)
    }
}

impl From<&tracing::Level> for LogLevel {
    fn from(level: &tracing::Level) -> Self {
        match *level {
            tracing::Level::ERROR => Self::Error,
            tracing::Level::WARN => Self::Warn,
            tracing::Level::INFO => Self::Info,
            tracing::Level::DEBUG => Self::Debug,
            tracing::Level::TRACE => Self::Trace,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Error => "ERROR",
            Self::Warn => "WARN",
            Self::Info => "INFO",
            Self::Debug => "DEBUG",
            Self::Trace => "TRACE",
        })
    }
}

/// One emitted log event.
#[derive(Debug, Clone)]
pub struct LogRecord {
    /// Severity.
    pub level: LogLevel,
    /// Event target (module path unless overridden).
    pub target: String,
    /// The formatted `message` field; empty when the event had none.
    pub message: String,
    /// The `error` field, when the event carried one.
    pub error: Option<String>,
    /// Every other field, by name.
    pub fields: BTreeMap<String, serde_json::Value>,
    /// Node the event was emitted on behalf of.
    pub node: Option<Arc<NodeContext>>,
    /// When the record was captured.
    pub timestamp: SystemTime,
}

impl LogRecord {
    /// A record with no fields, error or node, stamped now.
    pub fn new(level: LogLevel, target: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level,
            target: target.into(),
            message: message.into(),
            error: None,
            fields: BTreeMap::new(),
            node: None,
            timestamp: SystemTime::now(),
        }
    }

    /// Attach an error description.
    #[must_use]
    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    /// Attach node identity.
    #[must_use]
    pub fn with_node(mut self, node: NodeContext) -> Self {
        self.node = Some(Arc::new(node));
        self
    }
}

/// Receives every record that passes the logger's filter.
///
/// Handlers run synchronously on the emitting thread and must not block.
pub trait LogHandler: Send + Sync {
    /// Handle one record.
    fn handle(&self, record: &LogRecord);
}

thread_local! {
    static DISPATCHING: Cell<bool> = const { Cell::new(false) };
}

/// Shared list of [`LogHandler`]s.
///
/// Clones share the same list, so handlers registered after the logger is
/// installed still receive records.
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    handlers: Arc<RwLock<Vec<Arc<dyn LogHandler>>>>,
}

impl HandlerRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a handler.
    pub fn register(&self, handler: Arc<dyn LogHandler>) {
        self.handlers.write().push(handler);
    }

    /// Number of registered handlers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.read().len()
    }

    /// Whether no handler is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Deliver `record` to every handler.
    ///
    /// Records emitted by a handler while it runs are not dispatched again.
    pub fn dispatch(&self, record: &LogRecord) {
        if DISPATCHING.with(Cell::get) {
            return;
        }
        let handlers = self.handlers.read().clone();
        let _guard = DispatchGuard::enter();
        for handler in &handlers {
            handler.handle(record);
        }
    }
}

struct DispatchGuard;

impl DispatchGuard {
    fn enter() -> Self {
        DISPATCHING.with(|flag| flag.set(true));
        Self
    }
}

impl Drop for DispatchGuard {
    fn drop(&mut self) {
        DISPATCHING.with(|flag| flag.set(false));
    }
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("handlers", &self.len())
            .finish()
    }
}
