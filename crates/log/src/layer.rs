//! Tracing layer that turns events into [`LogRecord`]s.

use std::fmt;
use std::sync::Arc;

use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

use crate::context::NodeContext;
use crate::handler::{HandlerRegistry, LogLevel, LogRecord};

/// Feeds every event that passes the filter to a [`HandlerRegistry`].
///
/// Node identity comes from the active [`NodeContext`], or else from
/// `node.id` / `node.name` / `node.type` / `node.z` event fields.
#[derive(Debug, Clone)]
pub struct HandlerLayer {
    handlers: HandlerRegistry,
}

impl HandlerLayer {
    /// Layer dispatching to `handlers`.
    #[must_use]
    pub fn new(handlers: HandlerRegistry) -> Self {
        Self { handlers }
    }

    /// The registry this layer dispatches to.
    #[must_use]
    pub fn handlers(&self) -> &HandlerRegistry {
        &self.handlers
    }
}

impl<S: Subscriber> Layer<S> for HandlerLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if self.handlers.is_empty() {
            return;
        }
        let metadata = event.metadata();
        let mut record = LogRecord::new(LogLevel::from(metadata.level()), metadata.target(), "");
        event.record(&mut RecordVisitor(&mut record));
        record.node = NodeContext::current().or_else(|| node_from_fields(&mut record));
        self.handlers.dispatch(&record);
    }
}

fn node_from_fields(record: &mut LogRecord) -> Option<Arc<NodeContext>> {
    let mut take = |key: &str| match record.fields.remove(key)? {
        serde_json::Value::String(s) => Some(s),
        other => Some(other.to_string()),
    };
    let id = take("node.id")?;
    Some(Arc::new(NodeContext {
        id,
        name: take("node.name"),
        node_type: take("node.type"),
        z: take("node.z"),
    }))
}

struct RecordVisitor<'a>(&'a mut LogRecord);

impl RecordVisitor<'_> {
    fn put(&mut self, field: &Field, value: serde_json::Value) {
        self.0.fields.insert(field.name().to_owned(), value);
    }

    fn put_text(&mut self, field: &Field, text: String) {
        match field.name() {
            "message" => self.0.message = text,
            "error" => self.0.error = Some(text),
            _ => self.put(field, serde_json::Value::String(text)),
        }
    }
}

impl Visit for RecordVisitor<'_> {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.put_text(field, format!("{value:?}"));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.put_text(field, value.to_owned());
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.put_text(field, value.to_string());
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.put(field, value.into());
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.put(field, value.into());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.put(field, value.into());
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.put(field, value.into());
    }
}
