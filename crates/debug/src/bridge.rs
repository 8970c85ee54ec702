//! Forwarding of warning and error log records to debug observers.

use std::sync::Arc;

use flowscope_log::{LogHandler, LogRecord};
use flowscope_telemetry::{Counter, MetricsRegistry};
use flowscope_value::{ErrorValue, Value};

use crate::envelope::PublishContext;
use crate::publish::DebugPublisher;

/// A [`LogHandler`] that publishes WARN and ERROR records.
///
/// The record's attached error, or else its message, is the published
/// value. Node identity comes from the record's [`flowscope_log::NodeContext`];
/// records logged outside any node use their target as the id.
#[derive(Debug)]
pub struct LogBridge {
    publisher: Arc<DebugPublisher>,
    forwarded: Counter,
}

impl LogBridge {
    /// Bridge publishing through `publisher`.
    pub fn new(publisher: Arc<DebugPublisher>, metrics: &MetricsRegistry) -> Self {
        Self {
            publisher,
            forwarded: metrics.counter("debug_log_forwarded_total"),
        }
    }
}

impl LogHandler for LogBridge {
    fn handle(&self, record: &LogRecord) {
        if !record.level.is_warn_or_error() {
            return;
        }
        let value = match &record.error {
            Some(error) => Value::Error(ErrorValue::new(error.clone())),
            None => Value::String(record.message.clone()),
        };
        let mut context = PublishContext::new(record.target.clone());
        if let Some(node) = &record.node {
            context.id.clone_from(&node.id);
            context.name.clone_from(&node.name);
            context.node_type.clone_from(&node.node_type);
            context.z.clone_from(&node.z);
        }
        context.level = Some(record.level.severity());
        self.publisher.publish(&value, context);
        self.forwarded.inc();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::CommsMessage;
    use crate::settings::DebugSettings;
    use flowscope_log::{LogLevel, NodeContext};
    use flowscope_telemetry::{EventBus, EventSubscriber};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn bridge() -> (LogBridge, EventSubscriber<CommsMessage>, MetricsRegistry) {
        let metrics = MetricsRegistry::new();
        let bus = Arc::new(EventBus::<CommsMessage>::new(8));
        let sub = bus.subscribe();
        let publisher = Arc::new(DebugPublisher::new(DebugSettings::default(), bus, &metrics));
        (LogBridge::new(publisher, &metrics), sub, metrics)
    }

    #[rstest]
    #[case(LogLevel::Info)]
    #[case(LogLevel::Debug)]
    #[case(LogLevel::Trace)]
    fn quiet_levels_are_ignored(#[case] level: LogLevel) {
        let (bridge, mut sub, metrics) = bridge();
        bridge.handle(&LogRecord::new(level, "app", "hello"));
        assert!(sub.try_recv().is_none());
        assert_eq!(metrics.counter("debug_log_forwarded_total").get(), 0);
    }

    #[test]
    fn warning_publishes_message_with_node_identity() {
        let (bridge, mut sub, metrics) = bridge();
        let record = LogRecord::new(LogLevel::Warn, "app", "disk almost full").with_node(
            NodeContext::new("n1").with_name("fs").with_type("watch").with_flow("f1"),
        );
        bridge.handle(&record);

        let envelope = sub.try_recv().unwrap().data;
        assert_eq!(envelope.id, "n1");
        assert_eq!(envelope.name.as_deref(), Some("fs"));
        assert_eq!(envelope.node_type.as_deref(), Some("watch"));
        assert_eq!(envelope.z.as_deref(), Some("f1"));
        assert_eq!(envelope.level, Some(30));
        assert_eq!(envelope.format, "string[16]");
        assert_eq!(envelope.msg, "disk almost full");
        assert_eq!(metrics.counter("debug_log_forwarded_total").get(), 1);
    }

    #[test]
    fn attached_error_is_published_as_error() {
        let (bridge, mut sub, _) = bridge();
        bridge.handle(&LogRecord::new(LogLevel::Error, "db", "query failed").with_error("timeout"));

        let envelope = sub.try_recv().unwrap().data;
        assert_eq!(envelope.id, "db");
        assert_eq!(envelope.level, Some(20));
        assert_eq!(envelope.format, "error");
        assert_eq!(envelope.msg, r#"{"name":"Error","message":"timeout"}"#);
    }
}
