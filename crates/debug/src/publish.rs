//! Encoding and delivery of debug envelopes.

use std::fmt;
use std::sync::Arc;

use flowscope_telemetry::{Counter, EventBus, Histogram, MetricsRegistry};
use flowscope_value::Value;

use crate::encode::BoundedEncoder;
use crate::envelope::{CommsMessage, DebugEnvelope, PublishContext};
use crate::settings::DebugSettings;

/// Topic every envelope is published on.
pub const DEBUG_TOPIC: &str = "debug";

/// Fire-and-forget delivery of envelopes to observers.
pub trait Publish: Send + Sync {
    /// Deliver `envelope` on `topic`. Must not block.
    fn publish(&self, topic: &str, envelope: DebugEnvelope);
}

impl Publish for EventBus<CommsMessage> {
    fn publish(&self, topic: &str, envelope: DebugEnvelope) {
        self.emit(CommsMessage::new(topic, envelope));
    }
}

/// Classifies, encodes and publishes values.
pub struct DebugPublisher {
    encoder: BoundedEncoder,
    sink: Arc<dyn Publish>,
    published: Counter,
    skipped: Counter,
    payload_chars: Histogram,
}

impl DebugPublisher {
    /// Publisher delivering to `sink` and recording into `metrics`.
    pub fn new(settings: DebugSettings, sink: Arc<dyn Publish>, metrics: &MetricsRegistry) -> Self {
        Self {
            encoder: BoundedEncoder::new(settings),
            sink,
            published: metrics.counter("debug_published_total"),
            skipped: metrics.counter("debug_skipped_inactive_total"),
            payload_chars: metrics.histogram("debug_payload_chars"),
        }
    }

    /// Active settings.
    pub fn settings(&self) -> &DebugSettings {
        self.encoder.settings()
    }

    /// Encode `value` and publish it with the routing fields of `context`.
    pub fn publish(&self, value: &Value, context: PublishContext) {
        let encoded = self.encoder.encode_value(value);
        self.payload_chars
            .observe(u64::try_from(encoded.payload.chars().count()).unwrap_or(u64::MAX));
        tracing::trace!(node.id = %context.id, format = %encoded.format, "publishing debug value");
        self.sink.publish(DEBUG_TOPIC, DebugEnvelope::new(context, encoded));
        self.published.inc();
    }

    /// Record that an inactive node dropped a value.
    pub fn skip_inactive(&self) {
        self.skipped.inc();
    }
}

impl fmt::Debug for DebugPublisher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DebugPublisher")
            .field("settings", self.settings())
            .field("published", &self.published.get())
            .finish_non_exhaustive()
    }
}
