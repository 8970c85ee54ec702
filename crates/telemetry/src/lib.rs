#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! # Flowscope Telemetry
//!
//! Event distribution and metrics for the Flowscope runtime.
//!
//! This crate provides:
//! - [`EventBus`] -- broadcast-based fan-out of any cloneable event type
//! - [`TopicMessage`] -- an event tagged with the topic it was published on
//! - [`MetricsRegistry`] -- named counters, gauges and histograms
//!
//! Events are fire-and-forget: with no subscriber listening they are dropped.

pub mod event;
pub mod metrics;

pub use event::{EventBus, EventSubscriber, TopicMessage};
pub use metrics::{Counter, Gauge, Histogram, MetricSnapshot, MetricsRegistry};
