//! In-process metrics.
//!
//! Metrics are plain atomics behind shared handles. A handle obtained from
//! [`MetricsRegistry`] stays valid for the registry's lifetime, so hot paths
//! resolve their metrics once and keep the handle.

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

use dashmap::DashMap;

/// Monotonic count of occurrences.
#[derive(Debug, Clone, Default)]
pub struct Counter(Arc<AtomicU64>);

impl Counter {
    /// Add one.
    pub fn inc(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    /// Current total.
    #[must_use]
    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// Level that moves in both directions, e.g. the number of active nodes.
#[derive(Debug, Clone, Default)]
pub struct Gauge(Arc<AtomicI64>);

impl Gauge {
    /// Raise the level by one.
    pub fn inc(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    /// Lower the level by one.
    pub fn dec(&self) {
        self.0.fetch_sub(1, Ordering::Relaxed);
    }

    /// Current level.
    #[must_use]
    pub fn get(&self) -> i64 {
        self.0.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Default)]
struct Observations {
    count: AtomicU64,
    sum: AtomicU64,
    max: AtomicU64,
}

/// Distribution summary of unsigned samples (sizes, durations in micros).
///
/// Only count, sum and maximum are kept.
#[derive(Debug, Clone, Default)]
pub struct Histogram(Arc<Observations>);

impl Histogram {
    /// Record one sample.
    pub fn observe(&self, sample: u64) {
        self.0.count.fetch_add(1, Ordering::Relaxed);
        self.0.sum.fetch_add(sample, Ordering::Relaxed);
        self.0.max.fetch_max(sample, Ordering::Relaxed);
    }

    /// Samples recorded.
    #[must_use]
    pub fn count(&self) -> u64 {
        self.0.count.load(Ordering::Relaxed)
    }

    /// Sum of samples, wrapping on overflow.
    #[must_use]
    pub fn sum(&self) -> u64 {
        self.0.sum.load(Ordering::Relaxed)
    }

    /// Largest sample, zero before the first one.
    #[must_use]
    pub fn max(&self) -> u64 {
        self.0.max.load(Ordering::Relaxed)
    }
}

/// Reading of a single metric at some instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetricSnapshot {
    /// See [`Counter`].
    Counter(u64),
    /// See [`Gauge`].
    Gauge(i64),
    /// See [`Histogram`].
    Histogram {
        /// Samples recorded.
        count: u64,
        /// Sum of samples.
        sum: u64,
        /// Largest sample.
        max: u64,
    },
}

/// Named metrics, created on first use.
///
/// Cloning the registry shares it.
///
/// # Examples
///
/// ```
/// use flowscope_telemetry::MetricsRegistry;
///
/// let registry = MetricsRegistry::new();
/// registry.counter("debug_published_total").inc();
///
/// let again = registry.counter("debug_published_total");
/// assert_eq!(again.get(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MetricsRegistry {
    counters: Arc<DashMap<String, Counter>>,
    gauges: Arc<DashMap<String, Gauge>>,
    histograms: Arc<DashMap<String, Histogram>>,
}

impl MetricsRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The counter called `name`.
    pub fn counter(&self, name: &str) -> Counter {
        self.counters.entry(name.to_owned()).or_default().clone()
    }

    /// The gauge called `name`.
    pub fn gauge(&self, name: &str) -> Gauge {
        self.gauges.entry(name.to_owned()).or_default().clone()
    }

    /// The histogram called `name`.
    pub fn histogram(&self, name: &str) -> Histogram {
        self.histograms.entry(name.to_owned()).or_default().clone()
    }

    /// Every registered metric, sorted by name.
    #[must_use]
    pub fn snapshot(&self) -> Vec<(String, MetricSnapshot)> {
        let counters = self
            .counters
            .iter()
            .map(|e| (e.key().clone(), MetricSnapshot::Counter(e.value().get())));
        let gauges = self
            .gauges
            .iter()
            .map(|e| (e.key().clone(), MetricSnapshot::Gauge(e.value().get())));
        let histograms = self.histograms.iter().map(|e| {
            let h = e.value();
            let reading = MetricSnapshot::Histogram {
                count: h.count(),
                sum: h.sum(),
                max: h.max(),
            };
            (e.key().clone(), reading)
        });

        let mut out: Vec<_> = counters.chain(gauges).chain(histograms).collect();
        out.sort_by(|a, b| a.0.cmp(&b.0));
        out
    }
}
