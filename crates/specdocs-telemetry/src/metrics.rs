//! Prometheus metrics registry.

use prometheus_client::{
    encoding::EncodeLabelSet,
    metrics::{counter::Counter, family::Family, histogram::Histogram},
    registry::Registry,
};

/// Duration histogram buckets (in seconds).
/// Covers 5ms to 30s; remote hosts can be slow.
const DURATION_BUCKETS: [f64; 12] = [
    0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0,
];

/// Size histogram buckets (in bytes).
/// Covers 1KB to 50MB.
const SIZE_BUCKETS: [f64; 6] = [1000.0, 10000.0, 100000.0, 1000000.0, 10000000.0, 50000000.0];

/// Documentation request labels.
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct DocsRequestLabels {
    pub spec_type: String,
    pub outcome: String,
}

/// Per spec type labels.
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct SpecTypeLabels {
    pub spec_type: String,
}

/// Metrics registry holding all specdocs metrics.
pub struct MetricsRegistry {
    /// The prometheus-client registry for encoding.
    pub registry: Registry,

    pub docs_requests_total: Family<DocsRequestLabels, Counter>,
    pub fetch_duration_seconds: Family<SpecTypeLabels, Histogram>,
    pub spec_size_bytes: Family<SpecTypeLabels, Histogram>,
}

impl MetricsRegistry {
    /// Create a new metrics registry with all metrics registered.
    pub fn new() -> Self {
        let mut registry = Registry::default();

        let docs_requests_total = Family::<DocsRequestLabels, Counter>::default();
        registry.register(
            "specdocs_docs_requests",
            "Documentation requests by spec type and outcome",
            docs_requests_total.clone(),
        );

        let fetch_duration_seconds =
            Family::<SpecTypeLabels, Histogram>::new_with_constructor(|| {
                Histogram::new(DURATION_BUCKETS.iter().cloned())
            });
        registry.register(
            "specdocs_fetch_duration_seconds",
            "Time spent retrieving remote spec documents",
            fetch_duration_seconds.clone(),
        );

        let spec_size_bytes = Family::<SpecTypeLabels, Histogram>::new_with_constructor(|| {
            Histogram::new(SIZE_BUCKETS.iter().cloned())
        });
        registry.register(
            "specdocs_spec_size_bytes",
            "Size of retrieved spec documents in bytes",
            spec_size_bytes.clone(),
        );

        Self {
            registry,
            docs_requests_total,
            fetch_duration_seconds,
            spec_size_bytes,
        }
    }

    /// Record the outcome of a documentation request.
    pub fn record_outcome(&self, spec_type: &str, outcome: &str) {
        let labels = DocsRequestLabels {
            spec_type: spec_type.to_string(),
            outcome: outcome.to_string(),
        };
        self.docs_requests_total.get_or_create(&labels).inc();
    }

    /// Record a completed fetch and the size of the retrieved document.
    pub fn record_fetch(&self, spec_type: &str, duration_secs: f64, size: u64) {
        let labels = SpecTypeLabels {
            spec_type: spec_type.to_string(),
        };
        self.fetch_duration_seconds
            .get_or_create(&labels)
            .observe(duration_secs);
        self.spec_size_bytes
            .get_or_create(&labels)
            .observe(size as f64);
    }
}

impl Default for MetricsRegistry {
    fn default() -> Self {
        Self::new()
    }
}
