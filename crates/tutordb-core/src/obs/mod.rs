//! Observability: validation and storage-call counters behind a sink boundary.
//!
//! The library never installs a tracing subscriber; callers choose one.

pub(crate) mod metrics;
pub(crate) mod sink;

pub use metrics::{EntityCounters, EntitySummary, EventOps, EventReport, EventState};
pub use sink::{MetricsEvent, MetricsSink, metrics_report, metrics_reset_all, with_metrics_sink};
