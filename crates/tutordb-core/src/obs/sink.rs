//! Metrics sink boundary.
//!
//! Session logic never touches `obs::metrics` directly.
//! All instrumentation flows through `MetricsEvent` and `MetricsSink`.
use crate::{error::ErrorKind, obs::metrics, query::Action};
use std::{cell::RefCell, rc::Rc};

thread_local! {
    static SINK_OVERRIDE: RefCell<Option<Rc<dyn MetricsSink>>> = const { RefCell::new(None) };
}

///
/// MetricsEvent
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MetricsEvent {
    RequestValidated {
        entity: &'static str,
        action: Action,
    },
    /// `entity` is `None` when the entity name itself did not resolve.
    RequestRejected {
        entity: Option<&'static str>,
        kind: ErrorKind,
    },
    StorageCall {
        entity: &'static str,
        action: Action,
    },
    StorageFailed {
        entity: &'static str,
        action: Action,
    },
}

///
/// MetricsSink
///

pub trait MetricsSink {
    fn record(&self, event: MetricsEvent);
}

/// GlobalMetricsSink
/// Default sink that writes into the thread-local counters.

pub(crate) struct GlobalMetricsSink;

impl MetricsSink for GlobalMetricsSink {
    fn record(&self, event: MetricsEvent) {
        match event {
            MetricsEvent::RequestValidated { entity, .. } => {
                metrics::with_state_mut(|m| {
                    m.ops.requests_validated = m.ops.requests_validated.saturating_add(1);
                    let entry = m.entities.entry(entity.to_string()).or_default();
                    entry.validated = entry.validated.saturating_add(1);
                });
            }

            MetricsEvent::RequestRejected { entity, kind } => {
                metrics::with_state_mut(|m| {
                    m.ops.requests_rejected = m.ops.requests_rejected.saturating_add(1);
                    let count = m.rejections.entry(kind.to_string()).or_default();
                    *count = count.saturating_add(1);

                    if let Some(entity) = entity {
                        let entry = m.entities.entry(entity.to_string()).or_default();
                        entry.rejected = entry.rejected.saturating_add(1);
                    }
                });
            }

            MetricsEvent::StorageCall { entity, action } => {
                metrics::with_state_mut(|m| {
                    m.ops.storage_calls = m.ops.storage_calls.saturating_add(1);
                    if action.is_write() {
                        let entry = m.entities.entry(entity.to_string()).or_default();
                        entry.writes = entry.writes.saturating_add(1);
                    }
                });
            }

            MetricsEvent::StorageFailed { entity, .. } => {
                metrics::with_state_mut(|m| {
                    m.ops.storage_failures = m.ops.storage_failures.saturating_add(1);
                    let entry = m.entities.entry(entity.to_string()).or_default();
                    entry.storage_failures = entry.storage_failures.saturating_add(1);
                });
            }
        }
    }
}

pub(crate) fn record(event: MetricsEvent) {
    let sink = SINK_OVERRIDE.with(|cell| cell.borrow().clone());
    match sink {
        Some(sink) => sink.record(event),
        None => GlobalMetricsSink.record(event),
    }
}

/// Snapshot the current metrics state.
///
/// `window_start_ms` filters by window start (`EventState::since_ms`),
/// not by per-event timestamps.
#[must_use]
pub fn metrics_report(window_start_ms: Option<i64>) -> metrics::EventReport {
    metrics::report_window_start(window_start_ms)
}

/// Reset all metrics state.
pub fn metrics_reset_all() {
    metrics::reset_all();
}

/// Run a closure with a temporary metrics sink override on this thread.
pub fn with_metrics_sink<T>(sink: Rc<dyn MetricsSink>, f: impl FnOnce() -> T) -> T {
    struct Guard(Option<Rc<dyn MetricsSink>>);

    impl Drop for Guard {
        fn drop(&mut self) {
            let prev = self.0.take();
            SINK_OVERRIDE.with(|cell| {
                *cell.borrow_mut() = prev;
            });
        }
    }

    let prev = SINK_OVERRIDE.with(|cell| cell.borrow_mut().replace(sink));
    let _guard = Guard(prev);

    f()
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use std::{
        cell::Cell,
        panic::{AssertUnwindSafe, catch_unwind},
    };

    #[derive(Default)]
    struct CountingSink {
        calls: Cell<usize>,
    }

    impl MetricsSink for CountingSink {
        fn record(&self, _: MetricsEvent) {
            self.calls.set(self.calls.get() + 1);
        }
    }

    const VALIDATED: MetricsEvent = MetricsEvent::RequestValidated {
        entity: "Chapter",
        action: Action::FindMany,
    };

    fn clear_override() {
        SINK_OVERRIDE.with(|cell| {
            *cell.borrow_mut() = None;
        });
    }

    #[test]
    fn with_metrics_sink_routes_and_restores_nested_overrides() {
        clear_override();
        let outer = Rc::new(CountingSink::default());
        let inner = Rc::new(CountingSink::default());

        record(VALIDATED);
        assert_eq!(outer.calls.get(), 0);

        with_metrics_sink(outer.clone(), || {
            record(VALIDATED);
            with_metrics_sink(inner.clone(), || record(VALIDATED));
            record(VALIDATED);
        });

        assert_eq!(outer.calls.get(), 2);
        assert_eq!(inner.calls.get(), 1);
        SINK_OVERRIDE.with(|cell| assert!(cell.borrow().is_none()));
    }

    #[test]
    fn with_metrics_sink_restores_override_on_panic() {
        clear_override();
        let sink = Rc::new(CountingSink::default());

        let panicked = catch_unwind(AssertUnwindSafe(|| {
            with_metrics_sink(sink.clone(), || {
                record(VALIDATED);
                panic!("intentional panic for guard test");
            });
        }))
        .is_err();

        assert!(panicked);
        assert_eq!(sink.calls.get(), 1);
        SINK_OVERRIDE.with(|cell| assert!(cell.borrow().is_none()));
    }

    #[test]
    fn global_sink_accumulates_per_entity_and_kind() {
        clear_override();
        metrics_reset_all();

        record(VALIDATED);
        record(MetricsEvent::RequestRejected {
            entity: Some("Chapter"),
            kind: ErrorKind::UnknownField,
        });
        record(MetricsEvent::RequestRejected {
            entity: None,
            kind: ErrorKind::UnknownField,
        });
        record(MetricsEvent::StorageCall {
            entity: "Chapter",
            action: Action::Create,
        });
        record(MetricsEvent::StorageFailed {
            entity: "Chapter",
            action: Action::Create,
        });

        let report = metrics_report(None);
        let counters = report.counters.expect("counters without window start");
        assert_eq!(counters.ops.requests_validated, 1);
        assert_eq!(counters.ops.requests_rejected, 2);
        assert_eq!(counters.ops.storage_failures, 1);
        assert_eq!(counters.rejections.get("UnknownField"), Some(&2));

        let chapter = &report.entity_counters[0];
        assert_eq!(chapter.entity, "Chapter");
        assert_eq!(chapter.writes, 1);
        assert!((chapter.rejection_rate - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn window_start_after_window_returns_empty() {
        metrics_reset_all();
        let since = metrics::with_state(|m| m.since_ms);

        let report = metrics_report(Some(since.saturating_add(1)));
        assert!(report.counters.is_none());
        assert!(report.entity_counters.is_empty());
    }
}
