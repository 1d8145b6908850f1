use chrono::Utc;
use serde::Serialize;
use std::{cell::RefCell, collections::BTreeMap};

///
/// EventState
/// Ephemeral, in-memory counters since `since_ms`.
///

#[derive(Clone, Debug, Serialize)]
pub struct EventState {
    pub ops: EventOps,
    /// Rejections keyed by error kind.
    pub rejections: BTreeMap<String, u64>,
    pub entities: BTreeMap<String, EntityCounters>,
    pub since_ms: i64,
}

impl Default for EventState {
    fn default() -> Self {
        Self {
            ops: EventOps::default(),
            rejections: BTreeMap::new(),
            entities: BTreeMap::new(),
            since_ms: Utc::now().timestamp_millis(),
        }
    }
}

///
/// EventOps
///

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct EventOps {
    pub requests_validated: u64,
    pub requests_rejected: u64,
    pub storage_calls: u64,
    pub storage_failures: u64,
}

///
/// EntityCounters
///

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct EntityCounters {
    pub validated: u64,
    pub rejected: u64,
    pub writes: u64,
    pub storage_failures: u64,
}

thread_local! {
    static EVENT_STATE: RefCell<EventState> = RefCell::new(EventState::default());
}

pub(crate) fn with_state<R>(f: impl FnOnce(&EventState) -> R) -> R {
    EVENT_STATE.with(|m| f(&m.borrow()))
}

pub(crate) fn with_state_mut<R>(f: impl FnOnce(&mut EventState) -> R) -> R {
    EVENT_STATE.with(|m| f(&mut m.borrow_mut()))
}

pub(crate) fn reset_all() {
    with_state_mut(|m| *m = EventState::default());
}

///
/// EventReport
///

#[derive(Clone, Debug, Default, Serialize)]
pub struct EventReport {
    /// Counters since `since_ms`; `None` when the window started after the requested point.
    pub counters: Option<EventState>,
    pub entity_counters: Vec<EntitySummary>,
}

///
/// EntitySummary
///

#[derive(Clone, Debug, Default, Serialize)]
pub struct EntitySummary {
    pub entity: String,
    pub validated: u64,
    pub rejected: u64,
    pub writes: u64,
    pub storage_failures: u64,
    /// Share of requests for this entity that failed validation.
    pub rejection_rate: f64,
}

#[allow(clippy::cast_precision_loss)]
pub(crate) fn report_window_start(window_start_ms: Option<i64>) -> EventReport {
    let snap = with_state(Clone::clone);
    if window_start_ms.is_some_and(|start| start > snap.since_ms) {
        return EventReport::default();
    }

    let entity_counters = snap
        .entities
        .iter()
        .map(|(entity, c)| {
            let total = c.validated.saturating_add(c.rejected);
            let rejection_rate = if total > 0 {
                c.rejected as f64 / total as f64
            } else {
                0.0
            };

            EntitySummary {
                entity: entity.clone(),
                validated: c.validated,
                rejected: c.rejected,
                writes: c.writes,
                storage_failures: c.storage_failures,
                rejection_rate,
            }
        })
        .collect();

    EventReport {
        counters: Some(snap),
        entity_counters,
    }
}
