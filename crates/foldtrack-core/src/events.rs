use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Every observable state change in the system produces an Event.
/// The UI and the home-screen widget subscribe to these; the CLI prints them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Event {
    /// A confirmed closed-to-open transition was counted.
    FoldRecorded {
        new_total: u64,
        new_daily: u64,
        at: DateTime<Utc>,
    },
    /// Today's count reached the configured daily limit.
    /// Emitted at most once per calendar day.
    DailyLimitReached {
        limit: u32,
        at: DateTime<Utc>,
    },
    /// Derived statistics were recomputed.
    StatsUpdated {
        average_folds: f64,
        yearly_projection: u64,
        achievements: Vec<String>,
        progress_to_next: f64,
        at: DateTime<Utc>,
    },
    /// The external widget renderer should re-read current counters.
    /// Idempotent; emitted after every fold, reset, and explicit refresh.
    WidgetRefreshRequested {
        at: DateTime<Utc>,
    },
}
