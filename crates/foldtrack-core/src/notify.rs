//! Daily-limit notification gate.
//!
//! The OS notification channel itself is an external concern; this gate only
//! answers "should a limit notification go out right now?" -- positively at
//! most once per calendar day. The check-then-set on the last-notified date
//! runs under a mutex so two simultaneous limit crossings cannot both pass.

use std::sync::Arc;

use chrono::NaiveDate;
use tokio::sync::Mutex;

use crate::error::StoreError;
use crate::store::{CounterStore, DurableStore};

pub struct NotificationGate<S> {
    counters: Arc<CounterStore<S>>,
    gate_lock: Mutex<()>,
}

impl<S: DurableStore> NotificationGate<S> {
    pub fn new(counters: Arc<CounterStore<S>>) -> Self {
        Self {
            counters,
            gate_lock: Mutex::new(()),
        }
    }

    /// True exactly once per day: the first caller marks today notified,
    /// later callers are suppressed.
    pub async fn should_notify(&self, today: NaiveDate) -> Result<bool, StoreError> {
        let _guard = self.gate_lock.lock().await;
        if self.counters.last_notified_date().await? == Some(today) {
            tracing::debug!(%today, "daily limit notification already sent today");
            return Ok(false);
        }
        self.counters.set_last_notified_date(today).await?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn gate() -> NotificationGate<MemoryStore> {
        NotificationGate::new(Arc::new(CounterStore::new(Arc::new(MemoryStore::new()))))
    }

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[tokio::test]
    async fn notifies_once_per_day() {
        let gate = gate();
        let today = date("2026-08-23");
        assert!(gate.should_notify(today).await.unwrap());
        assert!(!gate.should_notify(today).await.unwrap());
        assert!(!gate.should_notify(today).await.unwrap());
    }

    #[tokio::test]
    async fn next_day_notifies_again() {
        let gate = gate();
        assert!(gate.should_notify(date("2026-08-23")).await.unwrap());
        assert!(gate.should_notify(date("2026-08-24")).await.unwrap());
    }

    #[tokio::test]
    async fn concurrent_crossings_pass_exactly_once() {
        let gate = Arc::new(gate());
        let today = date("2026-08-23");
        let mut handles = Vec::new();
        for _ in 0..16 {
            let gate = Arc::clone(&gate);
            handles.push(tokio::spawn(
                async move { gate.should_notify(today).await },
            ));
        }
        let mut passed = 0;
        for handle in handles {
            if handle.await.unwrap().unwrap() {
                passed += 1;
            }
        }
        assert_eq!(passed, 1);
    }
}
