//! Typed accessors over the durable store.
//!
//! Owns the key layout and default-value semantics. Every operation is a
//! single store access; the multi-key fold critical section lives in
//! [`crate::stats::StatsEngine`].

use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use tokio::sync::broadcast;

use super::keys;
use super::kv::{DurableStore, Value};
use crate::error::StoreError;

pub const DEFAULT_DAILY_LIMIT: u32 = 50;

pub struct CounterStore<S> {
    store: Arc<S>,
}

impl<S: DurableStore> CounterStore<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    // ── Counters ─────────────────────────────────────────────────────

    pub async fn total(&self) -> Result<u64, StoreError> {
        self.get_count(keys::TOTAL_COUNT).await
    }

    pub async fn set_total(&self, total: u64) -> Result<(), StoreError> {
        self.store
            .set(keys::TOTAL_COUNT, Value::Int(total as i64))
            .await
    }

    pub async fn daily(&self, date: NaiveDate) -> Result<u64, StoreError> {
        self.get_count(&keys::daily_count(date)).await
    }

    pub async fn set_daily(&self, date: NaiveDate, count: u64) -> Result<(), StoreError> {
        self.store
            .set(&keys::daily_count(date), Value::Int(count as i64))
            .await
    }

    /// Daily counts for the `days` most recent dates, most-recent-first.
    /// Missing days read as 0.
    pub async fn recent_daily(
        &self,
        today: NaiveDate,
        days: u32,
    ) -> Result<Vec<u64>, StoreError> {
        let mut counts = Vec::with_capacity(days as usize);
        for offset in 0..days {
            let date = today - Duration::days(i64::from(offset));
            counts.push(self.daily(date).await?);
        }
        Ok(counts)
    }

    /// Every persisted daily count, in no particular order.
    pub async fn all_daily_counts(&self) -> Result<Vec<u64>, StoreError> {
        let keys = self.store.keys_with_prefix(keys::DAILY_COUNT_PREFIX).await?;
        let mut counts = Vec::with_capacity(keys.len());
        for key in keys {
            counts.push(self.get_count(&key).await?);
        }
        Ok(counts)
    }

    /// Remove every persisted daily entry. Reset means reset: the full
    /// history goes, not just the trailing averaging window, so the yearly
    /// projection restarts from a clean slate.
    pub async fn clear_daily_history(&self) -> Result<(), StoreError> {
        let keys = self.store.keys_with_prefix(keys::DAILY_COUNT_PREFIX).await?;
        for key in keys {
            self.store.remove(&key).await?;
        }
        Ok(())
    }

    // ── Dates ────────────────────────────────────────────────────────

    pub async fn last_updated_date(&self) -> Result<Option<NaiveDate>, StoreError> {
        self.get_date(keys::LAST_UPDATED_DATE).await
    }

    pub async fn set_last_updated_date(&self, date: NaiveDate) -> Result<(), StoreError> {
        self.store
            .set(keys::LAST_UPDATED_DATE, Value::Text(date.to_string()))
            .await
    }

    pub async fn last_notified_date(&self) -> Result<Option<NaiveDate>, StoreError> {
        self.get_date(keys::LAST_NOTIFIED_DATE).await
    }

    pub async fn set_last_notified_date(&self, date: NaiveDate) -> Result<(), StoreError> {
        self.store
            .set(keys::LAST_NOTIFIED_DATE, Value::Text(date.to_string()))
            .await
    }

    // ── Hinge angle & limits ─────────────────────────────────────────

    pub async fn hinge_angle(&self) -> Result<i32, StoreError> {
        match self.store.get(keys::HINGE_ANGLE).await? {
            Some(v) => Ok(v.as_i64(keys::HINGE_ANGLE)? as i32),
            None => Ok(0),
        }
    }

    pub async fn set_hinge_angle(&self, angle: i32) -> Result<(), StoreError> {
        self.store
            .set(keys::HINGE_ANGLE, Value::Int(i64::from(angle)))
            .await
    }

    pub async fn daily_limit(&self) -> Result<u32, StoreError> {
        match self.store.get(keys::DAILY_LIMIT).await? {
            Some(v) => Ok(v.as_i64(keys::DAILY_LIMIT)?.max(0) as u32),
            None => Ok(DEFAULT_DAILY_LIMIT),
        }
    }

    pub async fn set_daily_limit(&self, limit: u32) -> Result<(), StoreError> {
        self.store
            .set(keys::DAILY_LIMIT, Value::Int(i64::from(limit)))
            .await
    }

    // ── Flags ────────────────────────────────────────────────────────

    pub async fn notification_permission_requested(&self) -> Result<bool, StoreError> {
        match self.store.get(keys::NOTIFICATION_PERMISSION_REQUESTED).await? {
            Some(v) => v.as_bool(keys::NOTIFICATION_PERMISSION_REQUESTED),
            None => Ok(false),
        }
    }

    pub async fn set_notification_permission_requested(
        &self,
        requested: bool,
    ) -> Result<(), StoreError> {
        self.store
            .set(keys::NOTIFICATION_PERMISSION_REQUESTED, Value::Bool(requested))
            .await
    }

    /// One-time initialization, guarded by the first-launch flag.
    /// Subsequent calls are no-ops.
    pub async fn initialize_defaults_once(&self, today: NaiveDate) -> Result<(), StoreError> {
        let first_launch = match self.store.get(keys::FIRST_LAUNCH).await? {
            Some(v) => v.as_bool(keys::FIRST_LAUNCH)?,
            None => true,
        };
        if first_launch {
            self.set_total(0).await?;
            self.set_last_updated_date(today).await?;
            self.store.set(keys::FIRST_LAUNCH, Value::Bool(false)).await?;
        }
        Ok(())
    }

    /// Changed-key notifications from the underlying store.
    pub fn subscribe_changes(&self) -> broadcast::Receiver<String> {
        self.store.subscribe()
    }

    // ── Internal ─────────────────────────────────────────────────────

    async fn get_count(&self, key: &str) -> Result<u64, StoreError> {
        match self.store.get(key).await? {
            Some(v) => Ok(v.as_i64(key)?.max(0) as u64),
            None => Ok(0),
        }
    }

    async fn get_date(&self, key: &str) -> Result<Option<NaiveDate>, StoreError> {
        match self.store.get(key).await? {
            Some(v) => {
                let raw = v.as_str(key)?.to_string();
                raw.parse::<NaiveDate>()
                    .map(Some)
                    .map_err(|e| StoreError::MalformedValue {
                        key: key.to_string(),
                        message: e.to_string(),
                    })
            }
            None => Ok(None),
        }
    }
}
