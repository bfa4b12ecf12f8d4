//! Statistics engine: day rollover, fold recording, and derived metrics.
//!
//! `record_fold` and `reset` are the only multi-key writers of the fold
//! counter family (total + daily + last-updated date). Both run under one
//! internal mutex so concurrent callers can never interleave their
//! read-modify-write cycles and lose an update.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::error::StoreError;
use crate::store::{CounterStore, DurableStore};

/// Lifetime-total thresholds that unlock achievements, ascending.
pub const MILESTONES: [u64; 4] = [10, 50, 100, 500];

/// Result of a fold recording: the counters after the increment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoldTally {
    pub total: u64,
    pub daily: u64,
}

/// What `day_rollover_check` found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RolloverOutcome {
    /// The stored date already matches today.
    Current,
    /// A new day started; today's count was zeroed.
    RolledOver,
    /// The stored date is in the future (clock moved backward). Nothing is
    /// rolled over, so same-day data survives clock jitter.
    ClockSkew,
}

/// Derived statistics, recomputed from the store on demand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    /// Mean of the last 7 daily counts, missing days as 0.
    pub average_folds: f64,
    /// `round(mean(all daily counts) * 365)`; 0 with no history.
    pub yearly_projection: u64,
    /// Unlocked milestones, ascending.
    pub achievements: Vec<String>,
    /// Lifetime total over the next milestone, saturating at 1.0.
    pub progress_to_next: f64,
}

pub struct StatsEngine<S> {
    counters: Arc<CounterStore<S>>,
    /// Serializes the fold counter family's read-modify-write cycles.
    fold_lock: Mutex<()>,
}

impl<S: DurableStore> StatsEngine<S> {
    pub fn new(counters: Arc<CounterStore<S>>) -> Self {
        Self {
            counters,
            fold_lock: Mutex::new(()),
        }
    }

    /// Roll the daily counter over if the calendar day changed.
    ///
    /// Idempotent within a day. Must run before any increment or read of
    /// "today's" count; `record_fold` does so internally.
    pub async fn day_rollover_check(
        &self,
        today: NaiveDate,
    ) -> Result<RolloverOutcome, StoreError> {
        let _guard = self.fold_lock.lock().await;
        self.rollover_locked(today).await
    }

    /// Count one confirmed fold: rollover, then daily+1 and total+1.
    ///
    /// Atomic from the caller's point of view; concurrent calls serialize on
    /// the internal lock.
    pub async fn record_fold(&self, today: NaiveDate) -> Result<FoldTally, StoreError> {
        let _guard = self.fold_lock.lock().await;
        self.rollover_locked(today).await?;

        let daily = self.counters.daily(today).await? + 1;
        self.counters.set_daily(today, daily).await?;

        let total = self.counters.total().await? + 1;
        self.counters.set_total(total).await?;

        Ok(FoldTally { total, daily })
    }

    /// Zero the lifetime total and today's count, and drop all daily history.
    /// The daily limit and permission flags are untouched.
    pub async fn reset(&self, today: NaiveDate) -> Result<(), StoreError> {
        let _guard = self.fold_lock.lock().await;
        self.counters.set_total(0).await?;
        self.counters.clear_daily_history().await?;
        self.counters.set_daily(today, 0).await?;
        self.counters.set_last_updated_date(today).await?;
        Ok(())
    }

    // ── Derived metrics ──────────────────────────────────────────────

    /// Mean of the last 7 daily counts, counting missing days as 0.
    pub async fn average_folds(&self, today: NaiveDate) -> Result<f64, StoreError> {
        let recent = self.counters.recent_daily(today, 7).await?;
        Ok(mean(&recent))
    }

    /// Mean over every persisted daily count, projected to a year.
    pub async fn yearly_projection(&self) -> Result<u64, StoreError> {
        let all = self.counters.all_daily_counts().await?;
        Ok((mean(&all) * 365.0).round() as u64)
    }

    /// Unlocked milestones for a lifetime total, ascending.
    pub fn achievements(total: u64) -> Vec<String> {
        MILESTONES
            .iter()
            .filter(|&&m| total >= m)
            .map(|m| format!("Unlocked {m} folds!"))
            .collect()
    }

    /// Progress toward the next milestone, saturating at 1.0 once every
    /// milestone is unlocked.
    pub fn progress(total: u64) -> f64 {
        let next = MILESTONES
            .iter()
            .find(|&&m| m > total)
            .copied()
            .unwrap_or_else(|| MILESTONES[MILESTONES.len() - 1]);
        (total as f64 / next as f64).min(1.0)
    }

    /// Recompute every derived value from the store's current state.
    pub async fn snapshot(&self, today: NaiveDate) -> Result<StatsSnapshot, StoreError> {
        let total = self.counters.total().await?;
        Ok(StatsSnapshot {
            average_folds: self.average_folds(today).await?,
            yearly_projection: self.yearly_projection().await?,
            achievements: Self::achievements(total),
            progress_to_next: Self::progress(total),
        })
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// Rollover body; caller holds `fold_lock`.
    async fn rollover_locked(&self, today: NaiveDate) -> Result<RolloverOutcome, StoreError> {
        match self.counters.last_updated_date().await? {
            Some(last) if last == today => Ok(RolloverOutcome::Current),
            Some(last) if last > today => {
                tracing::warn!(%last, %today, "stored date is in the future; skipping rollover");
                Ok(RolloverOutcome::ClockSkew)
            }
            _ => {
                self.counters.set_daily(today, 0).await?;
                self.counters.set_last_updated_date(today).await?;
                Ok(RolloverOutcome::RolledOver)
            }
        }
    }
}

fn mean(counts: &[u64]) -> f64 {
    if counts.is_empty() {
        return 0.0;
    }
    counts.iter().sum::<u64>() as f64 / counts.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn engine() -> StatsEngine<MemoryStore> {
        StatsEngine::new(Arc::new(CounterStore::new(Arc::new(MemoryStore::new()))))
    }

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[tokio::test]
    async fn sequential_folds_count_exactly() {
        let engine = engine();
        let today = date("2026-08-23");
        for i in 1..=5u64 {
            let tally = engine.record_fold(today).await.unwrap();
            assert_eq!(tally.total, i);
            assert_eq!(tally.daily, i);
        }
    }

    #[tokio::test]
    async fn rollover_is_idempotent() {
        let engine = engine();
        let today = date("2026-08-23");
        engine.record_fold(today).await.unwrap();

        assert_eq!(
            engine.day_rollover_check(today).await.unwrap(),
            RolloverOutcome::Current
        );
        assert_eq!(
            engine.day_rollover_check(today).await.unwrap(),
            RolloverOutcome::Current
        );
        // Today's count must survive repeated checks.
        let tally = engine.record_fold(today).await.unwrap();
        assert_eq!(tally.daily, 2);
    }

    #[tokio::test]
    async fn new_day_starts_at_one_and_keeps_yesterday() {
        let engine = engine();
        let yesterday = date("2026-08-22");
        let today = date("2026-08-23");

        engine.record_fold(yesterday).await.unwrap();
        engine.record_fold(yesterday).await.unwrap();

        let tally = engine.record_fold(today).await.unwrap();
        assert_eq!(tally.daily, 1);
        assert_eq!(tally.total, 3);
        assert_eq!(engine.counters.daily(yesterday).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn backward_clock_does_not_erase_data() {
        let engine = engine();
        let today = date("2026-08-23");
        engine.record_fold(today).await.unwrap();

        // Clock jumps back a day: no rollover, yesterday's key untouched.
        let earlier = date("2026-08-22");
        assert_eq!(
            engine.day_rollover_check(earlier).await.unwrap(),
            RolloverOutcome::ClockSkew
        );
        assert_eq!(engine.counters.daily(today).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn average_counts_missing_days_as_zero() {
        let engine = engine();
        let today = date("2026-08-23");
        engine.counters.set_daily(today, 3).await.unwrap();

        let avg = engine.average_folds(today).await.unwrap();
        assert!((avg - 3.0 / 7.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn projection_is_zero_without_history() {
        let engine = engine();
        assert_eq!(engine.yearly_projection().await.unwrap(), 0);

        engine.counters.set_daily(date("2026-08-23"), 2).await.unwrap();
        engine.counters.set_daily(date("2026-08-22"), 4).await.unwrap();
        // mean 3 * 365 = 1095
        assert_eq!(engine.yearly_projection().await.unwrap(), 1095);
    }

    #[test]
    fn achievements_and_progress_at_75() {
        assert_eq!(
            StatsEngine::<MemoryStore>::achievements(75),
            vec!["Unlocked 10 folds!", "Unlocked 50 folds!"]
        );
        assert!((StatsEngine::<MemoryStore>::progress(75) - 0.75).abs() < 1e-9);
    }

    #[test]
    fn progress_saturates_past_last_milestone() {
        assert_eq!(StatsEngine::<MemoryStore>::progress(500), 1.0);
        assert_eq!(StatsEngine::<MemoryStore>::progress(1200), 1.0);
        assert_eq!(StatsEngine::<MemoryStore>::progress(0), 0.0);
    }

    #[tokio::test]
    async fn reset_zeroes_everything_derived() {
        let engine = engine();
        let today = date("2026-08-23");
        for _ in 0..12 {
            engine.record_fold(today).await.unwrap();
        }
        engine.counters.set_daily(date("2026-08-20"), 9).await.unwrap();

        engine.reset(today).await.unwrap();

        assert_eq!(engine.counters.total().await.unwrap(), 0);
        assert_eq!(engine.average_folds(today).await.unwrap(), 0.0);
        assert_eq!(engine.yearly_projection().await.unwrap(), 0);
        let snap = engine.snapshot(today).await.unwrap();
        assert!(snap.achievements.is_empty());
        assert_eq!(snap.progress_to_next, 0.0);
    }
}
