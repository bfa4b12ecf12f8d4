//! Fold tracker service wiring.
//!
//! [`FoldTracker`] composes the counter store, the statistics engine, and the
//! notification gate, and publishes [`Event`]s on a broadcast bus for the UI,
//! the home-screen widget, and the CLI. `run` drives the detector from either
//! a live hinge sample stream or the simulation fallback until the enclosing
//! scope signals shutdown.

use std::sync::Arc;

use chrono::{Local, NaiveDate, Utc};
use tokio::sync::{broadcast, mpsc, watch};

use crate::detector::{FoldDetector, HingeSample, SampleOutcome};
use crate::error::StoreError;
use crate::events::Event;
use crate::notify::NotificationGate;
use crate::simulation::{SimulatedHinge, SIMULATION_PERIOD};
use crate::stats::{FoldTally, StatsEngine, StatsSnapshot};
use crate::store::{keys, CounterStore, DurableStore};

/// Capacity of the event bus. Subscribers that lag re-read the store.
const EVENT_CHANNEL_CAPACITY: usize = 128;

/// Where hinge samples come from.
pub enum SensorSource {
    /// Live hinge sensor readings.
    Hinge(mpsc::Receiver<HingeSample>),
    /// No hinge sensor available: draw pseudo-random angles on a fixed
    /// period. Dev/test affordance only.
    Simulated(SimulatedHinge),
}

pub struct FoldTracker<S> {
    counters: Arc<CounterStore<S>>,
    stats: StatsEngine<S>,
    gate: NotificationGate<S>,
    events: broadcast::Sender<Event>,
}

impl<S: DurableStore> FoldTracker<S> {
    pub fn new(store: Arc<S>) -> Self {
        let counters = Arc::new(CounterStore::new(store));
        let stats = StatsEngine::new(Arc::clone(&counters));
        let gate = NotificationGate::new(Arc::clone(&counters));
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            counters,
            stats,
            gate,
            events,
        }
    }

    pub fn counters(&self) -> &Arc<CounterStore<S>> {
        &self.counters
    }

    pub fn stats(&self) -> &StatsEngine<S> {
        &self.stats
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.events.subscribe()
    }

    /// First-launch defaults, day rollover, and an initial stats publish.
    pub async fn initialize(&self) -> Result<(), StoreError> {
        let today = today();
        self.counters.initialize_defaults_once(today).await?;
        self.stats.day_rollover_check(today).await?;
        self.publish_stats(today).await?;
        Ok(())
    }

    /// Process one raw sensor reading.
    ///
    /// Invalid samples are discarded with a warning -- a garbage reading must
    /// never take the service down. Valid samples always update the persisted
    /// hinge angle; a closed-to-open edge additionally records a fold.
    pub async fn handle_sample(
        &self,
        detector: &mut FoldDetector,
        sample: HingeSample,
    ) -> Result<(), StoreError> {
        if let Err(e) = sample.validate() {
            tracing::warn!(error = %e, "discarding hinge sample");
            return Ok(());
        }

        self.counters.set_hinge_angle(sample.angle).await?;

        if detector.on_sample(sample.angle) == SampleOutcome::FoldConfirmed {
            self.record_fold().await?;
        }
        Ok(())
    }

    /// Record one fold against the current calendar date.
    pub async fn record_fold(&self) -> Result<FoldTally, StoreError> {
        self.record_fold_on(today()).await
    }

    /// Record one fold against an explicit date (tests and backfills).
    ///
    /// Emits, in order: `FoldRecorded`, `DailyLimitReached` (first limit
    /// crossing of the day only), `StatsUpdated`, `WidgetRefreshRequested`.
    pub async fn record_fold_on(&self, today: NaiveDate) -> Result<FoldTally, StoreError> {
        let tally = self.stats.record_fold(today).await?;
        self.emit(Event::FoldRecorded {
            new_total: tally.total,
            new_daily: tally.daily,
            at: Utc::now(),
        });

        let limit = self.counters.daily_limit().await?;
        if tally.daily >= u64::from(limit) && self.gate.should_notify(today).await? {
            self.emit(Event::DailyLimitReached {
                limit,
                at: Utc::now(),
            });
        }

        self.publish_stats(today).await?;
        self.emit(Event::WidgetRefreshRequested { at: Utc::now() });
        Ok(tally)
    }

    /// Reset counters and history, then republish stats.
    pub async fn reset(&self) -> Result<(), StoreError> {
        self.reset_on(today()).await
    }

    pub async fn reset_on(&self, today: NaiveDate) -> Result<(), StoreError> {
        self.stats.reset(today).await?;
        self.publish_stats(today).await?;
        self.emit(Event::WidgetRefreshRequested { at: Utc::now() });
        Ok(())
    }

    pub async fn set_daily_limit(&self, limit: u32) -> Result<(), StoreError> {
        self.counters.set_daily_limit(limit).await
    }

    /// Explicit user-initiated widget refresh. Idempotent.
    pub fn request_widget_refresh(&self) {
        self.emit(Event::WidgetRefreshRequested { at: Utc::now() });
    }

    /// Drive the detector until the sample source ends or `shutdown` turns
    /// true. In-flight fold recordings complete before the loop observes the
    /// shutdown signal, so no write is left half-applied.
    pub async fn run(
        self: Arc<Self>,
        source: SensorSource,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<(), StoreError> {
        self.initialize().await?;

        let observer = tokio::spawn(Arc::clone(&self).observe_changes(shutdown.clone()));
        let mut detector = FoldDetector::new();

        let result = match source {
            SensorSource::Hinge(mut samples) => loop {
                tokio::select! {
                    changed = shutdown.changed() => {
                        if changed.is_err() || *shutdown.borrow() {
                            break Ok(());
                        }
                    }
                    sample = samples.recv() => match sample {
                        Some(sample) => {
                            if let Err(e) = self.handle_sample(&mut detector, sample).await {
                                break Err(e);
                            }
                        }
                        // Sensor stream ended: no more samples, no more folds.
                        None => break Ok(()),
                    }
                }
            },
            SensorSource::Simulated(mut hinge) => {
                tracing::info!("no hinge sensor; running simulation fallback");
                let mut ticker = tokio::time::interval(SIMULATION_PERIOD);
                ticker.tick().await; // the first tick fires immediately
                loop {
                    tokio::select! {
                        changed = shutdown.changed() => {
                            if changed.is_err() || *shutdown.borrow() {
                                break Ok(());
                            }
                        }
                        _ = ticker.tick() => {
                            let sample = hinge.next_sample();
                            if let Err(e) = self.handle_sample(&mut detector, sample).await {
                                break Err(e);
                            }
                        }
                    }
                }
            }
        };

        observer.abort();
        result
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// Reactive recompute: watch the keys the statistics depend on and
    /// republish the snapshot when it actually changed. Covers writers that
    /// bypass `record_fold` (another process, the widget, manual edits).
    async fn observe_changes(self: Arc<Self>, mut shutdown: watch::Receiver<bool>) {
        let mut changes = self.counters.subscribe_changes();
        let mut last: Option<StatsSnapshot> = None;
        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
                change = changes.recv() => match change {
                    Ok(key) if stats_relevant(&key) => {
                        match self.stats.snapshot(today()).await {
                            Ok(snap) => {
                                if last.as_ref() != Some(&snap) {
                                    self.emit_stats(&snap);
                                    last = Some(snap);
                                }
                            }
                            Err(e) => tracing::warn!(error = %e, "stats recompute failed"),
                        }
                    }
                    Ok(_) => {}
                    // Missed keys are fine; the next change triggers a full
                    // recompute from the store anyway.
                    Err(broadcast::error::RecvError::Lagged(_)) => {}
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }

    async fn publish_stats(&self, today: NaiveDate) -> Result<(), StoreError> {
        let snap = self.stats.snapshot(today).await?;
        self.emit_stats(&snap);
        Ok(())
    }

    fn emit_stats(&self, snap: &StatsSnapshot) {
        self.emit(Event::StatsUpdated {
            average_folds: snap.average_folds,
            yearly_projection: snap.yearly_projection,
            achievements: snap.achievements.clone(),
            progress_to_next: snap.progress_to_next,
            at: Utc::now(),
        });
    }

    fn emit(&self, event: Event) {
        // No subscribers is fine; the store already holds the truth.
        let _ = self.events.send(event);
    }
}

/// Statistics depend on the lifetime total and the per-date daily counts.
fn stats_relevant(key: &str) -> bool {
    key == keys::TOTAL_COUNT || keys::is_daily_count(key)
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}
