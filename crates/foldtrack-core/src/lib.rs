//! # FoldTrack Core Library
//!
//! This library provides the core business logic for FoldTrack, a fold-event
//! tracker for foldable devices. It implements a CLI-first philosophy where
//! all operations are available via a standalone CLI binary, with any GUI or
//! home-screen widget being a thin layer over the same core library.
//!
//! ## Architecture
//!
//! - **Fold Detector**: a debounced edge-detector state machine that turns a
//!   noisy hinge-angle stream into discrete fold events. The detector itself
//!   has no threads -- the caller feeds it samples
//! - **Counter Store**: typed accessors over an abstract durable key-value
//!   store (in-memory for tests, SQLite for the installed app)
//! - **Statistics Engine**: day rollover, 7-day rolling average, yearly
//!   projection, milestones, progress
//! - **Notification Gate**: at most one daily-limit notification per day
//! - **Fold Tracker**: service wiring that runs the detector against a live
//!   sensor stream or the simulation fallback and publishes events
//!
//! ## Key Components
//!
//! - [`FoldDetector`]: hinge-angle state machine
//! - [`CounterStore`]: counter persistence layer
//! - [`StatsEngine`]: derived statistics
//! - [`FoldTracker`]: event-publishing service loop

pub mod detector;
pub mod error;
pub mod events;
pub mod notify;
pub mod simulation;
pub mod stats;
pub mod store;
pub mod tracker;

pub use detector::{FoldDetector, FoldState, HingeSample, SampleOutcome};
pub use error::{CoreError, Result, SampleError, StoreError};
pub use events::Event;
pub use notify::NotificationGate;
pub use simulation::{SimulatedHinge, SIMULATION_PERIOD};
pub use stats::{FoldTally, RolloverOutcome, StatsEngine, StatsSnapshot, MILESTONES};
pub use store::{CounterStore, DurableStore, MemoryStore, SqliteStore, Value};
pub use tracker::{FoldTracker, SensorSource};
