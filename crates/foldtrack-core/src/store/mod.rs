//! Durable storage for counters and preferences.
//!
//! The rest of the crate talks to an abstract [`DurableStore`] -- a namespaced
//! key-value store with change notifications. Two implementations ship:
//! [`MemoryStore`] for tests and simulations, and [`SqliteStore`] backed by a
//! single `kv` table on disk.

mod counters;
pub mod keys;
mod kv;
mod sqlite;

pub use counters::CounterStore;
pub use kv::{DurableStore, MemoryStore, Value};
pub use sqlite::SqliteStore;

use std::path::PathBuf;

/// Returns `~/.config/foldtrack[-dev]/` based on FOLDTRACK_ENV.
///
/// Set FOLDTRACK_ENV=dev to use a development data directory, or
/// FOLDTRACK_DATA_DIR to point somewhere else entirely (used by tests).
///
/// # Errors
/// Returns an error if the directory cannot be created.
pub fn data_dir() -> Result<PathBuf, std::io::Error> {
    let dir = if let Ok(dir) = std::env::var("FOLDTRACK_DATA_DIR") {
        PathBuf::from(dir)
    } else {
        let base_dir = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config");

        let env = std::env::var("FOLDTRACK_ENV").unwrap_or_else(|_| "production".to_string());

        if env == "dev" {
            base_dir.join("foldtrack-dev")
        } else {
            base_dir.join("foldtrack")
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
