pub mod counter;
pub mod limit;
pub mod simulate;
pub mod stats;

use std::sync::Arc;

use foldtrack_core::{FoldTracker, SqliteStore};

/// Open the on-disk store and wire up an initialized tracker.
pub async fn open_tracker() -> Result<FoldTracker<SqliteStore>, Box<dyn std::error::Error>> {
    let tracker = FoldTracker::new(Arc::new(SqliteStore::open()?));
    tracker.initialize().await?;
    Ok(tracker)
}
