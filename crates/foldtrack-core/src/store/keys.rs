//! Key layout for the durable store.
//!
//! Key names are the on-disk contract; changing one orphans existing data.
//! Daily counts use one integer key per calendar date.

use chrono::NaiveDate;

pub const TOTAL_COUNT: &str = "counter_key";
pub const LAST_UPDATED_DATE: &str = "last_updated_date_key";
pub const FIRST_LAUNCH: &str = "first_launch_key";
pub const HINGE_ANGLE: &str = "hinge_angle_key";
pub const DAILY_LIMIT: &str = "daily_limit_key";
pub const LAST_NOTIFIED_DATE: &str = "last_notified_date_key";
pub const NOTIFICATION_PERMISSION_REQUESTED: &str = "notification_permission_requested_key";

pub const DAILY_COUNT_PREFIX: &str = "daily_count_";

/// `daily_count_<YYYY-MM-DD>` for the given date.
pub fn daily_count(date: NaiveDate) -> String {
    format!("{DAILY_COUNT_PREFIX}{date}")
}

/// True if `key` holds a per-date daily count.
pub fn is_daily_count(key: &str) -> bool {
    key.starts_with(DAILY_COUNT_PREFIX)
}
