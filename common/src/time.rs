// Time types used across the project
//
// The state core never samples the clock itself: every operation receives
// a logical timestamp from the request layer. The helpers below are meant
// for that layer (read once per request) and for log output only.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

// Seconds timestamps used to determine it using its type
pub type TimestampSeconds = u64;

pub const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

#[inline]
pub fn get_current_time() -> Duration {
    // A clock set before the epoch is reported as the epoch itself
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
}

// Return timestamp in seconds
pub fn get_current_time_in_seconds() -> TimestampSeconds {
    get_current_time().as_secs()
}
