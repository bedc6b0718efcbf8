// src/utils/time.rs

use chrono::{DateTime, FixedOffset, Utc};

/// Splits a UTC instant into local `YYYY-MM-DD` and `HH:MM:SS` strings.
pub fn local_date_time(ts: DateTime<Utc>, offset: &FixedOffset) -> (String, String) {
    let local = ts.with_timezone(offset);
    (
        local.format("%Y-%m-%d").to_string(),
        local.format("%H:%M:%S").to_string(),
    )
}

/// Rounds half away from zero to `places` decimals.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}
