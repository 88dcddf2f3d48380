//! Display helpers for provider values.

use chrono::{DateTime, FixedOffset, Offset, Utc};

const COMPASS: [&str; 8] = ["N", "NE", "E", "SE", "S", "SW", "W", "NW"];

/// 8-point compass label for a wind bearing in degrees.
pub fn compass(deg: f64) -> &'static str {
    let index = (deg.rem_euclid(360.0) / 45.0).round() as usize % COMPASS.len();
    COMPASS[index]
}

pub fn round_temp(value: f64) -> i64 {
    value.round() as i64
}

/// Out-of-range offsets fall back to UTC.
fn offset(secs: i32) -> FixedOffset {
    FixedOffset::east_opt(secs).unwrap_or_else(|| Utc.fix())
}

/// Wall-clock `HH:MM` at the location right now.
pub fn local_clock(now: DateTime<Utc>, offset_secs: i32) -> String {
    now.with_timezone(&offset(offset_secs)).format("%H:%M").to_string()
}

/// `hh:mm AM` at the location, used for sunrise and sunset.
pub fn local_time_12h(ts: DateTime<Utc>, offset_secs: i32) -> String {
    ts.with_timezone(&offset(offset_secs)).format("%I:%M %p").to_string()
}

pub fn weekday_short(ts: DateTime<Utc>, offset_secs: i32) -> String {
    ts.with_timezone(&offset(offset_secs)).format("%a").to_string()
}

/// `H:00` label for an hourly slot.
pub fn hour_label(ts: DateTime<Utc>, offset_secs: i32) -> String {
    ts.with_timezone(&offset(offset_secs)).format("%-H:00").to_string()
}
