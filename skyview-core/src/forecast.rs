//! Slicing the provider's 3-hour series into the hourly and daily views.

use chrono::Timelike;

use crate::model::ForecastEntry;

pub const HOURLY_SLOTS: usize = 8;
pub const DAILY_SLOTS: usize = 7;
/// UTC hour of the provider's fixed midday slot.
pub const MIDDAY_HOUR: u32 = 12;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ForecastViews {
    pub hourly: Vec<ForecastEntry>,
    pub daily: Vec<ForecastEntry>,
}

/// Derive both views from a raw series.
///
/// The series is put in strict chronological order first (duplicate
/// timestamps keep their first occurrence), so both views are strictly
/// increasing regardless of what the provider sent.
pub fn derive_views(series: Vec<ForecastEntry>) -> ForecastViews {
    let series = chronological(series);

    let hourly = series.iter().take(HOURLY_SLOTS).cloned().collect();
    let daily = series
        .into_iter()
        .filter(is_midday_slot)
        .take(DAILY_SLOTS)
        .collect();

    ForecastViews { hourly, daily }
}

fn chronological(mut series: Vec<ForecastEntry>) -> Vec<ForecastEntry> {
    series.sort_by_key(|e| e.timestamp);
    series.dedup_by_key(|e| e.timestamp);
    series
}

fn is_midday_slot(entry: &ForecastEntry) -> bool {
    let t = entry.timestamp;
    t.hour() == MIDDAY_HOUR && t.minute() == 0 && t.second() == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, day, hour, 0, 0).unwrap()
    }

    fn entry(ts: DateTime<Utc>) -> ForecastEntry {
        ForecastEntry {
            timestamp: ts,
            temperature: 10.0,
            humidity_pct: 50,
            description: "clear sky".into(),
        }
    }

    /// Five days of 3-hour slots starting at 09:00 on day 1.
    fn five_day_series() -> Vec<ForecastEntry> {
        let start = at(1, 9);
        (0..40)
            .map(|i| entry(start + chrono::Duration::hours(3 * i)))
            .collect()
    }

    #[test]
    fn hourly_takes_first_eight_slots() {
        let views = derive_views(five_day_series());
        assert_eq!(views.hourly.len(), HOURLY_SLOTS);
        assert_eq!(views.hourly[0].timestamp, at(1, 9));
        assert_eq!(views.hourly[7].timestamp, at(2, 6));
    }

    #[test]
    fn daily_keeps_only_midday_slots() {
        let views = derive_views(five_day_series());
        assert_eq!(views.daily.len(), 5);
        assert!(views.daily.iter().all(|e| e.timestamp.hour() == 12));
        assert_eq!(views.daily[0].timestamp, at(1, 12));
    }

    #[test]
    fn daily_is_capped_at_seven() {
        let series = (1..=10).map(|d| entry(at(d, 12))).collect();
        let views = derive_views(series);
        assert_eq!(views.daily.len(), DAILY_SLOTS);
        assert_eq!(views.daily[6].timestamp, at(7, 12));
    }

    #[test]
    fn unordered_series_yields_strictly_chronological_views() {
        let mut series = five_day_series();
        series.reverse();
        series.push(entry(at(2, 12)));

        let views = derive_views(series);
        for view in [&views.hourly, &views.daily] {
            assert!(view.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
        }
        assert_eq!(views.hourly[0].timestamp, at(1, 9));
    }

    #[test]
    fn short_series_is_not_padded() {
        let views = derive_views(vec![entry(at(1, 15)), entry(at(1, 18))]);
        assert_eq!(views.hourly.len(), 2);
        assert!(views.daily.is_empty());
    }
}
