//! Day-cycle clock.
//!
//! Times of day are folded onto a continuous scale that starts at the pivot
//! hour, so 23:00 and 01:00 sit two hours apart (23.0 and 25.0 with the
//! default 18:00 pivot) instead of 22 hours apart.
//!
//! The scale assumes one instance of each event type per calendar day and
//! cannot represent a sleep that spans more than one pivot.

use chrono::{DateTime, NaiveDate, Timelike, Utc};
use chrono_tz::Tz;

pub const HOURS_PER_DAY: f64 = 24.0;

/// Wall-clock hour (`hour + minute / 60`) of `timestamp` in `time_zone`.
pub fn clock_hour(timestamp: DateTime<Utc>, time_zone: Tz) -> f64 {
    let local = timestamp.with_timezone(&time_zone);
    local.hour() as f64 + local.minute() as f64 / 60.0
}

/// Calendar date of `timestamp` in `time_zone`.
pub fn local_date(timestamp: DateTime<Utc>, time_zone: Tz) -> NaiveDate {
    timestamp.with_timezone(&time_zone).date_naive()
}

/// Hour on the day-cycle scale: clock hours before the pivot move past 24.
pub fn normalize_hour(timestamp: DateTime<Utc>, time_zone: Tz, pivot_hour: f64) -> f64 {
    let hour = clock_hour(timestamp, time_zone);
    if hour < pivot_hour {
        hour + HOURS_PER_DAY
    } else {
        hour
    }
}

/// Fold any hour value into `[pivot_hour, pivot_hour + 24)`.
///
/// Accepts plain clock hours (1.0), cycle hours (25.0) and the extra-day
/// values some sleep exports carry (49.0); all three map to 25.0 for an
/// 18:00 pivot.
pub fn fold_hour(hour: f64, pivot_hour: f64) -> f64 {
    pivot_hour + (hour - pivot_hour).rem_euclid(HOURS_PER_DAY)
}

/// Place a threshold on the day cycle.
///
/// Values already in `[pivot_hour, pivot_hour + 24]` are kept, so a slider at
/// the top of its range stays the latest split rather than wrapping to the
/// pivot. Anything else is treated as a clock hour and folded.
pub fn fold_threshold(threshold: f64, pivot_hour: f64) -> f64 {
    if (pivot_hour..=pivot_hour + HOURS_PER_DAY).contains(&threshold) {
        threshold
    } else {
        fold_hour(threshold, pivot_hour)
    }
}

/// Forward distance from `from` to `to` on the clock, in `[0, 24)`.
///
/// An end earlier than its start is read as crossing midnight.
pub fn forward_span(from: f64, to: f64) -> f64 {
    (to - from).rem_euclid(HOURS_PER_DAY)
}

/// Render an hour value as a 12-hour clock, e.g. `25.5` -> `1:30 AM`.
///
/// `None` (and non-finite input) renders as a dash.
pub fn format_time_to_ampm(hour_value: Option<f64>) -> String {
    let Some(hour_value) = hour_value.filter(|value| value.is_finite()) else {
        return "-".to_string();
    };

    let total_minutes = (hour_value.rem_euclid(HOURS_PER_DAY) * 60.0).round() as u32 % (24 * 60);
    let hour = total_minutes / 60;
    let minute = total_minutes % 60;
    let period = if hour < 12 { "AM" } else { "PM" };
    let display_hour = match hour % 12 {
        0 => 12,
        h => h,
    };

    format!("{display_hour}:{minute:02} {period}")
}

/// Render a length of time in hours as `7h 05m`.
pub fn format_duration(hours: Option<f64>) -> String {
    let Some(hours) = hours.filter(|value| value.is_finite() && *value >= 0.0) else {
        return "-".to_string();
    };
    let total_minutes = (hours * 60.0).round() as u64;
    format!("{}h {:02}m", total_minutes / 60, total_minutes % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    #[test]
    fn hours_after_pivot_are_unchanged() {
        let hour = normalize_hour(utc(2024, 1, 1, 23, 0), chrono_tz::UTC, 18.0);
        assert_eq!(hour, 23.0);
    }

    #[test]
    fn hours_before_pivot_fold_past_midnight() {
        let hour = normalize_hour(utc(2024, 1, 2, 1, 30), chrono_tz::UTC, 18.0);
        assert_eq!(hour, 25.5);
    }

    #[test]
    fn normalization_uses_reference_zone() {
        // 07:15 UTC is 23:15 the previous evening in Los Angeles (PST).
        let ts = utc(2024, 1, 2, 7, 15);
        let hour = normalize_hour(ts, chrono_tz::America::Los_Angeles, 18.0);
        assert_eq!(hour, 23.25);
        assert_eq!(
            local_date(ts, chrono_tz::America::Los_Angeles),
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
        );
    }

    #[test]
    fn early_pivot_keeps_morning_hours() {
        let hour = normalize_hour(utc(2024, 1, 2, 7, 0), chrono_tz::UTC, 4.0);
        assert_eq!(hour, 7.0);
        let hour = normalize_hour(utc(2024, 1, 2, 2, 0), chrono_tz::UTC, 4.0);
        assert_eq!(hour, 26.0);
    }

    #[test]
    fn fold_accepts_every_representation() {
        assert_eq!(fold_hour(1.0, 18.0), 25.0);
        assert_eq!(fold_hour(25.0, 18.0), 25.0);
        assert_eq!(fold_hour(49.0, 18.0), 25.0);
        assert_eq!(fold_hour(18.0, 18.0), 18.0);
    }

    #[test]
    fn thresholds_keep_the_closed_cycle_end() {
        assert_eq!(fold_threshold(42.0, 18.0), 42.0);
        assert_eq!(fold_threshold(18.0, 18.0), 18.0);
        assert_eq!(fold_threshold(0.0, 18.0), 24.0);
        assert_eq!(fold_threshold(1.5, 18.0), 25.5);
        assert_eq!(fold_threshold(2.0, 4.0), 26.0);
    }

    #[test]
    fn forward_span_wraps_midnight() {
        assert_eq!(forward_span(23.0, 7.0), 8.0);
        assert_eq!(forward_span(9.0, 17.5), 8.5);
        assert_eq!(forward_span(23.0, 31.0), 8.0);
    }

    #[test]
    fn formats_midnight_and_noon() {
        let midnight = normalize_hour(utc(2024, 1, 2, 0, 0), chrono_tz::UTC, 18.0);
        let noon = normalize_hour(utc(2024, 1, 2, 12, 0), chrono_tz::UTC, 18.0);
        assert_eq!(format_time_to_ampm(Some(midnight)), "12:00 AM");
        assert_eq!(format_time_to_ampm(Some(noon)), "12:00 PM");
    }

    #[test]
    fn formats_folded_early_morning() {
        let hour = normalize_hour(utc(2024, 1, 2, 1, 30), chrono_tz::UTC, 18.0);
        assert_eq!(format_time_to_ampm(Some(hour)), "1:30 AM");
        assert_eq!(format_time_to_ampm(Some(22.75)), "10:45 PM");
    }

    #[test]
    fn formats_missing_as_dash() {
        assert_eq!(format_time_to_ampm(None), "-");
        assert_eq!(format_time_to_ampm(Some(f64::NAN)), "-");
    }

    #[test]
    fn formats_durations() {
        assert_eq!(format_duration(Some(7.5)), "7h 30m");
        assert_eq!(format_duration(Some(0.1)), "0h 06m");
        assert_eq!(format_duration(None), "-");
    }
}
