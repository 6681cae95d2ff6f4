//! Averages over day records and sleep exports, and the default split
//! points the analyzers start from.

use crate::config::EngineConfig;
use crate::models::{DayRecord, EventType, LocationDay, SleepMetric, SleepRecord, ThresholdConfig};
use crate::stats;
use crate::time::{self, HOURS_PER_DAY};

/// Mean day-cycle hour of `event_type` over the days that have it.
pub fn average_time(days: &[DayRecord], event_type: EventType, config: &EngineConfig) -> Option<f64> {
    let hours: Vec<f64> = days
        .iter()
        .filter_map(|day| day.event(event_type))
        .map(|hour| time::fold_hour(hour, config.pivot_hour))
        .filter(|hour| hour.is_finite())
        .collect();
    stats::mean(&hours)
}

/// Mean hours between two events on the same day record.
pub fn average_span(
    days: &[DayRecord],
    from: EventType,
    to: EventType,
    config: &EngineConfig,
) -> Option<f64> {
    let spans: Vec<f64> = days
        .iter()
        .filter_map(|day| {
            let start = time::fold_hour(day.event(from)?, config.pivot_hour);
            let end = time::fold_hour(day.event(to)?, config.pivot_hour);
            Some(time::forward_span(start, end))
        })
        .filter(|span| span.is_finite())
        .collect();
    stats::mean(&spans)
}

/// Mean of one sleep duration field, skipping records where it is missing.
pub fn average_duration(records: &[SleepRecord], metric: SleepMetric) -> Option<f64> {
    let values: Vec<f64> = records
        .iter()
        .filter_map(|record| record.metric(metric))
        .collect();
    stats::mean(&values)
}

/// Mean hours outside per day; `0.0` without data.
pub fn average_time_outside(location_days: &[LocationDay]) -> f64 {
    let values: Vec<f64> = location_days.iter().map(|day| day.time_outside).collect();
    stats::mean(&values).unwrap_or(0.0)
}

/// Hours between leaving and arriving home, per day that has both.
pub fn time_outside_by_day(days: &[DayRecord], config: &EngineConfig) -> Vec<LocationDay> {
    days.iter()
        .filter_map(|day| {
            let left = time::fold_hour(day.event(EventType::LeaveHome)?, config.pivot_hour);
            let arrived = time::fold_hour(day.event(EventType::ArriveHome)?, config.pivot_hour);
            let time_outside = time::forward_span(left, arrived);
            time_outside.is_finite().then_some(LocationDay {
                date: day.date,
                time_outside,
            })
        })
        .collect()
}

/// Clock hour each event type's slider centres on when there is no data.
fn fallback_clock_hour(event_type: EventType) -> f64 {
    match event_type {
        EventType::Asleep => 23.0,
        EventType::Awake => 7.0,
        EventType::StartWork => 9.0,
        EventType::EndWork => 17.5,
        EventType::Journal => 21.0,
        EventType::WorkoutStart => 7.0,
        EventType::WorkoutEnd => 8.0,
        EventType::LeaveHome => 8.5,
        EventType::ArriveHome => 18.5,
    }
}

/// Half-width of the slider range used without data.
const FALLBACK_SPREAD_HOURS: f64 = 3.0;

/// Slider bounds for an event type's early/late threshold.
///
/// Bounds span the observed hours (rounded outward to whole hours) and the
/// default is the average time. Without data the range is centred on a
/// typical hour for the event type.
pub fn threshold_config(
    days: &[DayRecord],
    event_type: EventType,
    config: &EngineConfig,
) -> ThresholdConfig {
    let pivot = config.pivot_hour;
    let observed: Vec<f64> = days
        .iter()
        .filter_map(|day| day.event(event_type))
        .map(|hour| time::fold_hour(hour, pivot))
        .filter(|hour| hour.is_finite())
        .collect();

    let lowest = observed.iter().copied().reduce(f64::min);
    let highest = observed.iter().copied().reduce(f64::max);

    let (min, max, default) = match (lowest, highest, stats::mean(&observed)) {
        (Some(lowest), Some(highest), Some(average)) => {
            let min = lowest.floor();
            let max = highest.ceil().max(min + 1.0);
            (min, max, average)
        }
        _ => {
            let centre = time::fold_hour(fallback_clock_hour(event_type), pivot);
            (
                centre - FALLBACK_SPREAD_HOURS,
                centre + FALLBACK_SPREAD_HOURS,
                centre,
            )
        }
    };

    let min = min.max(pivot);
    let max = max.min(pivot + HOURS_PER_DAY);

    ThresholdConfig {
        min,
        max,
        default: default.clamp(min, max),
        event_type,
    }
}
