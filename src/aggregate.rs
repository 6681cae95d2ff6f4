//! Day records from raw events and journal entries.
//!
//! Every event is filed under one calendar date in the reference time zone.
//! Sleep onsets between midnight and the pivot hour belong to the evening
//! before, so a night's sleep stays on one record.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;

use crate::config::EngineConfig;
use crate::models::{DayRecord, JournalEntry, RawEvent, ScoreType};
use crate::time;

/// Fold raw events into one record per calendar day, sorted by date.
///
/// Events are applied in timestamp order, so when a type occurs twice on the
/// same day the later occurrence is the one kept. A sleep onset before the
/// pivot hour is credited to the previous day.
pub fn aggregate_events(events: &[RawEvent], config: &EngineConfig) -> Vec<DayRecord> {
    let mut ordered: Vec<&RawEvent> = events.iter().collect();
    ordered.sort_by_key(|event| event.timestamp);

    let mut days: BTreeMap<NaiveDate, DayRecord> = BTreeMap::new();

    for event in ordered {
        let (date, hour) = day_slot(event, config);
        days.entry(date)
            .or_insert_with(|| DayRecord::new(date))
            .events
            .insert(event.event_type, hour);
    }

    tracing::debug!(
        events = events.len(),
        days = days.len(),
        "aggregated events into day records"
    );

    days.into_values().collect()
}

/// Calendar date and day-cycle hour an event is filed under.
pub fn day_slot(event: &RawEvent, config: &EngineConfig) -> (NaiveDate, f64) {
    let clock = time::clock_hour(event.timestamp, config.time_zone);
    let hour = time::normalize_hour(event.timestamp, config.time_zone, config.pivot_hour);

    let local = time::local_date(event.timestamp, config.time_zone);
    // Step back on the local calendar; a fixed 24h would skip a day across DST.
    let date = if event.event_type.is_sleep_onset() && clock < config.pivot_hour {
        local.pred_opt().unwrap_or(local)
    } else {
        local
    };

    (date, hour)
}

/// Attach mood and energy scores to the matching day records.
///
/// The chronologically last entry of a day wins; entries for days without
/// any event are ignored.
pub fn merge_journal(days: &mut [DayRecord], journals: &[JournalEntry], config: &EngineConfig) {
    let mut latest: HashMap<NaiveDate, &JournalEntry> = HashMap::new();

    for entry in journals {
        let date = entry.recorded.local_date(config.time_zone);
        match latest.get(&date) {
            // Option<DateTime> orders None (date-only) before any timestamp.
            Some(current) if current.recorded.sort_key() > entry.recorded.sort_key() => {}
            _ => {
                latest.insert(date, entry);
            }
        }
    }

    let mut matched = 0usize;
    for day in days.iter_mut() {
        if let Some(entry) = latest.get(&day.date) {
            for score_type in [ScoreType::Mood, ScoreType::Energy] {
                day.set_score(score_type, entry.score(score_type));
            }
            matched += 1;
        }
    }

    tracing::debug!(
        journals = journals.len(),
        matched,
        "merged journal scores into day records"
    );
}

/// Aggregate events and merge journal scores in one step.
pub fn build_day_records(
    events: &[RawEvent],
    journals: &[JournalEntry],
    config: &EngineConfig,
) -> Vec<DayRecord> {
    let mut days = aggregate_events(events, config);
    merge_journal(&mut days, journals, config);
    days
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EventType, JournalDate};
    use chrono::{DateTime, TimeZone, Utc};

    fn utc_config() -> EngineConfig {
        EngineConfig::new(chrono_tz::UTC, 18.0).unwrap()
    }

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn empty_input_yields_no_records() {
        assert!(aggregate_events(&[], &utc_config()).is_empty());
    }

    #[test]
    fn late_sleep_belongs_to_previous_day() {
        let events = vec![RawEvent::new(at(2024, 1, 2, 1, 0), EventType::Asleep)];
        let days = aggregate_events(&events, &utc_config());

        assert_eq!(days.len(), 1);
        assert_eq!(days[0].date, date(2024, 1, 1));
        assert_eq!(days[0].event(EventType::Asleep), Some(25.0));
    }

    #[test]
    fn late_sleep_after_spring_forward_steps_back_one_local_day() {
        let config = EngineConfig::new(chrono_tz::America::Los_Angeles, 18.0).unwrap();
        // The clocks changed at 02:00 on 2024-03-10, so this night is 23 hours long.
        let onset = chrono_tz::America::Los_Angeles
            .with_ymd_and_hms(2024, 3, 11, 0, 30, 0)
            .unwrap()
            .with_timezone(&Utc);
        let days = aggregate_events(&[RawEvent::new(onset, EventType::Asleep)], &config);

        assert_eq!(days.len(), 1);
        assert_eq!(days[0].date, date(2024, 3, 10));
        assert_eq!(days[0].event(EventType::Asleep), Some(24.5));
    }

    #[test]
    fn late_sleep_after_fall_back_steps_back_one_local_day() {
        let config = EngineConfig::new(chrono_tz::America::Los_Angeles, 18.0).unwrap();
        let onset = chrono_tz::America::Los_Angeles
            .with_ymd_and_hms(2024, 11, 4, 0, 30, 0)
            .unwrap()
            .with_timezone(&Utc);
        let days = aggregate_events(&[RawEvent::new(onset, EventType::Asleep)], &config);
        assert_eq!(days[0].date, date(2024, 11, 3));
    }

    #[test]
    fn evening_sleep_stays_on_its_day() {
        let events = vec![RawEvent::new(at(2024, 1, 1, 22, 30), EventType::Asleep)];
        let days = aggregate_events(&events, &utc_config());
        assert_eq!(days[0].date, date(2024, 1, 1));
        assert_eq!(days[0].event(EventType::Asleep), Some(22.5));
    }

    #[test]
    fn other_events_keep_their_own_day() {
        let events = vec![RawEvent::new(at(2024, 1, 2, 7, 0), EventType::Awake)];
        let days = aggregate_events(&events, &utc_config());
        assert_eq!(days[0].date, date(2024, 1, 2));
        assert_eq!(days[0].event(EventType::Awake), Some(31.0));
    }

    #[test]
    fn records_are_sorted_and_missing_types_absent() {
        let events = vec![
            RawEvent::new(at(2024, 1, 3, 9, 0), EventType::StartWork),
            RawEvent::new(at(2024, 1, 1, 9, 0), EventType::StartWork),
            RawEvent::new(at(2024, 1, 1, 17, 0), EventType::EndWork),
        ];
        let days = aggregate_events(&events, &utc_config());

        let dates: Vec<NaiveDate> = days.iter().map(|d| d.date).collect();
        assert_eq!(dates, vec![date(2024, 1, 1), date(2024, 1, 3)]);
        assert_eq!(days[1].event(EventType::EndWork), None);
        assert_eq!(days[0].event(EventType::EndWork), Some(41.0));
    }

    #[test]
    fn latest_duplicate_wins_regardless_of_input_order() {
        let events = vec![
            RawEvent::new(at(2024, 1, 1, 10, 0), EventType::StartWork),
            RawEvent::new(at(2024, 1, 1, 8, 0), EventType::StartWork),
        ];
        let days = aggregate_events(&events, &utc_config());
        assert_eq!(days[0].event(EventType::StartWork), Some(34.0));
    }

    #[test]
    fn journal_latest_entry_wins() {
        let events = vec![RawEvent::new(at(2024, 1, 1, 9, 0), EventType::StartWork)];
        let journals = vec![
            JournalEntry::new(JournalDate::Timestamp(at(2024, 1, 1, 20, 0)), 8.0, 6.0),
            JournalEntry::new(JournalDate::Timestamp(at(2024, 1, 1, 8, 0)), 3.0, 2.0),
            JournalEntry::new(JournalDate::Date(date(2024, 1, 1)), 1.0, 1.0),
        ];
        let days = build_day_records(&events, &journals, &utc_config());

        assert_eq!(days[0].score(ScoreType::Mood), Some(8.0));
        assert_eq!(days[0].score(ScoreType::Energy), Some(6.0));
    }

    #[test]
    fn journal_for_unknown_day_is_ignored() {
        let events = vec![RawEvent::new(at(2024, 1, 1, 9, 0), EventType::StartWork)];
        let journals = vec![JournalEntry::new(
            JournalDate::Date(date(2024, 2, 1)),
            5.0,
            5.0,
        )];
        let days = build_day_records(&events, &journals, &utc_config());
        assert_eq!(days.len(), 1);
        assert_eq!(days[0].score(ScoreType::Mood), None);
    }

    #[test]
    fn journal_dates_follow_reference_zone() {
        let config = EngineConfig::new(chrono_tz::America::New_York, 18.0).unwrap();
        // 20:00 local on Jan 1 in New York.
        let events = vec![RawEvent::new(at(2024, 1, 2, 1, 0), EventType::Journal)];
        let journals = vec![JournalEntry::new(
            JournalDate::Timestamp(at(2024, 1, 2, 2, 0)),
            7.0,
            4.0,
        )];
        let days = build_day_records(&events, &journals, &config);
        assert_eq!(days[0].date, date(2024, 1, 1));
        assert_eq!(days[0].score(ScoreType::Mood), Some(7.0));
    }
}
