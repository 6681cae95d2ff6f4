//! CSV readers for local exports.
//!
//! Rows that cannot be coerced are logged and skipped; only I/O and CSV
//! framing errors fail the whole file.

use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use crate::error::Result;
use crate::models::{
    parse_instant, parse_number, EventType, JournalDate, JournalEntry, RawEvent, SleepExportRow,
    SleepRecord,
};

#[derive(Deserialize)]
struct EventRow {
    timestamp: String,
    #[serde(alias = "eventType", alias = "event")]
    event_type: String,
}

#[derive(Deserialize)]
struct JournalRow {
    #[serde(alias = "date", alias = "created_at")]
    timestamp: String,
    #[serde(alias = "moodScore", alias = "mood")]
    mood_score: String,
    #[serde(alias = "energyScore", alias = "energy")]
    energy_score: String,
    #[serde(default, alias = "positiveFeelings")]
    positive_feelings: String,
    #[serde(default, alias = "negativeFeelings")]
    negative_feelings: String,
    #[serde(default, alias = "cognitiveStates")]
    cognitive_states: String,
    #[serde(default, alias = "physicalStates")]
    physical_states: String,
}

pub fn read_events(path: &Path) -> Result<Vec<RawEvent>> {
    read_events_from(std::fs::File::open(path)?)
}

pub fn read_events_from<R: Read>(reader: R) -> Result<Vec<RawEvent>> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut events = Vec::new();

    for (line, result) in csv_reader.deserialize::<EventRow>().enumerate() {
        let row = match result {
            Ok(row) => row,
            Err(err) if is_row_error(&err) => {
                tracing::warn!(line = line + 2, error = %err, "skipping malformed event row");
                continue;
            }
            Err(err) => return Err(err.into()),
        };

        let Some(timestamp) = parse_instant(&row.timestamp) else {
            tracing::warn!(line = line + 2, value = %row.timestamp, "skipping event with bad timestamp");
            continue;
        };
        let event_type = match row.event_type.parse::<EventType>() {
            Ok(event_type) => event_type,
            Err(err) => {
                tracing::warn!(line = line + 2, error = %err, "skipping event with unknown type");
                continue;
            }
        };

        events.push(RawEvent::new(timestamp, event_type));
    }

    tracing::debug!(count = events.len(), "read events");
    Ok(events)
}

pub fn read_journal(path: &Path) -> Result<Vec<JournalEntry>> {
    read_journal_from(std::fs::File::open(path)?)
}

pub fn read_journal_from<R: Read>(reader: R) -> Result<Vec<JournalEntry>> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut entries = Vec::new();

    for (line, result) in csv_reader.deserialize::<JournalRow>().enumerate() {
        let row = match result {
            Ok(row) => row,
            Err(err) if is_row_error(&err) => {
                tracing::warn!(line = line + 2, error = %err, "skipping malformed journal row");
                continue;
            }
            Err(err) => return Err(err.into()),
        };

        let (Some(recorded), Some(mood), Some(energy)) = (
            JournalDate::parse(&row.timestamp),
            parse_number(&row.mood_score),
            parse_number(&row.energy_score),
        ) else {
            tracing::warn!(line = line + 2, "skipping journal row with unparsable fields");
            continue;
        };

        let mut entry = JournalEntry::new(recorded, mood, energy);
        entry.positive_feelings = split_list(&row.positive_feelings);
        entry.negative_feelings = split_list(&row.negative_feelings);
        entry.cognitive_states = split_list(&row.cognitive_states);
        entry.physical_states = split_list(&row.physical_states);
        entries.push(entry);
    }

    tracing::debug!(count = entries.len(), "read journal entries");
    Ok(entries)
}

pub fn read_sleep(path: &Path) -> Result<Vec<SleepRecord>> {
    read_sleep_from(std::fs::File::open(path)?)
}

pub fn read_sleep_from<R: Read>(reader: R) -> Result<Vec<SleepRecord>> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut records = Vec::new();

    for (line, result) in csv_reader.deserialize::<SleepExportRow>().enumerate() {
        match result {
            Ok(row) => records.push(SleepRecord::from_export(&row)),
            Err(err) if is_row_error(&err) => {
                tracing::warn!(line = line + 2, error = %err, "skipping malformed sleep row");
            }
            Err(err) => return Err(err.into()),
        }
    }

    tracing::debug!(count = records.len(), "read sleep records");
    Ok(records)
}

/// Errors confined to one record, as opposed to I/O failures.
fn is_row_error(err: &csv::Error) -> bool {
    !matches!(err.kind(), csv::ErrorKind::Io(_))
}

/// Feelings are stored as `;`- or `,`-separated lists in one cell.
fn split_list(cell: &str) -> Vec<String> {
    cell.split([';', ','])
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}
