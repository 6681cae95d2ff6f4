//! Row fetching from the remote Postgres store.
//!
//! The schema belongs to the data store; this module only selects the
//! columns the engine needs from the configured tables and coerces them.

use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use crate::config::{is_table_identifier, TableNames};
use crate::error::{Error, Result};
use crate::models::{
    DataSet, EventType, JournalDate, JournalEntry, RawEvent, SleepExportRow, SleepRecord,
};

fn checked_table(name: &str) -> Result<&str> {
    if is_table_identifier(name) {
        Ok(name)
    } else {
        Err(Error::Config(format!("invalid table name: {name}")))
    }
}

pub async fn fetch_events(
    pool: &PgPool,
    table: &str,
    since: DateTime<Utc>,
) -> Result<Vec<RawEvent>> {
    let query = format!(
        "SELECT timestamp, event_type FROM {} WHERE timestamp >= $1 ORDER BY timestamp",
        checked_table(table)?
    );
    let rows = sqlx::query(&query).bind(since).fetch_all(pool).await?;

    let mut events = Vec::with_capacity(rows.len());
    for row in rows {
        let timestamp: DateTime<Utc> = row.try_get("timestamp")?;
        let name: String = row.try_get("event_type")?;
        match name.parse::<EventType>() {
            Ok(event_type) => events.push(RawEvent::new(timestamp, event_type)),
            Err(err) => tracing::warn!(error = %err, "skipping event row"),
        }
    }

    tracing::debug!(table, count = events.len(), "fetched events");
    Ok(events)
}

pub async fn fetch_journal(
    pool: &PgPool,
    table: &str,
    since: DateTime<Utc>,
) -> Result<Vec<JournalEntry>> {
    let query = format!(
        "SELECT timestamp, mood_score::float8 AS mood_score, energy_score::float8 AS energy_score, \
         positive_feelings, negative_feelings, cognitive_states, physical_states \
         FROM {} WHERE timestamp >= $1 ORDER BY timestamp",
        checked_table(table)?
    );
    let rows = sqlx::query(&query).bind(since).fetch_all(pool).await?;

    let mut entries = Vec::with_capacity(rows.len());
    for row in rows {
        match journal_entry(&row) {
            Ok(Some(entry)) => entries.push(entry),
            Ok(None) => tracing::warn!("skipping journal row without scores"),
            Err(err) => tracing::warn!(error = %err, "skipping malformed journal row"),
        }
    }

    tracing::debug!(table, count = entries.len(), "fetched journal entries");
    Ok(entries)
}

fn journal_entry(row: &PgRow) -> std::result::Result<Option<JournalEntry>, sqlx::Error> {
    let timestamp: DateTime<Utc> = row.try_get("timestamp")?;
    let mood: Option<f64> = row.try_get("mood_score")?;
    let energy: Option<f64> = row.try_get("energy_score")?;
    let (Some(mood), Some(energy)) = (mood, energy) else {
        return Ok(None);
    };

    let mut entry = JournalEntry::new(JournalDate::Timestamp(timestamp), mood, energy);
    entry.positive_feelings = string_list(row, "positive_feelings")?;
    entry.negative_feelings = string_list(row, "negative_feelings")?;
    entry.cognitive_states = string_list(row, "cognitive_states")?;
    entry.physical_states = string_list(row, "physical_states")?;
    Ok(Some(entry))
}

fn string_list(row: &PgRow, column: &str) -> std::result::Result<Vec<String>, sqlx::Error> {
    let values: Option<Vec<String>> = row.try_get(column)?;
    Ok(values.unwrap_or_default())
}

/// Sleep exports keep every column as text; coercion happens in
/// [`SleepRecord::from_export`].
pub async fn fetch_sleep(pool: &PgPool, table: &str) -> Result<Vec<SleepRecord>> {
    let query = format!(
        "SELECT start::text AS start, \"end\"::text AS \"end\", core::text AS core, \
         rem::text AS rem, deep::text AS deep, \"inBed\"::text AS in_bed FROM {}",
        checked_table(table)?
    );
    let rows = sqlx::query(&query).fetch_all(pool).await?;

    let mut records = Vec::with_capacity(rows.len());
    for row in rows {
        let export = SleepExportRow {
            start: text(&row, "start")?,
            end: text(&row, "end")?,
            core: text(&row, "core")?,
            rem: text(&row, "rem")?,
            deep: text(&row, "deep")?,
            in_bed: text(&row, "in_bed")?,
        };
        records.push(SleepRecord::from_export(&export));
    }

    tracing::debug!(table, count = records.len(), "fetched sleep records");
    Ok(records)
}

fn text(row: &PgRow, column: &str) -> Result<String> {
    let value: Option<String> = row.try_get(column)?;
    Ok(value.unwrap_or_default())
}

/// Load the events, journal and sleep rows of one query window.
pub async fn fetch_dataset(
    pool: &PgPool,
    tables: &TableNames,
    since: DateTime<Utc>,
) -> Result<DataSet> {
    let events = fetch_events(pool, &tables.events, since).await?;
    let journals = fetch_journal(pool, &tables.journal, since).await?;
    let sleep = fetch_sleep(pool, &tables.sleep).await?;

    let mut data = DataSet {
        events,
        journals,
        sleep,
    };
    data.retain_since(since);
    Ok(data)
}
