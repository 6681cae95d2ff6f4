//! Domain types shared by the engine, the loaders and the report.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Closed set of life events the dashboard tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Asleep,
    Awake,
    StartWork,
    EndWork,
    Journal,
    WorkoutStart,
    WorkoutEnd,
    LeaveHome,
    ArriveHome,
}

impl EventType {
    pub const ALL: [EventType; 9] = [
        EventType::Asleep,
        EventType::Awake,
        EventType::StartWork,
        EventType::EndWork,
        EventType::Journal,
        EventType::WorkoutStart,
        EventType::WorkoutEnd,
        EventType::LeaveHome,
        EventType::ArriveHome,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Asleep => "asleep",
            EventType::Awake => "awake",
            EventType::StartWork => "start_work",
            EventType::EndWork => "end_work",
            EventType::Journal => "journal",
            EventType::WorkoutStart => "workout_start",
            EventType::WorkoutEnd => "workout_end",
            EventType::LeaveHome => "leave_home",
            EventType::ArriveHome => "arrive_home",
        }
    }

    /// Verb phrase used in insight sentences ("days you {phrase} earlier").
    pub fn phrase(&self) -> &'static str {
        match self {
            EventType::Asleep => "fall asleep",
            EventType::Awake => "wake up",
            EventType::StartWork => "start work",
            EventType::EndWork => "finish work",
            EventType::Journal => "journal",
            EventType::WorkoutStart => "start a workout",
            EventType::WorkoutEnd => "finish a workout",
            EventType::LeaveHome => "leave home",
            EventType::ArriveHome => "get home",
        }
    }

    /// Noun used when naming the activity in gap insights.
    pub fn noun(&self) -> &'static str {
        match self {
            EventType::Asleep => "falling asleep",
            EventType::Awake => "waking up",
            EventType::StartWork => "starting work",
            EventType::EndWork => "finishing work",
            EventType::Journal => "journaling",
            EventType::WorkoutStart => "starting a workout",
            EventType::WorkoutEnd => "finishing a workout",
            EventType::LeaveHome => "leaving home",
            EventType::ArriveHome => "getting home",
        }
    }

    /// Sleep onset is the one event that belongs to the evening before when
    /// it happens after midnight.
    pub fn is_sleep_onset(&self) -> bool {
        matches!(self, EventType::Asleep)
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        EventType::ALL
            .iter()
            .copied()
            .find(|event_type| event_type.as_str() == normalized)
            .ok_or_else(|| Error::UnknownEventType(s.to_string()))
    }
}

/// Self-reported outcome attached to a day from the journal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScoreType {
    #[serde(rename = "mood_score")]
    Mood,
    #[serde(rename = "energy_score")]
    Energy,
}

impl ScoreType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScoreType::Mood => "mood_score",
            ScoreType::Energy => "energy_score",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ScoreType::Mood => "mood",
            ScoreType::Energy => "energy",
        }
    }
}

impl fmt::Display for ScoreType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScoreType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mood" | "mood_score" => Ok(ScoreType::Mood),
            "energy" | "energy_score" => Ok(ScoreType::Energy),
            _ => Err(Error::UnknownScoreType(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEvent {
    pub timestamp: DateTime<Utc>,
    pub event_type: EventType,
}

impl RawEvent {
    pub fn new(timestamp: DateTime<Utc>, event_type: EventType) -> Self {
        Self {
            timestamp,
            event_type,
        }
    }
}

/// When a journal entry was written. Older exports only carry a date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JournalDate {
    Timestamp(DateTime<Utc>),
    Date(NaiveDate),
}

impl JournalDate {
    /// Accepts RFC 3339, `yyyy-MM-ddTHH:mm:ss` (UTC) or a bare `yyyy-MM-dd`.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
            return Some(JournalDate::Timestamp(dt.with_timezone(&Utc)));
        }
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S") {
            return Some(JournalDate::Timestamp(Utc.from_utc_datetime(&dt)));
        }
        NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .ok()
            .map(JournalDate::Date)
    }

    pub fn local_date(&self, time_zone: Tz) -> NaiveDate {
        match self {
            JournalDate::Timestamp(ts) => ts.with_timezone(&time_zone).date_naive(),
            JournalDate::Date(date) => *date,
        }
    }

    /// Ordering key within a day; date-only entries sort before timed ones.
    pub(crate) fn sort_key(&self) -> Option<DateTime<Utc>> {
        match self {
            JournalDate::Timestamp(ts) => Some(*ts),
            JournalDate::Date(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct JournalEntry {
    pub recorded: JournalDate,
    pub mood_score: f64,
    pub energy_score: f64,
    pub positive_feelings: Vec<String>,
    pub negative_feelings: Vec<String>,
    pub cognitive_states: Vec<String>,
    pub physical_states: Vec<String>,
}

impl JournalEntry {
    pub fn new(recorded: JournalDate, mood_score: f64, energy_score: f64) -> Self {
        Self {
            recorded,
            mood_score,
            energy_score,
            positive_feelings: Vec::new(),
            negative_feelings: Vec::new(),
            cognitive_states: Vec::new(),
            physical_states: Vec::new(),
        }
    }

    pub fn score(&self, score_type: ScoreType) -> f64 {
        match score_type {
            ScoreType::Mood => self.mood_score,
            ScoreType::Energy => self.energy_score,
        }
    }
}

/// One calendar day in the reference time zone.
///
/// Event values are day-cycle hours; scores come from the journal.
#[derive(Debug, Clone, PartialEq)]
pub struct DayRecord {
    pub date: NaiveDate,
    pub events: BTreeMap<EventType, f64>,
    pub mood_score: Option<f64>,
    pub energy_score: Option<f64>,
}

impl DayRecord {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            events: BTreeMap::new(),
            mood_score: None,
            energy_score: None,
        }
    }

    pub fn with_event(mut self, event_type: EventType, hour: f64) -> Self {
        self.events.insert(event_type, hour);
        self
    }

    pub fn with_score(mut self, score_type: ScoreType, value: f64) -> Self {
        self.set_score(score_type, value);
        self
    }

    pub fn event(&self, event_type: EventType) -> Option<f64> {
        self.events.get(&event_type).copied()
    }

    pub fn score(&self, score_type: ScoreType) -> Option<f64> {
        match score_type {
            ScoreType::Mood => self.mood_score,
            ScoreType::Energy => self.energy_score,
        }
    }

    pub fn set_score(&mut self, score_type: ScoreType, value: f64) {
        match score_type {
            ScoreType::Mood => self.mood_score = Some(value),
            ScoreType::Energy => self.energy_score = Some(value),
        }
    }
}

/// Row shape of the sleep export: every field arrives as text.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SleepExportRow {
    #[serde(default)]
    pub start: String,
    #[serde(default)]
    pub end: String,
    #[serde(default)]
    pub core: String,
    #[serde(default)]
    pub rem: String,
    #[serde(default)]
    pub deep: String,
    #[serde(default, rename = "inBed", alias = "in_bed")]
    pub in_bed: String,
}

/// Sleep session with durations in hours. Unparsable fields are `None`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SleepRecord {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub core: Option<f64>,
    pub rem: Option<f64>,
    pub deep: Option<f64>,
    pub in_bed: Option<f64>,
}

impl SleepRecord {
    pub fn from_export(row: &SleepExportRow) -> Self {
        Self {
            start: parse_instant(&row.start),
            end: parse_instant(&row.end),
            core: parse_number(&row.core),
            rem: parse_number(&row.rem),
            deep: parse_number(&row.deep),
            in_bed: parse_number(&row.in_bed),
        }
    }

    pub fn metric(&self, metric: SleepMetric) -> Option<f64> {
        match metric {
            SleepMetric::Core => self.core,
            SleepMetric::Rem => self.rem,
            SleepMetric::Deep => self.deep,
            SleepMetric::InBed => self.in_bed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SleepMetric {
    Core,
    Rem,
    Deep,
    InBed,
}

impl SleepMetric {
    pub fn label(&self) -> &'static str {
        match self {
            SleepMetric::Core => "core",
            SleepMetric::Rem => "REM",
            SleepMetric::Deep => "deep",
            SleepMetric::InBed => "in bed",
        }
    }
}

/// Numeric coercion at the export boundary: anything that is not a finite
/// number is treated as missing.
pub fn parse_number(value: &str) -> Option<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|parsed| parsed.is_finite())
}

pub fn parse_instant(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%d %H:%M:%S %z", "%Y-%m-%d %H:%M %z"] {
        if let Ok(dt) = DateTime::parse_from_str(value, format) {
            return Some(dt.with_timezone(&Utc));
        }
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Some(Utc.from_utc_datetime(&dt));
        }
    }
    None
}

/// Everything loaded for one query window, from CSV files or the database.
#[derive(Debug, Clone, Default)]
pub struct DataSet {
    pub events: Vec<RawEvent>,
    pub journals: Vec<JournalEntry>,
    pub sleep: Vec<SleepRecord>,
}

impl DataSet {
    /// Drop rows recorded before `since` (date-only journal rows compare by
    /// their UTC midnight).
    pub fn retain_since(&mut self, since: DateTime<Utc>) {
        self.events.retain(|event| event.timestamp >= since);
        self.journals.retain(|entry| match entry.recorded {
            JournalDate::Timestamp(ts) => ts >= since,
            JournalDate::Date(date) => date >= since.date_naive(),
        });
        self.sleep
            .retain(|record| record.start.map_or(true, |start| start >= since));
    }
}

/// Hours spent away from home on one day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocationDay {
    pub date: NaiveDate,
    pub time_outside: f64,
}

/// Slider bounds for choosing an event type's early/late split point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThresholdConfig {
    pub min: f64,
    pub max: f64,
    pub default: f64,
    pub event_type: EventType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum CorrelationStrength {
    #[serde(rename = "insufficient data")]
    InsufficientData,
    #[serde(rename = "negligible")]
    Negligible,
    #[serde(rename = "weak")]
    Weak,
    #[serde(rename = "moderate")]
    Moderate,
    #[serde(rename = "strong")]
    Strong,
    #[serde(rename = "very strong")]
    VeryStrong,
}

impl CorrelationStrength {
    pub fn as_str(&self) -> &'static str {
        match self {
            CorrelationStrength::InsufficientData => "insufficient data",
            CorrelationStrength::Negligible => "negligible",
            CorrelationStrength::Weak => "weak",
            CorrelationStrength::Moderate => "moderate",
            CorrelationStrength::Strong => "strong",
            CorrelationStrength::VeryStrong => "very strong",
        }
    }
}

impl fmt::Display for CorrelationStrength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a p-value was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PValueMethod {
    /// Welch two-sample t-test
    TTest,
    /// Mean-difference approximation used for degenerate cohorts
    Heuristic,
}

/// Size and mean outcome of one side of a threshold split.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CohortSummary {
    pub label: String,
    pub size: usize,
    pub average: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsResult {
    pub correlation: f64,
    pub correlation_strength: CorrelationStrength,
    pub average_score: f64,
    pub sample_size: usize,
    pub insight: String,
    pub p_value: Option<f64>,
    pub effect_size: Option<f64>,
    pub standard_dev: Option<f64>,
    pub p_value_method: Option<PValueMethod>,
    /// Days at or below the threshold (earlier / shorter)
    pub lower_cohort: CohortSummary,
    /// Days above the threshold (later / longer)
    pub upper_cohort: CohortSummary,
}

impl AnalyticsResult {
    pub fn insufficient(sample_size: usize, insight: impl Into<String>) -> Self {
        Self {
            correlation: 0.0,
            correlation_strength: CorrelationStrength::InsufficientData,
            average_score: 0.0,
            sample_size,
            insight: insight.into(),
            p_value: None,
            effect_size: None,
            standard_dev: None,
            p_value_method: None,
            lower_cohort: CohortSummary::default(),
            upper_cohort: CohortSummary::default(),
        }
    }

    pub fn has_enough_data(&self) -> bool {
        self.correlation_strength != CorrelationStrength::InsufficientData
    }
}
