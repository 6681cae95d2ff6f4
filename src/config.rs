//! Engine and application configuration.
//!
//! [`EngineConfig`] is the only configuration the statistics engine sees.
//! [`AppConfig`] is the TOML file the CLI reads; every section is optional.

use std::path::Path;

use chrono_tz::Tz;
use serde::Deserialize;

use crate::error::{Error, Result};

pub const DEFAULT_TIME_ZONE: Tz = chrono_tz::America::Los_Angeles;
pub const DEFAULT_PIVOT_HOUR: f64 = 18.0;

/// Reference time zone and pivot hour used to place events on the day cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    pub time_zone: Tz,
    pub pivot_hour: f64,
}

impl EngineConfig {
    pub fn new(time_zone: Tz, pivot_hour: f64) -> Result<Self> {
        if !(0.0..24.0).contains(&pivot_hour) {
            return Err(Error::InvalidPivotHour(pivot_hour));
        }
        Ok(Self {
            time_zone,
            pivot_hour,
        })
    }

    /// Build from a zone name such as `Europe/Berlin`.
    pub fn from_zone_name(name: &str, pivot_hour: f64) -> Result<Self> {
        let time_zone = parse_time_zone(name)?;
        Self::new(time_zone, pivot_hour)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            time_zone: DEFAULT_TIME_ZONE,
            pivot_hour: DEFAULT_PIVOT_HOUR,
        }
    }
}

pub fn parse_time_zone(name: &str) -> Result<Tz> {
    name.parse::<Tz>()
        .map_err(|_| Error::InvalidTimeZone(name.to_string()))
}

/// Contents of the optional `lifelog.toml` file.
#[derive(Debug, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub engine: EngineSection,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub tables: TableNames,

    #[serde(default)]
    pub analysis: AnalysisConfig,
}

#[derive(Debug, Deserialize)]
pub struct EngineSection {
    #[serde(default = "default_time_zone")]
    pub time_zone: String,

    #[serde(default = "default_pivot_hour")]
    pub pivot_hour: f64,
}

impl Default for EngineSection {
    fn default() -> Self {
        Self {
            time_zone: default_time_zone(),
            pivot_hour: default_pivot_hour(),
        }
    }
}

fn default_time_zone() -> String {
    DEFAULT_TIME_ZONE.name().to_string()
}

fn default_pivot_hour() -> f64 {
    DEFAULT_PIVOT_HOUR
}

#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

/// Names of the remote tables rows are fetched from.
#[derive(Debug, Deserialize)]
pub struct TableNames {
    #[serde(default = "default_events_table")]
    pub events: String,

    #[serde(default = "default_journal_table")]
    pub journal: String,

    #[serde(default = "default_sleep_table")]
    pub sleep: String,
}

impl Default for TableNames {
    fn default() -> Self {
        Self {
            events: default_events_table(),
            journal: default_journal_table(),
            sleep: default_sleep_table(),
        }
    }
}

fn default_events_table() -> String {
    "events".to_string()
}

fn default_journal_table() -> String {
    "journal_entries".to_string()
}

fn default_sleep_table() -> String {
    "sleep_records".to_string()
}

#[derive(Debug, Deserialize)]
pub struct AnalysisConfig {
    /// Size of the query window in days
    #[serde(default = "default_since_days")]
    pub since_days: i64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            since_days: default_since_days(),
        }
    }
}

fn default_since_days() -> i64 {
    90
}

impl AppConfig {
    /// Load from `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    pub fn parse(contents: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.analysis.since_days < 1 {
            return Err(Error::Config(format!(
                "analysis.since_days must be positive, got {}",
                self.analysis.since_days
            )));
        }
        for name in [&self.tables.events, &self.tables.journal, &self.tables.sleep] {
            if !is_table_identifier(name) {
                return Err(Error::Config(format!("invalid table name: {name}")));
            }
        }
        self.engine_config().map(|_| ())
    }

    pub fn engine_config(&self) -> Result<EngineConfig> {
        EngineConfig::from_zone_name(&self.engine.time_zone, self.engine.pivot_hour)
    }
}

/// Table names are interpolated into SQL, so only `schema.table` style
/// identifiers are accepted.
pub fn is_table_identifier(name: &str) -> bool {
    !name.is_empty()
        && name.split('.').all(|part| {
            !part.is_empty()
                && part
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_')
                && !part.starts_with(|c: char| c.is_ascii_digit())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_engine_uses_six_pm_pivot() {
        let config = EngineConfig::default();
        assert_eq!(config.pivot_hour, 18.0);
        assert_eq!(config.time_zone, DEFAULT_TIME_ZONE);
    }

    #[test]
    fn rejects_pivot_outside_day() {
        assert!(matches!(
            EngineConfig::new(chrono_tz::UTC, 24.0),
            Err(Error::InvalidPivotHour(_))
        ));
        assert!(EngineConfig::new(chrono_tz::UTC, -1.0).is_err());
        assert!(EngineConfig::new(chrono_tz::UTC, 4.0).is_ok());
    }

    #[test]
    fn rejects_unknown_zone() {
        assert!(matches!(
            EngineConfig::from_zone_name("Mars/Olympus", 18.0),
            Err(Error::InvalidTimeZone(_))
        ));
    }

    #[test]
    fn parses_partial_toml() {
        let config = AppConfig::parse(
            r#"
            [engine]
            time_zone = "Europe/Berlin"
            pivot_hour = 4

            [tables]
            events = "lifelog.events"
            "#,
        )
        .unwrap();

        let engine = config.engine_config().unwrap();
        assert_eq!(engine.time_zone, chrono_tz::Europe::Berlin);
        assert_eq!(engine.pivot_hour, 4.0);
        assert_eq!(config.tables.events, "lifelog.events");
        assert_eq!(config.tables.journal, "journal_entries");
        assert_eq!(config.analysis.since_days, 90);
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn rejects_injected_table_name() {
        let result = AppConfig::parse(
            r#"
            [tables]
            events = "events; DROP TABLE events"
            "#,
        );
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.engine.pivot_hour, DEFAULT_PIVOT_HOUR);
    }

    #[test]
    fn loads_file_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[analysis]\nsince_days = 30").unwrap();
        let config = AppConfig::load(file.path()).unwrap();
        assert_eq!(config.analysis.since_days, 30);
    }
}
