use thiserror::Error;

/// Errors raised by the insight engine and its loaders.
///
/// Small samples, empty cohorts and zero-variance series are not errors;
/// analyzers report them through [`crate::models::AnalyticsResult`].
#[derive(Error, Debug)]
pub enum Error {
    #[error("unknown event type: {0}")]
    UnknownEventType(String),

    #[error("unknown score type: {0}")]
    UnknownScoreType(String),

    #[error("pivot hour must be within [0, 24), got {0}")]
    InvalidPivotHour(f64),

    #[error("unknown time zone: {0}")]
    InvalidTimeZone(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
