//! # lifelog-insights
//!
//! Statistical insight engine for a personal quantified-self dashboard.
//!
//! Data flows one way:
//! - raw events and journal entries are folded into [`DayRecord`]s on a
//!   sleep-aware day cycle ([`time`], [`aggregate`])
//! - analyzers split the days into two cohorts at a threshold and compare
//!   them ([`analyzers`], [`stats`])
//! - each analysis yields an [`AnalyticsResult`] with a generated sentence
//!
//! The engine is synchronous and never performs I/O; [`db`] and [`import`]
//! load rows for the CLI.
//!
//! ```rust,no_run
//! use lifelog_insights::{aggregate, analyzers, EngineConfig, EventType, ScoreType};
//!
//! let config = EngineConfig::default();
//! let days = aggregate::build_day_records(&[], &[], &config);
//! let result = analyzers::analyze_event_score(&days, EventType::Asleep, ScoreType::Mood, 24.0, &config);
//! println!("{}", result.insight);
//! ```

pub use config::{AppConfig, EngineConfig};
pub use error::{Error, Result};
pub use models::*;

pub mod aggregate;
pub mod analyzers;
pub mod averages;
pub mod config;
pub mod db;
pub mod error;
pub mod import;
pub mod logging;
pub mod models;
pub mod report;
pub mod stats;
pub mod time;
