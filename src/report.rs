use std::collections::HashMap;
use std::fmt::Write;

use chrono::NaiveDate;
use serde::Serialize;

use crate::aggregate;
use crate::analyzers;
use crate::averages;
use crate::config::EngineConfig;
use crate::models::{
    AnalyticsResult, DataSet, DayRecord, EventType, PValueMethod, ScoreType, SleepMetric,
};
use crate::time::{format_duration, format_time_to_ampm};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventTypeSummary {
    pub event_type: EventType,
    pub days: usize,
    pub average_time: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NamedAnalysis {
    pub title: String,
    #[serde(flatten)]
    pub result: AnalyticsResult,
}

/// Machine-readable counterpart of [`build_report`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportData {
    pub event_mix: Vec<EventTypeSummary>,
    pub analyses: Vec<NamedAnalysis>,
}

pub fn report_data(days: &[DayRecord], config: &EngineConfig) -> ReportData {
    ReportData {
        event_mix: summarize_by_type(days, config),
        analyses: standard_analyses(days, config),
    }
}

/// Per event type: how many days have it and its average day-cycle hour.
pub fn summarize_by_type(days: &[DayRecord], config: &EngineConfig) -> Vec<EventTypeSummary> {
    let mut counts: HashMap<EventType, usize> = HashMap::new();
    for day in days {
        for event_type in day.events.keys() {
            *counts.entry(*event_type).or_insert(0) += 1;
        }
    }

    let mut summaries: Vec<EventTypeSummary> = counts
        .into_iter()
        .map(|(event_type, days_with_event)| EventTypeSummary {
            event_type,
            days: days_with_event,
            average_time: averages::average_time(days, event_type, config),
        })
        .collect();

    summaries.sort_by(|a, b| b.days.cmp(&a.days).then(a.event_type.cmp(&b.event_type)));
    summaries
}

fn span_threshold(
    days: &[DayRecord],
    from: EventType,
    to: EventType,
    fallback: f64,
    config: &EngineConfig,
) -> f64 {
    averages::average_span(days, from, to, config).unwrap_or(fallback)
}

/// The analyses the dashboard shows by default, each split at the average.
pub fn standard_analyses(days: &[DayRecord], config: &EngineConfig) -> Vec<NamedAnalysis> {
    let sleep_time = averages::threshold_config(days, EventType::Asleep, config).default;
    let sleep_length = span_threshold(days, EventType::Asleep, EventType::Awake, 8.0, config);
    let commute_gap = span_threshold(days, EventType::Awake, EventType::StartWork, 1.5, config);
    let work_length = span_threshold(days, EventType::StartWork, EventType::EndWork, 8.0, config);

    vec![
        NamedAnalysis {
            title: "Bedtime and mood".to_string(),
            result: analyzers::analyze_event_score(
                days,
                EventType::Asleep,
                ScoreType::Mood,
                sleep_time,
                config,
            ),
        },
        NamedAnalysis {
            title: "Bedtime and energy".to_string(),
            result: analyzers::analyze_event_score(
                days,
                EventType::Asleep,
                ScoreType::Energy,
                sleep_time,
                config,
            ),
        },
        NamedAnalysis {
            title: "Sleep length and energy".to_string(),
            result: analyzers::analyze_duration_impact(
                days,
                EventType::Asleep,
                EventType::Awake,
                ScoreType::Energy,
                sleep_length,
                config,
            ),
        },
        NamedAnalysis {
            title: "Work hours and mood".to_string(),
            result: analyzers::analyze_duration_impact(
                days,
                EventType::StartWork,
                EventType::EndWork,
                ScoreType::Mood,
                work_length,
                config,
            ),
        },
        NamedAnalysis {
            title: "Wake-to-work gap and mood".to_string(),
            result: analyzers::analyze_sequential_gap(
                days,
                EventType::Awake,
                EventType::StartWork,
                ScoreType::Mood,
                commute_gap,
                config,
            ),
        },
        NamedAnalysis {
            title: "Last night's bedtime and mood".to_string(),
            result: analyzers::analyze_previous_day_impact(
                days,
                EventType::Asleep,
                ScoreType::Mood,
                sleep_time,
                config,
            ),
        },
    ]
}

pub fn build_report(data: &DataSet, since: NaiveDate, config: &EngineConfig) -> String {
    let days = aggregate::build_day_records(&data.events, &data.journals, config);
    let summaries = summarize_by_type(&days, config);
    let analyses = standard_analyses(&days, config);
    let outside = averages::time_outside_by_day(&days, config);

    let mut output = String::new();

    let _ = writeln!(output, "# Lifelog Insights Report");
    let _ = writeln!(
        output,
        "Generated for {} with days starting at {} (data since {})",
        config.time_zone.name(),
        format_time_to_ampm(Some(config.pivot_hour)),
        since
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Event Mix");

    if summaries.is_empty() {
        let _ = writeln!(output, "No events recorded for this window.");
    } else {
        for summary in summaries.iter() {
            let _ = writeln!(
                output,
                "- {}: {} days (avg {})",
                summary.event_type,
                summary.days,
                format_time_to_ampm(summary.average_time)
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Averages");
    for metric in [
        SleepMetric::InBed,
        SleepMetric::Core,
        SleepMetric::Rem,
        SleepMetric::Deep,
    ] {
        let _ = writeln!(
            output,
            "- Sleep ({}): {}",
            metric.label(),
            format_duration(averages::average_duration(&data.sleep, metric))
        );
    }
    let _ = writeln!(
        output,
        "- Time outside: {} across {} days",
        format_duration(Some(averages::average_time_outside(&outside))),
        outside.len()
    );

    let _ = writeln!(output);
    let _ = writeln!(output, "## Insights");

    for analysis in analyses.iter() {
        let result = &analysis.result;
        let _ = writeln!(output);
        let _ = writeln!(output, "### {}", analysis.title);
        let _ = writeln!(output, "{}", result.insight);
        if result.has_enough_data() {
            let _ = writeln!(
                output,
                "- r = {:.2} ({}), n = {}",
                result.correlation, result.correlation_strength, result.sample_size
            );
        }
        if let (Some(p), Some(method)) = (result.p_value, result.p_value_method) {
            let label = match method {
                PValueMethod::TTest => "p",
                PValueMethod::Heuristic => "approximate p",
            };
            let _ = writeln!(output, "- {label} = {p:.4}");
        }
        if let Some(d) = result.effect_size {
            let _ = writeln!(output, "- effect size d = {d:.2}");
        }
    }

    output
}
