//! Insight analyzers.
//!
//! Each analyzer turns day records into paired `(measure, score)`
//! observations, splits them at a threshold into a lower cohort (earlier,
//! shorter) and an upper cohort (later, longer), and summarises the split
//! as an [`AnalyticsResult`] with a generated sentence.

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::config::EngineConfig;
use crate::models::{AnalyticsResult, CohortSummary, DayRecord, EventType, PValueMethod, ScoreType};
use crate::stats;
use crate::time;

/// Fewer paired observations than this never reach the statistics.
pub const MIN_SAMPLE_SIZE: usize = 3;

/// Below this |r| the insight reports no relationship.
const NEGLIGIBLE_CORRELATION: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Observation {
    measure: f64,
    score: f64,
}

impl Observation {
    fn new(measure: f64, score: f64) -> Option<Self> {
        (measure.is_finite() && score.is_finite()).then_some(Self { measure, score })
    }
}

/// Wording for one analysis.
struct Framing {
    kind: &'static str,
    /// What has to be present on a day for it to count
    requirement: String,
    /// "timing", "duration", "gap"
    measure_noun: &'static str,
    /// What the measure describes, e.g. "when you fall asleep"
    subject: String,
    threshold_text: String,
    /// Possessive subject, e.g. "your mood" or "your next-day mood"
    score_phrase: String,
    lower_full: String,
    lower_short: String,
    upper_full: String,
    upper_short: String,
}

/// Relationship between when an event happens and the same day's score.
///
/// Days with the event at or before `early_threshold` (any hour
/// representation; it is folded onto the day cycle) form the early cohort.
pub fn analyze_event_score(
    days: &[DayRecord],
    event_type: EventType,
    score_type: ScoreType,
    early_threshold: f64,
    config: &EngineConfig,
) -> AnalyticsResult {
    let pivot = config.pivot_hour;
    let observations: Vec<Observation> = days
        .iter()
        .filter_map(|day| {
            let hour = day.event(event_type)?;
            let score = day.score(score_type)?;
            Observation::new(time::fold_hour(hour, pivot), score)
        })
        .collect();

    let threshold_time = time::format_time_to_ampm(Some(early_threshold));
    let framing = Framing {
        kind: "event_score",
        requirement: format!("{event_type} times and {} scores", score_type.label()),
        measure_noun: "timing",
        subject: format!("when you {}", event_type.phrase()),
        threshold_text: threshold_time.clone(),
        score_phrase: format!("your {}", score_type.label()),
        lower_full: format!(
            "on days you {} earlier (by {threshold_time})",
            event_type.phrase()
        ),
        lower_short: "on earlier days".to_string(),
        upper_full: format!(
            "on days you {} later (after {threshold_time})",
            event_type.phrase()
        ),
        upper_short: "on later days".to_string(),
    };

    evaluate(
        &observations,
        time::fold_threshold(early_threshold, pivot),
        &framing,
    )
}

/// Relationship between how long a start/end span lasts and the score.
///
/// An end earlier than its start is read as an overnight span.
pub fn analyze_duration_impact(
    days: &[DayRecord],
    start_event: EventType,
    end_event: EventType,
    score_type: ScoreType,
    duration_threshold: f64,
    config: &EngineConfig,
) -> AnalyticsResult {
    let observations = span_observations(days, start_event, end_event, score_type, config);
    let threshold_text = time::format_duration(Some(duration_threshold));
    let activity = format!("from {} to {}", start_event.noun(), end_event.noun());

    let framing = Framing {
        kind: "duration_impact",
        requirement: format!(
            "both {start_event} and {end_event} times plus {} scores",
            score_type.label()
        ),
        measure_noun: "duration",
        subject: format!("how long sessions {activity} last"),
        threshold_text: threshold_text.clone(),
        score_phrase: format!("your {}", score_type.label()),
        lower_full: format!("on days with shorter sessions {activity} (up to {threshold_text})"),
        lower_short: "after shorter ones".to_string(),
        upper_full: format!("on days with longer sessions {activity} (over {threshold_text})"),
        upper_short: "after longer ones".to_string(),
    };

    evaluate(&observations, duration_threshold, &framing)
}

/// Relationship between the gap separating two events and the score.
pub fn analyze_sequential_gap(
    days: &[DayRecord],
    first_event: EventType,
    second_event: EventType,
    score_type: ScoreType,
    gap_threshold: f64,
    config: &EngineConfig,
) -> AnalyticsResult {
    let observations = span_observations(days, first_event, second_event, score_type, config);
    let threshold_text = time::format_duration(Some(gap_threshold));
    let activities = format!("between {} and {}", first_event.noun(), second_event.noun());

    let framing = Framing {
        kind: "sequential_gap",
        requirement: format!(
            "both {first_event} and {second_event} times plus {} scores",
            score_type.label()
        ),
        measure_noun: "gap",
        subject: format!("the gap {activities}"),
        threshold_text: threshold_text.clone(),
        score_phrase: format!("your {}", score_type.label()),
        lower_full: format!("on days with a shorter gap {activities} (up to {threshold_text})"),
        lower_short: "with a shorter gap".to_string(),
        upper_full: format!("on days with a longer gap {activities} (over {threshold_text})"),
        upper_short: "with a longer gap".to_string(),
    };

    evaluate(&observations, gap_threshold, &framing)
}

/// Relationship between when an event happened on the previous calendar
/// day and today's score.
pub fn analyze_previous_day_impact(
    days: &[DayRecord],
    event_type: EventType,
    score_type: ScoreType,
    threshold: f64,
    config: &EngineConfig,
) -> AnalyticsResult {
    let pivot = config.pivot_hour;
    let by_date: HashMap<NaiveDate, &DayRecord> = days.iter().map(|day| (day.date, day)).collect();

    let observations: Vec<Observation> = days
        .iter()
        .filter_map(|day| {
            let score = day.score(score_type)?;
            let previous = by_date.get(&day.date.pred_opt()?)?;
            let hour = previous.event(event_type)?;
            Observation::new(time::fold_hour(hour, pivot), score)
        })
        .collect();

    let threshold_time = time::format_time_to_ampm(Some(threshold));
    let framing = Framing {
        kind: "previous_day",
        requirement: format!(
            "{event_type} times followed by a next-day {} score",
            score_type.label()
        ),
        measure_noun: "timing",
        subject: format!("when you {}", event_type.phrase()),
        threshold_text: threshold_time.clone(),
        score_phrase: format!("your next-day {}", score_type.label()),
        lower_full: format!(
            "after days you {} earlier (by {threshold_time})",
            event_type.phrase()
        ),
        lower_short: "after earlier ones".to_string(),
        upper_full: format!(
            "after days you {} later (after {threshold_time})",
            event_type.phrase()
        ),
        upper_short: "after later ones".to_string(),
    };

    evaluate(&observations, time::fold_threshold(threshold, pivot), &framing)
}

/// Same-day `(span, score)` pairs for two events on one record.
fn span_observations(
    days: &[DayRecord],
    from: EventType,
    to: EventType,
    score_type: ScoreType,
    config: &EngineConfig,
) -> Vec<Observation> {
    let pivot = config.pivot_hour;
    days.iter()
        .filter_map(|day| {
            let start = time::fold_hour(day.event(from)?, pivot);
            let end = time::fold_hour(day.event(to)?, pivot);
            let score = day.score(score_type)?;
            Observation::new(time::forward_span(start, end), score)
        })
        .collect()
}

fn evaluate(observations: &[Observation], threshold: f64, framing: &Framing) -> AnalyticsResult {
    let sample_size = observations.len();
    if sample_size < MIN_SAMPLE_SIZE {
        tracing::debug!(analysis = framing.kind, sample_size, "not enough observations");
        return AnalyticsResult::insufficient(
            sample_size,
            format!(
                "Not enough data yet: at least {MIN_SAMPLE_SIZE} days with {} are needed (found {sample_size}).",
                framing.requirement
            ),
        );
    }

    let (lower, upper): (Vec<Observation>, Vec<Observation>) = observations
        .iter()
        .copied()
        .partition(|observation| observation.measure <= threshold);

    let measures: Vec<f64> = observations.iter().map(|o| o.measure).collect();
    let scores: Vec<f64> = observations.iter().map(|o| o.score).collect();
    let correlation = stats::correlation(&measures, &scores);
    let correlation_strength = stats::correlation_strength(correlation);

    let lower_scores: Vec<f64> = lower.iter().map(|o| o.score).collect();
    let upper_scores: Vec<f64> = upper.iter().map(|o| o.score).collect();
    let lower_average = stats::mean(&lower_scores);
    let upper_average = stats::mean(&upper_scores);

    let lower_cohort = CohortSummary {
        label: framing.lower_full.clone(),
        size: lower_scores.len(),
        average: lower_average,
    };
    let upper_cohort = CohortSummary {
        label: framing.upper_full.clone(),
        size: upper_scores.len(),
        average: upper_average,
    };

    tracing::debug!(
        analysis = framing.kind,
        sample_size,
        lower = lower_cohort.size,
        upper = upper_cohort.size,
        correlation,
        "split observations at threshold"
    );

    let (Some(lower_mean), Some(upper_mean)) = (lower_average, upper_average) else {
        let side = if lower_cohort.size == 0 { "above" } else { "at or below" };
        return AnalyticsResult {
            correlation,
            correlation_strength,
            average_score: lower_average.or(upper_average).unwrap_or(0.0),
            sample_size,
            insight: format!(
                "Need more varied {} data: all {sample_size} days fall {side} the {} threshold.",
                framing.measure_noun, framing.threshold_text
            ),
            p_value: None,
            effect_size: None,
            standard_dev: None,
            p_value_method: None,
            lower_cohort,
            upper_cohort,
        };
    };

    let effect_size = stats::effect_size(&lower_scores, &upper_scores);
    let standard_dev = stats::pooled_standard_deviation(&lower_scores, &upper_scores);
    let p_value = stats::p_value(&lower_scores, &upper_scores);

    if let Some(p) = p_value {
        tracing::trace!(analysis = framing.kind, p = p.value, method = ?p.method, "p-value");
    }

    let insight = if correlation.abs() < NEGLIGIBLE_CORRELATION {
        format!(
            "No clear relationship found between {} and {} across {sample_size} days.",
            framing.subject, framing.score_phrase
        )
    } else {
        let (high_mean, high_subject, low_mean, low_subject) = if lower_mean >= upper_mean {
            (lower_mean, &framing.lower_full, upper_mean, &framing.upper_short)
        } else {
            (upper_mean, &framing.upper_full, lower_mean, &framing.lower_short)
        };
        let clause = format!(
            "{} averages {high_mean:.1} {high_subject} versus {low_mean:.1} {low_subject}, a difference of {:.1} points.",
            framing.score_phrase,
            high_mean - low_mean,
        );
        with_confidence(&clause, p_value, effect_size)
    };

    AnalyticsResult {
        correlation,
        correlation_strength,
        average_score: lower_mean,
        sample_size,
        insight,
        p_value: p_value.map(|p| p.value),
        effect_size,
        standard_dev,
        p_value_method: p_value.map(|p| p.method),
        lower_cohort,
        upper_cohort,
    }
}

/// Qualifier for a cohort comparison, from the strongest band that both
/// the p-value and the effect size clear.
pub fn confidence_qualifier(p_value: Option<f64>, effect_size: Option<f64>) -> Option<&'static str> {
    let (p, d) = (p_value?, effect_size?);
    if p < 0.01 && d > 0.8 {
        Some("very strong evidence")
    } else if p < 0.05 && d > 0.5 {
        Some("strong evidence")
    } else if p < 0.1 && d > 0.2 {
        Some("some evidence")
    } else {
        None
    }
}

fn with_confidence(
    clause: &str,
    p_value: Option<stats::PValue>,
    effect_size: Option<f64>,
) -> String {
    match confidence_qualifier(p_value.map(|p| p.value), effect_size) {
        Some(qualifier) => {
            let note = match (p_value, effect_size) {
                (Some(p), Some(d)) if p.method == PValueMethod::TTest => {
                    format!(" (p = {:.3}, d = {d:.2})", p.value)
                }
                (Some(p), Some(d)) => format!(" (approximate p = {:.4}, d = {d:.2})", p.value),
                _ => String::new(),
            };
            let clause = clause.trim_end_matches('.');
            format!("There is {qualifier} that {clause}{note}.")
        }
        None => capitalize(clause),
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CorrelationStrength;

    fn config() -> EngineConfig {
        EngineConfig::new(chrono_tz::UTC, 18.0).unwrap()
    }

    fn day(n: u32) -> DayRecord {
        DayRecord::new(NaiveDate::from_ymd_opt(2024, 1, n).unwrap())
    }

    fn sleep_days(rows: &[(f64, f64)]) -> Vec<DayRecord> {
        rows.iter()
            .enumerate()
            .map(|(i, (hour, mood))| {
                day(i as u32 + 1)
                    .with_event(EventType::Asleep, *hour)
                    .with_score(ScoreType::Mood, *mood)
            })
            .collect()
    }

    #[test]
    fn too_few_days_is_insufficient() {
        for rows in [&[][..], &[(23.0, 7.0)][..], &[(23.0, 7.0), (25.0, 5.0)][..]] {
            let result = analyze_event_score(
                &sleep_days(rows),
                EventType::Asleep,
                ScoreType::Mood,
                24.0,
                &config(),
            );
            assert_eq!(result.sample_size, rows.len());
            assert_eq!(result.correlation_strength, CorrelationStrength::InsufficientData);
            assert_eq!(result.p_value, None);
            assert_eq!(result.effect_size, None);
            assert_eq!(result.standard_dev, None);
            assert!(result.insight.starts_with("Not enough data"));
        }
    }

    fn assert_insufficient(result: &AnalyticsResult, sample_size: usize) {
        assert_eq!(result.sample_size, sample_size);
        assert_eq!(result.correlation_strength, CorrelationStrength::InsufficientData);
        assert_eq!(result.p_value, None);
        assert_eq!(result.effect_size, None);
        assert_eq!(result.standard_dev, None);
        assert_eq!(result.p_value_method, None);
        assert!(result.insight.starts_with("Not enough data"), "{}", result.insight);
    }

    fn routine_days(n: usize) -> Vec<DayRecord> {
        (0..n)
            .map(|i| {
                day(i as u32 + 1)
                    .with_event(EventType::Asleep, 23.0)
                    .with_event(EventType::Awake, 7.0 + i as f64)
                    .with_event(EventType::StartWork, 9.0 + i as f64 * 0.5)
                    .with_score(ScoreType::Mood, 5.0 + i as f64)
                    .with_score(ScoreType::Energy, 4.0 + i as f64)
            })
            .collect()
    }

    #[test]
    fn span_analyzers_need_three_days() {
        for n in 0..MIN_SAMPLE_SIZE {
            let days = routine_days(n);
            let duration = analyze_duration_impact(
                &days,
                EventType::Asleep,
                EventType::Awake,
                ScoreType::Energy,
                8.0,
                &config(),
            );
            assert_insufficient(&duration, n);

            let gap = analyze_sequential_gap(
                &days,
                EventType::Awake,
                EventType::StartWork,
                ScoreType::Mood,
                1.5,
                &config(),
            );
            assert_insufficient(&gap, n);
        }
    }

    #[test]
    fn previous_day_needs_three_consecutive_pairs() {
        let sleep = |n: u32| day(n).with_event(EventType::Asleep, 23.0);
        let scored = |n: u32, mood: f64| day(n).with_score(ScoreType::Mood, mood);

        let cases = vec![
            // every score sits after a missing date
            (vec![sleep(1), scored(3, 7.0), sleep(5), scored(7, 5.0)], 0),
            (vec![sleep(1), scored(2, 7.0), sleep(4), scored(6, 5.0)], 1),
            (
                vec![sleep(1), scored(2, 7.0), sleep(4), scored(5, 5.0), scored(8, 6.0)],
                2,
            ),
        ];
        for (days, pairs) in cases {
            let result = analyze_previous_day_impact(
                &days,
                EventType::Asleep,
                ScoreType::Mood,
                24.0,
                &config(),
            );
            assert_insufficient(&result, pairs);
        }
    }

    #[test]
    fn days_missing_fields_are_skipped() {
        let mut days = sleep_days(&[(23.0, 7.0), (25.0, 5.0), (23.5, 7.0)]);
        days.push(day(10).with_event(EventType::Asleep, 23.0));
        days.push(day(11).with_score(ScoreType::Mood, 9.0));
        let result = analyze_event_score(&days, EventType::Asleep, ScoreType::Mood, 24.0, &config());
        assert_eq!(result.sample_size, 3);
    }

    #[test]
    fn earlier_sleep_with_higher_mood() {
        let days = sleep_days(&[(23.0, 7.0), (25.0, 5.0), (23.0, 7.0), (25.0, 5.0), (23.0, 7.0)]);
        let result = analyze_event_score(&days, EventType::Asleep, ScoreType::Mood, 24.0, &config());

        assert_eq!(result.sample_size, 5);
        assert!(result.correlation < -0.99);
        assert_eq!(result.correlation_strength, CorrelationStrength::VeryStrong);
        assert_eq!(result.lower_cohort.size, 3);
        assert_eq!(result.upper_cohort.size, 2);
        assert_eq!(result.average_score, 7.0);
        // constant cohorts: no effect size, heuristic p-value
        assert_eq!(result.effect_size, None);
        assert_eq!(result.p_value, Some(stats::DISTINCT_CONSTANTS_P_VALUE));
        assert_eq!(result.p_value_method, Some(PValueMethod::Heuristic));
        assert!(result.insight.contains("earlier"), "{}", result.insight);
        assert!(result.insight.contains("7.0"));
        assert!(result.insight.contains("5.0"));
        assert!(result.insight.contains("2.0 points"));
    }

    #[test]
    fn clock_hour_thresholds_fold_like_cycle_hours() {
        let days = sleep_days(&[(23.0, 7.0), (1.0, 5.0), (22.5, 8.0), (0.5, 4.0)]);
        let folded = analyze_event_score(&days, EventType::Asleep, ScoreType::Mood, 24.0, &config());
        let clock = analyze_event_score(&days, EventType::Asleep, ScoreType::Mood, 0.0, &config());
        assert_eq!(folded.lower_cohort.size, 2);
        assert_eq!(folded.lower_cohort.size, clock.lower_cohort.size);
        assert_eq!(folded.correlation, clock.correlation);
    }

    #[test]
    fn slider_bounds_split_at_the_ends_of_the_range() {
        // 17:30 folds to 41.5, so the slider tops out at 42.0 = pivot + 24.
        let days = sleep_days(&[(20.0, 8.0), (23.0, 7.0), (17.5, 4.0), (22.0, 6.0)]);
        let slider = crate::averages::threshold_config(&days, EventType::Asleep, &config());
        assert_eq!(slider.min, 20.0);
        assert_eq!(slider.max, 42.0);

        let at_max =
            analyze_event_score(&days, EventType::Asleep, ScoreType::Mood, slider.max, &config());
        assert_eq!(at_max.lower_cohort.size, 4);
        assert_eq!(at_max.upper_cohort.size, 0);
        assert!(at_max.insight.contains("at or below"), "{}", at_max.insight);

        let at_min =
            analyze_event_score(&days, EventType::Asleep, ScoreType::Mood, slider.min, &config());
        assert_eq!(at_min.lower_cohort.size, 1);
        assert_eq!(at_min.upper_cohort.size, 3);

        let lagged = analyze_previous_day_impact(
            &days,
            EventType::Asleep,
            ScoreType::Mood,
            slider.max,
            &config(),
        );
        assert_eq!(lagged.upper_cohort.size, 0);
    }

    #[test]
    fn later_cohort_can_be_the_happier_one() {
        let days = sleep_days(&[(22.0, 4.0), (22.5, 5.0), (25.0, 8.0), (25.5, 7.0), (26.0, 9.0)]);
        let result = analyze_event_score(&days, EventType::Asleep, ScoreType::Mood, 24.0, &config());
        assert!(result.correlation > 0.0);
        assert!(result.insight.contains("later (after 12:00 AM)"), "{}", result.insight);
        assert!(result.insight.contains("8.0"));
        assert!(result.insight.contains("4.5"));
    }

    #[test]
    fn single_cohort_asks_for_variety() {
        let days = sleep_days(&[(22.0, 6.0), (22.5, 5.0), (23.0, 8.0)]);
        let result = analyze_event_score(&days, EventType::Asleep, ScoreType::Mood, 24.0, &config());
        assert_eq!(result.sample_size, 3);
        assert!(result.insight.starts_with("Need more varied timing data"));
        assert!(!result.insight.contains("NaN"));
        assert_eq!(result.average_score, 19.0 / 3.0);
        assert_eq!(result.upper_cohort.average, None);
        assert_eq!(result.p_value, None);
    }

    #[test]
    fn flat_scores_report_no_relationship() {
        let days = sleep_days(&[(22.0, 6.0), (23.0, 6.0), (25.0, 6.0), (26.0, 6.0)]);
        let result = analyze_event_score(&days, EventType::Asleep, ScoreType::Mood, 24.0, &config());
        assert_eq!(result.correlation, 0.0);
        assert!(result.insight.starts_with("No clear relationship"), "{}", result.insight);
        assert_eq!(result.p_value, Some(1.0));
    }

    #[test]
    fn qualifier_bands() {
        assert_eq!(confidence_qualifier(Some(0.005), Some(1.2)), Some("very strong evidence"));
        assert_eq!(confidence_qualifier(Some(0.005), Some(0.6)), Some("strong evidence"));
        assert_eq!(confidence_qualifier(Some(0.08), Some(0.3)), Some("some evidence"));
        assert_eq!(confidence_qualifier(Some(0.2), Some(2.0)), None);
        assert_eq!(confidence_qualifier(Some(0.001), None), None);
    }

    #[test]
    fn strong_split_gets_evidence_prefix() {
        let days = sleep_days(&[
            (22.0, 8.0),
            (22.5, 8.5),
            (23.0, 7.5),
            (23.5, 8.0),
            (25.0, 4.0),
            (25.5, 4.5),
            (26.0, 3.5),
            (26.5, 4.0),
        ]);
        let result = analyze_event_score(&days, EventType::Asleep, ScoreType::Mood, 24.0, &config());
        assert_eq!(result.p_value_method, Some(PValueMethod::TTest));
        assert!(result.p_value.unwrap() < 0.01);
        assert!(result.effect_size.unwrap() > 0.8);
        assert!(
            result.insight.starts_with("There is very strong evidence that your mood"),
            "{}",
            result.insight
        );
        assert!(result.insight.contains("p = "));
    }

    #[test]
    fn duration_wraps_overnight() {
        let days: Vec<DayRecord> = [(23.0, 7.0, 6.0), (1.0, 7.0, 4.0), (22.0, 7.5, 8.0), (0.5, 6.0, 3.0)]
            .iter()
            .enumerate()
            .map(|(i, (asleep, awake, energy))| {
                day(i as u32 + 1)
                    .with_event(EventType::Asleep, *asleep)
                    .with_event(EventType::Awake, *awake)
                    .with_score(ScoreType::Energy, *energy)
            })
            .collect();
        let result = analyze_duration_impact(
            &days,
            EventType::Asleep,
            EventType::Awake,
            ScoreType::Energy,
            7.0,
            &config(),
        );
        // durations: 8, 6, 9.5, 5.5
        assert_eq!(result.sample_size, 4);
        assert_eq!(result.lower_cohort.size, 2);
        assert_eq!(result.upper_cohort.size, 2);
        assert!(result.correlation > 0.9);
        assert!(result.insight.contains("longer sessions"), "{}", result.insight);
        assert!(result.insight.contains("shorter"));
    }

    #[test]
    fn gap_between_events() {
        let days: Vec<DayRecord> = [(7.0, 7.5, 8.0), (7.0, 10.0, 4.0), (6.5, 7.0, 8.0), (8.0, 11.0, 4.0)]
            .iter()
            .enumerate()
            .map(|(i, (awake, work, mood))| {
                day(i as u32 + 1)
                    .with_event(EventType::Awake, *awake + 24.0)
                    .with_event(EventType::StartWork, *work + 24.0)
                    .with_score(ScoreType::Mood, *mood)
            })
            .collect();
        let result = analyze_sequential_gap(
            &days,
            EventType::Awake,
            EventType::StartWork,
            ScoreType::Mood,
            1.0,
            &config(),
        );
        assert_eq!(result.lower_cohort.size, 2);
        assert!(result.correlation < -0.9);
        assert!(
            result.insight.contains("shorter gap between waking up and starting work"),
            "{}",
            result.insight
        );
    }

    #[test]
    fn previous_day_pairs_need_consecutive_dates() {
        let days = vec![
            day(1).with_event(EventType::Asleep, 23.0),
            day(2)
                .with_event(EventType::Asleep, 25.0)
                .with_score(ScoreType::Mood, 8.0),
            day(3)
                .with_event(EventType::Asleep, 22.5)
                .with_score(ScoreType::Mood, 4.0),
            day(4).with_score(ScoreType::Mood, 8.5),
            // gap: day 5 missing, so day 6 has no pair
            day(6).with_score(ScoreType::Mood, 1.0),
        ];
        let result = analyze_previous_day_impact(
            &days,
            EventType::Asleep,
            ScoreType::Mood,
            24.0,
            &config(),
        );
        assert_eq!(result.sample_size, 3);
        assert_eq!(result.lower_cohort.size, 2);
        assert_eq!(result.lower_cohort.average, Some(8.25));
        assert_eq!(result.upper_cohort.average, Some(4.0));
        assert!(result.insight.contains("next-day mood"), "{}", result.insight);
    }

    #[test]
    fn non_finite_values_are_dropped() {
        let days = sleep_days(&[(23.0, f64::NAN), (25.0, 5.0), (23.0, 7.0), (f64::INFINITY, 6.0)]);
        let result = analyze_event_score(&days, EventType::Asleep, ScoreType::Mood, 24.0, &config());
        assert_eq!(result.sample_size, 2);
        assert_eq!(result.correlation_strength, CorrelationStrength::InsufficientData);
    }
}
