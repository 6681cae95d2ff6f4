use std::path::PathBuf;

use anyhow::Context;
use chrono::{Duration, Utc};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use sqlx::postgres::PgPoolOptions;

use lifelog_insights::time::{format_duration, format_time_to_ampm};
use lifelog_insights::{
    aggregate, analyzers, averages, db, import, logging, report, AnalyticsResult, AppConfig,
    DataSet, EngineConfig, EventType, PValueMethod, ScoreType, SleepMetric, ThresholdConfig,
};

#[derive(Parser)]
#[command(name = "lifelog-insights")]
#[command(about = "Relate sleep and daily routines to self-reported mood and energy", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true, default_value = "lifelog.toml")]
    config: PathBuf,
    /// Reference time zone, e.g. Europe/Berlin
    #[arg(long, global = true)]
    timezone: Option<String>,
    /// Hour the logical day starts at
    #[arg(long, global = true)]
    pivot_hour: Option<f64>,
    /// Size of the query window in days
    #[arg(long, global = true)]
    since_days: Option<i64>,
    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,
    #[command(flatten)]
    source: SourceArgs,
    #[command(subcommand)]
    command: Commands,
}

/// Local CSV exports. When none is given, rows come from `DATABASE_URL`.
#[derive(Args)]
struct SourceArgs {
    #[arg(long, global = true)]
    events: Option<PathBuf>,
    #[arg(long, global = true)]
    journal: Option<PathBuf>,
    #[arg(long, global = true)]
    sleep: Option<PathBuf>,
}

impl SourceArgs {
    fn any(&self) -> bool {
        self.events.is_some() || self.journal.is_some() || self.sleep.is_some()
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Compare scores on days an event happens early versus late
    Relationship {
        #[arg(long)]
        event: EventType,
        #[arg(long, default_value = "mood")]
        score: ScoreType,
        /// Split point as an hour (defaults to the average time)
        #[arg(long)]
        threshold: Option<f64>,
    },
    /// Compare scores after short versus long spans between two events
    Duration {
        #[arg(long)]
        start: EventType,
        #[arg(long)]
        end: EventType,
        #[arg(long, default_value = "energy")]
        score: ScoreType,
        /// Split point in hours (defaults to the average span)
        #[arg(long)]
        threshold: Option<f64>,
    },
    /// Compare scores after short versus long gaps between two events
    Gap {
        #[arg(long)]
        first: EventType,
        #[arg(long)]
        second: EventType,
        #[arg(long, default_value = "mood")]
        score: ScoreType,
        /// Split point in hours (defaults to the average gap)
        #[arg(long)]
        threshold: Option<f64>,
    },
    /// Compare next-day scores after early versus late events
    Lag {
        #[arg(long)]
        event: EventType,
        #[arg(long, default_value = "mood")]
        score: ScoreType,
        /// Split point as an hour (defaults to the average time)
        #[arg(long)]
        threshold: Option<f64>,
    },
    /// Show average times, sleep durations and threshold ranges
    Averages,
    /// Generate a markdown report
    Report {
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AveragesOutput {
    average_times: Vec<(EventType, Option<f64>)>,
    sleep_durations: Vec<(&'static str, Option<f64>)>,
    average_time_outside: f64,
    thresholds: Vec<ThresholdConfig>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let app = AppConfig::load(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    logging::init(&app.logging.level);

    let engine = engine_config(&cli, &app)?;
    let since_days = cli.since_days.unwrap_or(app.analysis.since_days).max(1);
    let since = Utc::now() - Duration::days(since_days);

    let data = load_data(&cli.source, &app, since).await?;
    let days = aggregate::build_day_records(&data.events, &data.journals, &engine);
    tracing::info!(
        events = data.events.len(),
        journals = data.journals.len(),
        days = days.len(),
        since_days,
        "loaded data"
    );

    match cli.command {
        Commands::Relationship {
            event,
            score,
            threshold,
        } => {
            let threshold = threshold
                .unwrap_or_else(|| averages::threshold_config(&days, event, &engine).default);
            let result = analyzers::analyze_event_score(&days, event, score, threshold, &engine);
            print_result(&result, cli.json)?;
        }
        Commands::Duration {
            start,
            end,
            score,
            threshold,
        } => {
            let threshold = threshold
                .or_else(|| averages::average_span(&days, start, end, &engine))
                .unwrap_or(0.0);
            let result =
                analyzers::analyze_duration_impact(&days, start, end, score, threshold, &engine);
            print_result(&result, cli.json)?;
        }
        Commands::Gap {
            first,
            second,
            score,
            threshold,
        } => {
            let threshold = threshold
                .or_else(|| averages::average_span(&days, first, second, &engine))
                .unwrap_or(0.0);
            let result =
                analyzers::analyze_sequential_gap(&days, first, second, score, threshold, &engine);
            print_result(&result, cli.json)?;
        }
        Commands::Lag {
            event,
            score,
            threshold,
        } => {
            let threshold = threshold
                .unwrap_or_else(|| averages::threshold_config(&days, event, &engine).default);
            let result =
                analyzers::analyze_previous_day_impact(&days, event, score, threshold, &engine);
            print_result(&result, cli.json)?;
        }
        Commands::Averages => {
            let outside = averages::time_outside_by_day(&days, &engine);
            let output = AveragesOutput {
                average_times: EventType::ALL
                    .iter()
                    .map(|event| (*event, averages::average_time(&days, *event, &engine)))
                    .collect(),
                sleep_durations: [
                    SleepMetric::InBed,
                    SleepMetric::Core,
                    SleepMetric::Rem,
                    SleepMetric::Deep,
                ]
                .iter()
                .map(|metric| (metric.label(), averages::average_duration(&data.sleep, *metric)))
                .collect(),
                average_time_outside: averages::average_time_outside(&outside),
                thresholds: EventType::ALL
                    .iter()
                    .map(|event| averages::threshold_config(&days, *event, &engine))
                    .collect(),
            };
            print_averages(&output, cli.json)?;
        }
        Commands::Report { out } => {
            let contents = if cli.json {
                serde_json::to_string_pretty(&report::report_data(&days, &engine))?
            } else {
                report::build_report(&data, since.date_naive(), &engine)
            };
            std::fs::write(&out, contents)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}

fn engine_config(cli: &Cli, app: &AppConfig) -> anyhow::Result<EngineConfig> {
    let zone = cli.timezone.as_deref().unwrap_or(&app.engine.time_zone);
    let pivot_hour = cli.pivot_hour.unwrap_or(app.engine.pivot_hour);
    Ok(EngineConfig::from_zone_name(zone, pivot_hour)?)
}

async fn load_data(
    source: &SourceArgs,
    app: &AppConfig,
    since: chrono::DateTime<Utc>,
) -> anyhow::Result<DataSet> {
    if source.any() {
        let mut data = DataSet::default();
        if let Some(path) = &source.events {
            data.events = import::read_events(path)
                .with_context(|| format!("failed to read events from {}", path.display()))?;
        }
        if let Some(path) = &source.journal {
            data.journals = import::read_journal(path)
                .with_context(|| format!("failed to read journal from {}", path.display()))?;
        }
        if let Some(path) = &source.sleep {
            data.sleep = import::read_sleep(path)
                .with_context(|| format!("failed to read sleep export from {}", path.display()))?;
        }
        data.retain_since(since);
        return Ok(data);
    }

    let database_url = std::env::var("DATABASE_URL")
        .context("DATABASE_URL must be set when no CSV exports are given")?;

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .context("failed to connect to Postgres")?;

    let data = db::fetch_dataset(&pool, &app.tables, since)
        .await
        .context("failed to fetch rows")?;
    Ok(data)
}

fn print_result(result: &AnalyticsResult, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(result)?);
        return Ok(());
    }

    println!("{}", result.insight);
    if !result.has_enough_data() {
        return Ok(());
    }

    println!(
        "- correlation {:.2} ({}) across {} days",
        result.correlation, result.correlation_strength, result.sample_size
    );
    for cohort in [&result.lower_cohort, &result.upper_cohort] {
        match cohort.average {
            Some(average) => println!("- {} days {}: avg {:.1}", cohort.size, cohort.label, average),
            None => println!("- no days {}", cohort.label),
        }
    }
    if let Some(p) = result.p_value {
        let label = match result.p_value_method {
            Some(PValueMethod::TTest) => "p-value",
            _ => "approximate p-value",
        };
        println!("- {label} {p:.4}");
    }
    if let Some(d) = result.effect_size {
        println!("- effect size {d:.2}");
    }
    if let Some(sd) = result.standard_dev {
        println!("- pooled standard deviation {sd:.2}");
    }
    Ok(())
}

fn print_averages(output: &AveragesOutput, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(output)?);
        return Ok(());
    }

    println!("Average times:");
    for (event, hour) in output.average_times.iter() {
        println!("- {}: {}", event, format_time_to_ampm(*hour));
    }
    println!("Sleep:");
    for (label, hours) in output.sleep_durations.iter() {
        println!("- {}: {}", label, format_duration(*hours));
    }
    println!(
        "Time outside per day: {}",
        format_duration(Some(output.average_time_outside))
    );
    println!("Threshold ranges:");
    for threshold in output.thresholds.iter() {
        println!(
            "- {}: {} to {} (default {})",
            threshold.event_type,
            format_time_to_ampm(Some(threshold.min)),
            format_time_to_ampm(Some(threshold.max)),
            format_time_to_ampm(Some(threshold.default))
        );
    }
    Ok(())
}
