mod config;
mod render;
mod state;
mod web;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use plantcare_analysis::health::{self, HealthFactors};
use plantcare_analysis::light::LightStatus;
use plantcare_analysis::{dryness, AnalysisError, ReadingSeries};

use config::Config;
use render::{AnalysisOutput, HealthOutput, InterpretOutput, PercentageOutput};
use state::HubState;

/// Exit status for a malformed reading series.
const EXIT_FORMAT: u8 = 2;
/// Exit status when the series was too short to analyze.
const EXIT_INSUFFICIENT: u8 = 3;

// ---------------------------------------------------------------------------
// Command line
// ---------------------------------------------------------------------------

#[derive(Parser)]
#[command(name = "plantcare", version, about = "Soil-moisture trend analysis and watering advice")]
struct Cli {
    /// TOML policy file (defaults to ./plantcare.toml when present)
    #[arg(long, global = true, env = "PLANTCARE_CONFIG")]
    config: Option<PathBuf>,

    /// Debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Text,
}

#[derive(Subcommand)]
enum Command {
    /// Analyze a JSON array of readings from a file or stdin
    Analyze {
        /// Reading file; stdin when omitted
        path: Option<PathBuf>,
    },
    /// Recommend an action for a single value
    #[command(allow_negative_numbers = true)]
    Recommend {
        value: i64,
        /// Recent drying rate in units/hour (positive = drying)
        #[arg(long, default_value_t = 0.0)]
        rate: f64,
    },
    /// Convert a raw value to moisture percentage
    #[command(allow_negative_numbers = true)]
    Percentage { value: i64 },
    /// Dryness band and threshold guide for a raw value
    #[command(allow_negative_numbers = true)]
    Interpret { value: i64 },
    /// Remaining grow-light plan for today
    Light {
        /// Minutes of light already delivered today
        minutes: u32,
    },
    /// Analyze readings and score overall plant health
    Health {
        /// Reading file; stdin when omitted
        path: Option<PathBuf>,
        /// Minutes of light already delivered today
        #[arg(long, default_value_t = 0)]
        light_minutes: u32,
        /// Leaves look unhealthy (yellowing, drooping, spots)
        #[arg(long)]
        visual_concerns: bool,
    },
    /// Serve the analysis HTTP API
    Serve {
        #[arg(long, env = "WEB_PORT", default_value_t = 8080)]
        port: u16,
    },
}

/// Successful runs either finish normally or report a flagged result.
enum Outcome {
    Done,
    InsufficientData,
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(Outcome::Done) => ExitCode::SUCCESS,
        Ok(Outcome::InsufficientData) => ExitCode::from(EXIT_INSUFFICIENT),
        Err(e) => {
            error!("{e:#}");
            if e.chain().any(|cause| cause.is::<AnalysisError>()) {
                ExitCode::from(EXIT_FORMAT)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}

/// Logs go to stderr so stdout stays machine-readable. `RUST_LOG` wins
/// unless `-v` asks for debug.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<Outcome> {
    let cfg = config::resolve(cli.config.as_deref())?;
    let format = cli.format;

    match cli.command {
        Command::Analyze { path } => {
            let series = read_series(path.as_deref())?;
            let out = analyze(&cfg, &series);
            let insufficient = out.summary.is_insufficient();
            emit(format, &out, render::analysis_text)?;
            Ok(flagged(insufficient))
        }
        Command::Recommend { value, rate } => {
            if !rate.is_finite() {
                bail!("rate must be a finite number, got {rate}");
            }
            let rec = cfg.analyzer().recommend(value, rate);
            emit(format, &rec, render::recommendation_text)?;
            Ok(Outcome::Done)
        }
        Command::Percentage { value } => {
            let out = PercentageOutput {
                value,
                percentage: cfg.calibration.to_percentage(value),
            };
            emit(format, &out, render::percentage_text)?;
            Ok(Outcome::Done)
        }
        Command::Interpret { value } => {
            let out = InterpretOutput {
                report: dryness::interpret(&cfg.calibration, value),
                guide: dryness::threshold_guide(&cfg.calibration),
            };
            emit(format, &out, render::interpret_text)?;
            Ok(Outcome::Done)
        }
        Command::Light { minutes } => {
            let plan = cfg.light.remaining(minutes);
            emit(format, &plan, render::light_text)?;
            Ok(Outcome::Done)
        }
        Command::Health {
            path,
            light_minutes,
            visual_concerns,
        } => {
            let series = read_series(path.as_deref())?;
            let analysis = analyze(&cfg, &series);
            let light = cfg.light.remaining(light_minutes);
            let light_adequate = light.status == LightStatus::TargetMet;

            let health = match (analysis.summary.report(), &analysis.recommendation) {
                (Some(report), Some(rec)) => Some(health::score(&HealthFactors::from_analysis(
                    report,
                    rec,
                    light_adequate,
                    !visual_concerns,
                ))),
                _ => None,
            };
            let insufficient = health.is_none();

            let out = HealthOutput {
                analysis,
                light,
                health,
            };
            emit(format, &out, render::health_text)?;
            Ok(flagged(insufficient))
        }
        Command::Serve { port } => {
            let shared = HubState::shared(cfg.analyzer(), cfg.light.clone());
            shared
                .write()
                .await
                .record_system("hub started".to_string());
            web::serve(shared, port).await?;
            Ok(Outcome::Done)
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn flagged(insufficient: bool) -> Outcome {
    if insufficient {
        Outcome::InsufficientData
    } else {
        Outcome::Done
    }
}

/// Read the whole input before decoding so I/O failures and format failures
/// stay distinguishable.
fn read_series(path: Option<&Path>) -> Result<ReadingSeries> {
    let (input, source) = match path {
        Some(path) => {
            let input = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read readings: {}", path.display()))?;
            (input, path.display().to_string())
        }
        None => {
            let mut input = String::new();
            std::io::stdin()
                .read_to_string(&mut input)
                .context("failed to read readings from stdin")?;
            (input, "stdin".to_string())
        }
    };

    let series = ReadingSeries::from_json(&input)
        .with_context(|| format!("invalid readings in {source}"))?;
    debug!(readings = series.len(), %source, "readings decoded");
    Ok(series)
}

fn analyze(cfg: &Config, series: &ReadingSeries) -> AnalysisOutput {
    let analyzer = cfg.analyzer();
    let summary = analyzer.analyze(series);
    let recommendation = summary.report().map(|r| analyzer.recommend_for(r));

    match (summary.report(), &recommendation) {
        (Some(report), Some(rec)) => info!(
            readings = report.readings_count,
            trend = %report.trend_type,
            action = %rec.action,
            "series analyzed"
        ),
        _ => info!(readings = series.len(), "insufficient data for analysis"),
    }

    AnalysisOutput {
        summary,
        recommendation,
    }
}

fn emit<T: Serialize>(format: OutputFormat, value: &T, text: fn(&T) -> String) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(value).context("failed to encode output")?;
            println!("{json}");
        }
        OutputFormat::Text => print!("{}", text(value)),
    }
    Ok(())
}

// ===========================================================================
// Tests
// ===========================================================================
