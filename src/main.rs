//! CLI entry point for the grade engine.
//!
//! `grade` turns a JSON record of graded components into a report with the
//! final grade, letter grade and per-component statistics. `convert` turns
//! the pipe-separated course records into JSON.

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use grade_engine::{
    GradeEngine, GradeError, GradingMethod,
    config::{Settings, load_scale},
    input::parse_input,
    output::{render_summary, write_json},
    psv::{ConvertKind, convert_file},
};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "grade_engine")]
#[command(about = "Weighted grade calculator and course record converter", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Calculate the final grade for one input record
    Grade {
        /// JSON input record with a `components` list
        #[arg(short, long)]
        input: PathBuf,

        /// Where to write the JSON report
        #[arg(short, long)]
        output: PathBuf,

        /// JSON grading scale replacing the default catalog bands
        #[arg(long)]
        scale: Option<PathBuf>,

        /// Grading method; overrides the input record and GRADING_METHOD
        #[arg(short, long, value_enum)]
        method: Option<GradingMethod>,

        /// Spread missing weight across components whose percentage is 0
        #[arg(long, default_value_t = false)]
        fill_missing_weights: bool,
    },
    /// Convert a pipe-separated record file to JSON
    Convert {
        /// Layout of the input file
        #[arg(value_enum)]
        kind: ConvertKind,

        #[arg(short, long)]
        input: PathBuf,

        #[arg(short, long)]
        output: PathBuf,
    },
}

fn main() -> ExitCode {
    dotenvy::dotenv().ok(); // Load .env file

    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("error[Config]: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    let _file_guard = init_tracing(&settings.log_file_path);
    let cli = Cli::parse();

    match run(cli, &settings) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // stderr carries the user-facing line; the event goes to the log file
            match e.downcast_ref::<GradeError>() {
                Some(grade_error) => {
                    debug!(
                        kind = grade_error.kind(),
                        error = %grade_error,
                        "Grade calculation failed"
                    );
                    eprintln!("error[{}]: {}", grade_error.kind(), grade_error);
                }
                None => {
                    debug!(error = %e, "Command failed");
                    eprintln!("error: {e:#}");
                }
            }
            ExitCode::FAILURE
        }
    }
}

/// Logging setup: colored stderr + JSON rolling log file.
fn init_tracing(log_file_path: &Path) -> WorkerGuard {
    let log_dir = log_file_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("logs"));
    let log_file_name = log_file_path
        .file_name()
        .unwrap_or(OsStr::new("grade_engine.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(env_filter("RUST_LOG", "info"));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(env_filter("RUST_LOG_JSON", "debug"));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    file_guard
}

fn env_filter(var: &str, default: &str) -> EnvFilter {
    EnvFilter::try_from_env(var).unwrap_or_else(|_| EnvFilter::new(default))
}

fn run(cli: Cli, settings: &Settings) -> Result<()> {
    match cli.command {
        Commands::Grade {
            input,
            output,
            scale,
            method,
            fill_missing_weights,
        } => grade(
            &input,
            &output,
            scale.as_deref().or(settings.scale_path.as_deref()),
            method.or(settings.grading_method),
            fill_missing_weights,
        ),
        Commands::Convert {
            kind,
            input,
            output,
        } => {
            let count = convert_file(kind, &input, &output)?;
            if count == 0 {
                warn!(input = %input.display(), "No records converted");
            }
            println!("Converted {count} records to {}.", output.display());
            Ok(())
        }
    }
}

#[tracing::instrument(skip_all, fields(input = %input.display(), output = %output.display()))]
fn grade(
    input: &Path,
    output: &Path,
    scale: Option<&Path>,
    method: Option<GradingMethod>,
    fill_missing_weights: bool,
) -> Result<()> {
    let json = std::fs::read_to_string(input)
        .with_context(|| format!("failed to read {}", input.display()))?;
    let record = parse_input(&json)?;
    info!(
        components = record.components.len(),
        "Loaded exam components"
    );

    let mut engine = GradeEngine::new()
        .with_method(method.or(record.grading_method).unwrap_or_default())
        .with_fill_missing_weights(fill_missing_weights);
    if let Some(path) = scale {
        engine = engine.with_catalog_scale(load_scale(path)?);
        info!(scale = %path.display(), "Using custom grading scale");
    }

    let report = engine
        .build_report(&record.components)?
        .with_generated_at(Utc::now());

    print!("{}", render_summary(&report));
    write_json(output, &report)?;
    info!(
        final_grade = report.final_grade,
        letter_grade = %report.letter_grade,
        "Report written"
    );

    Ok(())
}
