mod cli;
mod config;
mod output;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use config::AppConfig;
use gradcpt_analysis::{WindowFeatures, extract_features, label, reconcile, stack_windows};
use gradcpt_core::SessionRecord;
use gradcpt_timing::{HighPrecisionTimer, ManualTimer};
use output::{ResponseSummary, write_results};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Serialize)]
struct FeatureTable {
    windows: Vec<WindowFeatures>,
    stacked: Vec<Vec<f64>>,
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), value)
        .with_context(|| format!("failed to write {}", path.display()))
}

fn run_label(
    config: &AppConfig,
    session: &Path,
    output: &Path,
    response_times_path: Option<&Path>,
) -> Result<()> {
    let record: SessionRecord = read_json(session)?;
    info!(
        session = %session.display(),
        trials = record.trial_count(),
        duration_secs = record.duration_secs(),
        "session loaded"
    );

    let response_times =
        reconcile(&record.trials, &config.reconcile).context("failed to reconcile responses")?;
    let summary = ResponseSummary::from_response_times(&response_times);
    info!(
        trials = summary.trials,
        response_rate = summary.response_rate,
        mean_ms = summary.mean_ms,
        min_ms = summary.min_ms,
        max_ms = summary.max_ms,
        "response times"
    );
    if let Some(path) = response_times_path {
        write_json(path, &response_times)?;
    }

    let labels = label(&response_times, &config.label).context("failed to label trials")?;
    let file =
        File::create(output).with_context(|| format!("failed to create {}", output.display()))?;
    write_results(
        BufWriter::new(file),
        &labels,
        record.start_timestamp,
        record.end_timestamp,
    )
    .with_context(|| format!("failed to write {}", output.display()))?;
    info!(output = %output.display(), "labels saved");
    Ok(())
}

fn run_simulate(
    config: &AppConfig,
    output: &Path,
    seed: u64,
    trials: Option<usize>,
    realtime: bool,
) -> Result<()> {
    let mut session = config.session.clone();
    if let Some(trials) = trials {
        session.trial_count = trials;
    }
    let schedule = StdRng::seed_from_u64(seed);
    let mut responses = StdRng::seed_from_u64(seed.wrapping_add(1));
    let participant = &config.participant;
    let record = if realtime {
        info!(
            duration_secs = session.trial_window().as_secs_f64() * session.trial_count as f64,
            "running paced session"
        );
        participant.run_session_with(HighPrecisionTimer::new(), &session, schedule, &mut responses)
    } else {
        participant.run_session_with(ManualTimer::new(), &session, schedule, &mut responses)
    }
    .context("simulated session failed")?;
    write_json(output, &record)?;
    info!(output = %output.display(), trials = record.trial_count(), seed, "session simulated");
    Ok(())
}

fn run_features(config: &AppConfig, input: &Path, output: &Path, lags: usize) -> Result<()> {
    let samples: Vec<f64> = read_json(input)?;
    let windows = extract_features(&samples, &config.features).context("feature extraction failed")?;
    let stacked = stack_windows(&windows, lags);
    write_json(output, &FeatureTable { windows, stacked })?;
    info!(output = %output.display(), lags, "features saved");
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let config = AppConfig::load_or_default(cli.config.as_deref())?;

    match cli.command {
        Commands::Label {
            session,
            output,
            response_times,
        } => run_label(&config, &session, &output, response_times.as_deref()),
        Commands::Simulate {
            output,
            seed,
            trials,
            realtime,
        } => run_simulate(&config, &output, seed, trials, realtime),
        Commands::Features {
            input,
            output,
            lags,
        } => run_features(&config, &input, &output, lags),
    }
}
