//! salescope - CSV Sales Data Analysis & Efficiency Report Generator
//!
//! Loads a sales interaction CSV, cleans it, computes grouped summaries and
//! the TRMNS efficiency metric, and emits a ranked report.

mod config;
mod data;
mod report;
mod stats;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use config::AnalysisConfig;
use data::{DataCleaner, DataLoader};
use report::{EfficiencyMetric, Report, ReportRenderer};
use stats::{Aggregator, StatsCalculator};

/// Sales interaction analysis: cleaning, grouped summaries and efficiency ranking
#[derive(Parser, Debug)]
#[command(name = "salescope", version, about)]
struct Cli {
    /// Path to the sales interaction CSV
    input: PathBuf,

    /// Write the full report as pretty JSON to this path
    #[arg(short, long)]
    report: Option<PathBuf>,

    /// Path to a JSON analysis config (tenure policy, time costs)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose output for debugging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = match &cli.config {
        Some(path) => AnalysisConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => AnalysisConfig::default(),
    };

    let report = run_pipeline(&cli.input, &config)?;
    println!("{}", ReportRenderer::render_text(&report));

    if let Some(path) = &cli.report {
        ReportRenderer::write_json(&report, path)?;
        info!(path = %path.display(), "JSON report written");
    }

    Ok(())
}

/// The four stages, composed explicitly: load, clean, aggregate, report.
/// Each stage consumes the previous stage's output; nothing is shared.
fn run_pipeline(input: &Path, config: &AnalysisConfig) -> Result<Report> {
    let raw = DataLoader::load_csv(input)?;
    info!(rows = raw.height(), path = %input.display(), "input table loaded");

    let (clean, clean_report) = DataCleaner::clean(&raw, config)?;
    info!(
        rows = clean_report.rows_out,
        duplicates_removed = clean_report.duplicates_removed,
        imputed = clean_report.imputed_rows,
        "cleaning complete"
    );

    let method_summary = Aggregator::by_method(&clean)?;
    let weekly_summary = Aggregator::by_method_week(&clean)?;
    let state_summary = Aggregator::by_method_state(&clean)?;
    let revenue_stats = StatsCalculator::revenue_stats_by_method(&clean)?;

    let method_efficiency = EfficiencyMetric::rank_methods(&method_summary, &config.time_costs)?;
    let state_efficiency = EfficiencyMetric::rank_states(&state_summary, &config.time_costs)?;
    let state_dominance = report::dominance_by_state(&state_summary);

    Ok(Report {
        rows_analyzed: clean_report.rows_out,
        duplicates_removed: clean_report.duplicates_removed,
        tenure_corrections: clean_report.tenure_corrections.len(),
        imputed_rows: clean_report.imputed_rows,
        method_summary,
        weekly_summary,
        state_summary,
        revenue_stats,
        method_efficiency,
        state_efficiency,
        state_dominance,
    })
}
