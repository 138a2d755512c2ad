// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2024 Hyperpolymath

//! Stance scorer CLI
//!
//! Usage:
//!   stance-score gold_labels.csv test_labels.csv
//!   stance-score gold.csv test.csv --format markdown --output report.md --comparators

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use stance_eval::config::ScoringConfig;
use stance_eval::pipeline::{EvaluationConfig, EvaluationPipeline};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
    Markdown,
}

#[derive(Parser, Debug)]
#[command(name = "stance-score")]
#[command(about = "Score predicted stance labels against gold labels")]
#[command(version)]
struct Args {
    /// CSV file with reference gold stance labels
    gold_labels: PathBuf,

    /// CSV file with predicted stance labels
    test_labels: PathBuf,

    /// Report format
    #[arg(short, long, value_enum, default_value = "text")]
    format: Format,

    /// Write the report to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Skip the confusion matrix
    #[arg(long)]
    no_confusion: bool,

    /// Also score the comparator strategies
    #[arg(long)]
    comparators: bool,

    /// Random seed for the comparator strategies
    #[arg(short, long, default_value_t = 42)]
    seed: u64,

    /// JSON file overriding the reward weights
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let scoring = match args.config {
        Some(ref path) => ScoringConfig::from_json_file(path)
            .with_context(|| format!("Failed to load scoring config {}", path.display()))?,
        None => ScoringConfig::default(),
    };

    let mut config = EvaluationConfig::new(args.gold_labels.clone(), args.test_labels.clone());
    config.confusion_matrix = !args.no_confusion;
    config.comparators = args.comparators;
    config.seed = args.seed;
    config.scoring = scoring;

    tracing::info!("Gold: {}", args.gold_labels.display());
    tracing::info!("Test: {}", args.test_labels.display());

    let results = EvaluationPipeline::new(config).run()?;

    if matches!(args.format, Format::Json) {
        if let Some(ref path) = args.output {
            EvaluationPipeline::save_results(&results, path)?;
            return Ok(());
        }
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    let report = match args.format {
        Format::Markdown => EvaluationPipeline::generate_report(&results),
        _ => EvaluationPipeline::format_text(&results),
    };

    match args.output {
        Some(ref path) => {
            std::fs::write(path, &report)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            println!("Report saved to: {}", path.display());
        }
        None => println!("{}", report),
    }

    Ok(())
}
