// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2024 Hyperpolymath

//! Comparator runner
//!
//! Scores the comparator strategies against a gold file, for a quick view
//! of what trivial predictors achieve on it.

use anyhow::{Context, Result};
use clap::Parser;
use stance_eval::baselines::all_comparators;
use stance_eval::config::ScoringConfig;
use stance_eval::datasets::Dataset;
use stance_eval::scoring::Scorer;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "stance-baselines")]
#[command(about = "Score comparator strategies against gold stance labels")]
#[command(version)]
struct Args {
    /// CSV file with reference gold stance labels (omit for a synthetic set)
    gold_labels: Option<PathBuf>,

    /// Comparator to run (AllUnrelated, Majority, Random, Stratified, Oracle)
    #[arg(short, long)]
    model: Option<String>,

    /// Random seed
    #[arg(short, long, default_value_t = 42)]
    seed: u64,

    /// Rows in the synthetic dataset
    #[arg(short, long, default_value_t = 1000)]
    num_samples: usize,

    /// List available comparators
    #[arg(long)]
    list: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    if args.list {
        println!("Available comparators:");
        println!("----------------------");
        for model in all_comparators(args.seed) {
            println!("  {}: {}", model.name(), model.description());
        }
        return Ok(());
    }

    let config = ScoringConfig::default();
    let dataset = match args.gold_labels {
        Some(ref path) => Dataset::load_csv(path)
            .with_context(|| format!("Failed to load gold labels {}", path.display()))?,
        None => {
            tracing::warn!("No gold file given, using {} synthetic rows (seed={})", args.num_samples, args.seed);
            Dataset::synthetic(args.num_samples, args.seed)
        }
    };

    println!("\nDataset: {} ({} rows)", dataset.name, dataset.len());
    for (stance, count) in Dataset::label_distribution(&dataset.records) {
        println!("  {:<10} {:>7} ({:.1}%)", stance, count, count as f64 / dataset.len() as f64 * 100.0);
    }

    let scorer = Scorer::new(&config).with_confusion_matrix(true);
    let baselines = scorer.baselines(&dataset.records);

    println!("\nNULL: {:.2}", baselines.null_score);
    println!("MAX:  {:.2}", baselines.max_score);

    println!("\n{}", "=".repeat(60));
    println!("COMPARATORS");
    println!("{}", "=".repeat(60));

    for mut model in all_comparators(args.seed) {
        if let Some(ref filter) = args.model {
            if !model.name().eq_ignore_ascii_case(filter) {
                continue;
            }
        }

        model.fit(&dataset.records);
        let predictions = model.predict_batch(&dataset.records);
        let scored = scorer.score(&dataset.records, &predictions)?;
        let relative = if baselines.max_score > 0.0 {
            scored.score / baselines.max_score * 100.0
        } else {
            0.0
        };

        println!("\n## {} ##", model.name());
        println!("{}", model.description());
        println!("{}", "-".repeat(40));
        println!("Score: {:.2} ({:.3}% of max)", scored.score, relative);
        if let Some(cm) = scored.confusion_matrix {
            println!("{}", cm.format());
        }
    }

    Ok(())
}
