// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2024 Hyperpolymath

//! Evaluation pipeline
//!
//! Orchestrates:
//! - Loading the gold and predicted datasets
//! - Scoring the predictions
//! - Null and max baselines
//! - Optional comparator strategies
//! - Text, Markdown and JSON output

use crate::baselines::all_comparators;
use crate::config::ScoringConfig;
use crate::datasets::{Dataset, LabelRecord, Stance};
use crate::error::{Result, ScoreError};
use crate::metrics::ClassificationReport;
use crate::scoring::Scorer;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Configuration for one evaluation run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationConfig {
    /// CSV with the reference stances
    pub gold_path: PathBuf,
    /// CSV with the predicted stances
    pub predictions_path: PathBuf,
    /// Accumulate and report the confusion matrix
    pub confusion_matrix: bool,
    /// Also score the comparator strategies
    pub comparators: bool,
    /// Seed for the random comparators
    pub seed: u64,
    pub scoring: ScoringConfig,
}

impl EvaluationConfig {
    pub fn new(gold_path: impl Into<PathBuf>, predictions_path: impl Into<PathBuf>) -> Self {
        Self {
            gold_path: gold_path.into(),
            predictions_path: predictions_path.into(),
            confusion_matrix: true,
            comparators: false,
            seed: 42,
            scoring: ScoringConfig::default(),
        }
    }
}

/// Score of one comparator strategy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparatorResult {
    pub model: String,
    pub description: String,
    pub score: f64,
    pub relative_score: f64,
    pub accuracy: Option<f64>,
}

/// Complete results of an evaluation run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationResults {
    pub gold_name: String,
    pub predictions_name: String,
    pub rows: usize,
    pub test_score: f64,
    pub null_score: f64,
    pub max_score: f64,
    /// Test score as a percentage of the max score
    pub relative_score: f64,
    pub classification: Option<ClassificationReport>,
    pub label_distribution: BTreeMap<Stance, usize>,
    pub comparators: Vec<ComparatorResult>,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl EvaluationResults {
    pub fn accuracy(&self) -> Option<f64> {
        self.classification.as_ref().and_then(|c| c.accuracy)
    }
}

fn relative(score: f64, max: f64) -> f64 {
    if max > 0.0 {
        score / max * 100.0
    } else {
        0.0
    }
}

/// Main evaluation pipeline
pub struct EvaluationPipeline {
    config: EvaluationConfig,
}

impl EvaluationPipeline {
    pub fn new(config: EvaluationConfig) -> Self {
        Self { config }
    }

    /// Load both datasets and evaluate
    pub fn run(&self) -> Result<EvaluationResults> {
        self.config.scoring.validate()?;

        let gold = Dataset::load_csv(&self.config.gold_path)?;
        let predictions = Dataset::load_csv(&self.config.predictions_path)?;

        self.evaluate(&gold, &predictions)
    }

    /// Evaluate already-loaded datasets
    pub fn evaluate(&self, gold: &Dataset, predictions: &Dataset) -> Result<EvaluationResults> {
        if gold.is_empty() {
            return Err(ScoreError::MalformedDataset {
                name: gold.name.clone(),
                reason: "no data rows found".to_string(),
            });
        }

        let scorer = Scorer::new(&self.config.scoring).with_confusion_matrix(self.config.confusion_matrix);

        let submission = scorer.score(&gold.records, &predictions.records)?;
        let baselines = scorer.baselines(&gold.records);

        tracing::info!(
            "Scored {} rows: test={:.2} null={:.2} max={:.2}",
            submission.rows,
            submission.score,
            baselines.null_score,
            baselines.max_score
        );

        let comparators = if self.config.comparators {
            self.score_comparators(&scorer, &gold.records, baselines.max_score)?
        } else {
            Vec::new()
        };

        Ok(EvaluationResults {
            gold_name: gold.name.clone(),
            predictions_name: predictions.name.clone(),
            rows: submission.rows,
            test_score: submission.score,
            null_score: baselines.null_score,
            max_score: baselines.max_score,
            relative_score: relative(submission.score, baselines.max_score),
            classification: submission.confusion_matrix.map(ClassificationReport::from_confusion_matrix),
            label_distribution: Dataset::label_distribution(&gold.records),
            comparators,
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        })
    }

    fn score_comparators(
        &self,
        scorer: &Scorer<'_>,
        gold: &[LabelRecord],
        max_score: f64,
    ) -> Result<Vec<ComparatorResult>> {
        let scorer = scorer.clone().with_confusion_matrix(true);
        let mut results = Vec::new();

        for mut model in all_comparators(self.config.seed) {
            model.fit(gold);
            let predictions = model.predict_batch(gold);
            let scored = scorer.score(gold, &predictions)?;

            tracing::debug!("Comparator {} scored {:.2}", model.name(), scored.score);

            results.push(ComparatorResult {
                model: model.name().to_string(),
                description: model.description().to_string(),
                score: scored.score,
                relative_score: relative(scored.score, max_score),
                accuracy: scored.confusion_matrix.and_then(|cm| cm.accuracy()),
            });
        }

        Ok(results)
    }

    /// Plain-text report: confusion matrix, accuracy and the score table
    pub fn format_text(results: &EvaluationResults) -> String {
        let mut report = String::new();

        if let Some(ref classification) = results.classification {
            report.push_str("CONFUSION MATRIX:\n");
            report.push_str(&classification.confusion_matrix.format());
            report.push_str("\n\n");
        }

        report.push_str("MAX  - the best possible score (100% accuracy)\n");
        report.push_str("NULL - score as if all predicted stances were unrelated\n");
        report.push_str("TEST - score based on the provided predictions\n\n");
        report.push_str("||    MAX    ||    NULL   ||    TEST   ||\n");
        report.push_str(&format!(
            "||{:^11}||{:^11}||{:^11}||\n",
            format_score(results.max_score),
            format_score(results.null_score),
            format_score(results.test_score)
        ));
        report.push_str(&format!("\nRELATIVE SCORE: {:.3}%\n", results.relative_score));

        if !results.comparators.is_empty() {
            report.push_str("\nCOMPARATORS:\n");
            for c in &results.comparators {
                report.push_str(&format!(
                    "  {:<13} {:>10} ({:.3}%)\n",
                    c.model,
                    format_score(c.score),
                    c.relative_score
                ));
            }
        }

        report
    }

    /// Markdown report
    pub fn generate_report(results: &EvaluationResults) -> String {
        let mut report = String::new();

        report.push_str("# Stance Detection Evaluation Report\n\n");
        report.push_str(&format!("**Generated:** {}\n\n", results.timestamp.format("%Y-%m-%d %H:%M:%S UTC")));
        report.push_str(&format!("**Version:** {}\n\n", results.version));

        report.push_str("## Datasets\n\n");
        report.push_str(&format!("- **Gold:** {}\n", results.gold_name));
        report.push_str(&format!("- **Predictions:** {}\n", results.predictions_name));
        report.push_str(&format!("- **Rows:** {}\n\n", results.rows));

        report.push_str("### Gold Label Distribution\n\n");
        report.push_str("| Stance | Count |\n");
        report.push_str("|--------|-------|\n");
        for (stance, count) in &results.label_distribution {
            report.push_str(&format!("| {} | {} |\n", stance, count));
        }

        report.push_str("\n## Scores\n\n");
        report.push_str("| Max | Null | Test | Relative |\n");
        report.push_str("|-----|------|------|----------|\n");
        report.push_str(&format!(
            "| {} | {} | {} | {:.3}% |\n\n",
            format_score(results.max_score),
            format_score(results.null_score),
            format_score(results.test_score),
            results.relative_score
        ));

        if let Some(ref classification) = results.classification {
            report.push_str("## Confusion Matrix\n\n");
            report.push_str(&format!("```\n{}\n```\n\n", classification.format()));
        }

        if !results.comparators.is_empty() {
            report.push_str("## Comparators\n\n");
            report.push_str("| Model | Score | Relative | Accuracy |\n");
            report.push_str("|-------|-------|----------|----------|\n");
            for c in &results.comparators {
                let acc = c.accuracy.map_or("-".to_string(), |v| format!("{:.4}", v));
                report.push_str(&format!(
                    "| {} | {} | {:.3}% | {} |\n",
                    c.model,
                    format_score(c.score),
                    c.relative_score,
                    acc
                ));
            }
            report.push('\n');
        }

        report
    }

    /// Save results to a JSON file
    pub fn save_results(results: &EvaluationResults, output_path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(results)?;
        std::fs::write(output_path, json).map_err(|source| ScoreError::Io {
            path: output_path.to_path_buf(),
            source,
        })?;
        tracing::info!("Results saved to {}", output_path.display());
        Ok(())
    }
}

/// Scores are sums of quarters; show them without float noise
fn format_score(score: f64) -> String {
    let rounded = (score * 100.0).round() / 100.0;
    if rounded.fract() == 0.0 {
        format!("{:.1}", rounded)
    } else {
        format!("{}", rounded)
    }
}
