// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2024 Hyperpolymath

//! Scorer for headline/body stance detection
//!
//! This crate provides:
//! - Stance labels and CSV dataset loading with header validation
//! - The partial-credit scoring engine with positional alignment checks
//! - Null and max baseline scores
//! - Confusion matrix, accuracy and per-class metrics
//! - Comparator strategies (all-unrelated, majority, random, stratified, oracle)
//! - An evaluation pipeline producing text, Markdown and JSON reports

pub mod baselines;
pub mod config;
pub mod datasets;
pub mod error;
pub mod metrics;
pub mod pipeline;
pub mod scoring;

pub use baselines::{all_comparators, ComparatorModel};
pub use config::{RewardWeights, ScoringConfig};
pub use datasets::{BodyId, Dataset, LabelRecord, Stance};
pub use error::ScoreError;
pub use metrics::{ClassificationReport, ConfusionMatrix};
pub use pipeline::{EvaluationConfig, EvaluationPipeline, EvaluationResults};
pub use scoring::{Baselines, Scorer, SubmissionScore};
