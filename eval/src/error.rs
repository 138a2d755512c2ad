// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2024 Hyperpolymath

//! Error types for dataset loading and scoring

use std::path::PathBuf;

/// Errors raised while loading datasets or scoring a submission
#[derive(Debug, thiserror::Error)]
pub enum ScoreError {
    // Alignment errors
    /// Gold and predicted rows disagree on (headline, body id) at a position.
    ///
    /// `line` is the 1-based physical line in the CSV file, counting the header.
    #[error(
        "entry mismatch at line {line}\n [expected] Headline: {expected_headline} // Body ID: {expected_body_id}\n [got] Headline: {got_headline} // Body ID: {got_body_id}"
    )]
    DatasetMismatch {
        line: usize,
        expected_headline: String,
        expected_body_id: String,
        got_headline: String,
        got_body_id: String,
    },

    #[error("row count mismatch: gold has {gold} rows, predictions have {predicted}")]
    LengthMismatch { gold: usize, predicted: usize },

    // Dataset errors
    #[error("malformed dataset {name}: {reason}")]
    MalformedDataset { name: String, reason: String },

    #[error("unknown stance '{value}' at line {line}")]
    UnknownStance { line: usize, value: String },

    #[error("could not read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    // Configuration errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, ScoreError>;
