// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2024 Hyperpolymath

//! Scoring configuration
//!
//! A single immutable value built once at startup and passed to the
//! scoring engine. The dataset header is the fixed `FIELDNAMES` and is not
//! part of it.

use crate::error::{Result, ScoreError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Column names every dataset must carry, in order
pub const FIELDNAMES: [&str; 3] = ["Headline", "Body ID", "Stance"];

/// Partial-credit rewards applied per aligned row
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardWeights {
    /// Awarded when the predicted stance equals the gold stance
    pub exact: f64,
    /// Added on top of `exact` when the matching stance is a related one
    pub exact_related_bonus: f64,
    /// Awarded when both stances are related, whether or not they match
    pub related: f64,
}

impl Default for RewardWeights {
    fn default() -> Self {
        Self {
            exact: 0.25,
            exact_related_bonus: 0.50,
            related: 0.25,
        }
    }
}

impl RewardWeights {
    /// Score of a perfect prediction on a related row
    pub fn perfect_related(&self) -> f64 {
        self.exact + self.exact_related_bonus + self.related
    }

    /// Score of a perfect prediction on an unrelated row
    pub fn perfect_unrelated(&self) -> f64 {
        self.exact
    }
}

/// Configuration shared by loading and scoring
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScoringConfig {
    pub weights: RewardWeights,
}

impl ScoringConfig {
    /// Load a configuration from a JSON file; missing fields take defaults
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|source| ScoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        tracing::debug!("Loaded scoring config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let w = &self.weights;
        for (name, value) in [
            ("exact", w.exact),
            ("exact_related_bonus", w.exact_related_bonus),
            ("related", w.related),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ScoreError::InvalidConfig(format!(
                    "weight '{}' must be a non-negative number, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}
