// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2024 Hyperpolymath

//! Scoring engine
//!
//! One linear pass over positionally aligned gold and predicted rows.
//! Each pair is checked for matching (headline, body id), rewarded under
//! the partial-credit scheme and, when requested, counted in a confusion
//! matrix. The first misaligned row aborts the run.
//!
//! Rewards per row (default weights):
//! - +0.25 for an exact match
//! - +0.50 more when that exact match is a related stance
//! - +0.25 when gold and predicted are both related, matching or not

use crate::config::{RewardWeights, ScoringConfig};
use crate::datasets::{LabelRecord, Stance};
use crate::error::{Result, ScoreError};
use crate::metrics::ConfusionMatrix;
use serde::{Deserialize, Serialize};

/// Outcome of scoring one submission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionScore {
    /// Un-normalised sum of row rewards
    pub score: f64,
    pub rows: usize,
    /// Present when the scorer was built with the confusion matrix enabled
    pub confusion_matrix: Option<ConfusionMatrix>,
}

/// Reference scores that depend on the gold labels only
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Baselines {
    /// Score of predicting `unrelated` for every row
    pub null_score: f64,
    /// Score of a fully correct prediction
    pub max_score: f64,
}

impl Baselines {
    pub fn from_gold(gold: &[LabelRecord], weights: &RewardWeights) -> Self {
        let unrelated = gold.iter().filter(|r| r.stance == Stance::Unrelated).count();
        let related = gold.len() - unrelated;

        let null_score = weights.perfect_unrelated() * unrelated as f64;
        let max_score = null_score + weights.perfect_related() * related as f64;

        Self { null_score, max_score }
    }
}

/// Alignment check plus reward accumulation
#[derive(Debug, Clone)]
pub struct Scorer<'a> {
    config: &'a ScoringConfig,
    confusion_matrix: bool,
}

impl<'a> Scorer<'a> {
    pub fn new(config: &'a ScoringConfig) -> Self {
        Self {
            config,
            confusion_matrix: false,
        }
    }

    /// Also accumulate a confusion matrix during the pass
    pub fn with_confusion_matrix(mut self, enabled: bool) -> Self {
        self.confusion_matrix = enabled;
        self
    }

    /// Reward for a single aligned pair
    pub fn row_score(&self, gold: Stance, predicted: Stance) -> f64 {
        let weights = &self.config.weights;
        let mut score = 0.0;

        if gold == predicted {
            score += weights.exact;
            if gold != Stance::Unrelated {
                score += weights.exact_related_bonus;
            }
        }

        if gold.is_related() && predicted.is_related() {
            score += weights.related;
        }

        score
    }

    /// Score `predicted` against `gold`
    ///
    /// Fails with [`ScoreError::LengthMismatch`] when the row counts differ and
    /// with [`ScoreError::DatasetMismatch`] on the first row whose headline or
    /// body id disagrees. No partial score is returned on failure.
    pub fn score(&self, gold: &[LabelRecord], predicted: &[LabelRecord]) -> Result<SubmissionScore> {
        if gold.len() != predicted.len() {
            return Err(ScoreError::LengthMismatch {
                gold: gold.len(),
                predicted: predicted.len(),
            });
        }

        let mut score = 0.0;
        let mut matrix = self.confusion_matrix.then(ConfusionMatrix::new);

        for (i, (g, t)) in gold.iter().zip(predicted.iter()).enumerate() {
            check_aligned(i, g, t)?;

            score += self.row_score(g.stance, t.stance);

            if let Some(cm) = matrix.as_mut() {
                cm.record(g.stance, t.stance);
            }
        }

        tracing::debug!(rows = gold.len(), score, "Scored submission");

        Ok(SubmissionScore {
            score,
            rows: gold.len(),
            confusion_matrix: matrix,
        })
    }

    pub fn baselines(&self, gold: &[LabelRecord]) -> Baselines {
        Baselines::from_gold(gold, &self.config.weights)
    }
}

fn check_aligned(index: usize, gold: &LabelRecord, predicted: &LabelRecord) -> Result<()> {
    if gold.headline != predicted.headline || gold.body_id != predicted.body_id {
        return Err(ScoreError::DatasetMismatch {
            // Header is line 1
            line: index + 2,
            expected_headline: gold.headline.clone(),
            expected_body_id: gold.body_id.to_string(),
            got_headline: predicted.headline.clone(),
            got_body_id: predicted.body_id.to_string(),
        });
    }
    Ok(())
}

/// Score with default weights, returning the score and its confusion matrix
pub fn score(gold: &[LabelRecord], predicted: &[LabelRecord]) -> Result<(f64, ConfusionMatrix)> {
    let config = ScoringConfig::default();
    let result = Scorer::new(&config).with_confusion_matrix(true).score(gold, predicted)?;
    Ok((result.score, result.confusion_matrix.unwrap_or_default()))
}

/// Null and max scores with default weights
pub fn baselines(gold: &[LabelRecord]) -> Baselines {
    Baselines::from_gold(gold, &RewardWeights::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datasets::Dataset;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    fn rec(headline: &str, body_id: &str, stance: Stance) -> LabelRecord {
        LabelRecord::new(headline, body_id, stance)
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_perfect_mixed_submission() {
        let gold = vec![rec("h1", "b1", Stance::Agree), rec("h2", "b2", Stance::Unrelated)];
        let predicted = gold.clone();

        let (score, cm) = score(&gold, &predicted).unwrap();
        let base = baselines(&gold);

        // 1.0 for the exact related row plus 0.25 for the exact unrelated row
        assert!(close(score, 1.25));
        assert!(close(score, base.max_score));
        assert!(close(base.null_score, 0.25));
        assert!(close(base.max_score, 1.25));
        assert_eq!(cm.correct(), 2);
    }

    #[test]
    fn test_related_but_wrong_label() {
        let gold = vec![rec("h1", "b1", Stance::Agree)];
        let predicted = vec![rec("h1", "b1", Stance::Disagree)];

        let (score, cm) = score(&gold, &predicted).unwrap();

        assert!(close(score, 0.25));
        assert_eq!(cm.get(Stance::Agree, Stance::Disagree), 1);
        assert_eq!(cm.total(), 1);
    }

    #[test]
    fn test_row_rewards() {
        let config = ScoringConfig::default();
        let scorer = Scorer::new(&config);

        for stance in Stance::RELATED {
            assert!(close(scorer.row_score(stance, stance), 1.0));
            assert!(close(scorer.row_score(stance, Stance::Unrelated), 0.0));
            assert!(close(scorer.row_score(Stance::Unrelated, stance), 0.0));
        }
        assert!(close(scorer.row_score(Stance::Unrelated, Stance::Unrelated), 0.25));
        assert!(close(scorer.row_score(Stance::Discuss, Stance::Agree), 0.25));
    }

    #[test]
    fn test_headline_mismatch_on_first_row() {
        let gold = vec![rec("h1", "b1", Stance::Agree)];
        let predicted = vec![rec("other", "b1", Stance::Agree)];

        match score(&gold, &predicted) {
            Err(ScoreError::DatasetMismatch {
                line,
                expected_headline,
                got_headline,
                ..
            }) => {
                assert_eq!(line, 2);
                assert_eq!(expected_headline, "h1");
                assert_eq!(got_headline, "other");
            }
            other => panic!("expected mismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_body_id_mismatch_reports_line() {
        let gold: Vec<_> = (0..5).map(|i| rec(&format!("h{i}"), &i.to_string(), Stance::Discuss)).collect();
        let mut predicted = gold.clone();
        predicted[3] = rec("h3", "99", Stance::Discuss);

        let err = score(&gold, &predicted).unwrap_err();
        assert!(err.to_string().contains("line 5"));
        match err {
            ScoreError::DatasetMismatch {
                line,
                expected_body_id,
                got_body_id,
                ..
            } => {
                assert_eq!(line, 5);
                assert_eq!(expected_body_id, "3");
                assert_eq!(got_body_id, "99");
            }
            other => panic!("expected mismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_length_mismatch() {
        let gold = vec![rec("h1", "b1", Stance::Agree), rec("h2", "b2", Stance::Agree)];
        let predicted = vec![rec("h1", "b1", Stance::Agree)];

        let err = score(&gold, &predicted).unwrap_err();
        assert!(matches!(err, ScoreError::LengthMismatch { gold: 2, predicted: 1 }));
    }

    #[test]
    fn test_confusion_matrix_is_optional() {
        let config = ScoringConfig::default();
        let gold = vec![rec("h1", "b1", Stance::Unrelated)];

        let without = Scorer::new(&config).score(&gold, &gold).unwrap();
        assert!(without.confusion_matrix.is_none());

        let with = Scorer::new(&config).with_confusion_matrix(true).score(&gold, &gold).unwrap();
        assert_eq!(with.confusion_matrix.map(|cm| cm.total()), Some(1));
        assert!(close(with.score, without.score));
    }

    #[test]
    fn test_empty_input_scores_zero() {
        let (score, cm) = score(&[], &[]).unwrap();
        assert_eq!(score, 0.0);
        assert_eq!(cm.accuracy(), None);
    }

    #[test]
    fn test_custom_weights() {
        let mut config = ScoringConfig::default();
        config.weights.related = 0.0;
        let scorer = Scorer::new(&config);

        assert!(close(scorer.row_score(Stance::Agree, Stance::Agree), 0.75));
        assert!(close(scorer.row_score(Stance::Agree, Stance::Discuss), 0.0));

        let gold = vec![rec("h1", "b1", Stance::Agree), rec("h2", "b2", Stance::Unrelated)];
        let base = scorer.baselines(&gold);
        assert!(close(base.max_score, 1.0));
    }

    #[test]
    fn test_gold_scores_max_and_unrelated_scores_null() {
        let gold = Dataset::synthetic(400, 3).records;
        let all_unrelated: Vec<_> = gold.iter().map(|r| r.with_stance(Stance::Unrelated)).collect();
        let base = baselines(&gold);

        let (perfect, _) = score(&gold, &gold).unwrap();
        let (null, _) = score(&gold, &all_unrelated).unwrap();

        assert!(close(perfect, base.max_score));
        assert!(close(null, base.null_score));
    }

    #[test]
    fn test_random_predictions_never_exceed_max() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);

        for seed in 0..20 {
            let gold = Dataset::synthetic(200, seed).records;
            let predicted: Vec<_> = gold
                .iter()
                .map(|r| r.with_stance(Stance::ALL[rng.gen_range(0..4)]))
                .collect();
            let base = baselines(&gold);

            let (score, cm) = score(&gold, &predicted).unwrap();

            assert!(score >= 0.0);
            assert!(score <= base.max_score + 1e-9);
            assert_eq!(cm.total(), gold.len());
            let acc = cm.accuracy().unwrap();
            assert!(close(acc, cm.correct() as f64 / gold.len() as f64));
        }
    }

    #[test]
    fn test_keeping_unrelated_rows_scores_at_least_null() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);

        for seed in 0..20 {
            let gold = Dataset::synthetic(200, seed).records;
            let predicted: Vec<_> = gold
                .iter()
                .map(|r| match r.stance {
                    Stance::Unrelated => r.clone(),
                    _ => r.with_stance(Stance::ALL[rng.gen_range(0..4)]),
                })
                .collect();
            let base = baselines(&gold);

            let (score, _) = score(&gold, &predicted).unwrap();

            assert!(base.null_score <= score + 1e-9);
            assert!(score <= base.max_score + 1e-9);
        }
    }

    #[test]
    fn test_wrong_unrelated_rows_can_fall_below_null() {
        let gold = vec![rec("h1", "b1", Stance::Unrelated)];
        let predicted = vec![rec("h1", "b1", Stance::Discuss)];

        let (score, _) = score(&gold, &predicted).unwrap();
        assert!(score < baselines(&gold).null_score);
    }
}
