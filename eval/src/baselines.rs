// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2024 Hyperpolymath

//! Comparator prediction strategies
//!
//! Simple predictors scored through the same engine as a real submission,
//! to put a test score in context:
//! - AllUnrelated (always `unrelated`, reproduces the null score)
//! - Majority (most frequent gold stance)
//! - Random (uniform over the four stances)
//! - Stratified (sampled from the gold stance distribution)
//! - Oracle (copies the gold stance, reproduces the max score)
//!
//! Predictions copy headline and body id from the input rows, so they are
//! always aligned with the gold data they were made for.

use crate::datasets::{Dataset, LabelRecord, Stance};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::HashMap;
use std::sync::Mutex;

/// A stance predictor that needs nothing but the gold rows
pub trait ComparatorModel: Send + Sync {
    /// Learn whatever the strategy needs from the gold rows
    fn fit(&mut self, records: &[LabelRecord]);

    /// Predict a stance for one row
    fn predict(&self, record: &LabelRecord) -> Stance;

    /// Predict every row, preserving order and alignment
    fn predict_batch(&self, records: &[LabelRecord]) -> Vec<LabelRecord> {
        records.iter().map(|r| r.with_stance(self.predict(r))).collect()
    }

    fn name(&self) -> &str;

    fn description(&self) -> &str;
}

/// Always predicts `unrelated`
#[derive(Debug, Clone, Default)]
pub struct AllUnrelated;

impl ComparatorModel for AllUnrelated {
    fn fit(&mut self, _records: &[LabelRecord]) {}

    fn predict(&self, _record: &LabelRecord) -> Stance {
        Stance::Unrelated
    }

    fn name(&self) -> &str {
        "AllUnrelated"
    }

    fn description(&self) -> &str {
        "Predicts unrelated for every row (the null score)"
    }
}

/// Always predicts the most frequent gold stance
#[derive(Debug, Clone)]
pub struct Majority {
    majority: Stance,
}

impl Default for Majority {
    fn default() -> Self {
        Self {
            majority: Stance::Unrelated,
        }
    }
}

impl Majority {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ComparatorModel for Majority {
    fn fit(&mut self, records: &[LabelRecord]) {
        let dist = Dataset::label_distribution(records);

        // Ties go to the stance earliest in canonical order
        let mut best: Option<(Stance, usize)> = None;
        for (stance, count) in dist {
            if best.map_or(true, |(_, c)| count > c) {
                best = Some((stance, count));
            }
        }
        if let Some((stance, _)) = best {
            self.majority = stance;
        }
    }

    fn predict(&self, _record: &LabelRecord) -> Stance {
        self.majority
    }

    fn name(&self) -> &str {
        "Majority"
    }

    fn description(&self) -> &str {
        "Always predicts the most frequent gold stance"
    }
}

/// Seeded generator shared by successive `predict` calls
///
/// `fit` reseeds it, so a fitted model always replays the same sequence.
#[derive(Debug)]
struct SeededRng {
    seed: u64,
    rng: Mutex<ChaCha8Rng>,
}

impl SeededRng {
    fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: Mutex::new(ChaCha8Rng::seed_from_u64(seed)),
        }
    }

    fn reseed(&mut self) {
        self.rng = Mutex::new(ChaCha8Rng::seed_from_u64(self.seed));
    }

    fn with<T>(&self, f: impl FnOnce(&mut ChaCha8Rng) -> T) -> T {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut *rng)
    }
}

/// Uniform random stance per row
#[derive(Debug)]
pub struct RandomComparator {
    rng: SeededRng,
}

impl RandomComparator {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SeededRng::new(seed),
        }
    }
}

impl ComparatorModel for RandomComparator {
    fn fit(&mut self, _records: &[LabelRecord]) {
        self.rng.reseed();
    }

    fn predict(&self, _record: &LabelRecord) -> Stance {
        self.rng.with(|rng| Stance::ALL[rng.gen_range(0..Stance::ALL.len())])
    }

    fn name(&self) -> &str {
        "Random"
    }

    fn description(&self) -> &str {
        "Uniform random stance per row"
    }
}

/// Stance sampled proportionally to the gold distribution
#[derive(Debug)]
pub struct Stratified {
    rng: SeededRng,
    /// Cumulative probabilities in canonical order
    cumulative: [f64; 4],
}

impl Stratified {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SeededRng::new(seed),
            cumulative: [0.25, 0.5, 0.75, 1.0],
        }
    }
}

impl ComparatorModel for Stratified {
    fn fit(&mut self, records: &[LabelRecord]) {
        self.rng.reseed();
        if records.is_empty() {
            return;
        }

        let dist = Dataset::label_distribution(records);
        let total = records.len() as f64;
        let mut running = 0.0;
        for stance in Stance::ALL {
            running += *dist.get(&stance).unwrap_or(&0) as f64 / total;
            self.cumulative[stance.index()] = running;
        }
        self.cumulative[3] = 1.0;
    }

    fn predict(&self, _record: &LabelRecord) -> Stance {
        let roll: f64 = self.rng.with(|rng| rng.gen());
        Stance::ALL
            .into_iter()
            .zip(self.cumulative)
            .find(|(_, bound)| roll < *bound)
            .map_or(Stance::Unrelated, |(stance, _)| stance)
    }

    fn name(&self) -> &str {
        "Stratified"
    }

    fn description(&self) -> &str {
        "Samples stances proportionally to the gold distribution"
    }
}

/// Returns the gold stance for every row it was fitted on
///
/// `predict` looks rows up by (headline, body id) and falls back to
/// `unrelated` for rows it never saw. `predict_batch` must be given the same
/// gold rows passed to `fit`: it echoes them back positionally, which keeps
/// duplicate (headline, body id) pairs with different stances exact.
#[derive(Debug, Clone, Default)]
pub struct Oracle {
    answers: HashMap<(String, String), Stance>,
}

impl Oracle {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ComparatorModel for Oracle {
    fn fit(&mut self, records: &[LabelRecord]) {
        self.answers = records
            .iter()
            .map(|r| ((r.headline.clone(), r.body_id.as_str().to_string()), r.stance))
            .collect();
    }

    fn predict(&self, record: &LabelRecord) -> Stance {
        self.answers
            .get(&(record.headline.clone(), record.body_id.as_str().to_string()))
            .copied()
            .unwrap_or(Stance::Unrelated)
    }

    fn predict_batch(&self, records: &[LabelRecord]) -> Vec<LabelRecord> {
        records.to_vec()
    }

    fn name(&self) -> &str {
        "Oracle"
    }

    fn description(&self) -> &str {
        "Copies the gold stance (the max score)"
    }
}

/// Every comparator, in report order
pub fn all_comparators(seed: u64) -> Vec<Box<dyn ComparatorModel>> {
    vec![
        Box::new(AllUnrelated),
        Box::new(Majority::new()),
        Box::new(RandomComparator::new(seed)),
        Box::new(Stratified::new(seed)),
        Box::new(Oracle::new()),
    ]
}
