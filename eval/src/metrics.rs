// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2024 Hyperpolymath

//! Confusion matrix and exact-label metrics for the four stance classes
//!
//! Rows are gold stances, columns are predicted stances, both in the
//! canonical order agree, disagree, discuss, unrelated.

use crate::datasets::Stance;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const CELL_WIDTH: usize = 11;

/// 4x4 confusion matrix over stances
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    /// `cells[gold][predicted]`
    cells: [[usize; 4]; 4],
}

impl ConfusionMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one (gold, predicted) pair
    pub fn record(&mut self, gold: Stance, predicted: Stance) {
        self.cells[gold.index()][predicted.index()] += 1;
    }

    pub fn get(&self, gold: Stance, predicted: Stance) -> usize {
        self.cells[gold.index()][predicted.index()]
    }

    /// Number of scored pairs
    pub fn total(&self) -> usize {
        self.cells.iter().flatten().sum()
    }

    /// Diagonal sum: exactly-correct predictions
    pub fn correct(&self) -> usize {
        (0..4).map(|i| self.cells[i][i]).sum()
    }

    /// Rows whose gold label is `stance`
    pub fn gold_total(&self, stance: Stance) -> usize {
        self.cells[stance.index()].iter().sum()
    }

    /// Rows predicted as `stance`
    pub fn predicted_total(&self, stance: Stance) -> usize {
        self.cells.iter().map(|row| row[stance.index()]).sum()
    }

    /// Exact-label accuracy, `None` when nothing was scored
    pub fn accuracy(&self) -> Option<f64> {
        let total = self.total();
        if total == 0 {
            return None;
        }
        Some(self.correct() as f64 / total as f64)
    }

    /// Precision, recall and F1 for one stance
    pub fn class_metrics(&self, stance: Stance) -> ClassMetrics {
        let tp = self.get(stance, stance);
        let support = self.gold_total(stance);
        let predicted = self.predicted_total(stance);

        let precision = if predicted == 0 { 0.0 } else { tp as f64 / predicted as f64 };
        let recall = if support == 0 { 0.0 } else { tp as f64 / support as f64 };
        let f1_score = if precision + recall == 0.0 {
            0.0
        } else {
            2.0 * precision * recall / (precision + recall)
        };

        ClassMetrics {
            precision,
            recall,
            f1_score,
            support,
        }
    }

    /// Render the matrix as a bordered text table followed by the accuracy line
    pub fn format(&self) -> String {
        let header = format_row("", &Stance::ALL.map(|s| s.to_string()));
        let rule = "-".repeat(header.chars().count());

        let mut lines = vec![rule.clone(), header, rule.clone()];
        for stance in Stance::ALL {
            let counts = self.cells[stance.index()].map(|n| n.to_string());
            lines.push(format_row(stance.as_str(), &counts));
            lines.push(rule.clone());
        }

        match self.accuracy() {
            Some(acc) => lines.push(format!("ACCURACY: {:.3}", acc)),
            None => lines.push("ACCURACY: n/a".to_string()),
        }

        lines.join("\n")
    }
}

fn format_row(label: &str, cells: &[String; 4]) -> String {
    let mut row = format!("|{:^w$}|", label, w = CELL_WIDTH);
    for cell in cells {
        row.push_str(&format!("{:^w$}|", cell, w = CELL_WIDTH));
    }
    row
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub support: usize,
}

/// Exact-label summary derived from a confusion matrix
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationReport {
    pub confusion_matrix: ConfusionMatrix,
    pub accuracy: Option<f64>,
    /// Unweighted mean of per-class F1 over the four stances
    pub macro_f1: f64,
    pub per_class: BTreeMap<Stance, ClassMetrics>,
    pub support: usize,
}

impl ClassificationReport {
    pub fn from_confusion_matrix(cm: ConfusionMatrix) -> Self {
        let per_class: BTreeMap<Stance, ClassMetrics> = Stance::ALL
            .into_iter()
            .map(|stance| (stance, cm.class_metrics(stance)))
            .collect();
        let macro_f1 = per_class.values().map(|m| m.f1_score).sum::<f64>() / per_class.len() as f64;

        Self {
            accuracy: cm.accuracy(),
            macro_f1,
            per_class,
            support: cm.total(),
            confusion_matrix: cm,
        }
    }

    /// Matrix table plus per-class lines
    pub fn format(&self) -> String {
        let mut output = self.confusion_matrix.format();
        output.push_str("\n\nPer-Class Metrics:\n");
        for (stance, metrics) in &self.per_class {
            output.push_str(&format!(
                "  {:<10} P={:.4} R={:.4} F1={:.4} (n={})\n",
                stance.as_str(),
                metrics.precision,
                metrics.recall,
                metrics.f1_score,
                metrics.support
            ));
        }
        output.push_str(&format!("  macro F1: {:.4}\n", self.macro_f1));
        output
    }
}
