// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2024 Hyperpolymath

//! Stance labels and dataset loading
//!
//! Datasets are CSV files with the header `Headline,Body ID,Stance`. Gold
//! and predicted files enumerate the same rows in the same order; the
//! scorer aligns them by position.

use crate::config::FIELDNAMES;
use crate::error::{Result, ScoreError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

/// Stance of a body of text towards a headline
///
/// Declaration order is the canonical label order used by the confusion
/// matrix and every report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stance {
    Agree,
    Disagree,
    Discuss,
    Unrelated,
}

impl Stance {
    /// All stances in canonical order
    pub const ALL: [Stance; 4] = [Stance::Agree, Stance::Disagree, Stance::Discuss, Stance::Unrelated];

    /// Stances counted as "related" to the headline
    pub const RELATED: [Stance; 3] = [Stance::Agree, Stance::Disagree, Stance::Discuss];

    /// Position in the canonical label order
    pub fn index(self) -> usize {
        match self {
            Stance::Agree => 0,
            Stance::Disagree => 1,
            Stance::Discuss => 2,
            Stance::Unrelated => 3,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Anything other than `Unrelated`
    pub fn is_related(self) -> bool {
        !matches!(self, Stance::Unrelated)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Stance::Agree => "agree",
            Stance::Disagree => "disagree",
            Stance::Discuss => "discuss",
            Stance::Unrelated => "unrelated",
        }
    }
}

impl fmt::Display for Stance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Returned when a stance field holds anything outside the four labels
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown stance '{0}'")]
pub struct ParseStanceError(pub String);

impl FromStr for Stance {
    type Err = ParseStanceError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let trimmed = s.trim();
        Stance::ALL
            .into_iter()
            .find(|stance| stance.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ParseStanceError(s.to_string()))
    }
}

/// Identifier of the article body a headline is paired with
///
/// Kept as the text found in the file so that `"0012"` and `"12"` stay distinct.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BodyId(String);

impl BodyId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BodyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl From<&str> for BodyId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for BodyId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<u32> for BodyId {
    fn from(value: u32) -> Self {
        Self(value.to_string())
    }
}

/// One row of a gold or predicted dataset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelRecord {
    pub headline: String,
    pub body_id: BodyId,
    pub stance: Stance,
}

impl LabelRecord {
    pub fn new(headline: impl Into<String>, body_id: impl Into<BodyId>, stance: Stance) -> Self {
        Self {
            headline: headline.into(),
            body_id: body_id.into(),
            stance,
        }
    }

    /// Same headline and body, different stance
    pub fn with_stance(&self, stance: Stance) -> Self {
        Self {
            headline: self.headline.clone(),
            body_id: self.body_id.clone(),
            stance,
        }
    }
}

/// A loaded, non-empty dataset
#[derive(Debug, Clone)]
pub struct Dataset {
    /// File path or caller-supplied label, used in messages
    pub name: String,
    pub records: Vec<LabelRecord>,
}

impl Dataset {
    /// Load a dataset from a CSV file
    pub fn load_csv(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|source| ScoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let dataset = Self::from_reader(&path.display().to_string(), file)?;
        tracing::info!("Loaded {} rows from {}", dataset.len(), path.display());
        Ok(dataset)
    }

    /// Parse a dataset from any CSV source
    pub fn from_reader<R: Read>(name: &str, source: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(source);

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .enumerate()
            .map(|(idx, field)| {
                if idx == 0 {
                    field.trim_start_matches('\u{feff}').to_string()
                } else {
                    field.to_string()
                }
            })
            .collect();

        if headers != FIELDNAMES {
            return Err(ScoreError::MalformedDataset {
                name: name.to_string(),
                reason: format!(
                    "incorrect headers: expected [{}], found [{}]",
                    FIELDNAMES.join(", "),
                    headers.join(", ")
                ),
            });
        }

        let mut records = Vec::new();

        for (idx, result) in reader.records().enumerate() {
            let record = result?;
            let line = idx + 2;

            let headline = record.get(0).unwrap_or("");
            let body_id = record.get(1).unwrap_or("");
            let raw_stance = record.get(2).unwrap_or("");

            let stance = raw_stance.parse::<Stance>().map_err(|_| ScoreError::UnknownStance {
                line,
                value: raw_stance.to_string(),
            })?;

            records.push(LabelRecord::new(headline, body_id, stance));
        }

        if records.is_empty() {
            return Err(ScoreError::MalformedDataset {
                name: name.to_string(),
                reason: "no data rows found".to_string(),
            });
        }

        Ok(Self {
            name: name.to_string(),
            records,
        })
    }

    /// Generate a synthetic gold dataset for development and testing
    ///
    /// Stance frequencies roughly follow the FNC-1 training split.
    pub fn synthetic(size: usize, seed: u64) -> Self {
        use rand::{Rng, SeedableRng};
        use rand_chacha::ChaCha8Rng;

        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let bodies = (size / 4).max(1) as u32;

        let records = (0..size)
            .map(|i| {
                let roll: f64 = rng.gen();
                let stance = if roll < 0.73 {
                    Stance::Unrelated
                } else if roll < 0.91 {
                    Stance::Discuss
                } else if roll < 0.98 {
                    Stance::Agree
                } else {
                    Stance::Disagree
                };
                let body_id = rng.gen_range(0..bodies);
                LabelRecord::new(format!("Synthetic headline {}", i), body_id, stance)
            })
            .collect();

        Self {
            name: "synthetic".to_string(),
            records,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Count of each stance, in canonical order
    pub fn label_distribution(records: &[LabelRecord]) -> BTreeMap<Stance, usize> {
        let mut dist = BTreeMap::new();
        for record in records {
            *dist.entry(record.stance).or_insert(0) += 1;
        }
        dist
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn load(csv: &str) -> Result<Dataset> {
        Dataset::from_reader("test", csv.as_bytes())
    }

    #[test]
    fn test_stance_parsing() {
        assert_eq!("agree".parse::<Stance>(), Ok(Stance::Agree));
        assert_eq!(" Unrelated ".parse::<Stance>(), Ok(Stance::Unrelated));
        assert_eq!("DISCUSS".parse::<Stance>(), Ok(Stance::Discuss));
        assert!("agrees".parse::<Stance>().is_err());
        assert!("".parse::<Stance>().is_err());
    }

    #[test]
    fn test_related_membership() {
        for stance in Stance::RELATED {
            assert!(stance.is_related());
        }
        assert!(!Stance::Unrelated.is_related());
    }

    #[test]
    fn test_canonical_order() {
        for (i, stance) in Stance::ALL.iter().enumerate() {
            assert_eq!(stance.index(), i);
            assert_eq!(Stance::from_index(i), Some(*stance));
        }
        assert_eq!(Stance::from_index(4), None);
    }

    #[test]
    fn test_load_valid_csv() {
        let dataset = load("Headline,Body ID,Stance\n\"Police find mass graves, officials say\",712,unrelated\nCrab sold,158,agree\n").unwrap();

        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.records[0].headline, "Police find mass graves, officials say");
        assert_eq!(dataset.records[0].body_id, BodyId::from("712"));
        assert_eq!(dataset.records[1].stance, Stance::Agree);
    }

    #[test]
    fn test_bom_is_ignored() {
        let dataset = load("\u{feff}Headline,Body ID,Stance\nh1,1,discuss\n").unwrap();
        assert_eq!(dataset.records[0].stance, Stance::Discuss);
    }

    #[test]
    fn test_wrong_header_rejected() {
        let err = load("Headline,BodyID,Stance\nh1,1,agree\n").unwrap_err();
        assert!(matches!(err, ScoreError::MalformedDataset { .. }));
    }

    #[test]
    fn test_reordered_header_rejected() {
        let err = load("Body ID,Headline,Stance\n712,Police find graves,agree\n").unwrap_err();
        match err {
            ScoreError::MalformedDataset { reason, .. } => {
                assert!(reason.contains("expected [Headline, Body ID, Stance]"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_empty_dataset_rejected() {
        let err = load("Headline,Body ID,Stance\n").unwrap_err();
        match err {
            ScoreError::MalformedDataset { reason, .. } => assert!(reason.contains("no data")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_stance_reports_line() {
        let err = load("Headline,Body ID,Stance\nh1,1,agree\nh2,2,agrees\n").unwrap_err();
        match err {
            ScoreError::UnknownStance { line, value } => {
                assert_eq!(line, 3);
                assert_eq!(value, "agrees");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_short_row_is_csv_error() {
        let err = load("Headline,Body ID,Stance\nh1,1\n").unwrap_err();
        assert!(matches!(err, ScoreError::Csv(_)));
    }

    #[test]
    fn test_load_csv_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Headline,Body ID,Stance").unwrap();
        writeln!(file, "h1,10,disagree").unwrap();

        let dataset = Dataset::load_csv(file.path()).unwrap();
        assert_eq!(dataset.records, vec![LabelRecord::new("h1", "10", Stance::Disagree)]);
    }

    #[test]
    fn test_missing_file() {
        let err = Dataset::load_csv(Path::new("/nonexistent/gold.csv")).unwrap_err();
        assert!(matches!(err, ScoreError::Io { .. }));
    }

    #[test]
    fn test_synthetic_dataset() {
        let a = Dataset::synthetic(500, 7);
        let b = Dataset::synthetic(500, 7);

        assert_eq!(a.len(), 500);
        assert_eq!(a.records, b.records);

        let dist = Dataset::label_distribution(&a.records);
        let unrelated = *dist.get(&Stance::Unrelated).unwrap_or(&0);
        assert!(unrelated > 250, "unrelated should dominate, got {unrelated}");
    }

    #[test]
    fn test_label_distribution() {
        let records = vec![
            LabelRecord::new("a", "1", Stance::Agree),
            LabelRecord::new("b", "1", Stance::Unrelated),
            LabelRecord::new("c", "2", Stance::Unrelated),
        ];
        let dist = Dataset::label_distribution(&records);
        assert_eq!(dist.get(&Stance::Agree), Some(&1));
        assert_eq!(dist.get(&Stance::Unrelated), Some(&2));
        assert_eq!(dist.get(&Stance::Discuss), None);
    }
}
