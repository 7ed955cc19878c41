// File: src/core/model.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

pub const MODEL_VERSION: &str = "1.0";

/// A scored claim that two verbs are interchangeable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquivalenceRecord {
    #[serde(rename = "a")]
    pub verb_a: String,
    #[serde(rename = "b")]
    pub verb_b: String,
    pub score: f64,
    #[serde(default)]
    pub shared_context_count: u64,
    #[serde(default)]
    pub freq_a: u64,
    #[serde(default)]
    pub freq_b: u64,
}

/// The persisted set of equivalences, sorted by score descending.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquivalenceModel {
    #[serde(default = "unknown_version")]
    pub version: String,
    #[serde(default)]
    pub generated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub equivalence_count: usize,
    pub equivalences: Vec<EquivalenceRecord>,
}

fn unknown_version() -> String {
    "unknown".to_string()
}

impl EquivalenceModel {
    /// Wraps scored records, stamping the current time.
    pub fn new(equivalences: Vec<EquivalenceRecord>) -> Self {
        Self {
            version: MODEL_VERSION.to_string(),
            generated_at: Some(Utc::now()),
            equivalence_count: equivalences.len(),
            equivalences,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.equivalences.is_empty()
    }

    pub fn stats(&self) -> ModelStats {
        let mut unique_verbs = BTreeSet::new();
        for eq in &self.equivalences {
            unique_verbs.insert(eq.verb_a.as_str());
            unique_verbs.insert(eq.verb_b.as_str());
        }
        let scores = self.equivalences.iter().map(|e| e.score);
        let (mean_score, max_score, min_score) = if self.equivalences.is_empty() {
            (0.0, 0.0, 0.0)
        } else {
            (
                round3(scores.clone().sum::<f64>() / self.equivalences.len() as f64),
                round3(scores.clone().fold(f64::MIN, f64::max)),
                round3(scores.fold(f64::MAX, f64::min)),
            )
        };

        ModelStats {
            version: self.version.clone(),
            generated_at: self.generated_at,
            equivalence_count: self.equivalences.len(),
            unique_verbs: unique_verbs.len(),
            mean_score,
            max_score,
            min_score,
        }
    }
}

/// Summary figures for inspecting a model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelStats {
    pub version: String,
    pub generated_at: Option<DateTime<Utc>>,
    pub equivalence_count: usize,
    pub unique_verbs: usize,
    pub mean_score: f64,
    pub max_score: f64,
    pub min_score: f64,
}

pub(crate) fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// Verb -> equivalents lookup, each list sorted by score descending.
#[derive(Debug, Clone, Default)]
pub struct EquivalenceIndex {
    entries: HashMap<String, Vec<(String, f64)>>,
}

impl EquivalenceIndex {
    /// Inserts every record under both of its verbs.
    pub fn from_model(model: &EquivalenceModel) -> Self {
        let mut entries: HashMap<String, Vec<(String, f64)>> = HashMap::new();
        for eq in &model.equivalences {
            entries
                .entry(eq.verb_a.clone())
                .or_default()
                .push((eq.verb_b.clone(), eq.score));
            entries
                .entry(eq.verb_b.clone())
                .or_default()
                .push((eq.verb_a.clone(), eq.score));
        }
        // Stable sort: exact ties keep model order.
        for list in entries.values_mut() {
            list.sort_by(|x, y| y.1.total_cmp(&x.1));
        }
        Self { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn equivalents(&self, verb: &str) -> &[(String, f64)] {
        self.entries
            .get(&verb.to_lowercase())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Highest-scoring equivalent at or above `min_score`.
    pub fn best_equivalent(&self, verb: &str, min_score: f64) -> Option<(&str, f64)> {
        self.equivalents(verb)
            .iter()
            .find(|(_, score)| *score >= min_score)
            .map(|(other, score)| (other.as_str(), *score))
    }

    pub fn top_n(&self, verb: &str, n: usize) -> &[(String, f64)] {
        let list = self.equivalents(verb);
        &list[..n.min(list.len())]
    }
}
