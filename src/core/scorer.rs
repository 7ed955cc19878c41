// File: src/core/scorer.rs
//! Pairwise verb similarity from shared argument distributions.
//!
//! `score = 0.7 * jaccard + 0.3 * freq_ratio`, where `jaccard` is taken over
//! the distinct subject and object lemmas of both verbs and `freq_ratio` is
//! `min(freq) / max(freq)`. Both terms lie in [0, 1], so the score does too.

use crate::core::context::VerbContexts;
use crate::core::model::{round3, EquivalenceRecord};
use tracing::{debug, info};

pub const DEFAULT_THRESHOLD: f64 = 0.1;
pub const JACCARD_WEIGHT: f64 = 0.7;
pub const FREQUENCY_WEIGHT: f64 = 0.3;

pub struct SimilarityScorer {
    threshold: f64,
}

impl Default for SimilarityScorer {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD)
    }
}

impl SimilarityScorer {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Scores one pair, without applying the threshold. `None` when the verbs
    /// share no context or a denominator degenerates.
    pub fn score_pair(&self, verb_a: &str, verb_b: &str, contexts: &VerbContexts) -> Option<EquivalenceRecord> {
        if verb_a == verb_b {
            return None;
        }
        let a = contexts.context(verb_a)?;
        let b = contexts.context(verb_b)?;

        let shared = a.shared_with(b);
        if shared == 0 {
            return None;
        }
        let union = a.distinct_len() + b.distinct_len() - shared;
        if union == 0 {
            return None;
        }
        let jaccard = shared as f64 / union as f64;

        let freq_a = contexts.frequency(verb_a);
        let freq_b = contexts.frequency(verb_b);
        let max_freq = freq_a.max(freq_b);
        let freq_ratio = if max_freq == 0 {
            0.0
        } else {
            freq_a.min(freq_b) as f64 / max_freq as f64
        };

        Some(EquivalenceRecord {
            verb_a: verb_a.to_string(),
            verb_b: verb_b.to_string(),
            score: round3(JACCARD_WEIGHT * jaccard + FREQUENCY_WEIGHT * freq_ratio),
            shared_context_count: shared as u64,
            freq_a,
            freq_b,
        })
    }

    /// Scores every unordered pair once, keeps those at or above the
    /// threshold and returns them sorted by score descending. O(V^2).
    pub fn score_all(&self, contexts: &VerbContexts) -> Vec<EquivalenceRecord> {
        let verbs: Vec<&str> = contexts.verbs().collect();
        let mut records = Vec::new();

        for (i, verb_a) in verbs.iter().enumerate() {
            for verb_b in &verbs[i + 1..] {
                if let Some(record) = self.score_pair(verb_a, verb_b, contexts) {
                    if record.score >= self.threshold {
                        records.push(record);
                    }
                }
            }
            if (i + 1) % 10 == 0 || i + 1 == verbs.len() {
                debug!(processed = i + 1, total = verbs.len(), "Scoring verbs");
            }
        }

        records.sort_by(|x, y| y.score.total_cmp(&x.score));

        info!(equivalences = records.len(), verbs = verbs.len(), "Verb similarity scored");
        for eq in records.iter().take(10) {
            info!("  {:15} ~ {:15} (score: {:.3})", eq.verb_a, eq.verb_b, eq.score);
        }
        records
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Triple;
    use proptest::prelude::*;

    fn founding_triples() -> Vec<Triple> {
        vec![
            Triple::new("científica", "fundar", Some("instituto")),
            Triple::new("investigador", "crear", Some("instituto")),
            Triple::new("científica", "fundar", Some("universidad")),
        ]
    }

    #[test]
    fn verbs_sharing_an_object_are_paired() {
        let contexts = VerbContexts::from_triples(&founding_triples());
        let record = SimilarityScorer::default()
            .score_pair("fundar", "crear", &contexts)
            .unwrap();

        // shared = 1 (instituto); union = 3 + 2 - 1 = 4; freq ratio = 1/2
        assert_eq!(record.shared_context_count, 1);
        assert_eq!(record.freq_a, 2);
        assert_eq!(record.freq_b, 1);
        assert_eq!(record.score, round3(0.7 * 0.25 + 0.3 * 0.5));

        let model = SimilarityScorer::default().score_all(&contexts);
        assert_eq!(model.len(), 1);
        assert_eq!((model[0].verb_a.as_str(), model[0].verb_b.as_str()), ("crear", "fundar"));
    }

    #[test]
    fn disjoint_verbs_are_not_paired() {
        let triples = vec![
            Triple::new("ella", "pintar", Some("cuadro")),
            Triple::new("él", "ganar", Some("premio")),
        ];
        let contexts = VerbContexts::from_triples(&triples);
        assert!(SimilarityScorer::default().score_pair("pintar", "ganar", &contexts).is_none());
        assert!(SimilarityScorer::new(0.0).score_all(&contexts).is_empty());
    }

    #[test]
    fn threshold_gates_weak_pairs() {
        let contexts = VerbContexts::from_triples(&founding_triples());
        assert!(SimilarityScorer::new(0.9).score_all(&contexts).is_empty());
    }

    fn arb_triples() -> impl Strategy<Value = Vec<Triple>> {
        let lemma = |pool: &'static [&'static str]| prop::sample::select(pool).prop_map(str::to_string);
        let triple = (
            lemma(&["ella", "él", "científico", "pintor", "reina"]),
            lemma(&["fundar", "crear", "pintar", "estudiar", "ganar", "recibir"]),
            prop::option::of(lemma(&["premio", "cuadro", "instituto", "física", "corona"])),
        )
            .prop_map(|(subject, verb, object)| Triple { subject, verb, object });
        prop::collection::vec(triple, 0..80)
    }

    proptest! {
        #[test]
        fn scores_are_symmetric_bounded_and_sorted(triples in arb_triples(), threshold in 0.0f64..0.6) {
            let contexts = VerbContexts::from_triples(&triples);
            let scorer = SimilarityScorer::new(threshold);
            let records = scorer.score_all(&contexts);

            let mut seen = std::collections::HashSet::new();
            for r in &records {
                prop_assert!(r.verb_a != r.verb_b);
                prop_assert!((0.0..=1.0).contains(&r.score));
                prop_assert!(r.shared_context_count >= 1);
                prop_assert!(r.score >= threshold);

                let mut key = [r.verb_a.clone(), r.verb_b.clone()];
                key.sort();
                prop_assert!(seen.insert(key));

                let reversed = scorer.score_pair(&r.verb_b, &r.verb_a, &contexts).unwrap();
                prop_assert_eq!(reversed.score, r.score);
                prop_assert_eq!(reversed.shared_context_count, r.shared_context_count);
            }
            for pair in records.windows(2) {
                prop_assert!(pair[0].score >= pair[1].score);
            }
        }
    }
}
