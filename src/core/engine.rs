// File: src/core/engine.rs
use crate::config::check_unit;
use crate::core::model::{EquivalenceIndex, EquivalenceModel};
use crate::core::oracle::LinguisticOracle;
use crate::core::types::Token;
use crate::error::ConfigError;
use crate::persistence::global_cache;
use rand::Rng;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Knobs for one `apply` call.
#[derive(Debug, Clone, PartialEq)]
pub struct ApplyOptions {
    /// Chance that an eligible verb is actually replaced.
    pub substitution_probability: f64,
    /// Equivalents scoring below this are never used.
    pub min_score: f64,
    /// Cap on replacements across the whole batch.
    pub max_substitutions: Option<usize>,
}

impl Default for ApplyOptions {
    fn default() -> Self {
        Self {
            substitution_probability: 0.3,
            min_score: 0.2,
            max_substitutions: None,
        }
    }
}

impl ApplyOptions {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_unit("apply.substitution_probability", self.substitution_probability)?;
        check_unit("apply.min_score", self.min_score)
    }
}

/// One verb replacement made during `apply`.
#[derive(Debug, Clone, PartialEq)]
pub struct Substitution {
    /// Position of the sentence in the input batch.
    pub sentence: usize,
    pub original: String,
    pub replacement: String,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApplyReport {
    pub sentences: Vec<String>,
    pub substitutions: Vec<Substitution>,
}

/// Rewrites candidate hint sentences by swapping verbs for learned
/// equivalents. Without a usable model or oracle it passes input through.
pub struct DirtEngine {
    model: Option<Arc<EquivalenceModel>>,
    index: EquivalenceIndex,
}

impl DirtEngine {
    pub fn new(model: Option<Arc<EquivalenceModel>>) -> Self {
        let index = model
            .as_deref()
            .map(EquivalenceIndex::from_model)
            .unwrap_or_default();
        Self { model, index }
    }

    /// Uses the process-wide model cache, loading `path` on first use.
    pub fn from_cache(path: &Path) -> Self {
        Self::new(global_cache().get_or_load(path))
    }

    pub fn model(&self) -> Option<&EquivalenceModel> {
        self.model.as_deref()
    }

    pub fn index(&self) -> &EquivalenceIndex {
        &self.index
    }

    /// Returns `sentences` with at most one verb per sentence replaced.
    /// The output always has the same length and order as the input.
    pub fn apply<S, R>(
        &self,
        sentences: &[S],
        options: &ApplyOptions,
        oracle: Option<&dyn LinguisticOracle>,
        rng: &mut R,
    ) -> Vec<String>
    where
        S: AsRef<str>,
        R: Rng + ?Sized,
    {
        self.apply_with_report(sentences, options, oracle, rng).sentences
    }

    pub fn apply_with_report<S, R>(
        &self,
        sentences: &[S],
        options: &ApplyOptions,
        oracle: Option<&dyn LinguisticOracle>,
        rng: &mut R,
    ) -> ApplyReport
    where
        S: AsRef<str>,
        R: Rng + ?Sized,
    {
        let passthrough = || ApplyReport {
            sentences: sentences.iter().map(|s| s.as_ref().to_string()).collect(),
            substitutions: Vec::new(),
        };

        if self.model.is_none() {
            debug!("No DIRT model available, passing sentences through");
            return passthrough();
        }
        if self.index.is_empty() {
            debug!("DIRT model has no equivalences, passing sentences through");
            return passthrough();
        }
        let Some(oracle) = oracle else {
            debug!("No linguistic oracle, passing sentences through");
            return passthrough();
        };
        if let Err(e) = oracle.ready() {
            debug!(error = %e, "Linguistic oracle not ready, passing sentences through");
            return passthrough();
        }

        let mut output = Vec::with_capacity(sentences.len());
        let mut substitutions = Vec::new();

        for (i, sentence) in sentences.iter().enumerate() {
            let sentence = sentence.as_ref();
            let budget_left = options
                .max_substitutions
                .map_or(true, |max| substitutions.len() < max);
            if !budget_left {
                output.push(sentence.to_string());
                continue;
            }

            match self.rewrite_sentence(sentence, options, oracle, rng) {
                Some((rewritten, mut substitution)) => {
                    substitution.sentence = i;
                    debug!(
                        sentence = i,
                        original = %substitution.original,
                        replacement = %substitution.replacement,
                        score = substitution.score,
                        "Verb substituted"
                    );
                    output.push(rewritten);
                    substitutions.push(substitution);
                }
                None => output.push(sentence.to_string()),
            }
        }

        info!(
            sentences = output.len(),
            substitutions = substitutions.len(),
            "DIRT applied"
        );
        ApplyReport { sentences: output, substitutions }
    }

    /// Scans verbs left to right; each eligible verb gets one draw and the
    /// first successful draw ends the scan.
    fn rewrite_sentence<R: Rng + ?Sized>(
        &self,
        sentence: &str,
        options: &ApplyOptions,
        oracle: &dyn LinguisticOracle,
        rng: &mut R,
    ) -> Option<(String, Substitution)> {
        let annotated = match oracle.annotate(sentence) {
            Ok(annotated) => annotated,
            Err(e) => {
                debug!(error = %e, "Sentence not annotated, leaving it unchanged");
                return None;
            }
        };

        for token in annotated.iter().flat_map(|s| s.tokens.iter()).filter(|t| t.pos.is_verb()) {
            let Some((equivalent, score)) = self.index.best_equivalent(&token.lemma, options.min_score) else {
                continue;
            };
            if rng.gen::<f64>() >= options.substitution_probability {
                continue;
            }
            let replacement = match_initial_case(&token.form, equivalent);
            if let Some(rewritten) = replace_token(sentence, token, &replacement) {
                return Some((
                    rewritten,
                    Substitution {
                        sentence: 0,
                        original: token.form.clone(),
                        replacement,
                        score,
                    },
                ));
            }
        }
        None
    }
}

/// Replaces the token's surface form once: at its aligned span when that
/// still matches, otherwise at the first whole-word occurrence.
fn replace_token(text: &str, token: &Token, replacement: &str) -> Option<String> {
    let range = token
        .span
        .clone()
        .filter(|span| text.get(span.clone()) == Some(token.form.as_str()))
        .or_else(|| find_whole_word(text, &token.form))?;

    let mut out = String::with_capacity(text.len() + replacement.len());
    out.push_str(&text[..range.start]);
    out.push_str(replacement);
    out.push_str(&text[range.end..]);
    Some(out)
}

fn find_whole_word(text: &str, word: &str) -> Option<std::ops::Range<usize>> {
    if word.is_empty() {
        return None;
    }
    text.match_indices(word).map(|(start, _)| start..start + word.len()).find(|r| {
        let before = text[..r.start].chars().next_back();
        let after = text[r.end..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    })
}

/// Conjugation is not regenerated; only a leading capital is carried over.
fn match_initial_case(original: &str, lemma: &str) -> String {
    if original.chars().next().is_some_and(char::is_uppercase) {
        let mut chars = lemma.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    } else {
        lemma.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_word_search_skips_substrings() {
        assert_eq!(find_whole_word("refundó y fundó", "fundó"), Some(11..17));
        assert_eq!(find_whole_word("refundó", "fundó"), None);
    }

    #[test]
    fn leading_capital_is_preserved() {
        assert_eq!(match_initial_case("Fundó", "crear"), "Crear");
        assert_eq!(match_initial_case("fundó", "crear"), "crear");
        assert_eq!(match_initial_case("Émile", "élever"), "Élever");
    }

    #[test]
    fn out_of_range_options_fail_validation() {
        let options = ApplyOptions { min_score: -0.1, ..ApplyOptions::default() };
        assert!(options.validate().is_err());
        assert!(ApplyOptions::default().validate().is_ok());
    }
}
