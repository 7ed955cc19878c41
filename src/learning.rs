// File: src/learning.rs
use crate::config::BuildConfig;
use crate::core::context::VerbContexts;
use crate::core::extractor::Extractor;
use crate::core::model::EquivalenceModel;
use crate::core::oracle::LinguisticOracle;
use crate::core::scorer::SimilarityScorer;
use crate::error::BuildError;
use tracing::info;

/// Result of a successful build. The contexts are returned so callers can
/// snapshot them for later rescoring.
#[derive(Debug)]
pub struct BuildOutcome {
    pub model: EquivalenceModel,
    pub contexts: VerbContexts,
}

/// Learns the verb equivalence model from a biography corpus.
pub struct ModelBuilder {
    extractor: Extractor,
    scorer: SimilarityScorer,
}

impl Default for ModelBuilder {
    fn default() -> Self {
        Self {
            extractor: Extractor::default(),
            scorer: SimilarityScorer::default(),
        }
    }
}

impl ModelBuilder {
    pub fn new(extractor: Extractor, scorer: SimilarityScorer) -> Self {
        Self { extractor, scorer }
    }

    pub fn from_config(config: &BuildConfig) -> Self {
        Self::new(
            Extractor::new(config.min_sentence_tokens),
            SimilarityScorer::new(config.threshold),
        )
    }

    /// Runs extraction, aggregation and scoring. Every stage that comes up
    /// empty stops the run with its own error, so "found nothing" is never
    /// confused with "never ran".
    pub fn build<S: AsRef<str>>(&self, texts: &[S], oracle: &dyn LinguisticOracle) -> Result<BuildOutcome, BuildError> {
        oracle.ready().map_err(BuildError::OracleUnavailable)?;
        if texts.is_empty() {
            return Err(BuildError::EmptyCorpus);
        }
        info!(texts = texts.len(), "Extracting subject-verb-object triples");

        let triples = self.extractor.extract(texts, oracle);
        if triples.is_empty() {
            return Err(BuildError::NoTriples { texts: texts.len() });
        }
        info!(triples = triples.len(), "Triples extracted");

        let contexts = VerbContexts::from_triples(&triples);
        let model = self.build_from_contexts(&contexts)?;
        Ok(BuildOutcome { model, contexts })
    }

    /// Scores already aggregated contexts.
    pub fn build_from_contexts(&self, contexts: &VerbContexts) -> Result<EquivalenceModel, BuildError> {
        if contexts.is_empty() {
            return Err(BuildError::NoTriples { texts: 0 });
        }
        let records = self.scorer.score_all(contexts);
        if records.is_empty() {
            return Err(BuildError::NoEquivalences {
                threshold: self.scorer.threshold(),
                verbs: contexts.len(),
            });
        }
        Ok(EquivalenceModel::new(records))
    }
}
