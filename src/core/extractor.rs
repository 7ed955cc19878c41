// File: src/core/extractor.rs
use crate::core::oracle::LinguisticOracle;
use crate::core::types::{AnnotatedSentence, Triple};
use regex::Regex;
use std::sync::OnceLock;
use tracing::{info, warn};

pub const DEFAULT_MIN_SENTENCE_TOKENS: usize = 3;

struct CleanupPatterns {
    references: Regex,
    parentheticals: Regex,
    whitespace: Regex,
}

fn cleanup_patterns() -> &'static CleanupPatterns {
    static PATTERNS: OnceLock<CleanupPatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| CleanupPatterns {
        references: Regex::new(r"\[\d+\]").unwrap(),
        parentheticals: Regex::new(r"\([^)]*\)").unwrap(),
        whitespace: Regex::new(r"\s+").unwrap(),
    })
}

/// Strips `[12]`-style reference markers and parenthetical asides, then
/// collapses newlines and runs of whitespace.
pub fn clean_text(raw: &str) -> String {
    let p = cleanup_patterns();
    let text = p.references.replace_all(raw, "");
    let text = p.parentheticals.replace_all(&text, "");
    p.whitespace.replace_all(&text, " ").trim().to_string()
}

/// Pulls subject-verb-object triples out of annotated text.
pub struct Extractor {
    min_sentence_tokens: usize,
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_SENTENCE_TOKENS)
    }
}

impl Extractor {
    pub fn new(min_sentence_tokens: usize) -> Self {
        Self { min_sentence_tokens }
    }

    /// Extracts triples from every text, in corpus order. Texts the oracle
    /// cannot annotate are skipped.
    pub fn extract<S: AsRef<str>>(&self, texts: &[S], oracle: &dyn LinguisticOracle) -> Vec<Triple> {
        let mut triples = Vec::new();
        let total = texts.len();

        for (i, text) in texts.iter().enumerate() {
            match oracle.annotate(text.as_ref()) {
                Ok(sentences) => {
                    for sentence in &sentences {
                        if sentence.tokens.len() < self.min_sentence_tokens {
                            continue;
                        }
                        triples.extend(self.extract_sentence(sentence));
                    }
                }
                Err(e) => warn!(text = i, error = %e, "Skipping text the oracle could not annotate"),
            }

            if (i + 1) % 5 == 0 || i + 1 == total {
                info!(processed = i + 1, total, triples = triples.len(), "Extracting triples");
            }
        }
        triples
    }

    /// One triple per verb with a subject child. The first subject child and
    /// the first object child in traversal order win.
    pub fn extract_sentence(&self, sentence: &AnnotatedSentence) -> Vec<Triple> {
        sentence
            .verbs()
            .filter(|verb| !verb.lemma.is_empty())
            .filter_map(|verb| {
                let subject = sentence.children(verb.index).find(|c| c.deprel.is_subject())?;
                let object = sentence.children(verb.index).find(|c| c.deprel.is_object());
                Some(Triple {
                    subject: subject.lemma.to_lowercase(),
                    verb: verb.lemma.to_lowercase(),
                    object: object.map(|o| o.lemma.to_lowercase()),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::oracle::ConlluOracle;

    const CORPUS: &str = "\
# newdoc id = d1
# text = La científica fundó el instituto.
1\tLa\tel\tDET\t_\t_\t2\tdet\t_\t_
2\tcientífica\tcientífica\tNOUN\t_\t_\t3\tnsubj\t_\t_
3\tfundó\tfundar\tVERB\t_\t_\t0\troot\t_\t_
4\tel\tel\tDET\t_\t_\t5\tdet\t_\t_
5\tinstituto\tInstituto\tNOUN\t_\t_\t3\tobj\t_\t_

# text = Murió allí.
1\tMurió\tmorir\tVERB\t_\t_\t0\troot\t_\t_
2\tallí\tallí\tADV\t_\t_\t1\tadvmod\t_\t_

# text = El premio fue recibido por ella.
1\tEl\tel\tDET\t_\t_\t2\tdet\t_\t_
2\tpremio\tpremio\tNOUN\t_\t_\t4\tnsubj:pass\t_\t_
3\tfue\tser\tAUX\t_\t_\t4\taux:pass\t_\t_
4\trecibido\trecibir\tVERB\t_\t_\t0\troot\t_\t_
5\tpor\tpor\tADP\t_\t_\t6\tcase\t_\t_
6\tella\tél\tPRON\t_\t_\t4\tobl:agent\t_\t_
";

    #[test]
    fn clean_text_strips_references_and_asides() {
        let raw = "Marie Curie (1867-1934) fue\n\nuna científica[1]   polaca.[23]";
        assert_eq!(clean_text(raw), "Marie Curie fue una científica polaca.");
    }

    #[test]
    fn extracts_subject_verb_object_and_passive_subjects() {
        let oracle = ConlluOracle::parse(CORPUS).unwrap();
        let texts: Vec<String> = oracle.documents().map(str::to_string).collect();
        let triples = Extractor::default().extract(&texts, &oracle);
        assert_eq!(
            triples,
            vec![
                Triple::new("científica", "fundar", Some("instituto")),
                Triple::new("premio", "recibir", None),
            ]
        );
    }

    #[test]
    fn short_sentences_are_prefiltered() {
        let oracle = ConlluOracle::parse(CORPUS).unwrap();
        let texts: Vec<String> = oracle.documents().map(str::to_string).collect();
        let triples = Extractor::new(6).extract(&texts, &oracle);
        // Only the six-token passive sentence survives.
        assert_eq!(triples, vec![Triple::new("premio", "recibir", None)]);
    }

    #[test]
    fn extraction_is_deterministic() {
        let oracle = ConlluOracle::parse(CORPUS).unwrap();
        let texts: Vec<String> = oracle.documents().map(str::to_string).collect();
        let extractor = Extractor::default();
        assert_eq!(extractor.extract(&texts, &oracle), extractor.extract(&texts, &oracle));
    }

    #[test]
    fn unannotated_texts_are_skipped() {
        let oracle = ConlluOracle::parse(CORPUS).unwrap();
        let triples = Extractor::default().extract(["Texto desconocido."].as_slice(), &oracle);
        assert!(triples.is_empty());
    }
}
