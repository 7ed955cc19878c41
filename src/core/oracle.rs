// File: src/core/oracle.rs
//! The linguistic oracle capability and a CoNLL-U backed implementation.
//!
//! The builder and the applier only need sentence boundaries plus, per token,
//! a lemma, a POS tag and a dependency label. Any parser that can emit
//! CoNLL-U (spaCy, UDPipe, Stanza) satisfies that through [`ConlluOracle`].

use crate::core::types::{AnnotatedSentence, DepRel, Pos, Token};
use crate::error::OracleError;
use std::collections::HashMap;
use std::path::Path;

pub trait LinguisticOracle {
    /// Checks that the oracle can annotate anything at all.
    fn ready(&self) -> Result<(), OracleError> {
        Ok(())
    }

    /// Segments `text` into sentences and annotates every token.
    /// Token spans are byte ranges into `text`.
    fn annotate(&self, text: &str) -> Result<Vec<AnnotatedSentence>, OracleError>;
}

/// A multiword surface token (`1-2  del`) covering several syntactic words.
#[derive(Debug, Clone)]
struct MultiwordRange {
    first: usize,
    last: usize,
    surface: String,
}

#[derive(Debug, Clone)]
struct ConlluSentence {
    sentence: AnnotatedSentence,
    multiword: Vec<MultiwordRange>,
}

#[derive(Debug, Clone)]
struct ConlluDocument {
    text: String,
    sentences: Vec<ConlluSentence>,
}

/// Serves annotations parsed ahead of time from CoNLL-U output.
///
/// Lookup is by whitespace-normalised text: a whole `# newdoc` document first,
/// then a single sentence (`# text = ...`). Input without `# newdoc` markers is
/// a single document.
#[derive(Debug, Default)]
pub struct ConlluOracle {
    documents: Vec<ConlluDocument>,
    by_document: HashMap<String, usize>,
    by_sentence: HashMap<String, (usize, usize)>,
}

#[derive(Default)]
struct PendingSentence {
    text: Option<String>,
    tokens: Vec<Token>,
    multiword: Vec<MultiwordRange>,
}

impl ConlluOracle {
    pub fn from_path(path: &Path) -> Result<Self, OracleError> {
        let input = std::fs::read_to_string(path).map_err(|source| OracleError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&input)
    }

    pub fn parse(input: &str) -> Result<Self, OracleError> {
        let mut oracle = ConlluOracle::default();
        let mut doc_sentences: Vec<ConlluSentence> = Vec::new();
        let mut pending = PendingSentence::default();

        for (line_no, raw) in input.lines().enumerate() {
            let line = raw.trim_end_matches('\r');
            if line.trim().is_empty() {
                finish_sentence(&mut pending, &mut doc_sentences);
            } else if let Some(comment) = line.strip_prefix('#') {
                let comment = comment.trim();
                if comment.starts_with("newdoc") {
                    finish_sentence(&mut pending, &mut doc_sentences);
                    oracle.push_document(std::mem::take(&mut doc_sentences));
                } else if let Some(text) = comment.strip_prefix("text =") {
                    pending.text = Some(text.trim().to_string());
                }
            } else {
                parse_token_line(line, line_no + 1, &mut pending)?;
            }
        }
        finish_sentence(&mut pending, &mut doc_sentences);
        oracle.push_document(doc_sentences);

        Ok(oracle)
    }

    fn push_document(&mut self, sentences: Vec<ConlluSentence>) {
        if sentences.is_empty() {
            return;
        }
        let doc_id = self.documents.len();
        let text = normalize_whitespace(
            &sentences
                .iter()
                .map(|s| s.sentence.text.as_str())
                .collect::<Vec<_>>()
                .join(" "),
        );
        for (sent_id, s) in sentences.iter().enumerate() {
            self.by_sentence
                .entry(normalize_whitespace(&s.sentence.text))
                .or_insert((doc_id, sent_id));
        }
        self.by_document.entry(text.clone()).or_insert(doc_id);
        self.documents.push(ConlluDocument { text, sentences });
    }

    /// Texts of every loaded document, in file order.
    pub fn documents(&self) -> impl Iterator<Item = &str> + '_ {
        self.documents.iter().map(|d| d.text.as_str())
    }

    pub fn sentence_count(&self) -> usize {
        self.documents.iter().map(|d| d.sentences.len()).sum()
    }
}

impl LinguisticOracle for ConlluOracle {
    fn ready(&self) -> Result<(), OracleError> {
        if self.documents.is_empty() {
            return Err(OracleError::Unavailable {
                reason: "no CoNLL-U annotations loaded".to_string(),
            });
        }
        Ok(())
    }

    fn annotate(&self, text: &str) -> Result<Vec<AnnotatedSentence>, OracleError> {
        let key = normalize_whitespace(text);
        let selected: Vec<&ConlluSentence> = if let Some(&doc_id) = self.by_document.get(&key) {
            self.documents[doc_id].sentences.iter().collect()
        } else if let Some(&(doc_id, sent_id)) = self.by_sentence.get(&key) {
            vec![&self.documents[doc_id].sentences[sent_id]]
        } else {
            return Err(OracleError::Unannotated {
                preview: key.chars().take(60).collect(),
            });
        };

        let mut cursor = 0;
        Ok(selected
            .into_iter()
            .map(|s| {
                let mut sentence = s.sentence.clone();
                align_spans(text, &mut cursor, &mut sentence, &s.multiword);
                sentence
            })
            .collect())
    }
}

fn parse_token_line(line: &str, line_no: usize, pending: &mut PendingSentence) -> Result<(), OracleError> {
    let cols: Vec<&str> = line.split('\t').collect();
    if cols.len() < 8 {
        return Err(OracleError::Malformed {
            line: line_no,
            reason: format!("expected 10 tab-separated columns, found {}", cols.len()),
        });
    }
    let id = cols[0];

    // Empty nodes of enhanced dependencies carry no surface text.
    if id.contains('.') {
        return Ok(());
    }
    if let Some((first, last)) = id.split_once('-') {
        let (first, last) = match (first.parse::<usize>(), last.parse::<usize>()) {
            (Ok(f), Ok(l)) if f >= 1 && l >= f => (f - 1, l - 1),
            _ => {
                return Err(OracleError::Malformed {
                    line: line_no,
                    reason: format!("invalid multiword range '{id}'"),
                })
            }
        };
        pending.multiword.push(MultiwordRange {
            first,
            last,
            surface: cols[1].to_string(),
        });
        return Ok(());
    }

    let index = match id.parse::<usize>() {
        Ok(n) if n >= 1 => n - 1,
        _ => {
            return Err(OracleError::Malformed {
                line: line_no,
                reason: format!("invalid token id '{id}'"),
            })
        }
    };
    let head = match cols[6].parse::<usize>() {
        Ok(0) => None,
        Ok(h) => Some(h - 1),
        Err(_) => {
            return Err(OracleError::Malformed {
                line: line_no,
                reason: format!("invalid head '{}'", cols[6]),
            })
        }
    };
    let form = cols[1].to_string();
    let lemma = match cols[2] {
        "_" => form.to_lowercase(),
        l => l.to_string(),
    };

    pending.tokens.push(Token {
        index,
        form,
        lemma,
        pos: Pos::from_tag(cols[3]),
        deprel: DepRel::from_label(cols[7]),
        head,
        span: None,
    });
    Ok(())
}

fn finish_sentence(pending: &mut PendingSentence, out: &mut Vec<ConlluSentence>) {
    let done = std::mem::take(pending);
    if done.tokens.is_empty() {
        return;
    }
    let text = done.text.unwrap_or_else(|| {
        done.tokens
            .iter()
            .map(|t| t.form.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    });
    out.push(ConlluSentence {
        sentence: AnnotatedSentence { text, tokens: done.tokens },
        multiword: done.multiword,
    });
}

/// Aligns token forms against `text` left to right starting at `cursor`.
/// Words inside a multiword token stay unaligned; the cursor skips the
/// multiword surface instead.
fn align_spans(text: &str, cursor: &mut usize, sentence: &mut AnnotatedSentence, multiword: &[MultiwordRange]) {
    let mut i = 0;
    while i < sentence.tokens.len() {
        let index = sentence.tokens[i].index;
        if let Some(range) = multiword.iter().find(|r| r.first == index) {
            if let Some(pos) = text[*cursor..].find(range.surface.as_str()) {
                *cursor += pos + range.surface.len();
            }
            while i < sentence.tokens.len() && sentence.tokens[i].index <= range.last {
                sentence.tokens[i].span = None;
                i += 1;
            }
            continue;
        }

        let token = &mut sentence.tokens[i];
        token.span = text[*cursor..].find(token.form.as_str()).map(|pos| {
            let start = *cursor + pos;
            let end = start + token.form.len();
            *cursor = end;
            start..end
        });
        i += 1;
    }
}

fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
# newdoc id = curie
# text = Curie fundó el instituto.
1\tCurie\tCurie\tPROPN\t_\t_\t2\tnsubj\t_\t_
2\tfundó\tfundar\tVERB\t_\t_\t0\troot\t_\t_
3\tel\tel\tDET\t_\t_\t4\tdet\t_\t_
4\tinstituto\tinstituto\tNOUN\t_\t_\t2\tobj\t_\tSpaceAfter=No
5\t.\t.\tPUNCT\t_\t_\t2\tpunct\t_\t_

# text = Trabajó del alba.
1\tTrabajó\ttrabajar\tVERB\t_\t_\t0\troot\t_\t_
2-3\tdel\t_\t_\t_\t_\t_\t_\t_\t_
2\tde\tde\tADP\t_\t_\t4\tcase\t_\t_
3\tel\tel\tDET\t_\t_\t4\tdet\t_\t_
4\talba\talba\tNOUN\t_\t_\t1\tobl\t_\tSpaceAfter=No
5\t.\t.\tPUNCT\t_\t_\t1\tpunct\t_\t_
";

    #[test]
    fn parses_documents_and_sentences() {
        let oracle = ConlluOracle::parse(SAMPLE).unwrap();
        assert!(oracle.ready().is_ok());
        assert_eq!(oracle.sentence_count(), 2);
        let docs: Vec<&str> = oracle.documents().collect();
        assert_eq!(docs, vec!["Curie fundó el instituto. Trabajó del alba."]);
    }

    #[test]
    fn annotates_single_sentence_with_aligned_spans() {
        let oracle = ConlluOracle::parse(SAMPLE).unwrap();
        let text = "Curie  fundó el instituto.";
        let sentences = oracle.annotate(text).unwrap();
        assert_eq!(sentences.len(), 1);

        let verb = &sentences[0].tokens[1];
        assert!(verb.pos.is_verb());
        assert_eq!(verb.lemma, "fundar");
        assert_eq!(verb.head, None);
        let span = verb.span.clone().unwrap();
        assert_eq!(&text[span], "fundó");

        let children: Vec<&str> = sentences[0].children(1).map(|t| t.form.as_str()).collect();
        assert_eq!(children, vec!["Curie", "instituto", "."]);
    }

    #[test]
    fn multiword_tokens_are_skipped_during_alignment() {
        let oracle = ConlluOracle::parse(SAMPLE).unwrap();
        let text = "Trabajó del alba.";
        let sentence = &oracle.annotate(text).unwrap()[0];
        assert_eq!(sentence.tokens[1].span, None);
        assert_eq!(sentence.tokens[2].span, None);
        assert_eq!(&text[sentence.tokens[3].span.clone().unwrap()], "alba");
    }

    #[test]
    fn unknown_text_is_unannotated() {
        let oracle = ConlluOracle::parse(SAMPLE).unwrap();
        assert!(matches!(
            oracle.annotate("Nunca visto."),
            Err(OracleError::Unannotated { .. })
        ));
    }

    #[test]
    fn empty_input_is_not_ready() {
        let oracle = ConlluOracle::parse("").unwrap();
        assert!(matches!(oracle.ready(), Err(OracleError::Unavailable { .. })));
    }

    #[test]
    fn broken_token_line_reports_its_line_number() {
        let err = ConlluOracle::parse("# text = x\n1\tx\tx\n").unwrap_err();
        assert!(matches!(err, OracleError::Malformed { line: 2, .. }));
    }
}
