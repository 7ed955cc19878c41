// src/core/types.rs
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Universal part-of-speech tag as emitted by the annotation oracle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pos {
    Verb,
    Aux,
    Noun,
    ProperNoun,
    Pronoun,
    Other(String),
}

impl Pos {
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "VERB" => Pos::Verb,
            "AUX" => Pos::Aux,
            "NOUN" => Pos::Noun,
            "PROPN" => Pos::ProperNoun,
            "PRON" => Pos::Pronoun,
            other => Pos::Other(other.to_string()),
        }
    }

    /// Auxiliaries and copulas are not content verbs.
    pub fn is_verb(&self) -> bool {
        matches!(self, Pos::Verb)
    }
}

/// Dependency label relative to the token's head.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DepRel {
    NominalSubject,
    PassiveSubject,
    DirectObject,
    IndirectObject,
    Other(String),
}

impl DepRel {
    /// Accepts both UD v2 labels (`nsubj:pass`, `obj`) and the older
    /// spaCy/UD v1 spellings (`nsubjpass`, `dobj`).
    pub fn from_label(label: &str) -> Self {
        match label {
            "nsubj:pass" | "nsubjpass" => DepRel::PassiveSubject,
            "obj" | "dobj" => DepRel::DirectObject,
            "iobj" => DepRel::IndirectObject,
            l if l == "nsubj" || l.starts_with("nsubj:") => DepRel::NominalSubject,
            other => DepRel::Other(other.to_string()),
        }
    }

    pub fn is_subject(&self) -> bool {
        matches!(self, DepRel::NominalSubject | DepRel::PassiveSubject)
    }

    pub fn is_object(&self) -> bool {
        matches!(self, DepRel::DirectObject | DepRel::IndirectObject)
    }
}

/// One annotated word of a sentence.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// 0-based position within the sentence.
    pub index: usize,
    pub form: String,
    pub lemma: String,
    pub pos: Pos,
    pub deprel: DepRel,
    /// 0-based index of the syntactic head, `None` for the root.
    pub head: Option<usize>,
    /// Byte range of `form` in the annotated text, when it could be aligned.
    pub span: Option<Range<usize>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnnotatedSentence {
    pub text: String,
    pub tokens: Vec<Token>,
}

impl AnnotatedSentence {
    /// Direct syntactic children of `index`, in traversal order.
    pub fn children(&self, index: usize) -> impl Iterator<Item = &Token> + '_ {
        self.tokens.iter().filter(move |t| t.head == Some(index))
    }

    pub fn verbs(&self) -> impl Iterator<Item = &Token> + '_ {
        self.tokens.iter().filter(|t| t.pos.is_verb())
    }
}

/// A subject-verb-object fact. All fields are lower-cased lemmas; a missing
/// object is `None`. Triples without a subject are never built.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Triple {
    pub subject: String,
    pub verb: String,
    pub object: Option<String>,
}

impl Triple {
    pub fn new(subject: &str, verb: &str, object: Option<&str>) -> Self {
        Self {
            subject: subject.to_string(),
            verb: verb.to_string(),
            object: object.map(str::to_string),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dependency_labels_cover_both_ud_generations() {
        assert_eq!(DepRel::from_label("nsubj"), DepRel::NominalSubject);
        assert_eq!(DepRel::from_label("nsubj:outer"), DepRel::NominalSubject);
        assert_eq!(DepRel::from_label("nsubj:pass"), DepRel::PassiveSubject);
        assert_eq!(DepRel::from_label("nsubjpass"), DepRel::PassiveSubject);
        assert_eq!(DepRel::from_label("dobj"), DepRel::DirectObject);
        assert_eq!(DepRel::from_label("obj"), DepRel::DirectObject);
        assert!(DepRel::from_label("iobj").is_object());
        assert!(!DepRel::from_label("obl").is_object());
        assert!(!DepRel::from_label("nmod").is_subject());
    }

    #[test]
    fn only_content_verbs_count_as_verbs() {
        assert!(Pos::from_tag("VERB").is_verb());
        assert!(!Pos::from_tag("AUX").is_verb());
        assert_eq!(Pos::from_tag("ADJ"), Pos::Other("ADJ".into()));
    }
}
