// File: src/core/context.rs
use crate::core::types::Triple;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Subjects and objects one verb was seen with, with their counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerbContext {
    pub subjects: BTreeMap<String, u64>,
    pub objects: BTreeMap<String, u64>,
}

impl VerbContext {
    /// Distinct subject plus distinct object lemmas.
    pub fn distinct_len(&self) -> usize {
        self.subjects.len() + self.objects.len()
    }

    /// Distinct lemmas shared with `other`, subjects and objects counted
    /// separately.
    pub fn shared_with(&self, other: &VerbContext) -> usize {
        let subjects = self.subjects.keys().filter(|s| other.subjects.contains_key(*s)).count();
        let objects = self.objects.keys().filter(|o| other.objects.contains_key(*o)).count();
        subjects + objects
    }
}

/// Per-verb argument distributions folded from a triple stream.
/// Ordered maps keep pair enumeration deterministic across runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerbContexts {
    contexts: BTreeMap<String, VerbContext>,
    /// Maps verb -> number of triples it appeared in
    frequencies: BTreeMap<String, u64>,
    triple_count: u64,
}

impl VerbContexts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_triples<'a, I>(triples: I) -> Self
    where
        I: IntoIterator<Item = &'a Triple>,
    {
        let mut contexts = Self::new();
        for triple in triples {
            contexts.add_triple(triple);
        }
        contexts
    }

    /// Folds one triple into its verb's context. O(log V).
    pub fn add_triple(&mut self, triple: &Triple) {
        let context = self.contexts.entry(triple.verb.clone()).or_default();
        *context.subjects.entry(triple.subject.clone()).or_insert(0) += 1;
        if let Some(object) = &triple.object {
            *context.objects.entry(object.clone()).or_insert(0) += 1;
        }
        *self.frequencies.entry(triple.verb.clone()).or_insert(0) += 1;
        self.triple_count += 1;
    }

    pub fn verbs(&self) -> impl Iterator<Item = &str> + '_ {
        self.contexts.keys().map(String::as_str)
    }

    pub fn context(&self, verb: &str) -> Option<&VerbContext> {
        self.contexts.get(verb)
    }

    pub fn frequency(&self, verb: &str) -> u64 {
        self.frequencies.get(verb).copied().unwrap_or(0)
    }

    pub fn triple_count(&self) -> u64 {
        self.triple_count
    }

    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }
}
