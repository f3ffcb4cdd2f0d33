//! Grouping of translation tuples into gloss entries.
//!
//! The aggregator makes a single forward pass over an ordered tuple stream.
//! Each distinct `(source word, part of speech)` pair becomes one entry whose
//! position is fixed by its first occurrence; target words are bucketed by
//! concept group in encounter order. Nothing is sorted here.

use std::collections::HashMap;

use serde::Serialize;
use smallvec::SmallVec;

use crate::tuple::{ConceptGroupId, PartOfSpeech, TranslationTuple};

/// Identity of a gloss entry.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct DefinitionKey {
    pub source_word: String,
    pub part_of_speech: PartOfSpeech,
}

impl DefinitionKey {
    pub fn new(source_word: impl Into<String>, part_of_speech: PartOfSpeech) -> Self {
        Self {
            source_word: source_word.into(),
            part_of_speech,
        }
    }
}

/// Target words sharing one concept group.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ConceptGroup {
    pub id: ConceptGroupId,
    pub words: SmallVec<[String; 2]>,
}

/// Concept groups of one entry, in first-seen order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct DefinitionValues {
    groups: Vec<ConceptGroup>,
}

impl DefinitionValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Values holding a single word.
    pub fn single(concept_group_id: ConceptGroupId, word: impl Into<String>) -> Self {
        let mut values = Self::new();
        values.add(concept_group_id, word);
        values
    }

    /// Append `word` to the list of `concept_group_id`, opening the group on
    /// first sight.
    pub fn add(&mut self, concept_group_id: ConceptGroupId, word: impl Into<String>) {
        let word = word.into();
        match self.group_mut(concept_group_id) {
            Some(group) => group.words.push(word),
            None => {
                let mut words = SmallVec::new();
                words.push(word);
                self.groups.push(ConceptGroup {
                    id: concept_group_id,
                    words,
                });
            }
        }
    }

    /// Merge `other` into `self`.
    ///
    /// Groups already present keep their position and receive `other`'s words
    /// at the end; groups new to `self` are appended in `other`'s order.
    pub fn merge_from(&mut self, other: DefinitionValues) {
        for group in other.groups {
            match self.group_mut(group.id) {
                Some(existing) => existing.words.extend(group.words),
                None => self.groups.push(group),
            }
        }
    }

    /// Owned form of [`merge_from`](Self::merge_from).
    pub fn merge(mut self, other: DefinitionValues) -> Self {
        self.merge_from(other);
        self
    }

    pub fn groups(&self) -> &[ConceptGroup] {
        &self.groups
    }

    pub fn group(&self, concept_group_id: ConceptGroupId) -> Option<&ConceptGroup> {
        self.groups.iter().find(|g| g.id == concept_group_id)
    }

    fn group_mut(&mut self, concept_group_id: ConceptGroupId) -> Option<&mut ConceptGroup> {
        self.groups.iter_mut().find(|g| g.id == concept_group_id)
    }

    /// Number of concept groups (senses).
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Total number of target words across all groups.
    pub fn word_count(&self) -> usize {
        self.groups.iter().map(|g| g.words.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// One `(key, values)` pair of the glossary.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GlossEntry {
    pub key: DefinitionKey,
    pub values: DefinitionValues,
}

/// Ordered gloss entries, in first-occurrence order of their keys.
#[derive(Clone, Debug, Default)]
pub struct Glossary {
    entries: Vec<GlossEntry>,
    index: HashMap<DefinitionKey, usize>,
}

impl PartialEq for Glossary {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl Eq for Glossary {}

impl Glossary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[GlossEntry] {
        &self.entries
    }

    pub fn iter(&self) -> core::slice::Iter<'_, GlossEntry> {
        self.entries.iter()
    }

    pub fn get(&self, key: &DefinitionKey) -> Option<&DefinitionValues> {
        self.index.get(key).map(|&idx| &self.entries[idx].values)
    }

    pub fn into_entries(self) -> Vec<GlossEntry> {
        self.entries
    }

    /// Merge `values` into the entry for `key`, creating it at the end when
    /// the key is new.
    pub fn insert(&mut self, key: DefinitionKey, values: DefinitionValues) {
        match self.index.get(&key) {
            Some(&idx) => self.entries[idx].values.merge_from(values),
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push(GlossEntry { key, values });
            }
        }
    }

    /// Compose two partial glossaries. Entries of `self` keep their positions;
    /// keys first seen in `other` follow in `other`'s order.
    pub fn merge(mut self, other: Glossary) -> Self {
        for entry in other.entries {
            self.insert(entry.key, entry.values);
        }
        self
    }

    fn push_tuple(&mut self, tuple: TranslationTuple) {
        let key = DefinitionKey::new(tuple.source_word, tuple.part_of_speech);
        match self.index.get(&key) {
            Some(&idx) => self.entries[idx]
                .values
                .add(tuple.concept_group_id, tuple.target_word),
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push(GlossEntry {
                    key,
                    values: DefinitionValues::single(tuple.concept_group_id, tuple.target_word),
                });
            }
        }
    }
}

impl<'a> IntoIterator for &'a Glossary {
    type Item = &'a GlossEntry;
    type IntoIter = core::slice::Iter<'a, GlossEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Incremental tuple folder.
#[derive(Debug, Default)]
pub struct Aggregator {
    glossary: Glossary,
    tuples_seen: usize,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, tuple: TranslationTuple) {
        self.tuples_seen += 1;
        self.glossary.push_tuple(tuple);
    }

    pub fn extend<I>(&mut self, tuples: I)
    where
        I: IntoIterator<Item = TranslationTuple>,
    {
        for tuple in tuples {
            self.push(tuple);
        }
    }

    pub fn tuples_seen(&self) -> usize {
        self.tuples_seen
    }

    pub fn finish(self) -> Glossary {
        log::debug!(
            "aggregated {} tuples into {} gloss entries",
            self.tuples_seen,
            self.glossary.len()
        );
        self.glossary
    }
}

/// Fold an ordered tuple stream into a glossary in one pass.
pub fn fold<I>(tuples: I) -> Glossary
where
    I: IntoIterator<Item = TranslationTuple>,
{
    let mut aggregator = Aggregator::new();
    aggregator.extend(tuples);
    aggregator.finish()
}
