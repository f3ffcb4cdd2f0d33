//! Translation tuples as produced by the upstream word/concept join.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Grammatical category attached to a source word.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartOfSpeech {
    Noun,
    Verb,
    Adverb,
    Adjective,
}

impl PartOfSpeech {
    /// Every variant in declaration order.
    pub const ALL: [PartOfSpeech; 4] = [Self::Noun, Self::Verb, Self::Adverb, Self::Adjective];

    /// Label used in rendered output (`"noun"`, `"verb"`, ...).
    pub fn label(self) -> &'static str {
        match self {
            Self::Noun => "noun",
            Self::Verb => "verb",
            Self::Adverb => "adverb",
            Self::Adjective => "adjective",
        }
    }
}

impl fmt::Display for PartOfSpeech {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Error returned when a part-of-speech tag is not recognized.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnknownPartOfSpeech(pub String);

impl fmt::Display for UnknownPartOfSpeech {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown part of speech '{}'", self.0)
    }
}

impl std::error::Error for UnknownPartOfSpeech {}

impl FromStr for PartOfSpeech {
    type Err = UnknownPartOfSpeech;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim();
        Self::ALL
            .into_iter()
            .find(|pos| pos.label().eq_ignore_ascii_case(tag))
            .ok_or_else(|| UnknownPartOfSpeech(tag.to_string()))
    }
}

/// Identifier of a concept group shared by words with the same meaning.
pub type ConceptGroupId = i64;

/// One row of the source-word/target-word join.
///
/// Streams of tuples are expected to arrive ordered by `source_word`; nothing
/// in this crate checks or restores that order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationTuple {
    pub source_word: String,
    pub part_of_speech: PartOfSpeech,
    pub target_word: String,
    pub concept_group_id: ConceptGroupId,
}

impl TranslationTuple {
    pub fn new(
        source_word: impl Into<String>,
        part_of_speech: PartOfSpeech,
        target_word: impl Into<String>,
        concept_group_id: ConceptGroupId,
    ) -> Self {
        Self {
            source_word: source_word.into(),
            part_of_speech,
            target_word: target_word.into(),
            concept_group_id,
        }
    }
}
