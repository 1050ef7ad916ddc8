#![forbid(unsafe_code)]

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Function words (pronouns, auxiliaries, prepositions, conjunctions)
/// admitted only up to a per-response quota.
pub const JOINING_WORDS: &[&str] = &[
    "is", "are", "was", "were", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with",
    "by", "from", "i", "you", "he", "she", "it", "we", "they", "am", "have", "has", "had", "do",
    "does", "did", "will", "would", "can", "could", "should", "may", "might",
];

/// Extra function words treated as joining words by the offline word set.
pub const OFFLINE_EXTRA_JOINING_WORDS: &[&str] = &[
    "be", "been", "being", "if", "then", "else", "when", "this", "that", "these", "those", "up",
    "down", "out", "off", "over", "under", "me", "him", "her", "us", "them", "my", "your", "his",
    "its", "our", "their", "not",
];

/// Articles, intensifiers and quantifiers that never make it into a reply.
pub const FILLER_WORDS: &[&str] = &[
    "the", "a", "an", "very", "really", "quite", "so", "just", "only", "even", "still", "also",
    "too", "as", "like", "such", "much", "many", "few", "some", "any", "all", "every", "each",
    "both", "either", "neither", "other", "another",
];

/// Literals a vocabulary may use for unknown words.
pub const UNKNOWN_MARKERS: &[&str] = &["<UNK>", "unk"];

/// True for an unknown-word marker, compared case-insensitively.
pub fn is_unknown_marker(word: &str) -> bool {
    UNKNOWN_MARKERS.iter().any(|m| word.eq_ignore_ascii_case(m))
}

/// Which word lists a decoder runs with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WordClassSet {
    /// Base joining list plus fillers.
    #[default]
    Serving,
    /// Base and extended joining lists plus fillers.
    Offline,
}

/// Category of a candidate word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordClass {
    /// function word, quota-limited
    Joining,
    /// always dropped
    Filler,
    /// always kept
    Content,
}

/// Immutable classification tables, shared read-only by every decode call.
#[derive(Debug, Clone)]
pub struct WordClasses {
    joining: HashSet<&'static str>,
    filler: HashSet<&'static str>,
}

impl WordClasses {
    /// Tables used when serving interactive replies.
    pub fn serving() -> Self {
        Self {
            joining: JOINING_WORDS.iter().copied().collect(),
            filler: FILLER_WORDS.iter().copied().collect(),
        }
    }

    /// Tables used by the offline decoding path.
    pub fn offline() -> Self {
        Self {
            joining: JOINING_WORDS
                .iter()
                .chain(OFFLINE_EXTRA_JOINING_WORDS)
                .copied()
                .collect(),
            filler: FILLER_WORDS.iter().copied().collect(),
        }
    }

    /// Build the tables for a named set.
    pub fn for_set(set: WordClassSet) -> Self {
        match set {
            WordClassSet::Serving => Self::serving(),
            WordClassSet::Offline => Self::offline(),
        }
    }

    /// Classify `word` by its lowercased form.
    pub fn classify(&self, word: &str) -> WordClass {
        let lower = word.to_lowercase();
        if self.joining.contains(lower.as_str()) {
            WordClass::Joining
        } else if self.filler.contains(lower.as_str()) {
            WordClass::Filler
        } else {
            WordClass::Content
        }
    }
}
