#![forbid(unsafe_code)]

use std::collections::HashSet;

use catbot_tokenize::{Tokenizer, PAD_ID};

use crate::words::{is_unknown_marker, WordClass, WordClasses};

/// Per-response limits applied while accepting words.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterRules {
    /// joining words admitted per response
    pub joining_quota: usize,
    /// words after which scanning stops
    pub max_words: usize,
}

/// Words accepted so far for one response.
#[derive(Debug, Default)]
pub struct ResponseAccumulator {
    words: Vec<String>,
    used: HashSet<String>,
    joining_used: usize,
}

impl ResponseAccumulator {
    /// Empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of accepted words.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// True before any word is accepted.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Accepted words in order.
    pub fn words(&self) -> &[String] {
        &self.words
    }

    /// Consume into the accepted words.
    pub fn into_words(self) -> Vec<String> {
        self.words
    }

    /// Offer one resolved word. Returns whether it was accepted.
    ///
    /// Repeats of an exact surface form are refused, joining words count
    /// against `rules.joining_quota`, fillers are always refused.
    pub fn offer(&mut self, word: &str, class: WordClass, rules: FilterRules) -> bool {
        if self.used.contains(word) {
            return false;
        }
        match class {
            WordClass::Filler => return false,
            WordClass::Joining => {
                if self.joining_used >= rules.joining_quota {
                    return false;
                }
                self.joining_used += 1;
            }
            WordClass::Content => {}
        }
        self.used.insert(word.to_string());
        self.words.push(word.to_string());
        true
    }
}

/// Turn sampled ids into accepted words, in position order.
///
/// Padding ids, ids without a word, and unknown-word markers are skipped.
/// Scanning stops as soon as `rules.max_words` words are held.
pub fn select_words<T: Tokenizer + ?Sized>(
    ids: &[usize],
    tokenizer: &T,
    classes: &WordClasses,
    rules: FilterRules,
) -> Vec<String> {
    let mut acc = ResponseAccumulator::new();
    for &id in ids {
        if acc.len() >= rules.max_words {
            break;
        }
        let Ok(id) = u32::try_from(id) else { continue };
        if id == PAD_ID {
            continue;
        }
        let Some(word) = tokenizer.id_to_word(id) else { continue };
        if is_unknown_marker(word) {
            continue;
        }
        acc.offer(word, classes.classify(word), rules);
    }
    acc.into_words()
}
