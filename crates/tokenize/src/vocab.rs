use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::pad::PAD_ID;

/// Characters treated as word separators when encoding (besides whitespace).
const SPLIT_FILTERS: &str = "!\"#$%&()*+,-./:;<=>?@[\\]^_`{|}~\t\n";

/// Encode/decode contract the decoder relies on.
///
/// Implementations are shared read-only across concurrent requests.
pub trait Tokenizer: Send + Sync {
    /// Encode normalized text into vocabulary ids. Out-of-vocabulary policy
    /// belongs to the implementation.
    fn text_to_ids(&self, text: &str) -> Vec<u32>;

    /// Surface form for `id`, or `None` when the id has no word.
    fn id_to_word(&self, id: u32) -> Option<&str>;
}

/// Errors raised while building or loading a vocabulary.
#[derive(Debug, thiserror::Error)]
pub enum TokenizerError {
    /// The vocabulary file could not be read.
    #[error("cannot read vocabulary {path}: {source}")]
    Io {
        /// file that failed
        path: PathBuf,
        /// underlying IO error
        source: std::io::Error,
    },
    /// The vocabulary file is not valid JSON of the expected shape.
    #[error("malformed vocabulary: {0}")]
    Json(#[from] serde_json::Error),
    /// No words at all.
    #[error("vocabulary is empty")]
    EmptyVocabulary,
    /// A word was mapped onto the padding id.
    #[error("word {word:?} uses reserved padding id 0")]
    ReservedPadId {
        /// offending word
        word: String,
    },
}

/// On-disk shape of a word-index vocabulary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VocabFile {
    /// word → id, ids starting at 1
    pub word_index: HashMap<String, u32>,
    /// token substituted for unknown words, if any
    #[serde(default)]
    pub oov_token: Option<String>,
    /// only ids below this bound are emitted when encoding
    #[serde(default)]
    pub num_words: Option<usize>,
}

/// Word-level tokenizer backed by a fixed word → id index.
#[derive(Debug, Clone)]
pub struct WordIndexTokenizer {
    word_index: HashMap<String, u32>,
    index_word: HashMap<u32, String>,
    oov_id: Option<u32>,
    num_words: Option<usize>,
}

impl WordIndexTokenizer {
    /// Build from an in-memory vocabulary file.
    pub fn new(vocab: VocabFile) -> Result<Self, TokenizerError> {
        if vocab.word_index.is_empty() {
            return Err(TokenizerError::EmptyVocabulary);
        }
        if let Some((word, _)) = vocab.word_index.iter().find(|(_, id)| **id == PAD_ID) {
            return Err(TokenizerError::ReservedPadId { word: word.clone() });
        }

        // sorted so that duplicate ids resolve to the same word every run
        let mut entries: Vec<(&String, &u32)> = vocab.word_index.iter().collect();
        entries.sort_by(|a, b| a.1.cmp(b.1).then_with(|| a.0.cmp(b.0)));
        let mut index_word = HashMap::with_capacity(entries.len());
        for (word, &id) in entries {
            index_word.entry(id).or_insert_with(|| word.clone());
        }

        let oov_id = match vocab.oov_token.as_deref() {
            Some(token) => {
                let id = vocab.word_index.get(token).copied();
                if id.is_none() {
                    tracing::warn!(token, "oov token missing from word index, unknown words will be dropped");
                }
                id
            }
            None => None,
        };

        Ok(Self {
            word_index: vocab.word_index,
            index_word,
            oov_id,
            num_words: vocab.num_words,
        })
    }

    /// Assign ids `1..` to `words` in order. Later duplicates are ignored.
    pub fn from_words<I, S>(words: I) -> Result<Self, TokenizerError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut word_index: HashMap<String, u32> = HashMap::new();
        let mut next = 1u32;
        for w in words {
            if let std::collections::hash_map::Entry::Vacant(e) = word_index.entry(w.into()) {
                e.insert(next);
                next += 1;
            }
        }
        Self::new(VocabFile {
            word_index,
            ..VocabFile::default()
        })
    }

    /// Parse a JSON vocabulary.
    pub fn from_json_str(json: &str) -> Result<Self, TokenizerError> {
        let vocab: VocabFile = serde_json::from_str(json)?;
        Self::new(vocab)
    }

    /// Load a JSON vocabulary from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TokenizerError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| TokenizerError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let tok = Self::from_json_str(&content)?;
        tracing::info!(path = %path.display(), words = tok.len(), "vocabulary loaded");
        Ok(tok)
    }

    /// Number of words in the index.
    pub fn len(&self) -> usize {
        self.word_index.len()
    }

    /// True when the index holds no words (never, for a constructed tokenizer).
    pub fn is_empty(&self) -> bool {
        self.word_index.is_empty()
    }

    /// One past the largest id: the width a model's score rows must have.
    pub fn vocab_size(&self) -> usize {
        self.index_word.keys().max().map_or(1, |&m| m as usize + 1)
    }

    fn id_for(&self, word: &str) -> Option<u32> {
        let id = self.word_index.get(word).copied();
        match (id, self.num_words) {
            (Some(id), Some(limit)) if id as usize >= limit => self.oov_id,
            (Some(id), _) => Some(id),
            (None, _) => self.oov_id,
        }
    }
}

impl Tokenizer for WordIndexTokenizer {
    fn text_to_ids(&self, text: &str) -> Vec<u32> {
        let lowered = text.to_lowercase();
        lowered
            .split(|c: char| c.is_whitespace() || SPLIT_FILTERS.contains(c))
            .filter(|w| !w.is_empty())
            .filter_map(|w| self.id_for(w))
            .collect()
    }

    fn id_to_word(&self, id: u32) -> Option<&str> {
        self.index_word.get(&id).map(String::as_str)
    }
}
