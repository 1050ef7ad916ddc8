#![forbid(unsafe_code)]

use std::sync::Mutex;

use catbot_core::ScoreTensor;
use catbot_tokenize::WordIndexTokenizer;

use crate::config::DecoderConfig;
use crate::generator::ResponseGenerator;
use crate::model::{ModelError, SequenceModel};

/// Returns a fixed score tensor and remembers its last input.
pub(crate) struct FixedModel {
    pub(crate) scores: ScoreTensor,
    pub(crate) seen: Mutex<Vec<u32>>,
}

impl FixedModel {
    pub(crate) fn uniform(positions: usize, vocab: usize) -> Self {
        Self::new(vec![vec![0.0; vocab]; positions])
    }

    pub(crate) fn new(scores: ScoreTensor) -> Self {
        Self { scores, seen: Mutex::new(Vec::new()) }
    }
}

impl SequenceModel for FixedModel {
    fn forward(&self, ids: &[u32]) -> Result<ScoreTensor, ModelError> {
        *self.seen.lock().unwrap() = ids.to_vec();
        Ok(self.scores.clone())
    }
}

pub(crate) struct FailingModel;

impl SequenceModel for FailingModel {
    fn forward(&self, _ids: &[u32]) -> Result<ScoreTensor, ModelError> {
        Err(ModelError::Inference("tensor shape mismatch".into()))
    }
}

/// `{pad, hello, world, is, the}`
pub(crate) fn five_word_vocab() -> WordIndexTokenizer {
    WordIndexTokenizer::from_words(["hello", "world", "is", "the"]).unwrap()
}

pub(crate) fn serving<M: SequenceModel>(model: M) -> ResponseGenerator<M, WordIndexTokenizer> {
    ResponseGenerator::new(Some(model), Some(five_word_vocab()), DecoderConfig::serving()).unwrap()
}

/// Generator with a tokenizer but no model.
pub(crate) fn not_loaded() -> ResponseGenerator<FixedModel, WordIndexTokenizer> {
    ResponseGenerator::new(None, Some(five_word_vocab()), DecoderConfig::serving()).unwrap()
}
