#![forbid(unsafe_code)]

use rand::Rng;

use catbot_core::softmax_rows;
use catbot_sampler::{sample_positions, SampleError};
use catbot_tokenize::{normalize_text, pad_sequence, Tokenizer};

use crate::assemble::assemble;
use crate::config::{ConfigError, DecoderConfig};
use crate::filter::select_words;
use crate::model::{ModelError, SequenceModel};
use crate::words::WordClasses;

/// Reply when the model or the tokenizer is missing.
pub const NOT_LOADED_RESPONSE: &str = "Sorry, the model is not loaded properly.";

/// Prefix of every reply produced from an internal error.
pub const ERROR_PREFIX: &str = "Sorry, I encountered an error: ";

/// Failures that end a decode call early.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// Model or tokenizer absent.
    #[error("model or tokenizer not loaded")]
    NotLoaded,
    /// The forward pass failed.
    #[error(transparent)]
    Model(#[from] ModelError),
    /// The model produced an unusable score row.
    #[error(transparent)]
    Sample(#[from] SampleError),
}

impl DecodeError {
    /// User-facing apology for this error.
    pub fn to_response(&self) -> String {
        match self {
            DecodeError::NotLoaded => NOT_LOADED_RESPONSE.to_string(),
            other => format!("{ERROR_PREFIX}{other}"),
        }
    }
}

/// Whether a generator can answer chat requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    /// model and tokenizer both present
    Ready,
    /// at least one collaborator missing
    NotLoaded,
}

impl Readiness {
    /// Short status label: `ready` or `error`.
    pub fn label(self) -> &'static str {
        match self {
            Readiness::Ready => "ready",
            Readiness::NotLoaded => "error",
        }
    }

    /// Human-readable status message.
    pub fn message(self) -> &'static str {
        match self {
            Readiness::Ready => "Model loaded successfully",
            Readiness::NotLoaded => "Model not loaded",
        }
    }
}

/// Turns user utterances into replies using an injected model and tokenizer.
///
/// Holds no mutable state, so one instance can serve concurrent requests
/// behind an `Arc`. Either collaborator may be absent, in which case the
/// generator reports [`Readiness::NotLoaded`] and answers with
/// [`NOT_LOADED_RESPONSE`].
pub struct ResponseGenerator<M, T> {
    model: Option<M>,
    tokenizer: Option<T>,
    config: DecoderConfig,
    classes: WordClasses,
}

impl<M: SequenceModel, T: Tokenizer> ResponseGenerator<M, T> {
    /// Wire collaborators and configuration together.
    ///
    /// The configuration is validated first; a generator never runs with a
    /// non-positive temperature, `k = 0` or a zero length.
    pub fn new(
        model: Option<M>,
        tokenizer: Option<T>,
        config: DecoderConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let classes = WordClasses::for_set(config.word_classes);
        Ok(Self { model, tokenizer, config, classes })
    }

    /// Active configuration.
    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Readiness of the collaborator pair.
    pub fn readiness(&self) -> Readiness {
        if self.model.is_some() && self.tokenizer.is_some() {
            Readiness::Ready
        } else {
            Readiness::NotLoaded
        }
    }

    /// Shorthand for `readiness() == Readiness::Ready`.
    pub fn is_ready(&self) -> bool {
        self.readiness() == Readiness::Ready
    }

    /// Normalize, encode and pad an utterance to the configured length.
    pub fn encode(&self, text: &str) -> Result<Vec<u32>, DecodeError> {
        let tokenizer = self.tokenizer.as_ref().ok_or(DecodeError::NotLoaded)?;
        let normalized = normalize_text(text);
        let ids = tokenizer.text_to_ids(&normalized);
        tracing::debug!(%normalized, tokens = ids.len(), "encoded input");
        Ok(pad_sequence(&ids, self.config.max_length))
    }

    /// Run the whole pipeline, surfacing failures as [`DecodeError`].
    pub fn try_generate<R: Rng + ?Sized>(&self, text: &str, rng: &mut R) -> Result<String, DecodeError> {
        let (Some(model), Some(tokenizer)) = (self.model.as_ref(), self.tokenizer.as_ref()) else {
            return Err(DecodeError::NotLoaded);
        };
        let input = self.encode(text)?;
        let scores = model.forward(&input)?;
        let dists = softmax_rows(&scores, self.config.temperature);
        let sampled = sample_positions(&dists, self.config.sampling, rng)?;
        tracing::debug!(?sampled, "sampled ids");
        let words = select_words(&sampled, tokenizer, &self.classes, self.config.filter_rules());
        tracing::debug!(?words, "accepted words");
        Ok(assemble(&words))
    }

    /// Reply to `text` using a caller-supplied random source. Never fails.
    pub fn generate_response_with<R: Rng + ?Sized>(&self, text: &str, rng: &mut R) -> String {
        match self.try_generate(text, rng) {
            Ok(reply) => reply,
            Err(e) => {
                match &e {
                    DecodeError::NotLoaded => tracing::warn!("chat request while not ready"),
                    other => tracing::error!(error = %other, "response generation failed"),
                }
                e.to_response()
            }
        }
    }

    /// Reply to `text` using the thread-local random source. Never fails.
    pub fn generate_response(&self, text: &str) -> String {
        self.generate_response_with(text, &mut rand::thread_rng())
    }
}
