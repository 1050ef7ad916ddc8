#![forbid(unsafe_code)]
#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic, clippy::indexing_slicing)]
#![deny(missing_docs, unused_must_use)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::indexing_slicing))]

//! Catbot: response decoding for a sequence-to-sequence chatbot
//!
//! A trained model maps a padded utterance to one score row per output
//! position. This crate turns those rows into a short, readable reply:
//! temperature softmax, per-position sampling, word filtering with a
//! joining-word quota, repeat suppression, a length cap and a canned
//! fallback. The model and the tokenizer are injected, never global.
//!
//! Layout (important files):
//! - `generator.rs` — `ResponseGenerator`: the whole pipeline + readiness
//! - `filter.rs` — id → word resolution and categorical filtering
//! - `words.rs` — joining / filler word tables
//! - `assemble.rs` — joining, special-token scrub, fallback sentence
//! - `config.rs` — `DecoderConfig` presets (serving / offline) and JSON loading
//! - `model.rs` — `SequenceModel` trait + bundled `LinearSeqModel`
//! - `linear.rs` — tiny dense layer used by the bundled model
//! - `loader.rs` — weight blob and collaborator loading
//! - `http.rs` — request routing for the HTTP front end
//! - `repl.rs` — quit words and per-line replies for the REPL
//! - `bin/chat.rs` — REPL / one-shot CLI
//! - `bin/server.rs` — tiny HTTP front end (`/chat`, `/status`)

/// Reply assembly and fallback.
pub mod assemble;
/// Decoder configuration and policy presets.
pub mod config;
/// Word resolution and categorical filtering.
pub mod filter;
/// The response generation pipeline.
pub mod generator;
/// HTTP routing for the `/chat` and `/status` endpoints.
pub mod http;
/// Dense layer helper.
pub mod linear;
/// Weight and collaborator loading.
pub mod loader;
/// Sequence model contract and the bundled model.
pub mod model;
/// Line handling for the interactive chat loop.
pub mod repl;
/// Joining and filler word tables.
pub mod words;

#[cfg(test)]
pub(crate) mod testing;

pub use assemble::{assemble, FALLBACK_RESPONSE};
pub use config::{ConfigError, DecoderConfig, Policy};
pub use filter::{select_words, FilterRules, ResponseAccumulator};
pub use generator::{DecodeError, Readiness, ResponseGenerator, NOT_LOADED_RESPONSE};
pub use http::{route, HttpReply};
pub use loader::load_collaborators;
pub use model::{LinearSeqModel, ModelDims, ModelError, SequenceModel};
pub use repl::{respond_line, ReplStep};
pub use words::{WordClass, WordClassSet, WordClasses};

pub use catbot_sampler::Sampling;
pub use catbot_tokenize::{normalize_text, pad_sequence, Tokenizer, WordIndexTokenizer};

/// Response generator wired to the bundled model and JSON vocabulary.
pub type Catbot = ResponseGenerator<LinearSeqModel, WordIndexTokenizer>;

/// Install a `tracing` subscriber filtered by `RUST_LOG` (default `info`).
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
