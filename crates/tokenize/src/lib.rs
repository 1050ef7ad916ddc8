#![forbid(unsafe_code)]
#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::indexing_slicing
)]
#![deny(missing_docs, unused_must_use)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::indexing_slicing))]

//! Input side of the Catbot pipeline.
//!
//! - `normalize.rs` — utterance cleaning (lowercase, symbol stripping, whitespace)
//! - `pad.rs` — fixed-length post-padding / post-truncation
//! - `vocab.rs` — `Tokenizer` trait and the JSON word-index tokenizer

/// Utterance normalization.
pub mod normalize;
/// Fixed-length padding helpers.
pub mod pad;
/// Tokenizer contract and word-index vocabulary.
pub mod vocab;

pub use normalize::normalize_text;
pub use pad::{pad_sequence, DEFAULT_MAX_LENGTH, PAD_ID};
pub use vocab::{Tokenizer, TokenizerError, VocabFile, WordIndexTokenizer};
