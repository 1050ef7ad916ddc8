#![forbid(unsafe_code)]

use std::path::Path;

use catbot_tokenize::WordIndexTokenizer;

use crate::model::{LinearSeqModel, ModelDims};

/// Load a file of little-endian `f32` values. Trailing bytes that do not
/// form a whole value are ignored.
pub fn load_f32_file(path: impl AsRef<Path>) -> Result<Vec<f32>, std::io::Error> {
    let buf = std::fs::read(path)?;
    Ok(buf
        .chunks_exact(4)
        .filter_map(|b| <[u8; 4]>::try_from(b).ok())
        .map(f32::from_le_bytes)
        .collect())
}

/// Load the model and the vocabulary, leaving whichever fails absent.
///
/// Failures are logged, not returned: a decoder built from the result
/// simply reports itself as not ready.
pub fn load_collaborators(
    weights: impl AsRef<Path>,
    vocab: impl AsRef<Path>,
    dims: ModelDims,
) -> (Option<LinearSeqModel>, Option<WordIndexTokenizer>) {
    let weights = weights.as_ref();
    let model = match LinearSeqModel::load(weights, dims) {
        Ok(m) => Some(m),
        Err(e) => {
            tracing::error!(path = %weights.display(), error = %e, "failed to load model");
            None
        }
    };
    let vocab = vocab.as_ref();
    let tokenizer = match WordIndexTokenizer::load(vocab) {
        Ok(t) => Some(t),
        Err(e) => {
            tracing::error!(path = %vocab.display(), error = %e, "failed to load tokenizer");
            None
        }
    };
    if let Some(t) = &tokenizer {
        if t.vocab_size() > dims.vocab_size {
            tracing::warn!(
                tokenizer = t.vocab_size(),
                model = dims.vocab_size,
                "vocabulary is wider than the model output, high ids will never be produced"
            );
        }
    }
    (model, tokenizer)
}
