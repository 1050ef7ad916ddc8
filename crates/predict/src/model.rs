#![forbid(unsafe_code)]

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use catbot_core::ScoreTensor;
use catbot_tokenize::PAD_ID;

use crate::linear::Linear;
use crate::loader;

/// A trained sequence model seen as a black box.
///
/// Given a padded id sequence, returns one row of pre-softmax scores per
/// output position. Implementations are shared read-only across requests.
pub trait SequenceModel: Send + Sync {
    /// Run one forward pass.
    fn forward(&self, ids: &[u32]) -> Result<ScoreTensor, ModelError>;
}

/// Model loading and inference failures.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// The weight file could not be read.
    #[error("cannot read weights {path}: {source}")]
    Io {
        /// file that failed
        path: PathBuf,
        /// underlying IO error
        source: std::io::Error,
    },
    /// The weight blob does not match the declared dimensions.
    #[error("expected {expected} weights, found {got}")]
    WeightCount {
        /// values required by the dimensions
        expected: usize,
        /// values present in the blob
        got: usize,
    },
    /// A dimension is zero or the layout size overflows.
    #[error("invalid model dimensions: {0}")]
    InvalidDims(&'static str),
    /// The forward pass itself failed.
    #[error("{0}")]
    Inference(String),
}

/// Shape of the bundled bag-of-embeddings model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelDims {
    /// width of every score row
    pub vocab_size: usize,
    /// embedding width
    pub embed_dim: usize,
    /// number of output positions
    pub positions: usize,
}

/// Small bag-of-embeddings model with one dense head per output position.
///
/// Weight layout (little-endian `f32`): embedding table `vocab x embed`,
/// then for each position a dense `embed -> vocab` layer, weights followed
/// by bias. Forward: mean embedding of the non-padding ids, `tanh`, then
/// every head.
#[derive(Debug, Clone)]
pub struct LinearSeqModel {
    dims: ModelDims,
    embedding: Vec<f32>,
    heads: Vec<Linear>,
}

impl LinearSeqModel {
    /// Number of `f32` values a weight blob for `dims` must hold.
    pub fn expected_weight_count(dims: ModelDims) -> Result<usize, ModelError> {
        if dims.vocab_size == 0 || dims.embed_dim == 0 || dims.positions == 0 {
            return Err(ModelError::InvalidDims("dimensions must be non-zero"));
        }
        let overflow = ModelError::InvalidDims("weight count overflows");
        let embedding = dims.vocab_size.checked_mul(dims.embed_dim);
        let head = dims
            .embed_dim
            .checked_mul(dims.vocab_size)
            .and_then(|w| w.checked_add(dims.vocab_size));
        match (embedding, head) {
            (Some(e), Some(h)) => h
                .checked_mul(dims.positions)
                .and_then(|heads| heads.checked_add(e))
                .ok_or(overflow),
            _ => Err(overflow),
        }
    }

    /// Build from an in-memory weight blob.
    pub fn from_weights(dims: ModelDims, weights: &[f32]) -> Result<Self, ModelError> {
        let expected = Self::expected_weight_count(dims)?;
        if weights.len() != expected {
            return Err(ModelError::WeightCount { expected, got: weights.len() });
        }
        let (embedding, rest) = weights.split_at(dims.vocab_size * dims.embed_dim);
        let head_len = dims.embed_dim * dims.vocab_size + dims.vocab_size;
        let heads = rest
            .chunks_exact(head_len)
            .map(|raw| Linear::from_raw(dims.embed_dim, dims.vocab_size, raw))
            .collect();
        Ok(Self { dims, embedding: embedding.to_vec(), heads })
    }

    /// Load a weight blob from disk.
    pub fn load(path: impl AsRef<Path>, dims: ModelDims) -> Result<Self, ModelError> {
        let path = path.as_ref();
        let weights = loader::load_f32_file(path).map_err(|source| ModelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let model = Self::from_weights(dims, &weights)?;
        tracing::info!(path = %path.display(), ?dims, "model loaded");
        Ok(model)
    }

    /// Dimensions the model was built with.
    pub fn dims(&self) -> ModelDims {
        self.dims
    }

    fn encode_input(&self, ids: &[u32]) -> Vec<f32> {
        let mut acc = vec![0.0_f32; self.dims.embed_dim];
        let mut count = 0usize;
        for &id in ids.iter().filter(|&&id| id != PAD_ID) {
            if let Some(row) = self.embedding.chunks_exact(self.dims.embed_dim).nth(id as usize) {
                for (a, v) in acc.iter_mut().zip(row) {
                    *a += v;
                }
                count += 1;
            }
        }
        if count > 0 {
            let n = count as f32;
            acc.iter_mut().for_each(|a| *a /= n);
        }
        acc.into_iter().map(f32::tanh).collect()
    }
}

impl SequenceModel for LinearSeqModel {
    fn forward(&self, ids: &[u32]) -> Result<ScoreTensor, ModelError> {
        let hidden = self.encode_input(ids);
        Ok(self.heads.iter().map(|h| h.forward(&hidden)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DIMS: ModelDims = ModelDims { vocab_size: 3, embed_dim: 2, positions: 2 };

    #[test]
    fn weight_count_follows_layout() {
        // 3*2 embedding + 2 heads of (2*3 + 3)
        assert_eq!(LinearSeqModel::expected_weight_count(DIMS).unwrap(), 6 + 2 * 9);
        assert!(matches!(
            LinearSeqModel::expected_weight_count(ModelDims { embed_dim: 0, ..DIMS }),
            Err(ModelError::InvalidDims(_))
        ));
    }

    #[test]
    fn wrong_blob_size_is_rejected() {
        let err = LinearSeqModel::from_weights(DIMS, &[0.0; 5]).unwrap_err();
        assert!(matches!(err, ModelError::WeightCount { expected: 24, got: 5 }));
    }

    #[test]
    fn forward_shape_is_positions_by_vocab() {
        let model = LinearSeqModel::from_weights(DIMS, &[0.5; 24]).unwrap();
        let scores = model.forward(&[1, 2, 0, 0]).unwrap();
        assert_eq!(scores.len(), 2);
        assert!(scores.iter().all(|row| row.len() == 3));
    }

    #[test]
    fn padding_only_input_scores_the_bias() {
        let mut weights = vec![1.0; 24];
        // bias of the first head is the last 3 values of its 9-value block
        weights[6 + 6..6 + 9].copy_from_slice(&[0.1, 0.2, 0.3]);
        let model = LinearSeqModel::from_weights(DIMS, &weights).unwrap();
        let scores = model.forward(&[0, 0, 0]).unwrap();
        assert_eq!(scores[0], vec![0.1, 0.2, 0.3]);
    }

    #[test]
    fn out_of_range_ids_are_ignored() {
        let model = LinearSeqModel::from_weights(DIMS, &[0.25; 24]).unwrap();
        let a = model.forward(&[1]).unwrap();
        let b = model.forward(&[1, 99]).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn missing_file_is_io_error() {
        assert!(matches!(
            LinearSeqModel::load("/nonexistent/model.bin", DIMS),
            Err(ModelError::Io { .. })
        ));
    }
}
