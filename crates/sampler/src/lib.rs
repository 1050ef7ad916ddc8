#![forbid(unsafe_code)]
#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::indexing_slicing
)]
#![deny(missing_docs, unused_must_use)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::indexing_slicing))]

//! Token sampling strategies: top-k restricted and full-vocabulary.
//!
//! Both draw a genuine categorical sample per output position. Nothing
//! here is deterministic unless the caller hands in a seeded RNG.

use rand::Rng;
use serde::{Deserialize, Serialize};

use catbot_core::{sample_index, Distribution};

/// Top-k restriction and renormalization.
pub mod top_k;

pub use top_k::{sample_top_k, top_k_candidates};

/// Number of candidates kept by the serving policy.
pub const DEFAULT_TOP_K: usize = 10;

/// How one id is drawn from a position's distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Sampling {
    /// Keep the `k` most probable ids, renormalize, draw among them.
    TopK {
        /// candidates kept per position
        k: usize,
    },
    /// Draw from the whole vocabulary.
    Full,
}

impl Default for Sampling {
    fn default() -> Self {
        Sampling::TopK { k: DEFAULT_TOP_K }
    }
}

/// Sampling failures.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum SampleError {
    /// A position had no vocabulary entries to draw from.
    #[error("position {position} has an empty distribution")]
    EmptyDistribution {
        /// output position
        position: usize,
    },
}

/// Draw one id for a single position. `None` for an empty distribution.
pub fn sample_position<R: Rng + ?Sized>(
    probs: &[f64],
    sampling: Sampling,
    rng: &mut R,
) -> Option<usize> {
    match sampling {
        Sampling::TopK { k } => sample_top_k(probs, k, rng),
        Sampling::Full => sample_index(probs, rng),
    }
}

/// Draw one id per position, in position order.
pub fn sample_positions<R: Rng + ?Sized>(
    dists: &[Distribution],
    sampling: Sampling,
    rng: &mut R,
) -> Result<Vec<usize>, SampleError> {
    dists
        .iter()
        .enumerate()
        .map(|(position, probs)| {
            sample_position(probs, sampling, rng).ok_or(SampleError::EmptyDistribution { position })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use catbot_core::make_rng;

    #[test]
    fn one_id_per_position() {
        let dists = vec![vec![0.5, 0.5]; 20];
        let mut rng = make_rng(1);
        let ids = sample_positions(&dists, Sampling::default(), &mut rng).unwrap();
        assert_eq!(ids.len(), 20);
        assert!(ids.iter().all(|&i| i < 2));
    }

    #[test]
    fn empty_position_is_reported() {
        let dists = vec![vec![1.0], vec![]];
        let mut rng = make_rng(1);
        assert_eq!(
            sample_positions(&dists, Sampling::Full, &mut rng),
            Err(SampleError::EmptyDistribution { position: 1 })
        );
    }

    #[test]
    fn full_sampling_reaches_the_tail() {
        // 12 ids, the last two hold tiny mass and fall outside a top-10 cut
        let mut probs = vec![0.0999; 10];
        probs.extend([0.0005, 0.0005]);
        let mut rng = make_rng(9);
        let mut tail = false;
        for _ in 0..50_000 {
            if sample_position(&probs, Sampling::Full, &mut rng).unwrap() >= 10 {
                tail = true;
                break;
            }
        }
        assert!(tail);
    }

    #[test]
    fn sampling_policy_json_shape() {
        let top: Sampling = serde_json::from_str(r#"{"kind":"top_k","k":10}"#).unwrap();
        assert_eq!(top, Sampling::TopK { k: 10 });
        let full: Sampling = serde_json::from_str(r#"{"kind":"full"}"#).unwrap();
        assert_eq!(full, Sampling::Full);
    }
}
