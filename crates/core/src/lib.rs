#![forbid(unsafe_code)]
#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::indexing_slicing
)]
#![deny(missing_docs, unused_must_use)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::indexing_slicing))]

//! Numeric primitives shared by the Catbot decoder crates.
//!
//! Everything here is pure and allocation-light: temperature-scaled
//! softmax with a uniform fallback for degenerate rows, a categorical
//! draw over unnormalized weights, and a seeded RNG constructor for
//! reproducible runs.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Raw per-position scores returned by a sequence model: `[positions][vocab]`.
pub type ScoreTensor = Vec<Vec<f32>>;

/// A probability distribution over vocabulary ids for one output position.
pub type Distribution = Vec<f64>;

/// Temperature used to re-sharpen model scores before sampling.
pub const DEFAULT_TEMPERATURE: f64 = 0.8;

/// Uniform distribution over `n` outcomes. Empty when `n == 0`.
pub fn uniform(n: usize) -> Distribution {
    if n == 0 {
        return Vec::new();
    }
    vec![1.0 / n as f64; n]
}

/// Softmax of `scores / temperature`.
///
/// The row maximum is subtracted before exponentiation, which leaves the
/// result unchanged but keeps large scores from overflowing. When the row
/// has no finite score (all `-inf`), or the exponentials do not sum to a
/// finite positive value, the uniform distribution is returned instead of
/// NaNs.
pub fn softmax_with_temperature(scores: &[f32], temperature: f64) -> Distribution {
    if scores.is_empty() {
        return Vec::new();
    }
    let scaled: Vec<f64> = scores
        .iter()
        .map(|&s| f64::from(s) / temperature)
        .collect();
    let max = scaled
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(f64::NEG_INFINITY, f64::max);
    if !max.is_finite() {
        tracing::warn!(len = scores.len(), "no finite score in row, using uniform distribution");
        return uniform(scores.len());
    }

    let exps: Vec<f64> = scaled.iter().map(|v| (v - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    if !(sum.is_finite() && sum > 0.0) {
        tracing::warn!(len = scores.len(), sum, "degenerate softmax row, using uniform distribution");
        return uniform(scores.len());
    }
    exps.into_iter().map(|e| e / sum).collect()
}

/// Apply [`softmax_with_temperature`] independently to every row.
pub fn softmax_rows(scores: &[Vec<f32>], temperature: f64) -> Vec<Distribution> {
    scores
        .iter()
        .map(|row| softmax_with_temperature(row, temperature))
        .collect()
}

/// Seeded ChaCha8 RNG for reproducible sampling.
pub fn make_rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// Draw an index with probability proportional to `weights[i]`.
///
/// Weights need not be normalized. Non-finite and non-positive weights are
/// never chosen. If no weight is positive the draw falls back to a uniform
/// pick over all indices. Returns `None` only for an empty slice.
pub fn sample_index<R: Rng + ?Sized>(weights: &[f64], rng: &mut R) -> Option<usize> {
    if weights.is_empty() {
        return None;
    }
    let usable = |w: f64| w.is_finite() && w > 0.0;
    let total: f64 = weights.iter().copied().filter(|&w| usable(w)).sum();
    if !(total.is_finite() && total > 0.0) {
        return Some(rng.gen_range(0..weights.len()));
    }

    let r = rng.gen::<f64>() * total;
    let mut acc = 0.0_f64;
    let mut last_usable = None;
    for (i, &w) in weights.iter().enumerate() {
        if !usable(w) {
            continue;
        }
        acc += w;
        last_usable = Some(i);
        if r < acc {
            return Some(i);
        }
    }
    // rounding can leave r just above the final accumulator
    last_usable
}
