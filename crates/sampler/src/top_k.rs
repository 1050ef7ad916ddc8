use rand::Rng;

use catbot_core::sample_index;

/// The `k` most probable ids with their probabilities renormalized to sum to 1.
///
/// Ids are ordered by a stable ascending sort on probability and the last
/// `k` are kept, so among equal probabilities the lower ids are evicted
/// first. The result is in that ascending order. Fewer than `k` entries
/// are returned when the row is shorter than `k`.
pub fn top_k_candidates(probs: &[f64], k: usize) -> Vec<(usize, f64)> {
    let mut order: Vec<(usize, f64)> = probs.iter().copied().enumerate().collect();
    order.sort_by(|a, b| a.1.total_cmp(&b.1));
    let kept = order.split_off(order.len().saturating_sub(k));

    let mass: f64 = kept.iter().map(|&(_, p)| p).sum();
    if mass.is_finite() && mass > 0.0 {
        kept.into_iter().map(|(id, p)| (id, p / mass)).collect()
    } else {
        let n = kept.len() as f64;
        kept.into_iter().map(|(id, _)| (id, 1.0 / n)).collect()
    }
}

/// Draw one id from the top-`k` restricted distribution.
pub fn sample_top_k<R: Rng + ?Sized>(probs: &[f64], k: usize, rng: &mut R) -> Option<usize> {
    let candidates = top_k_candidates(probs, k);
    let weights: Vec<f64> = candidates.iter().map(|&(_, p)| p).collect();
    let pick = sample_index(&weights, rng)?;
    candidates.get(pick).map(|&(id, _)| id)
}
