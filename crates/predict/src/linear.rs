#![forbid(unsafe_code)]

/// Dense layer container: `out = W * in + b`.
#[derive(Debug, Clone)]
pub struct Linear {
    /// input dimension
    pub in_dim: usize,
    /// output dimension
    pub out_dim: usize,
    /// weights in row-major order: out_dim x in_dim
    pub weights: Vec<f32>,
    /// bias vector of length out_dim
    pub bias: Vec<f32>,
}

impl Linear {
    /// Build from a raw buffer holding the weights followed by the bias.
    /// A short buffer leaves the missing entries at zero.
    pub fn from_raw(in_dim: usize, out_dim: usize, raw: &[f32]) -> Self {
        let expected = out_dim * in_dim;
        let mut weights = vec![0.0_f32; expected];
        for (dst, src) in weights.iter_mut().zip(raw) {
            *dst = *src;
        }
        let mut bias = vec![0.0_f32; out_dim];
        for (dst, src) in bias.iter_mut().zip(raw.iter().skip(expected)) {
            *dst = *src;
        }
        Self { in_dim, out_dim, weights, bias }
    }

    /// Forward pass for a single input vector. Missing inputs count as zero.
    pub fn forward(&self, input: &[f32]) -> Vec<f32> {
        if self.in_dim == 0 {
            return self.bias.clone();
        }
        self.weights
            .chunks_exact(self.in_dim)
            .zip(&self.bias)
            .map(|(row, b)| row.iter().zip(input).map(|(w, x)| w * x).sum::<f32>() + b)
            .collect()
    }
}
