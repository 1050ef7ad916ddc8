/// Reserved id meaning "no token here".
pub const PAD_ID: u32 = 0;

/// Sequence length the model is trained and served with.
pub const DEFAULT_MAX_LENGTH: usize = 20;

/// Post-pad with [`PAD_ID`] or post-truncate `ids` to exactly `len` entries.
pub fn pad_sequence(ids: &[u32], len: usize) -> Vec<u32> {
    let mut out: Vec<u32> = ids.iter().copied().take(len).collect();
    out.resize(len, PAD_ID);
    out
}
