#![forbid(unsafe_code)]

/// Canned reply used whenever decoding yields fewer than two words.
pub const FALLBACK_RESPONSE: &str = "I'm still learning to respond properly.";

/// Vocabulary artefacts that must never reach the user.
const SPECIAL_TOKENS: &[&str] = &["newlinechar", "<OOV>"];

/// Minimum word count for a reply to be shown as-is.
const MIN_WORDS: usize = 2;

/// Join accepted words into the final reply.
///
/// Special-token literals are replaced by a space and whitespace is
/// collapsed again. Anything shorter than two words becomes
/// [`FALLBACK_RESPONSE`].
pub fn assemble(words: &[String]) -> String {
    let mut joined = words.join(" ");
    for token in SPECIAL_TOKENS {
        joined = joined.replace(token, " ");
    }
    let parts: Vec<&str> = joined.split_whitespace().collect();
    if parts.len() < MIN_WORDS {
        tracing::debug!(words = parts.len(), "reply too short, using fallback");
        return FALLBACK_RESPONSE.to_string();
    }
    parts.join(" ")
}
