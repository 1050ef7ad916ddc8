/// Characters that survive normalization besides whitespace.
fn is_kept(c: char) -> bool {
    matches!(c, 'a'..='z' | '0'..='9' | '.' | ',' | '!' | '?') || c.is_whitespace()
}

/// Clean a raw utterance before encoding.
///
/// Lowercases, drops every character outside `a-z`, `0-9`, whitespace and
/// `. , ! ?`, then collapses whitespace runs to a single space and trims.
/// Symbols are dropped before whitespace is collapsed so that `"a @ b"`
/// becomes `"a b"` in one pass; this keeps the function idempotent.
pub fn normalize_text(raw: &str) -> String {
    let kept: String = raw.to_lowercase().chars().filter(|&c| is_kept(c)).collect();
    kept.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn lowercases_and_strips_symbols() {
        assert_eq!(normalize_text("  Hello, WORLD!!  "), "hello, world!!");
        assert_eq!(normalize_text("what's up? #rust"), "whats up? rust");
    }

    #[test]
    fn collapses_whitespace_left_by_removed_symbols() {
        assert_eq!(normalize_text("a @ b"), "a b");
        assert_eq!(normalize_text("tab\there\n\nnewline"), "tab here newline");
    }

    #[test]
    fn non_ascii_letters_are_removed() {
        assert_eq!(normalize_text("café привет 42"), "caf 42");
    }

    #[test]
    fn blank_input_is_empty() {
        assert_eq!(normalize_text(""), "");
        assert_eq!(normalize_text(" \t @@ \n"), "");
    }

    proptest! {
        #[test]
        fn normalization_is_idempotent(s in "\\PC{0,64}") {
            let once = normalize_text(&s);
            prop_assert_eq!(normalize_text(&once), once.clone());
        }

        #[test]
        fn output_uses_only_allowed_characters(s in "\\PC{0,64}") {
            let out = normalize_text(&s);
            prop_assert!(out.chars().all(|c| c == ' ' || is_kept(c)));
            prop_assert!(!out.contains("  "));
            prop_assert_eq!(out.trim(), out.as_str());
        }
    }
}
