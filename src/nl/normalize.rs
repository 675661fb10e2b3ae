//! Text normalization for the dialogue core.
//!
//! Two views of an input are used downstream:
//!
//! - the **normalized string** (lowercase, whitespace collapsed, trimmed),
//!   searched for trigger phrases as substrings;
//! - the **token list**, the normalized string split on a fixed delimiter
//!   set, used where a whole-word match is required (exit words, tip words).
//!
//! All operations are pure string transforms.

/// Characters that separate tokens.
pub const DELIMITERS: [char; 5] = [' ', ',', '.', '!', '?'];

/// Lowercase, collapse runs of whitespace to a single space, and trim.
///
/// Idempotent: `normalize(&normalize(x)) == normalize(x)`.
pub fn normalize(input: &str) -> String {
    input
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Split a normalized string on [`DELIMITERS`], dropping empty pieces.
pub fn tokenize(normalized: &str) -> Vec<&str> {
    normalized
        .split(|c: char| DELIMITERS.contains(&c))
        .filter(|t| !t.is_empty())
        .collect()
}

/// True if any of `words` appears as a whole token of `normalized`.
pub fn has_token(normalized: &str, words: &[String]) -> bool {
    tokenize(normalized)
        .iter()
        .any(|t| words.iter().any(|w| w == t))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowercases_and_collapses() {
        assert_eq!(normalize("  Tell   me\tabout\nVPN  "), "tell me about vpn");
    }

    #[test]
    fn test_empty_and_whitespace() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize(" \t\n "), "");
    }

    #[test]
    fn test_idempotent() {
        let samples = [
            "I don't KNOW what to do",
            "  ok   BYE!! ",
            "Remind me to enable 2FA in 2 weeks.",
            "ÀÉÎ mixed Ünïcode",
            "",
        ];
        for s in samples {
            let once = normalize(s);
            assert_eq!(normalize(&once), once, "not idempotent for {:?}", s);
        }
    }

    #[test]
    fn test_tokenize_on_punctuation() {
        assert_eq!(tokenize("ok, bye!"), vec!["ok", "bye"]);
        assert_eq!(tokenize("what? no.. really"), vec!["what", "no", "really"]);
    }

    #[test]
    fn test_apostrophes_stay_inside_tokens() {
        assert_eq!(tokenize("i don't know"), vec!["i", "don't", "know"]);
    }

    #[test]
    fn test_has_token_is_whole_word() {
        let words = vec!["no".to_string()];
        assert!(!has_token("i don't know", &words));
        assert!(has_token("no, thanks", &words));
    }
}
