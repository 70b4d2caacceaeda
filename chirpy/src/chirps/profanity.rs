//! Whole-word profanity masking for chirp bodies.

/// Words replaced before a chirp is stored
pub const PROFANE_WORDS: [&str; 3] = ["kerfuffle", "sharbert", "fornax"];

/// Replacement for a masked word
pub const MASK: &str = "****";

/// Mask profane words, matching case-insensitively on single-space boundaries
///
/// A word with punctuation attached (`"Sharbert!"`) is left alone, and the
/// original spacing is preserved.
pub fn clean(body: &str) -> String {
    body.split(' ')
        .map(|word| {
            let lower = word.to_lowercase();
            if PROFANE_WORDS.contains(&lower.as_str()) {
                MASK
            } else {
                word
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_masks_whole_words() {
        assert_eq!(
            clean("I really need a kerfuffle to go to bed sooner, Fornax !"),
            "I really need a **** to go to bed sooner, **** !"
        );
    }

    #[test]
    fn test_clean_ignores_attached_punctuation() {
        assert_eq!(clean("Sharbert! is fine"), "Sharbert! is fine");
    }

    #[test]
    fn test_clean_is_case_insensitive() {
        assert_eq!(clean("SHARBERT sharbert ShArBeRt"), "**** **** ****");
    }

    #[test]
    fn test_clean_preserves_spacing() {
        assert_eq!(clean("  fornax  ok "), "  ****  ok ");
        assert_eq!(clean(""), "");
    }
}
