use lazy_static::lazy_static;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    static ref WORD: Regex = Regex::new(r"(?u)\p{L}[\p{L}\p{N}_']*").expect("valid regex");
}

/// Splits text into lowercase word tokens in document order, after
/// NFKC normalization. Every token counts toward word positions, so no
/// stopword filtering or stemming happens here.
pub fn parse_words(text: &str) -> Vec<String> {
    let normalized = text.nfkc().collect::<String>().to_lowercase();
    WORD.find_iter(&normalized)
        .map(|token| token.as_str().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_and_keeps_order() {
        assert_eq!(parse_words("Cat, DOG cat!"), ["cat", "dog", "cat"]);
    }

    #[test]
    fn skips_bare_punctuation_and_numbers() {
        assert_eq!(parse_words("... 404 error-page"), ["error", "page"]);
    }

    #[test]
    fn empty_text_yields_no_tokens() {
        assert!(parse_words("  \t\n").is_empty());
    }
}
