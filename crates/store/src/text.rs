//! Tokenization shared by the lexical index and the extractive summarizer.

/// Lowercased alphanumeric terms, in order of appearance.
pub(crate) fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Sentence split on terminal punctuation; keeps non-blank sentences in
/// original order.
pub(crate) fn split_sentences(text: &str) -> Vec<&str> {
    text.split(['.', '!', '?'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenize_lowercases_and_strips_punctuation() {
        assert_eq!(
            tokenize("Portfolio re-balancing, Q3!"),
            vec!["portfolio", "re", "balancing", "q3"]
        );
    }

    #[test]
    fn split_sentences_keeps_order_and_drops_blanks() {
        let sentences = split_sentences("First one. Second!  Third? ");
        assert_eq!(sentences, vec!["First one", "Second", "Third"]);
    }
}
