//! Word alignment for clickable translations.
//!
//! Model lines arrive with a list of [`WordPair`]s. When the learner taps a
//! token of the rendered line, [`WordAligner::translate`] finds the pair it
//! belongs to:
//!
//! 1. exact string match of the token against `word`;
//! 2. normalized match: both sides lowercased with [`STRIPPED_PUNCTUATION`]
//!    removed;
//! 3. otherwise no match. A translation is never invented.

use serde::Serialize;

use crate::domain::WordPair;

/// Characters removed by [`normalize_token`].
pub const STRIPPED_PUNCTUATION: &[char] = &[
    '.', ',', '/', '#', '!', '$', '%', '^', '&', '*', ';', ':', '{', '}', '=', '-', '_', '`', '~',
    '(', ')',
];

/// Lowercase `token` and strip [`STRIPPED_PUNCTUATION`].
///
/// Characters outside the set (e.g. `?`, quotes, umlauts) are kept.
#[must_use]
pub fn normalize_token(token: &str) -> String {
    token
        .chars()
        .filter(|c| !STRIPPED_PUNCTUATION.contains(c))
        .collect::<String>()
        .to_lowercase()
}

/// A whitespace-delimited token of a line together with its translation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlignedToken {
    pub token: String,
    pub translation: Option<String>,
}

/// Looks up translations for tokens of the current model line.
///
/// Borrowed view over one turn's word pairs; cheap to construct per lookup.
#[derive(Debug, Clone, Copy)]
pub struct WordAligner<'a> {
    pairs: &'a [WordPair],
}

impl<'a> WordAligner<'a> {
    pub const fn new(pairs: &'a [WordPair]) -> Self {
        Self { pairs }
    }

    /// Return the pair matching `token`, if any.
    pub fn find(&self, token: &str) -> Option<&'a WordPair> {
        if let Some(pair) = self.pairs.iter().find(|p| p.word == token) {
            return Some(pair);
        }

        let wanted = normalize_token(token);
        self.pairs
            .iter()
            .find(|p| normalize_token(&p.word) == wanted)
    }

    /// Return the translation of `token`, if any.
    pub fn translate(&self, token: &str) -> Option<&'a str> {
        self.find(token).map(|pair| pair.translation.as_str())
    }

    /// Split `text` on whitespace and translate every token.
    pub fn align_line(&self, text: &str) -> Vec<AlignedToken> {
        text.split_whitespace()
            .map(|token| AlignedToken {
                token: token.to_string(),
                translation: self.translate(token).map(str::to_string),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs() -> Vec<WordPair> {
        vec![
            WordPair::new("Hallo!", "Привіт!"),
            WordPair::new("ich", "я"),
            WordPair::new("bin", "am"),
            WordPair::new("dir?", "в тебе?"),
        ]
    }

    #[test]
    fn exact_match_wins() {
        let pairs = pairs();
        let aligner = WordAligner::new(&pairs);
        assert_eq!(aligner.translate("bin"), Some("am"));
        assert_eq!(aligner.translate("Hallo!"), Some("Привіт!"));
    }

    #[test]
    fn normalized_match_ignores_case_and_punctuation() {
        let pairs = pairs();
        let aligner = WordAligner::new(&pairs);
        assert_eq!(aligner.translate("HALLO"), Some("Привіт!"));
        assert_eq!(aligner.translate("Ich,"), Some("я"));
    }

    #[test]
    fn question_mark_is_not_stripped() {
        let pairs = pairs();
        let aligner = WordAligner::new(&pairs);
        assert_eq!(aligner.translate("dir?"), Some("в тебе?"));
        assert_eq!(aligner.translate("dir"), None);
    }

    #[test]
    fn unknown_token_has_no_match() {
        let pairs = pairs();
        let aligner = WordAligner::new(&pairs);
        assert_eq!(aligner.translate("Wohnung"), None);
        assert_eq!(WordAligner::new(&[]).translate("bin"), None);
    }

    #[test]
    fn exact_match_preferred_over_earlier_normalized_match() {
        let pairs = vec![WordPair::new("Sie", "you"), WordPair::new("sie", "she")];
        let aligner = WordAligner::new(&pairs);
        assert_eq!(aligner.translate("sie"), Some("she"));
        assert_eq!(aligner.translate("SIE"), Some("you"));
    }

    #[test]
    fn lookup_is_idempotent() {
        let pairs = pairs();
        let aligner = WordAligner::new(&pairs);
        assert_eq!(aligner.translate("HALLO"), aligner.translate("HALLO"));
        assert_eq!(pairs, self::pairs());
    }

    #[test]
    fn align_line_covers_every_token() {
        let pairs = pairs();
        let aligned = WordAligner::new(&pairs).align_line("Hallo! Ich bin müde");
        let translations: Vec<_> = aligned.iter().map(|t| t.translation.as_deref()).collect();
        assert_eq!(
            translations,
            vec![Some("Привіт!"), Some("я"), Some("am"), None]
        );
    }

    #[test]
    fn normalize_strips_full_set() {
        assert_eq!(normalize_token(".,/#!$%^&*;:{}=-_`~()Wort"), "wort");
    }
}
