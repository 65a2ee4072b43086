//! Deterministic text normalization feeding the classifier.
//!
//! Applies, in order: lowercasing, URL and email stripping, collapse of
//! repeated `!` / `?` / `.` runs, whitespace collapse, trim. Pure and
//! infallible; an input that normalizes to the empty string is a valid
//! (empty) output, not an error.

use regex::Regex;

/// Text normalizer with pre-compiled patterns.
#[derive(Debug)]
pub struct TextNormalizer {
    url: Regex,
    email: Regex,
    bangs: Regex,
    questions: Regex,
    dots: Regex,
    whitespace: Regex,
}

impl TextNormalizer {
    /// Creates a normalizer, compiling its patterns once.
    pub fn new() -> Self {
        Self {
            url: Regex::new(r"https?://[^\s]+").expect("valid url pattern"),
            email: Regex::new(r"\S+@\S+").expect("valid email pattern"),
            bangs: Regex::new(r"!{2,}").expect("valid pattern"),
            questions: Regex::new(r"\?{2,}").expect("valid pattern"),
            dots: Regex::new(r"\.{2,}").expect("valid pattern"),
            whitespace: Regex::new(r"\s+").expect("valid pattern"),
        }
    }

    /// Normalizes `text` into classifier-ready form.
    pub fn normalize(&self, text: &str) -> String {
        let text = text.to_lowercase();
        let text = self.url.replace_all(&text, "");
        let text = self.email.replace_all(&text, "");
        let text = self.bangs.replace_all(&text, "!");
        let text = self.questions.replace_all(&text, "?");
        let text = self.dots.replace_all(&text, ".");
        let text = self.whitespace.replace_all(&text, " ");
        text.trim().to_string()
    }
}

impl Default for TextNormalizer {
    fn default() -> Self {
        Self::new()
    }
}
