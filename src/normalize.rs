//! Transliteration applied to completed candidate readings.
//!
//! Readings are stored in a canonical form so that a query typed with
//! full-width latin letters or upper case still prefix-matches them.

use unicode_normalization::UnicodeNormalization;

/// A string-to-string normalization step.
pub trait Normalizer: Send + Sync + std::fmt::Debug {
    /// Normalize the given text.
    fn normalize(&self, text: &str) -> String;

    /// Get the name of this normalizer.
    fn name(&self) -> &'static str;
}

/// Full-width to half-width folding followed by lower-casing.
///
/// Width folding uses Unicode NFKC, which maps full-width ASCII
/// (`Ｋｅｎ`) to its half-width form (`Ken`) while keeping kana intact.
#[derive(Debug, Clone, Copy, Default)]
pub struct WidthNormalizer;

impl WidthNormalizer {
    /// Create a new width normalizer.
    pub fn new() -> Self {
        WidthNormalizer
    }
}

impl Normalizer for WidthNormalizer {
    fn normalize(&self, text: &str) -> String {
        let folded: String = text.nfkc().collect();
        folded.to_lowercase()
    }

    fn name(&self) -> &'static str {
        "width"
    }
}

/// Leaves text untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityNormalizer;

impl Normalizer for IdentityNormalizer {
    fn normalize(&self, text: &str) -> String {
        text.to_string()
    }

    fn name(&self) -> &'static str {
        "identity"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_width_folding() {
        let normalizer = WidthNormalizer::new();
        assert_eq!(normalizer.normalize("ＫＥＮＳＡＫＵ"), "kensaku");
        assert_eq!(normalizer.normalize("Fess"), "fess");
    }

    #[test]
    fn test_kana_is_preserved() {
        let normalizer = WidthNormalizer::new();
        assert_eq!(normalizer.normalize("ケンサク"), "ケンサク");
    }

    #[test]
    fn test_identity() {
        assert_eq!(IdentityNormalizer.normalize("ＡＢＣ"), "ＡＢＣ");
    }
}
