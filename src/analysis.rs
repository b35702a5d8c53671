//! Morphological analysis boundary.
//!
//! Suggestion building needs token boundaries and a base kana reading per
//! token. Real deployments plug in a morphological analyzer; the crate ships a
//! whitespace analyzer and a longest-match dictionary analyzer.
//!
//! # Examples
//!
//! ```
//! use sarissa_suggest::analysis::Analyzer;
//! use sarissa_suggest::analysis::dictionary::DictionaryAnalyzer;
//!
//! let analyzer = DictionaryAnalyzer::from_csv("柿,カキ,名詞\n美味しい,オイシイ,形容詞\n").unwrap();
//! let tokens = analyzer.analyze("柿美味しい").unwrap();
//! assert_eq!(tokens[0].reading.as_deref(), Some("カキ"));
//! assert_eq!(tokens[1].surface, "美味しい");
//! ```

use crate::error::Result;

pub use self::token::AnalyzedToken;

/// Splits text into tokens carrying an optional kana reading.
pub trait Analyzer: Send + Sync + std::fmt::Debug {
    /// Analyze the given text.
    fn analyze(&self, text: &str) -> Result<Vec<AnalyzedToken>>;

    /// Get the name of this analyzer (for debugging and configuration).
    fn name(&self) -> &'static str;
}

pub mod dictionary;
pub mod token;
pub mod whitespace;
