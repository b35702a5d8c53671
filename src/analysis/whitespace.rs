//! Whitespace analyzer.

use crate::analysis::{AnalyzedToken, Analyzer};
use crate::error::Result;
use crate::util::kana;

/// Splits on whitespace (including the ideographic space). Tokens made only of
/// kana get their katakana form as reading.
#[derive(Clone, Debug, Default)]
pub struct WhitespaceAnalyzer;

impl WhitespaceAnalyzer {
    /// Create a new whitespace analyzer.
    pub fn new() -> Self {
        WhitespaceAnalyzer
    }
}

impl Analyzer for WhitespaceAnalyzer {
    fn analyze(&self, text: &str) -> Result<Vec<AnalyzedToken>> {
        let mut tokens = Vec::new();
        let mut start: Option<usize> = None;

        let push = |begin: usize, end: usize, tokens: &mut Vec<AnalyzedToken>| {
            let surface = &text[begin..end];
            let mut token = AnalyzedToken::new(surface, tokens.len(), begin, end);
            if kana::is_kana(surface) {
                token = token.with_reading(kana::hiragana_to_katakana(surface));
            }
            tokens.push(token);
        };

        for (idx, c) in text.char_indices() {
            if c.is_whitespace() {
                if let Some(begin) = start.take() {
                    push(begin, idx, &mut tokens);
                }
            } else if start.is_none() {
                start = Some(idx);
            }
        }
        if let Some(begin) = start {
            push(begin, text.len(), &mut tokens);
        }

        Ok(tokens)
    }

    fn name(&self) -> &'static str {
        "whitespace"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_on_ideographic_space() {
        let analyzer = WhitespaceAnalyzer::new();
        let tokens = analyzer.analyze("検索　エンジン  fess").unwrap();

        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[0].surface, "検索");
        assert_eq!(tokens[1].surface, "エンジン");
        assert_eq!(tokens[1].reading.as_deref(), Some("エンジン"));
        assert_eq!(tokens[2].surface, "fess");
        assert_eq!(tokens[2].position, 2);
        assert_eq!(&"検索　エンジン  fess"[tokens[2].start_offset..tokens[2].end_offset], "fess");
    }

    #[test]
    fn test_empty_text() {
        let analyzer = WhitespaceAnalyzer::new();
        assert!(analyzer.analyze("   ").unwrap().is_empty());
    }
}
