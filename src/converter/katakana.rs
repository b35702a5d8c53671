//! Kana normalization converter.
//!
//! Turns hiragana into katakana. With an analyzer attached, spans the analyzer
//! knows a reading for (typically kanji) are replaced by that reading, so
//! `検索` becomes `ケンサク`.

use std::sync::Arc;

use log::warn;

use crate::analysis::Analyzer;
use crate::converter::ReadingConverter;
use crate::util::kana;

/// Produces the katakana reading of its input.
#[derive(Debug, Clone, Default)]
pub struct KatakanaConverter {
    analyzer: Option<Arc<dyn Analyzer>>,
}

impl KatakanaConverter {
    /// Converter that only maps hiragana to katakana.
    pub fn new() -> Self {
        KatakanaConverter { analyzer: None }
    }

    /// Converter that consults the analyzer for readings first.
    pub fn with_analyzer(analyzer: Arc<dyn Analyzer>) -> Self {
        KatakanaConverter {
            analyzer: Some(analyzer),
        }
    }

    fn analyzed_reading(&self, analyzer: &dyn Analyzer, text: &str) -> Option<String> {
        match analyzer.analyze(text) {
            Ok(tokens) if !tokens.is_empty() => Some(
                tokens
                    .iter()
                    .map(|token| kana::hiragana_to_katakana(token.reading_or_surface()))
                    .collect(),
            ),
            Ok(_) => None,
            Err(e) => {
                warn!("Analyzer {} failed on {:?}: {}", analyzer.name(), text, e);
                None
            }
        }
    }
}

impl ReadingConverter for KatakanaConverter {
    fn convert(&self, text: &str) -> Vec<String> {
        let reading = self
            .analyzer
            .as_deref()
            .and_then(|analyzer| self.analyzed_reading(analyzer, text))
            .unwrap_or_else(|| kana::hiragana_to_katakana(text));
        vec![reading]
    }

    fn name(&self) -> &'static str {
        "katakana"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::dictionary::DictionaryAnalyzer;

    #[test]
    fn test_hiragana_only() {
        let converter = KatakanaConverter::new();
        assert_eq!(converter.convert("けんさく"), vec!["ケンサク"]);
        assert_eq!(converter.convert("検索"), vec!["検索"]);
    }

    #[test]
    fn test_with_analyzer() {
        let analyzer = DictionaryAnalyzer::new()
            .with_entry("検索", Some("けんさく"), Some("名詞"))
            .with_entry("全文", Some("ゼンブン"), Some("名詞"));
        let converter = KatakanaConverter::with_analyzer(Arc::new(analyzer));

        assert_eq!(converter.convert("全文検索"), vec!["ゼンブンケンサク"]);
        assert_eq!(converter.convert("検索エンジン"), vec!["ケンサクエンジン"]);
        assert_eq!(converter.convert("fess"), vec!["fess"]);
    }
}
