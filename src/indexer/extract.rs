//! Turning raw inputs into suggestion items.
//!
//! Query strings and query logs contribute one item per supported field, the
//! field's values forming the token sequence. Documents are run through the
//! analyzer and contribute one item per kept token. Every token's readings
//! come from the reading converter chain.

use std::sync::Arc;

use crate::analysis::{AnalyzedToken, Analyzer};
use crate::config::SuggestConfig;
use crate::converter::ReadingConverterChain;
use crate::entity::document::Document;
use crate::entity::elevate_word::ElevateWord;
use crate::entity::item::{SuggestItem, SuggestItemKind};
use crate::entity::query_log::QueryLog;
use crate::error::Result;
use crate::indexer::query_string::{FieldTerm, parse_field_query};

/// Builds [`SuggestItem`]s from query strings, query logs, documents and
/// elevate words.
#[derive(Debug, Clone)]
pub struct ItemExtractor {
    chain: Arc<ReadingConverterChain>,
    analyzer: Arc<dyn Analyzer>,
    tag_field_names: Vec<String>,
    role_field_name: String,
    score_increment: u64,
    max_token_length: usize,
    excluded_parts_of_speech: Vec<String>,
}

impl ItemExtractor {
    pub fn new(
        chain: Arc<ReadingConverterChain>,
        analyzer: Arc<dyn Analyzer>,
        config: &SuggestConfig,
    ) -> Self {
        ItemExtractor {
            chain,
            analyzer,
            tag_field_names: config.tag_field_names.clone(),
            role_field_name: config.role_field_name.clone(),
            score_increment: config.indexing.score_increment,
            max_token_length: config.indexing.max_token_length,
            excluded_parts_of_speech: config.indexing.excluded_parts_of_speech.clone(),
        }
    }

    /// Candidate readings of one token.
    pub fn readings(&self, token: &str) -> Vec<String> {
        self.chain.convert(token)
    }

    /// Items for a `field:value [AND field:value]*` query. Clauses on fields
    /// outside `supported_fields` are ignored.
    pub fn from_query_string(
        &self,
        query: &str,
        supported_fields: &[String],
        kind: SuggestItemKind,
    ) -> Result<Vec<SuggestItem>> {
        let terms = parse_field_query(query)?;
        let mut items = Vec::new();
        for field in supported_fields {
            let values: Vec<String> = terms
                .iter()
                .filter(|term| &term.field == field)
                .map(|term| term.value.clone())
                .collect();
            if values.is_empty() {
                continue;
            }
            let readings = values.iter().map(|value| self.readings(value)).collect();
            let item = SuggestItem::new(values, readings, kind)?
                .with_fields([field.as_str()])
                .with_score(self.score_increment);
            items.push(item);
        }
        Ok(items)
    }

    /// QUERY-kind items for one logged search, tagged from its filter query.
    pub fn from_query_log(
        &self,
        log: &QueryLog,
        supported_fields: &[String],
    ) -> Result<Vec<SuggestItem>> {
        let items = self.from_query_string(&log.query_string, supported_fields, SuggestItemKind::Query)?;
        if items.is_empty() {
            return Ok(items);
        }

        let filters = match log.filter_query_string.as_deref().map(str::trim) {
            Some(filter) if !filter.is_empty() => parse_field_query(filter)?,
            _ => Vec::new(),
        };
        let tags = self.values_of(&filters, |field| self.tag_field_names.iter().any(|t| t == field));
        let roles = self.values_of(&filters, |field| field == self.role_field_name);

        Ok(items
            .into_iter()
            .map(|item| item.with_tags(tags.clone()).with_roles(roles.clone()))
            .collect())
    }

    /// DOCUMENT-kind items for the supported fields of one document.
    pub fn from_document(
        &self,
        document: &Document,
        supported_fields: &[String],
    ) -> Result<Vec<SuggestItem>> {
        let tags: Vec<String> = self
            .tag_field_names
            .iter()
            .flat_map(|name| document.texts(name))
            .map(str::to_string)
            .collect();
        let roles: Vec<String> = document
            .texts(&self.role_field_name)
            .into_iter()
            .map(str::to_string)
            .collect();

        let mut items = Vec::new();
        for field in supported_fields {
            for text in document.texts(field) {
                for token in self.analyzer.analyze(text)? {
                    if !self.is_indexable(&token) {
                        continue;
                    }
                    let readings = self.readings(token.reading_or_surface());
                    let item = SuggestItem::new(
                        vec![token.surface.clone()],
                        vec![readings],
                        SuggestItemKind::Document,
                    )?
                    .with_fields([field.as_str()])
                    .with_score(self.score_increment)
                    .with_tags(tags.iter().cloned())
                    .with_roles(roles.iter().cloned());
                    items.push(item);
                }
            }
        }
        Ok(items)
    }

    /// The boosted item of an elevate word. Missing readings are filled in
    /// by the converter chain.
    pub fn from_elevate_word(&self, word: &ElevateWord) -> Result<SuggestItem> {
        if word.readings.is_empty() {
            word.clone()
                .with_readings(self.readings(&word.word))
                .to_suggest_item()
        } else {
            word.to_suggest_item()
        }
    }

    fn is_indexable(&self, token: &AnalyzedToken) -> bool {
        if token.surface.trim().is_empty() || token.char_len() > self.max_token_length {
            return false;
        }
        match token.part_of_speech.as_deref() {
            Some(pos) => !self
                .excluded_parts_of_speech
                .iter()
                .any(|excluded| pos.starts_with(excluded.as_str())),
            None => true,
        }
    }

    fn values_of<F>(&self, terms: &[FieldTerm], wanted: F) -> Vec<String>
    where
        F: Fn(&str) -> bool,
    {
        terms
            .iter()
            .filter(|term| wanted(&term.field))
            .map(|term| term.value.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::dictionary::DictionaryAnalyzer;
    use crate::config::DEFAULT_ROLE;
    use crate::converter::alphabet::AlphabetConverter;
    use crate::converter::katakana::KatakanaConverter;
    use crate::entity::document::DocumentBuilder;

    fn extractor() -> ItemExtractor {
        let analyzer: Arc<dyn Analyzer> = Arc::new(
            DictionaryAnalyzer::from_csv(
                "この,コノ,連体詞\n柿,カキ,名詞\nは,ハ,助詞\n美味しい,オイシイ,形容詞\n検索,ケンサク,名詞\n",
            )
            .unwrap(),
        );
        let chain = ReadingConverterChain::new()
            .with_converter(Box::new(KatakanaConverter::with_analyzer(Arc::clone(&analyzer))))
            .with_converter(Box::new(AlphabetConverter::new()));
        ItemExtractor::new(Arc::new(chain), analyzer, &SuggestConfig::default())
    }

    fn fields() -> Vec<String> {
        vec!["content".to_string()]
    }

    #[test]
    fn test_query_string_groups_by_field() {
        let items = extractor()
            .from_query_string(
                "content:検索 AND title:ignored AND content:ワード",
                &fields(),
                SuggestItemKind::Query,
            )
            .unwrap();

        assert_eq!(items.len(), 1);
        let item = &items[0];
        assert_eq!(item.display_text(), "検索 ワード");
        assert!(item.readings()[0].contains(&"kensaku".to_string()));
        assert_eq!(item.readings()[1][0], "ワード");
        assert!(item.fields().contains("content"));
        assert_eq!(item.kind(), SuggestItemKind::Query);
    }

    #[test]
    fn test_query_log_filters_become_tags_and_roles() {
        let log = QueryLog::new("content:fess").with_filter_query("label:news AND role:admin");
        let items = extractor().from_query_log(&log, &fields()).unwrap();

        assert_eq!(items.len(), 1);
        assert!(items[0].tags().contains("news"));
        assert!(items[0].roles().contains("admin"));
        assert!(!items[0].roles().contains(DEFAULT_ROLE));
    }

    #[test]
    fn test_query_log_without_field_is_an_error() {
        let log = QueryLog::new("fess");
        assert!(extractor().from_query_log(&log, &fields()).is_err());
    }

    #[test]
    fn test_document_skips_excluded_parts_of_speech() {
        let doc = DocumentBuilder::new()
            .add_text("content", "この柿は美味しい。")
            .add_texts("label", vec!["fruit"])
            .build();
        let items = extractor().from_document(&doc, &fields()).unwrap();

        let texts: Vec<String> = items.iter().map(|i| i.display_text()).collect();
        assert_eq!(texts, vec!["柿", "美味しい"]);
        assert!(items[0].readings()[0].contains(&"kaki".to_string()));
        assert!(items[0].tags().contains("fruit"));
        assert_eq!(items[0].kind(), SuggestItemKind::Document);
    }

    #[test]
    fn test_long_tokens_are_skipped() {
        let mut config = SuggestConfig::default();
        config.indexing.max_token_length = 3;
        let base = extractor();
        let extractor = ItemExtractor::new(Arc::clone(&base.chain), Arc::clone(&base.analyzer), &config);

        let doc = DocumentBuilder::new().add_text("content", "柿 美味しい").build();
        let texts: Vec<String> = extractor
            .from_document(&doc, &fields())
            .unwrap()
            .iter()
            .map(|i| i.display_text())
            .collect();
        assert_eq!(texts, vec!["柿"]);
    }

    #[test]
    fn test_elevate_word_readings_filled_in() {
        let item = extractor()
            .from_elevate_word(&ElevateWord::new("けんさく", 3.0))
            .unwrap();
        assert!(item.readings()[0].contains(&"kensaku".to_string()));
        assert_eq!(item.user_boost(), 3.0);
    }
}
