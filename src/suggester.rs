//! The suggester facade.
//!
//! A [`Suggester`] wires the backing store, the settings store, the analyzer
//! and the reading converter chain together and hands out the indexer and the
//! request builders.
//!
//! # Examples
//!
//! ```
//! use sarissa_suggest::entity::item::{SuggestItem, SuggestItemKind};
//! use sarissa_suggest::suggester::Suggester;
//!
//! let suggester = Suggester::builder().build().unwrap();
//! let item = SuggestItem::new(
//!     vec!["検索".to_string(), "エンジン".to_string()],
//!     vec![vec!["kensaku".to_string()], vec!["enjin".to_string()]],
//!     SuggestItemKind::Document,
//! )
//! .unwrap();
//! suggester.indexer().index(vec![item]);
//! suggester.refresh().unwrap();
//!
//! let response = suggester.suggest().query("kensaku").execute().unwrap();
//! assert_eq!(response.words(), ["検索 エンジン"]);
//! ```

use std::sync::Arc;

use log::info;

use crate::analysis::Analyzer;
use crate::analysis::whitespace::WhitespaceAnalyzer;
use crate::config::SuggestConfig;
use crate::converter::alphabet::AlphabetConverter;
use crate::converter::katakana::KatakanaConverter;
use crate::converter::{ReadingConverter, ReadingConverterChain};
use crate::error::Result;
use crate::indexer::extract::ItemExtractor;
use crate::indexer::pipeline::{BatchPipeline, IndexingOptions};
use crate::indexer::suggest_indexer::SuggestIndexer;
use crate::request::{PopularWordsRequestBuilder, RequestContext, SuggestRequestBuilder};
use crate::settings::memory::MemorySettingsStore;
use crate::settings::{SettingsStore, SuggestSettings};
use crate::store::{MemorySuggestStore, SuggestStore};

/// Entry point of the library.
#[derive(Debug, Clone)]
pub struct Suggester {
    config: SuggestConfig,
    store: Arc<dyn SuggestStore>,
    settings: SuggestSettings,
    chain: Arc<ReadingConverterChain>,
    indexer: SuggestIndexer,
}

impl Suggester {
    pub fn builder() -> SuggesterBuilder {
        SuggesterBuilder::default()
    }

    pub fn config(&self) -> &SuggestConfig {
        &self.config
    }

    pub fn indexer(&self) -> &SuggestIndexer {
        &self.indexer
    }

    pub fn settings(&self) -> &SuggestSettings {
        &self.settings
    }

    pub fn store(&self) -> &Arc<dyn SuggestStore> {
        &self.store
    }

    /// The chain used for both indexing and query expansion.
    pub fn converter_chain(&self) -> &ReadingConverterChain {
        &self.chain
    }

    pub fn suggest(&self) -> SuggestRequestBuilder {
        SuggestRequestBuilder::new(self.request_context())
    }

    pub fn popular_words(&self) -> PopularWordsRequestBuilder {
        PopularWordsRequestBuilder::new(self.request_context())
    }

    /// Make every finished write visible to requests.
    pub fn refresh(&self) -> Result<()> {
        self.store.refresh()
    }

    fn request_context(&self) -> RequestContext {
        RequestContext {
            store: Arc::clone(&self.store),
            settings: self.settings.clone(),
            chain: Arc::clone(&self.chain),
            default_size: self.config.default_suggest_size,
        }
    }
}

/// Builder for [`Suggester`]. Every collaborator has an in-memory default.
#[derive(Default)]
pub struct SuggesterBuilder {
    config: SuggestConfig,
    store: Option<Arc<dyn SuggestStore>>,
    settings_store: Option<Arc<dyn SettingsStore>>,
    analyzer: Option<Arc<dyn Analyzer>>,
    converters: Option<Vec<Box<dyn ReadingConverter>>>,
}

impl SuggesterBuilder {
    pub fn config(mut self, config: SuggestConfig) -> Self {
        self.config = config;
        self
    }

    pub fn store(mut self, store: Arc<dyn SuggestStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn settings_store(mut self, settings_store: Arc<dyn SettingsStore>) -> Self {
        self.settings_store = Some(settings_store);
        self
    }

    /// Analyzer used to tokenize documents and to read kanji.
    pub fn analyzer(mut self, analyzer: Arc<dyn Analyzer>) -> Self {
        self.analyzer = Some(analyzer);
        self
    }

    /// Replace the default katakana → alphabet chain.
    pub fn converters(mut self, converters: Vec<Box<dyn ReadingConverter>>) -> Self {
        self.converters = Some(converters);
        self
    }

    pub fn build(self) -> Result<Suggester> {
        let config = self.config;
        config.validate()?;

        let store: Arc<dyn SuggestStore> = match self.store {
            Some(store) => store,
            None => Arc::new(
                MemorySuggestStore::new()
                    .with_max_readings_per_position(config.converter.max_readings_per_position),
            ),
        };
        let settings_store: Arc<dyn SettingsStore> = match self.settings_store {
            Some(settings_store) => settings_store,
            None => Arc::new(MemorySettingsStore::new()),
        };
        let analyzer: Arc<dyn Analyzer> = match self.analyzer {
            Some(analyzer) => analyzer,
            None => Arc::new(WhitespaceAnalyzer::new()),
        };

        let settings = SuggestSettings::new(settings_store);
        settings.init(&config)?;

        let converters: Vec<Box<dyn ReadingConverter>> = match self.converters {
            Some(converters) => converters,
            None => vec![
                Box::new(KatakanaConverter::with_analyzer(Arc::clone(&analyzer))),
                Box::new(
                    AlphabetConverter::new()
                        .with_max_reading_patterns(config.converter.max_reading_patterns),
                ),
            ],
        };
        let chain = converters
            .into_iter()
            .fold(ReadingConverterChain::new(), |chain, converter| {
                chain.with_converter(converter)
            });
        chain.start()?;
        let chain = Arc::new(chain);

        let extractor = ItemExtractor::new(Arc::clone(&chain), analyzer, &config);
        let pipeline = BatchPipeline::new(&config.indexing)?;
        let indexer = SuggestIndexer::new(
            Arc::clone(&store),
            settings.clone(),
            extractor,
            pipeline,
            IndexingOptions::from(&config.indexing),
        );

        info!(
            "Suggester ready: store {}, converters {:?}",
            store.name(),
            chain.converter_names()
        );

        Ok(Suggester {
            config,
            store,
            settings,
            chain,
            indexer,
        })
    }
}
