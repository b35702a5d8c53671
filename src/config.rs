//! Configuration for the suggester.
//!
//! [`SuggestConfig`] gathers every tunable of the library. It can be built in
//! code (all sections implement `Default`) or loaded from a JSON file:
//!
//! ```no_run
//! use sarissa_suggest::config::SuggestConfig;
//!
//! let config = SuggestConfig::from_file("suggest.json").unwrap();
//! assert!(config.validate().is_ok());
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SuggestError};

/// Role carried by every item that is visible to all users.
pub const DEFAULT_ROLE: &str = "_default_";

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SuggestConfig {
    /// Reading conversion limits.
    pub converter: ConverterConfig,

    /// Indexing pipeline settings.
    pub indexing: IndexingConfig,

    /// Fields whose text is turned into suggestions. Seeds the settings store
    /// when it has no supported fields yet.
    pub supported_fields: Vec<String>,

    /// Document / filter-query fields whose values become item tags.
    pub tag_field_names: Vec<String>,

    /// Document / filter-query field whose values become item roles.
    pub role_field_name: String,

    /// Number of suggestions returned when a request does not set a size.
    pub default_suggest_size: usize,
}

impl Default for SuggestConfig {
    fn default() -> Self {
        Self {
            converter: ConverterConfig::default(),
            indexing: IndexingConfig::default(),
            supported_fields: vec!["content".to_string()],
            tag_field_names: vec!["label".to_string()],
            role_field_name: "role".to_string(),
            default_suggest_size: 10,
        }
    }
}

impl SuggestConfig {
    /// Load a configuration from a JSON file. Missing keys take their defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_json(&content)
    }

    /// Parse a configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: SuggestConfig = serde_json::from_str(json)?;
        Ok(config)
    }

    /// Check the configuration for values the pipeline cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.converter.max_reading_patterns == 0 {
            return Err(SuggestError::configuration(
                "converter.max_reading_patterns must be at least 1",
            ));
        }
        if self.converter.max_readings_per_position == 0 {
            return Err(SuggestError::configuration(
                "converter.max_readings_per_position must be at least 1",
            ));
        }
        if self.indexing.batch_size == 0 {
            return Err(SuggestError::configuration(
                "indexing.batch_size must be at least 1",
            ));
        }
        if self.indexing.queue_capacity == 0 {
            return Err(SuggestError::configuration(
                "indexing.queue_capacity must be at least 1",
            ));
        }
        if self.indexing.thread_pool_size == Some(0) {
            return Err(SuggestError::configuration(
                "indexing.thread_pool_size must be at least 1",
            ));
        }
        Ok(())
    }
}

/// Limits applied by the reading converters and the merge algebra.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConverterConfig {
    /// Hard ceiling on romanized candidates produced per input string.
    pub max_reading_patterns: usize,

    /// Ceiling on the readings kept per token position when items merge.
    pub max_readings_per_position: usize,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            max_reading_patterns: 10,
            max_readings_per_position: 30,
        }
    }
}

/// Settings for the indexing pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexingConfig {
    /// Worker pool size. If None, uses the number of CPU cores.
    pub thread_pool_size: Option<usize>,

    /// Inputs per batch handed to a worker.
    pub batch_size: usize,

    /// Batches that may wait in the queue before producers block.
    pub queue_capacity: usize,

    /// Score added by a single observation of a phrase.
    pub score_increment: u64,

    /// Tokens longer than this (in chars) are not turned into suggestions.
    pub max_token_length: usize,

    /// Parts of speech (prefix match) skipped when indexing documents.
    pub excluded_parts_of_speech: Vec<String>,
}

impl Default for IndexingConfig {
    fn default() -> Self {
        Self {
            thread_pool_size: None,
            batch_size: 100,
            queue_capacity: 10,
            score_increment: 1,
            max_token_length: 50,
            excluded_parts_of_speech: vec![
                "助詞".to_string(),
                "助動詞".to_string(),
                "記号".to_string(),
                "補助記号".to_string(),
                "連体詞".to_string(),
            ],
        }
    }
}

impl IndexingConfig {
    /// Effective worker count.
    pub fn worker_count(&self) -> usize {
        self.thread_pool_size.unwrap_or_else(num_cpus::get).max(1)
    }
}
