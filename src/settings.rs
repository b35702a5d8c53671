//! Persisted suggester settings.
//!
//! Settings are kept in a [`SettingsStore`], a key-value store of string
//! arrays. [`SuggestSettings`] gives typed access to the three lists the
//! suggester relies on: supported fields, elevate words and bad words.

use std::sync::Arc;

use log::{debug, warn};

use crate::config::SuggestConfig;
use crate::entity::elevate_word::ElevateWord;
use crate::error::{Result, SuggestError};

pub mod file;
pub mod memory;

pub use file::FileSettingsStore;
pub use memory::MemorySettingsStore;

/// Key of the supported field list.
pub const SUPPORTED_FIELDS_KEY: &str = "supported_fields";
/// Key of the elevate word list.
pub const ELEVATE_WORDS_KEY: &str = "elevate_words";
/// Key of the bad word list.
pub const BAD_WORDS_KEY: &str = "bad_words";

/// String-array key-value store.
pub trait SettingsStore: Send + Sync + std::fmt::Debug {
    /// Values stored under `key`, empty when the key is unknown.
    fn get_array(&self, key: &str) -> Result<Vec<String>>;

    /// Append `value` unless already present.
    fn add_to_array(&self, key: &str, value: &str) -> Result<()>;

    /// Remove every occurrence of `value`. Returns whether anything was removed.
    fn remove_from_array(&self, key: &str, value: &str) -> Result<bool>;

    /// Replace the whole array.
    fn set_array(&self, key: &str, values: Vec<String>) -> Result<()>;

    /// Run `update` on the array under `key` while holding the store's write
    /// lock. The array is saved only when `update` returns `true`.
    fn update_array(
        &self,
        key: &str,
        update: &mut dyn FnMut(&mut Vec<String>) -> bool,
    ) -> Result<()>;
}

/// Typed view over a [`SettingsStore`].
#[derive(Debug, Clone)]
pub struct SuggestSettings {
    store: Arc<dyn SettingsStore>,
}

impl SuggestSettings {
    pub fn new(store: Arc<dyn SettingsStore>) -> Self {
        SuggestSettings { store }
    }

    /// Seed the supported fields from the configuration when none are stored.
    pub fn init(&self, config: &SuggestConfig) -> Result<()> {
        if self.store.get_array(SUPPORTED_FIELDS_KEY)?.is_empty()
            && !config.supported_fields.is_empty()
        {
            debug!("Seeding supported fields: {:?}", config.supported_fields);
            self.store
                .set_array(SUPPORTED_FIELDS_KEY, config.supported_fields.clone())?;
        }
        Ok(())
    }

    pub fn store(&self) -> &Arc<dyn SettingsStore> {
        &self.store
    }

    pub fn supported_fields(&self) -> Result<Vec<String>> {
        self.store.get_array(SUPPORTED_FIELDS_KEY)
    }

    /// Supported fields, or a configuration error when there are none.
    pub fn require_supported_fields(&self) -> Result<Vec<String>> {
        let fields = self.supported_fields()?;
        if fields.is_empty() {
            return Err(SuggestError::configuration("No supported fields are configured"));
        }
        Ok(fields)
    }

    pub fn add_supported_field(&self, field: &str) -> Result<()> {
        if field.trim().is_empty() {
            return Err(SuggestError::invalid_argument("Field name must not be empty"));
        }
        self.store.add_to_array(SUPPORTED_FIELDS_KEY, field)
    }

    pub fn remove_supported_field(&self, field: &str) -> Result<bool> {
        self.store.remove_from_array(SUPPORTED_FIELDS_KEY, field)
    }

    /// Persisted elevate words. Entries that no longer parse are skipped.
    pub fn elevate_words(&self) -> Result<Vec<ElevateWord>> {
        let entries = self.store.get_array(ELEVATE_WORDS_KEY)?;
        Ok(entries
            .iter()
            .filter_map(|entry| parse_elevate_entry(entry))
            .collect())
    }

    /// Persist an elevate word, replacing any entry for the same word.
    pub fn add_elevate_word(&self, word: &ElevateWord) -> Result<()> {
        word.validate()?;
        let entry = serde_json::to_string(word)?;
        self.store.update_array(ELEVATE_WORDS_KEY, &mut |entries| {
            entries.retain(|e| parse_elevate_entry(e).is_some_and(|w| w.word != word.word));
            entries.push(entry.clone());
            true
        })
    }

    /// Remove the entry for `word`, returning it when it existed.
    pub fn delete_elevate_word(&self, word: &str) -> Result<Option<ElevateWord>> {
        let mut removed = None;
        self.store.update_array(ELEVATE_WORDS_KEY, &mut |entries| {
            let position = entries
                .iter()
                .position(|e| parse_elevate_entry(e).is_some_and(|w| w.word == word));
            match position {
                Some(i) => {
                    removed = parse_elevate_entry(&entries.remove(i));
                    true
                }
                None => false,
            }
        })?;
        Ok(removed)
    }

    pub fn bad_words(&self) -> Result<Vec<String>> {
        self.store.get_array(BAD_WORDS_KEY)
    }

    /// Persist a bad word. It must be non-empty and free of whitespace.
    pub fn add_bad_word(&self, word: &str) -> Result<()> {
        let word = word.trim();
        if word.is_empty() {
            return Err(SuggestError::invalid_argument("Bad word must not be empty"));
        }
        if word.chars().any(char::is_whitespace) {
            return Err(SuggestError::invalid_argument(format!(
                "Bad word must not contain whitespace: {word:?}"
            )));
        }
        self.store.add_to_array(BAD_WORDS_KEY, word)
    }

    pub fn delete_bad_word(&self, word: &str) -> Result<bool> {
        self.store.remove_from_array(BAD_WORDS_KEY, word.trim())
    }
}

fn parse_elevate_entry(entry: &str) -> Option<ElevateWord> {
    match serde_json::from_str::<ElevateWord>(entry) {
        Ok(word) => Some(word),
        Err(e) => {
            warn!("Skipping malformed elevate word entry {entry:?}: {e}");
            None
        }
    }
}
