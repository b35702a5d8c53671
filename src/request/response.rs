//! Responses of read requests.

use std::time::Duration;

use serde::Serialize;

use crate::entity::item::SuggestItem;

/// One word of the raw query and the readings it was matched with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuggestResultGroup {
    /// The query word as typed.
    pub token: String,
    /// Readings the word was expanded to.
    pub alternatives: Vec<String>,
    /// Byte offsets of the word in the raw query.
    pub start_offset: usize,
    pub end_offset: usize,
}

/// Result of a suggest request.
#[derive(Debug, Clone, Serialize)]
pub struct SuggestResponse {
    pub query: String,
    pub took: Duration,
    /// Number of distinct phrases matching the request.
    pub total: usize,
    /// Suggested phrases, best first.
    pub words: Vec<String>,
    pub groups: Vec<SuggestResultGroup>,
    /// Items behind `words`, when detail was requested.
    pub items: Vec<SuggestItem>,
}

impl SuggestResponse {
    pub fn words(&self) -> &[String] {
        &self.words
    }

    /// Number of returned words.
    pub fn num(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// Result of a popular words request.
#[derive(Debug, Clone, Serialize)]
pub struct PopularWordsResponse {
    pub took: Duration,
    /// Number of distinct eligible phrases, independent of the sample size.
    pub total: usize,
    pub words: Vec<String>,
    pub items: Vec<SuggestItem>,
}

impl PopularWordsResponse {
    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn num(&self) -> usize {
        self.words.len()
    }
}
