//! Backing store abstraction for suggestion items.
//!
//! The store owns the corpus and the locking discipline around it: every
//! upsert merges into the stored item with the same merge key atomically, so
//! concurrent indexing of the same phrase never loses an update.

use std::collections::HashSet;

use chrono::{DateTime, Utc};

use crate::entity::item::SuggestItem;
use crate::error::{Result, SuggestError};

pub mod memory;

pub use memory::MemorySuggestStore;

/// A store query and the number of items to return.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreSearchRequest {
    /// Query in the store query syntax, see [`crate::query`].
    pub query: String,
    /// Maximum number of items returned. `None` returns every match.
    pub size: Option<usize>,
}

impl StoreSearchRequest {
    pub fn new<S: Into<String>>(query: S) -> Self {
        StoreSearchRequest {
            query: query.into(),
            size: None,
        }
    }

    pub fn with_size(mut self, size: usize) -> Self {
        self.size = Some(size);
        self
    }
}

/// Matches of a store query, ranked by `score × user_boost` descending.
#[derive(Debug, Clone, Default)]
pub struct StoreSearchResult {
    /// Number of matching items, independent of the requested size.
    pub total: usize,
    pub items: Vec<SuggestItem>,
}

/// Per-item failure of a bulk write.
#[derive(Debug)]
pub struct BulkFailure {
    pub item: SuggestItem,
    pub error: SuggestError,
}

/// Outcome of a bulk write.
#[derive(Debug, Default)]
pub struct BulkResponse {
    pub succeeded: usize,
    pub failures: Vec<BulkFailure>,
}

impl BulkResponse {
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// Persistence and search for suggestion items.
pub trait SuggestStore: Send + Sync + std::fmt::Debug {
    /// Insert the item, or merge it into the stored item with the same id.
    fn upsert(&self, item: SuggestItem) -> Result<()>;

    /// Upsert several items. Failures of single items are reported in the
    /// response; `Err` means the whole batch was rejected.
    fn bulk_upsert(&self, items: Vec<SuggestItem>) -> Result<BulkResponse> {
        let mut response = BulkResponse::default();
        for item in items {
            match self.upsert(item.clone()) {
                Ok(()) => response.succeeded += 1,
                Err(error) => response.failures.push(BulkFailure { item, error }),
            }
        }
        Ok(response)
    }

    fn get(&self, id: &str) -> Result<Option<SuggestItem>>;

    /// Remove one item. Returns whether it existed.
    fn delete(&self, id: &str) -> Result<bool>;

    /// Remove every item updated strictly before `threshold`, except the ids in
    /// `protected`. Returns the number of removed items.
    fn delete_older_than(
        &self,
        threshold: DateTime<Utc>,
        protected: &HashSet<String>,
    ) -> Result<usize>;

    /// Remove every item. Returns the number of removed items.
    fn delete_all(&self) -> Result<usize>;

    fn search(&self, request: &StoreSearchRequest) -> Result<StoreSearchResult>;

    fn count(&self) -> Result<usize>;

    /// Make previous writes visible to searches.
    fn refresh(&self) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &'static str;
}
