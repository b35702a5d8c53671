//! In-memory suggestion store.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use log::debug;
use parking_lot::RwLock;

use crate::entity::item::SuggestItem;
use crate::error::Result;
use crate::query::QueryParser;
use crate::store::{StoreSearchRequest, StoreSearchResult, SuggestStore};

/// Default ceiling on readings kept per token position.
pub const DEFAULT_MAX_READINGS_PER_POSITION: usize = 30;

/// A store keeping every item in a hash map keyed by merge key.
///
/// Queries are parsed with [`QueryParser`] and evaluated item by item.
#[derive(Debug)]
pub struct MemorySuggestStore {
    items: RwLock<HashMap<String, SuggestItem>>,
    max_readings_per_position: usize,
    parser: QueryParser,
}

impl Default for MemorySuggestStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemorySuggestStore {
    pub fn new() -> Self {
        MemorySuggestStore {
            items: RwLock::new(HashMap::new()),
            max_readings_per_position: DEFAULT_MAX_READINGS_PER_POSITION,
            parser: QueryParser::new(),
        }
    }

    /// Set the ceiling on readings kept per token position.
    pub fn with_max_readings_per_position(mut self, max: usize) -> Self {
        self.max_readings_per_position = max.max(1);
        self
    }

    /// Snapshot of every stored item, in no particular order.
    pub fn items(&self) -> Vec<SuggestItem> {
        self.items.read().values().cloned().collect()
    }
}

fn rank(a: &SuggestItem, b: &SuggestItem) -> Ordering {
    b.rank_score()
        .partial_cmp(&a.rank_score())
        .unwrap_or(Ordering::Equal)
        .then_with(|| b.score().cmp(&a.score()))
        .then_with(|| a.display_text().cmp(&b.display_text()))
        .then_with(|| a.kind().cmp(&b.kind()))
}

impl SuggestStore for MemorySuggestStore {
    fn upsert(&self, mut item: SuggestItem) -> Result<()> {
        let id = item.id();
        let mut items = self.items.write();
        match items.get_mut(&id) {
            Some(stored) => stored.merge(&item, self.max_readings_per_position),
            None => {
                item.truncate_readings(self.max_readings_per_position);
                items.insert(id, item);
                Ok(())
            }
        }
    }

    fn get(&self, id: &str) -> Result<Option<SuggestItem>> {
        Ok(self.items.read().get(id).cloned())
    }

    fn delete(&self, id: &str) -> Result<bool> {
        Ok(self.items.write().remove(id).is_some())
    }

    fn delete_older_than(
        &self,
        threshold: DateTime<Utc>,
        protected: &HashSet<String>,
    ) -> Result<usize> {
        let mut items = self.items.write();
        let before = items.len();
        items.retain(|id, item| item.updated_at() >= threshold || protected.contains(id));
        let removed = before - items.len();
        debug!("Removed {removed} items updated before {threshold}");
        Ok(removed)
    }

    fn delete_all(&self) -> Result<usize> {
        let mut items = self.items.write();
        let removed = items.len();
        items.clear();
        Ok(removed)
    }

    fn search(&self, request: &StoreSearchRequest) -> Result<StoreSearchResult> {
        let query = self.parser.parse(&request.query)?;
        let mut matched: Vec<SuggestItem> = self
            .items
            .read()
            .values()
            .filter(|item| query.matches(item))
            .cloned()
            .collect();

        let total = matched.len();
        matched.sort_by(rank);
        if let Some(size) = request.size {
            matched.truncate(size);
        }
        Ok(StoreSearchResult {
            total,
            items: matched,
        })
    }

    fn count(&self) -> Result<usize> {
        Ok(self.items.read().len())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
