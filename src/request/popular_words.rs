//! Randomized, score-weighted sample of logged search phrases.
//!
//! Only QUERY-kind items are eligible. Every call draws a fresh weighted
//! sample without replacement, so repeated calls surface the whole eligible
//! set over time while favoring frequent phrases.

use std::time::Instant;

use ahash::AHashMap;
use log::debug;
use rand::seq::IndexedRandom;

use crate::config::DEFAULT_ROLE;
use crate::entity::item::{SuggestItem, SuggestItemKind};
use crate::error::{Result, SuggestError};
use crate::query::escape_query_value;
use crate::request::response::PopularWordsResponse;
use crate::request::{RequestContext, any_of, bad_word_clauses, conjunction};
use crate::store::StoreSearchRequest;

/// Default number of sampled words.
pub const DEFAULT_POPULAR_WORDS_SIZE: usize = 10;

#[derive(Debug)]
struct Candidate {
    word: String,
    weight: u64,
    item: SuggestItem,
}

/// Builder of a popular words request.
#[derive(Debug, Clone)]
pub struct PopularWordsRequestBuilder {
    context: RequestContext,
    size: usize,
    exclude_words: Vec<String>,
    roles: Vec<String>,
    tags: Vec<String>,
    fields: Vec<String>,
    suggest_detail: bool,
}

impl PopularWordsRequestBuilder {
    pub(crate) fn new(context: RequestContext) -> Self {
        PopularWordsRequestBuilder {
            context,
            size: DEFAULT_POPULAR_WORDS_SIZE,
            exclude_words: Vec::new(),
            roles: Vec::new(),
            tags: Vec::new(),
            fields: Vec::new(),
            suggest_detail: false,
        }
    }

    pub fn size(mut self, size: usize) -> Self {
        self.size = size;
        self
    }

    /// Never return this phrase. Repeatable.
    pub fn exclude_word<S: Into<String>>(mut self, word: S) -> Self {
        self.exclude_words.push(word.into());
        self
    }

    pub fn roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.roles = roles.into_iter().map(Into::into).collect();
        self
    }

    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn suggest_detail(mut self, suggest_detail: bool) -> Self {
        self.suggest_detail = suggest_detail;
        self
    }

    pub(crate) fn build_query(&self) -> Result<String> {
        let mut clauses = vec![format!("kind:{}", SuggestItemKind::Query.as_str())];
        if !self.roles.is_empty() {
            let mut roles = self.roles.clone();
            roles.push(DEFAULT_ROLE.to_string());
            clauses.extend(any_of("role", &roles));
        }
        clauses.extend(any_of("tag", &self.tags));
        clauses.extend(any_of("field", &self.fields));
        clauses.extend(
            self.exclude_words
                .iter()
                .filter(|word| !word.is_empty())
                .map(|word| format!("-text:{}", escape_query_value(word))),
        );
        clauses.extend(bad_word_clauses(&self.context.settings)?);
        Ok(conjunction(&clauses))
    }

    pub fn execute(self) -> Result<PopularWordsResponse> {
        let start = Instant::now();
        let query = self.build_query()?;
        debug!("Popular words query: {query}");
        let result = self.context.store.search(&StoreSearchRequest::new(query))?;

        // Phrases logged under several fields count once, with their scores summed.
        let mut candidates: Vec<Candidate> = Vec::new();
        let mut positions: AHashMap<String, usize> = AHashMap::new();
        for item in result.items {
            let word = item.display_text();
            match positions.get(&word) {
                Some(&index) => {
                    let candidate = &mut candidates[index];
                    candidate.weight = candidate.weight.saturating_add(item.score());
                }
                None => {
                    positions.insert(word.clone(), candidates.len());
                    candidates.push(Candidate {
                        word,
                        weight: item.score(),
                        item,
                    });
                }
            }
        }

        let total = candidates.len();
        let mut rng = rand::rng();
        let sampled: Vec<&Candidate> = candidates
            .choose_multiple_weighted(&mut rng, self.size.min(total), |candidate| {
                candidate.weight.max(1) as f64
            })
            .map_err(|e| SuggestError::query(format!("Failed to sample popular words: {e}")))?
            .collect();

        let words = sampled.iter().map(|c| c.word.clone()).collect();
        let items = if self.suggest_detail {
            sampled.iter().map(|c| c.item.clone()).collect()
        } else {
            Vec::new()
        };

        Ok(PopularWordsResponse {
            took: start.elapsed(),
            total,
            words,
            items,
        })
    }
}
