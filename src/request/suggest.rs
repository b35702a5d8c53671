//! Prefix suggestions for a partially typed query.

use std::collections::HashSet;
use std::time::Instant;

use log::debug;

use crate::config::DEFAULT_ROLE;
use crate::entity::item::{SuggestItem, SuggestItemKind};
use crate::error::Result;
use crate::query::escape_query_value;
use crate::request::response::{SuggestResponse, SuggestResultGroup};
use crate::request::{RequestContext, any_of, bad_word_clauses, conjunction};
use crate::store::StoreSearchRequest;

/// A whitespace-delimited word of the raw query with its byte offsets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct QueryTerm {
    pub(crate) text: String,
    pub(crate) start: usize,
    pub(crate) end: usize,
}

/// Split on any Unicode whitespace, including the ideographic space.
pub(crate) fn split_terms(query: &str) -> Vec<QueryTerm> {
    let mut terms = Vec::new();
    let mut start: Option<usize> = None;
    for (offset, c) in query.char_indices() {
        match (c.is_whitespace(), start) {
            (true, Some(s)) => {
                terms.push(QueryTerm {
                    text: query[s..offset].to_string(),
                    start: s,
                    end: offset,
                });
                start = None;
            }
            (false, None) => start = Some(offset),
            _ => {}
        }
    }
    if let Some(s) = start {
        terms.push(QueryTerm {
            text: query[s..].to_string(),
            start: s,
            end: query.len(),
        });
    }
    terms
}

/// Builder of a suggest request.
///
/// ```no_run
/// # use sarissa_suggest::suggester::Suggester;
/// # let suggester = Suggester::builder().build().unwrap();
/// let response = suggester
///     .suggest()
///     .query("kensaku enj")
///     .size(5)
///     .roles(["staff"])
///     .execute()
///     .unwrap();
/// for word in response.words() {
///     println!("{word}");
/// }
/// ```
#[derive(Debug, Clone)]
pub struct SuggestRequestBuilder {
    context: RequestContext,
    query: String,
    size: usize,
    kinds: Vec<SuggestItemKind>,
    roles: Vec<String>,
    tags: Vec<String>,
    fields: Vec<String>,
    suggest_detail: bool,
}

impl SuggestRequestBuilder {
    pub(crate) fn new(context: RequestContext) -> Self {
        let size = context.default_size;
        SuggestRequestBuilder {
            context,
            query: String::new(),
            size,
            kinds: Vec::new(),
            roles: Vec::new(),
            tags: Vec::new(),
            fields: Vec::new(),
            suggest_detail: false,
        }
    }

    /// Raw user input. Words are separated by whitespace.
    pub fn query<S: Into<String>>(mut self, query: S) -> Self {
        self.query = query.into();
        self
    }

    pub fn size(mut self, size: usize) -> Self {
        self.size = size;
        self
    }

    /// Restrict to items of these kinds. No kind means any kind.
    pub fn kinds<I>(mut self, kinds: I) -> Self
    where
        I: IntoIterator<Item = SuggestItemKind>,
    {
        self.kinds = kinds.into_iter().collect();
        self
    }

    pub fn add_kind(mut self, kind: SuggestItemKind) -> Self {
        self.kinds.push(kind);
        self
    }

    /// Roles of the requesting user. Items visible to everyone always match.
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

    /// Return the matching items next to the bare words.
    pub fn suggest_detail(mut self, suggest_detail: bool) -> Self {
        self.suggest_detail = suggest_detail;
        self
    }

    /// The store query this request runs, with the reading alternatives of
    /// every query word.
    pub(crate) fn build_query(&self) -> Result<(String, Vec<SuggestResultGroup>)> {
        let mut clauses = Vec::new();
        let mut groups = Vec::new();

        for (position, term) in split_terms(&self.query).into_iter().enumerate() {
            let alternatives = self.context.chain.convert(&term.text);
            let mut matchers: Vec<String> = alternatives
                .iter()
                .map(|reading| format!("reading_{position}:{}*", escape_query_value(reading)))
                .collect();
            matchers.push(format!("text_{position}:{}*", escape_query_value(&term.text)));
            clauses.push(format!("({})", matchers.join(" OR ")));

            groups.push(SuggestResultGroup {
                token: term.text,
                alternatives,
                start_offset: term.start,
                end_offset: term.end,
            });
        }

        let kinds: Vec<&str> = self.kinds.iter().map(|k| k.as_str()).collect();
        clauses.extend(any_of("kind", &kinds));
        if !self.roles.is_empty() {
            let mut roles = self.roles.clone();
            roles.push(DEFAULT_ROLE.to_string());
            clauses.extend(any_of("role", &roles));
        }
        clauses.extend(any_of("tag", &self.tags));
        clauses.extend(any_of("field", &self.fields));
        clauses.extend(bad_word_clauses(&self.context.settings)?);

        Ok((conjunction(&clauses), groups))
    }

    pub fn execute(self) -> Result<SuggestResponse> {
        let start = Instant::now();
        let (query, groups) = self.build_query()?;
        debug!("Suggest query: {query}");

        // Items of different kinds or fields can share a phrase, so every
        // match is ranked and deduped before the page is cut.
        let result = self.context.store.search(&StoreSearchRequest::new(query))?;
        let mut seen = HashSet::new();
        let mut items: Vec<SuggestItem> = result
            .items
            .into_iter()
            .filter(|item| seen.insert(item.display_text()))
            .collect();
        let total = items.len();
        items.truncate(self.size);
        let words = items.iter().map(SuggestItem::display_text).collect();

        Ok(SuggestResponse {
            query: self.query,
            took: start.elapsed(),
            total,
            words,
            groups,
            items: if self.suggest_detail { items } else { Vec::new() },
        })
    }
}
