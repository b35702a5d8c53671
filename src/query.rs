//! Store query language.
//!
//! The retrieval engine talks to the backing store through a Lucene-style
//! query string. This module holds the parsed form of such a query and its
//! evaluation against a [`SuggestItem`], which is what the in-memory store
//! uses. External stores receive the string unchanged.
//!
//! Supported syntax:
//! - `field:value`, where `value` may be a `"quoted phrase"` (exact match)
//! - `*` and `?` wildcards inside unquoted values (`reading_0:ken*`)
//! - `AND`, `OR`, `NOT`, a leading `-` for exclusion, parentheses
//! - backslash escapes for reserved characters (`reading_0:\-a*`)
//! - `*:*` matches everything
//!
//! Searchable fields of an item:
//!
//! | field       | values                                   |
//! |-------------|------------------------------------------|
//! | `text`      | the display phrase                       |
//! | `text_N`    | surface token at position N              |
//! | `reading_N` | readings at position N                   |
//! | `kind`      | `document`, `query` or `user`            |
//! | `role`      | roles                                    |
//! | `tag`       | tags                                     |
//! | `field`     | source fields                            |

use std::borrow::Cow;
use std::fmt;

use regex::Regex;

use crate::entity::item::SuggestItem;

pub mod escape;
pub mod parser;

pub use escape::escape_query_value;
pub use parser::QueryParser;

/// Value pattern of a field clause.
#[derive(Debug, Clone)]
pub enum Pattern {
    /// Matches any value, including none.
    Any,
    Exact(String),
    Prefix(String),
    Suffix(String),
    Contains(String),
    /// Mixed `*`/`?` pattern compiled to an anchored regex.
    Wildcard { pattern: String, regex: Regex },
}

impl Pattern {
    pub fn matches(&self, value: &str) -> bool {
        match self {
            Pattern::Any => true,
            Pattern::Exact(s) => value == s,
            Pattern::Prefix(s) => value.starts_with(s.as_str()),
            Pattern::Suffix(s) => value.ends_with(s.as_str()),
            Pattern::Contains(s) => value.contains(s.as_str()),
            Pattern::Wildcard { regex, .. } => regex.is_match(value),
        }
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Pattern::Any, Pattern::Any) => true,
            (Pattern::Exact(a), Pattern::Exact(b))
            | (Pattern::Prefix(a), Pattern::Prefix(b))
            | (Pattern::Suffix(a), Pattern::Suffix(b))
            | (Pattern::Contains(a), Pattern::Contains(b)) => a == b,
            (Pattern::Wildcard { pattern: a, .. }, Pattern::Wildcard { pattern: b, .. }) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pattern::Any => write!(f, "*"),
            Pattern::Exact(s) => write!(f, "\"{s}\""),
            Pattern::Prefix(s) => write!(f, "{s}*"),
            Pattern::Suffix(s) => write!(f, "*{s}"),
            Pattern::Contains(s) => write!(f, "*{s}*"),
            Pattern::Wildcard { pattern, .. } => write!(f, "{pattern}"),
        }
    }
}

/// Parsed store query.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreQuery {
    MatchAll,
    Field { field: String, pattern: Pattern },
    And(Vec<StoreQuery>),
    Or(Vec<StoreQuery>),
    Not(Box<StoreQuery>),
}

impl StoreQuery {
    pub fn field<S: Into<String>>(field: S, pattern: Pattern) -> Self {
        StoreQuery::Field {
            field: field.into(),
            pattern,
        }
    }

    /// Evaluate the query against one item.
    pub fn matches(&self, item: &SuggestItem) -> bool {
        match self {
            StoreQuery::MatchAll => true,
            StoreQuery::Field { field, pattern } => {
                if matches!(pattern, Pattern::Any) {
                    return true;
                }
                field_values(item, field)
                    .iter()
                    .any(|value| pattern.matches(value))
            }
            StoreQuery::And(clauses) => clauses.iter().all(|c| c.matches(item)),
            StoreQuery::Or(clauses) => clauses.iter().any(|c| c.matches(item)),
            StoreQuery::Not(inner) => !inner.matches(item),
        }
    }
}

impl fmt::Display for StoreQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let join = |f: &mut fmt::Formatter<'_>, clauses: &[StoreQuery], op: &str| {
            write!(f, "(")?;
            for (i, clause) in clauses.iter().enumerate() {
                if i > 0 {
                    write!(f, " {op} ")?;
                }
                write!(f, "{clause}")?;
            }
            write!(f, ")")
        };
        match self {
            StoreQuery::MatchAll => write!(f, "*:*"),
            StoreQuery::Field { field, pattern } => write!(f, "{field}:{pattern}"),
            StoreQuery::And(clauses) => join(f, clauses, "AND"),
            StoreQuery::Or(clauses) => join(f, clauses, "OR"),
            StoreQuery::Not(inner) => write!(f, "-{inner}"),
        }
    }
}

/// Values an item exposes under `field`. Unknown fields have no values.
pub fn field_values<'a>(item: &'a SuggestItem, field: &str) -> Vec<Cow<'a, str>> {
    match field {
        "text" => vec![Cow::Owned(item.display_text())],
        "kind" => vec![Cow::Borrowed(item.kind().as_str())],
        "role" => item.roles().iter().map(|r| Cow::Borrowed(r.as_str())).collect(),
        "tag" => item.tags().iter().map(|t| Cow::Borrowed(t.as_str())).collect(),
        "field" => item.fields().iter().map(|f| Cow::Borrowed(f.as_str())).collect(),
        _ => {
            if let Some(position) = positional(field, "text_") {
                return item
                    .text()
                    .get(position)
                    .map(|t| vec![Cow::Borrowed(t.as_str())])
                    .unwrap_or_default();
            }
            if let Some(position) = positional(field, "reading_") {
                return item
                    .readings()
                    .get(position)
                    .map(|rs| rs.iter().map(|r| Cow::Borrowed(r.as_str())).collect())
                    .unwrap_or_default();
            }
            Vec::new()
        }
    }
}

fn positional(field: &str, prefix: &str) -> Option<usize> {
    field.strip_prefix(prefix)?.parse().ok()
}
