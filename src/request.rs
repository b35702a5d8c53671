//! Read side of the suggester.
//!
//! Requests are built fluently from a [`Suggester`](crate::suggester::Suggester)
//! and translated into a single store query. Role, kind, tag and field
//! restrictions as well as bad-word exclusion are part of that query, so the
//! store never returns an item the caller must not see.

use std::sync::Arc;

use crate::converter::ReadingConverterChain;
use crate::error::Result;
use crate::query::escape_query_value;
use crate::settings::SuggestSettings;
use crate::store::SuggestStore;

pub mod popular_words;
pub mod response;
pub mod suggest;

pub use popular_words::PopularWordsRequestBuilder;
pub use response::{PopularWordsResponse, SuggestResponse, SuggestResultGroup};
pub use suggest::SuggestRequestBuilder;

/// Collaborators a request needs to run.
#[derive(Debug, Clone)]
pub(crate) struct RequestContext {
    pub(crate) store: Arc<dyn SuggestStore>,
    pub(crate) settings: SuggestSettings,
    pub(crate) chain: Arc<ReadingConverterChain>,
    pub(crate) default_size: usize,
}

/// `(field:v1 OR field:v2)` over escaped values, or `None` without values.
pub(crate) fn any_of<S: AsRef<str>>(field: &str, values: &[S]) -> Option<String> {
    if values.is_empty() {
        return None;
    }
    let clauses: Vec<String> = values
        .iter()
        .map(|value| format!("{field}:{}", escape_query_value(value.as_ref())))
        .collect();
    Some(format!("({})", clauses.join(" OR ")))
}

/// One `-text:*word*` exclusion per persisted bad word.
pub(crate) fn bad_word_clauses(settings: &SuggestSettings) -> Result<Vec<String>> {
    Ok(settings
        .bad_words()?
        .iter()
        .map(|word| format!("-text:*{}*", escape_query_value(word)))
        .collect())
}

/// AND the clauses together. No clause matches everything.
pub(crate) fn conjunction(clauses: &[String]) -> String {
    if clauses.is_empty() {
        "*:*".to_string()
    } else {
        clauses.join(" AND ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_any_of() {
        assert_eq!(any_of::<&str>("role", &[]), None);
        assert_eq!(
            any_of("role", &["admin", "_default_"]),
            Some("(role:admin OR role:_default_)".to_string())
        );
        assert_eq!(any_of("tag", &["a:b"]), Some(r"(tag:a\:b)".to_string()));
    }

    #[test]
    fn test_conjunction() {
        assert_eq!(conjunction(&[]), "*:*");
        assert_eq!(
            conjunction(&["kind:query".to_string(), "-text:*x*".to_string()]),
            "kind:query AND -text:*x*"
        );
    }
}
