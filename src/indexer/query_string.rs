//! Parsing of logged query strings (`field:value [AND field:value]*`).

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::{Result, SuggestError};

lazy_static! {
    static ref AND_SEPARATOR: Regex = Regex::new(r"\s+AND\s+").unwrap();
}

/// One `field:value` clause of a logged query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldTerm {
    pub field: String,
    pub value: String,
}

/// Split a logged query into its clauses.
///
/// Values may be double-quoted. A clause without a `field:` prefix or with an
/// empty value is an input error.
///
/// ```
/// use sarissa_suggest::indexer::query_string::parse_field_query;
///
/// let terms = parse_field_query("content:検索 AND content:ワード").unwrap();
/// assert_eq!(terms.len(), 2);
/// assert_eq!(terms[1].value, "ワード");
/// ```
pub fn parse_field_query(query: &str) -> Result<Vec<FieldTerm>> {
    let query = query.trim();
    if query.is_empty() {
        return Err(SuggestError::invalid_input("Query string is empty"));
    }

    AND_SEPARATOR
        .split(query)
        .map(|clause| {
            let clause = clause.trim();
            let (field, value) = clause.split_once(':').ok_or_else(|| {
                SuggestError::invalid_input(format!("Expected field:value, got {clause:?}"))
            })?;
            let field = field.trim();
            let value = unquote(value.trim());
            if field.is_empty() || value.is_empty() {
                return Err(SuggestError::invalid_input(format!(
                    "Expected field:value, got {clause:?}"
                )));
            }
            Ok(FieldTerm {
                field: field.to_string(),
                value: value.to_string(),
            })
        })
        .collect()
}

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_and_multiple_clauses() {
        let terms = parse_field_query("content:検索").unwrap();
        assert_eq!(
            terms,
            vec![FieldTerm {
                field: "content".to_string(),
                value: "検索".to_string()
            }]
        );

        let terms = parse_field_query(r#"title:"full text"  AND  content:fess"#).unwrap();
        assert_eq!(terms[0].value, "full text");
        assert_eq!(terms[1].field, "content");
    }

    #[test]
    fn test_invalid_clauses() {
        assert!(parse_field_query("").is_err());
        assert!(parse_field_query("fess").is_err());
        assert!(parse_field_query("content:").is_err());
        assert!(parse_field_query("content:a AND b").is_err());
    }
}
