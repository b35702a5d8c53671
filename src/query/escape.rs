//! Escaping of user text embedded in store queries.

/// Characters with a meaning in the store query syntax.
pub const RESERVED_CHARS: &[char] = &[
    '\\', '+', '-', '!', '(', ')', ':', '^', '[', ']', '"', '{', '}', '~', '*', '?', '|', '&', '/',
];

/// Escape `value` so every character is matched literally.
///
/// Reserved characters and whitespace are prefixed with a backslash. A leading
/// `-` in particular would otherwise read as an exclusion operator.
///
/// ```
/// use sarissa_suggest::query::escape_query_value;
///
/// assert_eq!(escape_query_value("-aa-"), r"\-aa\-");
/// assert_eq!(escape_query_value("c++"), r"c\+\+");
/// assert_eq!(escape_query_value("検索"), "検索");
/// ```
pub fn escape_query_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len() + 4);
    for c in value.chars() {
        if RESERVED_CHARS.contains(&c) || c.is_whitespace() {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape() {
        assert_eq!(escape_query_value("-a"), r"\-a");
        assert_eq!(escape_query_value("a:b"), r"a\:b");
        assert_eq!(escape_query_value("*x?"), r"\*x\?");
        assert_eq!(escape_query_value(r"a\b"), r"a\\b");
        assert_eq!(escape_query_value("a b"), r"a\ b");
        assert_eq!(escape_query_value(""), "");
    }
}
