//! Query parser for converting store query strings to [`StoreQuery`] trees.

use regex::Regex;

use crate::error::{Result, SuggestError};
use crate::query::{Pattern, StoreQuery};

/// Parser for the store query syntax.
#[derive(Debug, Default, Clone)]
pub struct QueryParser {
    /// Field used for values written without a `field:` prefix.
    default_field: Option<String>,
}

impl QueryParser {
    pub fn new() -> Self {
        QueryParser {
            default_field: None,
        }
    }

    /// Set the default field to search in when no field is specified.
    pub fn with_default_field<S: Into<String>>(mut self, field: S) -> Self {
        self.default_field = Some(field.into());
        self
    }

    pub fn default_field(&self) -> Option<&str> {
        self.default_field.as_deref()
    }

    /// Parse a query string. An empty string matches everything.
    pub fn parse(&self, query_str: &str) -> Result<StoreQuery> {
        let mut parser = QueryStringParser::new(query_str, self.default_field.as_deref());
        parser.parse()
    }
}

enum Segment {
    Literal(char),
    Star,
    Question,
}

struct QueryStringParser<'a> {
    chars: Vec<char>,
    pos: usize,
    default_field: Option<&'a str>,
}

impl<'a> QueryStringParser<'a> {
    fn new(query_str: &str, default_field: Option<&'a str>) -> Self {
        QueryStringParser {
            chars: query_str.chars().collect(),
            pos: 0,
            default_field,
        }
    }

    fn parse(&mut self) -> Result<StoreQuery> {
        self.skip_whitespace();
        if self.at_end() {
            return Ok(StoreQuery::MatchAll);
        }
        let query = self.parse_or_expression()?;
        self.skip_whitespace();
        if let Some(c) = self.peek() {
            return Err(self.error(format!("Unexpected '{c}'")));
        }
        Ok(query)
    }

    fn parse_or_expression(&mut self) -> Result<StoreQuery> {
        let mut clauses = vec![self.parse_and_expression()?];
        while self.peek_keyword("OR") {
            self.pos += 2;
            clauses.push(self.parse_and_expression()?);
        }
        Ok(collapse(clauses, StoreQuery::Or))
    }

    fn parse_and_expression(&mut self) -> Result<StoreQuery> {
        let mut clauses = vec![self.parse_unary()?];
        loop {
            self.skip_whitespace();
            if self.at_end() || self.peek() == Some(')') || self.peek_keyword("OR") {
                break;
            }
            if self.peek_keyword("AND") {
                self.pos += 3;
            }
            clauses.push(self.parse_unary()?);
        }
        Ok(collapse(clauses, StoreQuery::And))
    }

    fn parse_unary(&mut self) -> Result<StoreQuery> {
        self.skip_whitespace();
        if self.peek_keyword("NOT") {
            self.pos += 3;
            return Ok(StoreQuery::Not(Box::new(self.parse_unary()?)));
        }
        match self.peek() {
            Some('-') | Some('!') => {
                self.pos += 1;
                Ok(StoreQuery::Not(Box::new(self.parse_unary()?)))
            }
            Some('+') => {
                self.pos += 1;
                self.parse_unary()
            }
            _ => self.parse_primary(),
        }
    }

    fn parse_primary(&mut self) -> Result<StoreQuery> {
        self.skip_whitespace();
        match self.peek() {
            None => Err(self.error("Unexpected end of query")),
            Some('(') => {
                self.pos += 1;
                let inner = self.parse_or_expression()?;
                self.skip_whitespace();
                if self.peek() != Some(')') {
                    return Err(self.error("Missing closing parenthesis"));
                }
                self.pos += 1;
                Ok(inner)
            }
            Some(')') => Err(self.error("Unexpected ')'")),
            _ => {
                if self.chars[self.pos..].starts_with(&['*', ':', '*']) {
                    self.pos += 3;
                    return Ok(StoreQuery::MatchAll);
                }

                let start = self.pos;
                while self
                    .peek()
                    .is_some_and(|c| c.is_alphanumeric() || c == '_' || c == '.')
                {
                    self.pos += 1;
                }
                if self.pos > start && self.peek() == Some(':') {
                    let field: String = self.chars[start..self.pos].iter().collect();
                    self.pos += 1;
                    let pattern = self.parse_value(&field)?;
                    return Ok(StoreQuery::Field { field, pattern });
                }

                self.pos = start;
                let field = self
                    .default_field
                    .ok_or_else(|| self.error("No default field specified and no field prefix found"))?
                    .to_string();
                let pattern = self.parse_value(&field)?;
                Ok(StoreQuery::Field { field, pattern })
            }
        }
    }

    fn parse_value(&mut self, field: &str) -> Result<Pattern> {
        match self.peek() {
            Some('"') => return self.parse_quoted().map(Pattern::Exact),
            Some(c @ ('-' | '+' | '!')) => {
                return Err(self.error(format!(
                    "Unexpected operator '{c}' at start of value for field {field}"
                )));
            }
            _ => {}
        }

        let mut segments = Vec::new();
        while let Some(c) = self.peek() {
            if c.is_whitespace() || c == ')' {
                break;
            }
            self.pos += 1;
            match c {
                '\\' => match self.peek() {
                    Some(escaped) => {
                        self.pos += 1;
                        segments.push(Segment::Literal(escaped));
                    }
                    None => return Err(self.error("Dangling escape character")),
                },
                '*' => segments.push(Segment::Star),
                '?' => segments.push(Segment::Question),
                '(' | ':' | '"' => {
                    return Err(self.error(format!("Unescaped reserved character '{c}'")));
                }
                other => segments.push(Segment::Literal(other)),
            }
        }

        if segments.is_empty() {
            return Err(self.error(format!("Missing value for field {field}")));
        }
        build_pattern(&segments)
    }

    fn parse_quoted(&mut self) -> Result<String> {
        // Opening quote
        self.pos += 1;
        let mut value = String::new();
        loop {
            match self.peek() {
                None => return Err(self.error("Unterminated quoted value")),
                Some('"') => {
                    self.pos += 1;
                    return Ok(value);
                }
                Some('\\') => {
                    self.pos += 1;
                    match self.peek() {
                        Some(escaped) => {
                            self.pos += 1;
                            value.push(escaped);
                        }
                        None => return Err(self.error("Dangling escape character")),
                    }
                }
                Some(c) => {
                    self.pos += 1;
                    value.push(c);
                }
            }
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn peek_keyword(&mut self, keyword: &str) -> bool {
        self.skip_whitespace();
        let len = keyword.chars().count();
        let end = self.pos + len;
        if end > self.chars.len() {
            return false;
        }
        let matches = self.chars[self.pos..end].iter().copied().eq(keyword.chars());
        matches
            && self
                .chars
                .get(end)
                .is_none_or(|c| c.is_whitespace() || *c == '(')
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn error<S: AsRef<str>>(&self, msg: S) -> SuggestError {
        SuggestError::query(format!("{} (at position {})", msg.as_ref(), self.pos))
    }
}

fn collapse(mut clauses: Vec<StoreQuery>, combine: fn(Vec<StoreQuery>) -> StoreQuery) -> StoreQuery {
    if clauses.len() == 1 {
        clauses.remove(0)
    } else {
        combine(clauses)
    }
}

fn build_pattern(segments: &[Segment]) -> Result<Pattern> {
    let literal = |segs: &[Segment]| -> Option<String> {
        segs.iter()
            .map(|s| match s {
                Segment::Literal(c) => Some(*c),
                _ => None,
            })
            .collect()
    };

    if let Some(exact) = literal(segments) {
        return Ok(Pattern::Exact(exact));
    }

    if !segments.iter().any(|s| matches!(s, Segment::Question)) {
        let leading = segments.iter().take_while(|s| matches!(s, Segment::Star)).count();
        if leading == segments.len() {
            return Ok(Pattern::Any);
        }
        let trailing = segments
            .iter()
            .rev()
            .take_while(|s| matches!(s, Segment::Star))
            .count();
        if let Some(inner) = literal(&segments[leading..segments.len() - trailing]) {
            return Ok(match (leading > 0, trailing > 0) {
                (false, true) => Pattern::Prefix(inner),
                (true, false) => Pattern::Suffix(inner),
                _ => Pattern::Contains(inner),
            });
        }
    }

    let mut pattern = String::new();
    let mut regex_pattern = String::from("(?s)^");
    for segment in segments {
        match segment {
            Segment::Literal(c) => {
                if super::escape::RESERVED_CHARS.contains(c) || c.is_whitespace() {
                    pattern.push('\\');
                }
                pattern.push(*c);
                regex_pattern.push_str(&regex::escape(&c.to_string()));
            }
            Segment::Star => {
                pattern.push('*');
                regex_pattern.push_str(".*");
            }
            Segment::Question => {
                pattern.push('?');
                regex_pattern.push('.');
            }
        }
    }
    regex_pattern.push('$');

    let regex = Regex::new(&regex_pattern)
        .map_err(|e| SuggestError::query(format!("Invalid wildcard pattern: {e}")))?;
    Ok(Pattern::Wildcard { pattern, regex })
}
