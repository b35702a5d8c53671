//! The suggestion item and its merge algebra.
//!
//! A [`SuggestItem`] is one candidate suggestion phrase: an ordered list of
//! surface tokens, the candidate readings of each token, and the bookkeeping
//! that accumulates as the phrase is observed again. Items sharing a merge key
//! (normalized text + fields + kind) are folded together by
//! [`SuggestItem::merge`].
//!
//! # Examples
//!
//! ```
//! use sarissa_suggest::entity::item::{SuggestItem, SuggestItemKind};
//!
//! let mut stored = SuggestItem::new(
//!     vec!["検索".to_string()],
//!     vec![vec!["kensaku".to_string()]],
//!     SuggestItemKind::Query,
//! )
//! .unwrap()
//! .with_tags(vec!["tag1".to_string()]);
//!
//! let incoming = SuggestItem::new(
//!     vec!["検索".to_string()],
//!     vec![vec!["kennsaku".to_string()]],
//!     SuggestItemKind::Query,
//! )
//! .unwrap()
//! .with_tags(vec!["tag2".to_string()]);
//!
//! stored.merge(&incoming, 30).unwrap();
//! assert_eq!(stored.score(), 2);
//! assert_eq!(stored.readings()[0], vec!["kensaku", "kennsaku"]);
//! assert_eq!(stored.tags().len(), 2);
//! ```

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

use crate::config::DEFAULT_ROLE;
use crate::error::{Result, SuggestError};

const TOKEN_SEPARATOR: &str = "\u{1f}";
const KEY_SEPARATOR: char = '\u{1e}';

/// Origin of a suggestion item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestItemKind {
    /// Observed in indexed content.
    Document,
    /// Observed in search queries.
    Query,
    /// Injected by an administrator through an elevate word.
    User,
}

impl SuggestItemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SuggestItemKind::Document => "document",
            SuggestItemKind::Query => "query",
            SuggestItemKind::User => "user",
        }
    }
}

impl fmt::Display for SuggestItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SuggestItemKind {
    type Err = SuggestError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "document" => Ok(SuggestItemKind::Document),
            "query" => Ok(SuggestItemKind::Query),
            "user" => Ok(SuggestItemKind::User),
            other => Err(SuggestError::invalid_argument(format!(
                "Unknown item kind: {other}"
            ))),
        }
    }
}

/// One candidate suggestion phrase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestItem {
    text: Vec<String>,
    readings: Vec<Vec<String>>,
    fields: BTreeSet<String>,
    score: u64,
    user_boost: Option<f32>,
    tags: BTreeSet<String>,
    roles: BTreeSet<String>,
    kind: SuggestItemKind,
    updated_at: DateTime<Utc>,
}

impl SuggestItem {
    /// Create an item with score 1, the default role and the current time.
    ///
    /// `readings` must have one entry per token of `text`.
    pub fn new(
        text: Vec<String>,
        readings: Vec<Vec<String>>,
        kind: SuggestItemKind,
    ) -> Result<Self> {
        if text.is_empty() || text.iter().any(|t| t.trim().is_empty()) {
            return Err(SuggestError::invalid_input(
                "Suggest item text must contain non-empty tokens",
            ));
        }
        if text.len() != readings.len() {
            return Err(SuggestError::invalid_input(format!(
                "Suggest item has {} tokens but {} reading positions",
                text.len(),
                readings.len()
            )));
        }

        let readings = readings
            .into_iter()
            .map(|position| dedup_preserving_order(position.into_iter()))
            .collect();

        Ok(SuggestItem {
            text,
            readings,
            fields: BTreeSet::new(),
            score: 1,
            user_boost: None,
            tags: BTreeSet::new(),
            roles: BTreeSet::from([DEFAULT_ROLE.to_string()]),
            kind,
            updated_at: Utc::now(),
        })
    }

    /// Set the source fields.
    pub fn with_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Set the score.
    pub fn with_score(mut self, score: u64) -> Self {
        self.score = score;
        self
    }

    /// Set the elevate boost.
    pub fn with_user_boost(mut self, boost: f32) -> Self {
        self.user_boost = Some(boost);
        self
    }

    /// Set the tags.
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Restrict the item to the given roles. An empty list keeps the default role.
    pub fn with_roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let roles: BTreeSet<String> = roles.into_iter().map(Into::into).collect();
        if !roles.is_empty() {
            self.roles = roles;
        }
        self
    }

    /// Override the last-update timestamp.
    pub fn with_updated_at(mut self, updated_at: DateTime<Utc>) -> Self {
        self.updated_at = updated_at;
        self
    }

    pub fn text(&self) -> &[String] {
        &self.text
    }

    /// Display phrase: the tokens joined by a single space.
    pub fn display_text(&self) -> String {
        self.text.join(" ")
    }

    pub fn readings(&self) -> &[Vec<String>] {
        &self.readings
    }

    pub fn fields(&self) -> &BTreeSet<String> {
        &self.fields
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    /// Elevate boost, 1.0 unless set by an elevate word.
    pub fn user_boost(&self) -> f32 {
        self.user_boost.unwrap_or(1.0)
    }

    pub fn has_user_boost(&self) -> bool {
        self.user_boost.is_some()
    }

    pub fn tags(&self) -> &BTreeSet<String> {
        &self.tags
    }

    pub fn roles(&self) -> &BTreeSet<String> {
        &self.roles
    }

    pub fn kind(&self) -> SuggestItemKind {
        self.kind
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Ranking weight: score multiplied by the elevate boost.
    pub fn rank_score(&self) -> f64 {
        self.score as f64 * f64::from(self.user_boost())
    }

    /// Merge key and store identifier.
    ///
    /// Built from the NFKC-normalized tokens, the sorted field names and the
    /// kind, so at most one stored item exists per key. Tokens are joined by a
    /// control character, so a token containing a space never collides with
    /// the same words split into several tokens.
    pub fn id(&self) -> String {
        let text: Vec<String> = self
            .text
            .iter()
            .map(|token| token.trim().nfkc().collect::<String>())
            .collect();
        let fields: Vec<&str> = self.fields.iter().map(String::as_str).collect();
        format!(
            "{}{KEY_SEPARATOR}{}{KEY_SEPARATOR}{}",
            text.join(TOKEN_SEPARATOR),
            fields.join(TOKEN_SEPARATOR),
            self.kind
        )
    }

    /// Fold `incoming` into this item.
    ///
    /// Scores add up, readings are unioned per position (keeping at most
    /// `max_readings_per_position`), tags/roles/fields are unioned, the boost is
    /// taken from `incoming` only when it carries one, and the timestamp is
    /// refreshed.
    pub fn merge(&mut self, incoming: &SuggestItem, max_readings_per_position: usize) -> Result<()> {
        if self.id() != incoming.id() {
            return Err(SuggestError::invalid_argument(format!(
                "Cannot merge items with different keys: {} / {}",
                self.id(),
                incoming.id()
            )));
        }
        if self.text.len() != incoming.text.len() {
            return Err(SuggestError::invalid_argument(format!(
                "Cannot merge a {}-token item into a {}-token item",
                incoming.text.len(),
                self.text.len()
            )));
        }

        self.score = self.score.saturating_add(incoming.score);

        for (position, additional) in self.readings.iter_mut().zip(&incoming.readings) {
            for reading in additional {
                if position.len() >= max_readings_per_position {
                    break;
                }
                if !position.contains(reading) {
                    position.push(reading.clone());
                }
            }
        }

        self.tags.extend(incoming.tags.iter().cloned());
        self.roles.extend(incoming.roles.iter().cloned());
        self.fields.extend(incoming.fields.iter().cloned());

        if incoming.user_boost.is_some() {
            self.user_boost = incoming.user_boost;
        }

        self.updated_at = Utc::now();
        Ok(())
    }

    /// Trim every reading position to at most `max` entries.
    pub fn truncate_readings(&mut self, max: usize) {
        for position in &mut self.readings {
            position.truncate(max.max(1));
        }
    }
}

fn dedup_preserving_order<I: Iterator<Item = String>>(values: I) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for value in values {
        if !value.is_empty() && !out.contains(&value) {
            out.push(value);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn item(text: &[&str], readings: &[&[&str]], kind: SuggestItemKind) -> SuggestItem {
        SuggestItem::new(
            text.iter().map(|s| s.to_string()).collect(),
            readings
                .iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect())
                .collect(),
            kind,
        )
        .unwrap()
    }

    #[test]
    fn test_new_rejects_misaligned_readings() {
        let result = SuggestItem::new(
            vec!["検索".to_string(), "エンジン".to_string()],
            vec![vec!["kensaku".to_string()]],
            SuggestItemKind::Document,
        );
        assert!(matches!(result, Err(SuggestError::InvalidInput(_))));
    }

    #[test]
    fn test_default_role_unless_restricted() {
        let open = item(&["fess"], &[&["fess"]], SuggestItemKind::Query);
        assert!(open.roles().contains(DEFAULT_ROLE));

        let restricted = open.clone().with_roles(vec!["admin"]);
        assert_eq!(restricted.roles().len(), 1);
        assert!(restricted.roles().contains("admin"));

        let unchanged = open.with_roles(Vec::<String>::new());
        assert!(unchanged.roles().contains(DEFAULT_ROLE));
    }

    #[test]
    fn test_merge_key_components() {
        let a = item(&["検索"], &[&["kensaku"]], SuggestItemKind::Query).with_fields(vec!["content"]);
        let b = item(&["検索"], &[&["kennsaku"]], SuggestItemKind::Query).with_fields(vec!["content"]);
        let c = item(&["検索"], &[&["kensaku"]], SuggestItemKind::Document).with_fields(vec!["content"]);
        let d = item(&["検索"], &[&["kensaku"]], SuggestItemKind::Query).with_fields(vec!["title"]);
        let e = item(&["ｆｅｓｓ"], &[&["fess"]], SuggestItemKind::Query);
        let f = item(&["fess"], &[&["fess"]], SuggestItemKind::Query);

        assert_eq!(a.id(), b.id());
        assert_ne!(a.id(), c.id());
        assert_ne!(a.id(), d.id());
        assert_eq!(e.id(), f.id());
    }

    #[test]
    fn test_merge_accumulates() {
        let old = Utc::now() - Duration::days(3);
        let mut stored = item(&["全文", "検索"], &[&["zenbun"], &["kensaku"]], SuggestItemKind::Document)
            .with_tags(vec!["tag1"])
            .with_roles(vec!["role1"])
            .with_score(4)
            .with_updated_at(old);
        let incoming = item(
            &["全文", "検索"],
            &[&["zenbun", "zennbun"], &["kennsaku"]],
            SuggestItemKind::Document,
        )
        .with_tags(vec!["tag2"])
        .with_roles(vec!["role2"]);

        stored.merge(&incoming, 30).unwrap();

        assert_eq!(stored.score(), 5);
        assert_eq!(stored.readings()[0], vec!["zenbun", "zennbun"]);
        assert_eq!(stored.readings()[1], vec!["kensaku", "kennsaku"]);
        assert_eq!(stored.tags().len(), 2);
        assert_eq!(stored.roles().len(), 2);
        assert!(stored.updated_at() > old);
        assert!(!stored.has_user_boost());
    }

    #[test]
    fn test_merge_is_commutative_on_sets() {
        let a = item(&["fess"], &[&["fess", "fes"]], SuggestItemKind::Query)
            .with_tags(vec!["x"])
            .with_score(2);
        let b = item(&["fess"], &[&["fesu"]], SuggestItemKind::Query)
            .with_tags(vec!["y"])
            .with_score(3);

        let mut ab = a.clone();
        ab.merge(&b, 30).unwrap();
        let mut ba = b.clone();
        ba.merge(&a, 30).unwrap();

        assert_eq!(ab.score(), ba.score());
        assert_eq!(ab.tags(), ba.tags());
        assert_eq!(ab.roles(), ba.roles());
        let ab_readings: BTreeSet<_> = ab.readings()[0].iter().collect();
        let ba_readings: BTreeSet<_> = ba.readings()[0].iter().collect();
        assert_eq!(ab_readings, ba_readings);
    }

    #[test]
    fn test_merge_is_idempotent_on_sets() {
        let mut a = item(&["fess"], &[&["fess"]], SuggestItemKind::Query).with_tags(vec!["x"]);
        let same = a.clone();
        a.merge(&same, 30).unwrap();
        a.merge(&same, 30).unwrap();

        assert_eq!(a.readings()[0], vec!["fess"]);
        assert_eq!(a.tags().len(), 1);
        assert_eq!(a.score(), 3);
    }

    #[test]
    fn test_merge_caps_readings() {
        let mut a = item(&["シチ"], &[&["siti", "shiti"]], SuggestItemKind::Query);
        let b = item(&["シチ"], &[&["sichi", "shichi"]], SuggestItemKind::Query);
        a.merge(&b, 3).unwrap();
        assert_eq!(a.readings()[0], vec!["siti", "shiti", "sichi"]);
    }

    #[test]
    fn test_merge_boost_only_from_elevate() {
        let mut boosted = item(&["test"], &[&["test"]], SuggestItemKind::User).with_user_boost(2.0);
        let plain = item(&["test"], &[&["test"]], SuggestItemKind::User);
        boosted.merge(&plain, 30).unwrap();
        assert_eq!(boosted.user_boost(), 2.0);

        let mut plain = plain;
        let elevated = item(&["test"], &[&["test"]], SuggestItemKind::User).with_user_boost(5.0);
        plain.merge(&elevated, 30).unwrap();
        assert_eq!(plain.user_boost(), 5.0);
        assert_eq!(plain.rank_score(), 10.0);
    }

    #[test]
    fn test_merge_rejects_different_keys() {
        let mut a = item(&["a"], &[&["a"]], SuggestItemKind::Query);
        let b = item(&["b"], &[&["b"]], SuggestItemKind::Query);
        assert!(a.merge(&b, 30).is_err());
    }

    #[test]
    fn test_merge_key_keeps_token_boundaries() {
        let phrase = item(&["full text"], &[&["full text"]], SuggestItemKind::Query)
            .with_fields(vec!["content"]);
        let split = item(&["full", "text"], &[&["full"], &["text"]], SuggestItemKind::Query)
            .with_fields(vec!["content"]);
        assert_ne!(phrase.id(), split.id());
        assert_eq!(phrase.display_text(), split.display_text());

        let mut stored = phrase.clone();
        assert!(stored.merge(&split, 30).is_err());
        assert_eq!(stored.readings().len(), 1);
        assert_eq!(stored.score(), 1);
    }

    #[test]
    fn test_kind_parsing() {
        assert_eq!("QUERY".parse::<SuggestItemKind>().unwrap(), SuggestItemKind::Query);
        assert_eq!(SuggestItemKind::Document.to_string(), "document");
        assert!("other".parse::<SuggestItemKind>().is_err());
    }

    #[test]
    fn test_serde_round_trip_keeps_key() {
        let a = item(&["検索", "エンジン"], &[&["kensaku"], &["enjin"]], SuggestItemKind::Document);
        let json = serde_json::to_string(&a).unwrap();
        let back: SuggestItem = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id(), a.id());
        assert_eq!(back.display_text(), "検索 エンジン");
    }
}
