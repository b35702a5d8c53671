//! Administrator overrides that inject or boost a suggestion.

use serde::{Deserialize, Serialize};

use crate::entity::item::{SuggestItem, SuggestItemKind};
use crate::error::{Result, SuggestError};

/// A word pinned into the corpus with a ranking boost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElevateWord {
    pub word: String,
    pub boost: f32,
    #[serde(default)]
    pub readings: Vec<String>,
    #[serde(default)]
    pub fields: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub roles: Vec<String>,
}

impl ElevateWord {
    pub fn new<S: Into<String>>(word: S, boost: f32) -> Self {
        ElevateWord {
            word: word.into(),
            boost,
            readings: Vec::new(),
            fields: Vec::new(),
            tags: Vec::new(),
            roles: Vec::new(),
        }
    }

    pub fn with_readings<I, S>(mut self, readings: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.readings = readings.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.roles = roles.into_iter().map(Into::into).collect();
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.word.trim().is_empty() {
            return Err(SuggestError::invalid_argument("Elevate word must not be empty"));
        }
        if !self.boost.is_finite() || self.boost < 0.0 {
            return Err(SuggestError::invalid_argument(format!(
                "Elevate word boost must be a non-negative number: {}",
                self.boost
            )));
        }
        Ok(())
    }

    /// The boosted item this override stands for. When no readings were
    /// given, the word itself is its only reading.
    pub fn to_suggest_item(&self) -> Result<SuggestItem> {
        self.validate()?;
        let readings = if self.readings.is_empty() {
            vec![self.word.clone()]
        } else {
            self.readings.clone()
        };
        Ok(SuggestItem::new(vec![self.word.clone()], vec![readings], SuggestItemKind::User)?
            .with_fields(self.fields.iter().cloned())
            .with_tags(self.tags.iter().cloned())
            .with_roles(self.roles.iter().cloned())
            .with_user_boost(self.boost))
    }

    /// Identifier of the item produced by [`to_suggest_item`](Self::to_suggest_item).
    pub fn item_id(&self) -> Result<String> {
        Ok(self.to_suggest_item()?.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_suggest_item() {
        let word = ElevateWord::new("test", 2.0)
            .with_readings(vec!["test"])
            .with_fields(vec!["content"])
            .with_tags(vec!["news"]);
        let item = word.to_suggest_item().unwrap();

        assert_eq!(item.text(), &["test".to_string()]);
        assert_eq!(item.kind(), SuggestItemKind::User);
        assert_eq!(item.user_boost(), 2.0);
        assert!(item.tags().contains("news"));
        assert_eq!(word.item_id().unwrap(), item.id());
    }

    #[test]
    fn test_validation() {
        assert!(ElevateWord::new("", 1.0).validate().is_err());
        assert!(ElevateWord::new("a", -1.0).validate().is_err());
        assert!(ElevateWord::new("a", f32::NAN).validate().is_err());
        assert!(ElevateWord::new("a", 0.0).validate().is_ok());
    }

    #[test]
    fn test_json_defaults() {
        let word: ElevateWord = serde_json::from_str(r#"{"word":"fess","boost":1.5}"#).unwrap();
        assert!(word.readings.is_empty());
        assert_eq!(word.boost, 1.5);
    }
}
