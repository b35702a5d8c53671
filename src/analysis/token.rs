//! Token produced by an [`Analyzer`](super::Analyzer).

use serde::{Deserialize, Serialize};

/// A single analyzed token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzedToken {
    /// Surface form as it appears in the text.
    pub surface: String,

    /// Kana reading, when the analyzer knows one.
    pub reading: Option<String>,

    /// Part of speech tag, when the analyzer knows one.
    pub part_of_speech: Option<String>,

    /// Token position in the stream.
    pub position: usize,

    /// Byte offset of the first character.
    pub start_offset: usize,

    /// Byte offset one past the last character.
    pub end_offset: usize,
}

impl AnalyzedToken {
    /// Create a token with offsets and no reading.
    pub fn new<S: Into<String>>(
        surface: S,
        position: usize,
        start_offset: usize,
        end_offset: usize,
    ) -> Self {
        AnalyzedToken {
            surface: surface.into(),
            reading: None,
            part_of_speech: None,
            position,
            start_offset,
            end_offset,
        }
    }

    /// Attach a reading.
    pub fn with_reading<S: Into<String>>(mut self, reading: S) -> Self {
        self.reading = Some(reading.into());
        self
    }

    /// Attach a part of speech.
    pub fn with_part_of_speech<S: Into<String>>(mut self, pos: S) -> Self {
        self.part_of_speech = Some(pos.into());
        self
    }

    /// The reading if known, else the surface.
    pub fn reading_or_surface(&self) -> &str {
        self.reading.as_deref().unwrap_or(&self.surface)
    }

    /// Number of characters in the surface form.
    pub fn char_len(&self) -> usize {
        self.surface.chars().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reading_or_surface() {
        let token = AnalyzedToken::new("fess", 0, 0, 4);
        assert_eq!(token.reading_or_surface(), "fess");

        let token = AnalyzedToken::new("柿", 0, 0, 3).with_reading("カキ");
        assert_eq!(token.reading_or_surface(), "カキ");
        assert_eq!(token.char_len(), 1);
    }
}
