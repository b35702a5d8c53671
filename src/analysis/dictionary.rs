//! Longest-match dictionary analyzer.
//!
//! Segments text greedily against a user dictionary of
//! `surface,reading,part_of_speech` entries. Spans not covered by the
//! dictionary are grouped into runs of the same script (kanji, hiragana,
//! katakana, alphanumerics); symbols always form single-character tokens.

use ahash::AHashMap;

use crate::analysis::{AnalyzedToken, Analyzer};
use crate::error::{Result, SuggestError};
use crate::util::kana::{self, Script};

/// Part of speech given to unknown symbol characters.
const SYMBOL_POS: &str = "記号";

/// One dictionary entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DictionaryEntry {
    pub reading: Option<String>,
    pub part_of_speech: Option<String>,
}

/// Analyzer backed by an in-memory user dictionary.
#[derive(Debug, Clone, Default)]
pub struct DictionaryAnalyzer {
    entries: AHashMap<String, DictionaryEntry>,
    max_entry_chars: usize,
}

impl DictionaryAnalyzer {
    /// Create an analyzer with an empty dictionary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a CSV dictionary: one `surface,reading[,part_of_speech]` entry per
    /// line. Blank lines and lines starting with `#` are ignored.
    pub fn from_csv(content: &str) -> Result<Self> {
        let mut analyzer = Self::new();

        for (line_no, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let columns: Vec<&str> = line.split(',').map(str::trim).collect();
            let surface = columns.first().copied().unwrap_or_default();
            if surface.is_empty() {
                return Err(SuggestError::analysis(format!(
                    "Dictionary line {} has an empty surface",
                    line_no + 1
                )));
            }
            let reading = columns.get(1).copied().filter(|s| !s.is_empty());
            let pos = columns.get(2).copied().filter(|s| !s.is_empty());
            analyzer.add_entry(surface, reading, pos);
        }

        Ok(analyzer)
    }

    /// Add or replace an entry.
    pub fn add_entry(&mut self, surface: &str, reading: Option<&str>, pos: Option<&str>) {
        self.max_entry_chars = self.max_entry_chars.max(surface.chars().count());
        self.entries.insert(
            surface.to_string(),
            DictionaryEntry {
                reading: reading.map(kana::hiragana_to_katakana),
                part_of_speech: pos.map(str::to_string),
            },
        );
    }

    /// Builder-style variant of [`add_entry`](Self::add_entry).
    pub fn with_entry(mut self, surface: &str, reading: Option<&str>, pos: Option<&str>) -> Self {
        self.add_entry(surface, reading, pos);
        self
    }

    /// Number of dictionary entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Longest entry starting at char index `start`. Returns the exclusive end
    /// char index and the entry.
    fn longest_match(
        &self,
        text: &str,
        chars: &[(usize, char)],
        start: usize,
    ) -> Option<(usize, &DictionaryEntry)> {
        let max_len = self.max_entry_chars.min(chars.len() - start);
        (1..=max_len).rev().find_map(|len| {
            let surface = &text[byte_at(text, chars, start)..byte_at(text, chars, start + len)];
            self.entries.get(surface).map(|entry| (start + len, entry))
        })
    }
}

fn byte_at(text: &str, chars: &[(usize, char)], idx: usize) -> usize {
    chars.get(idx).map(|(b, _)| *b).unwrap_or(text.len())
}

impl Analyzer for DictionaryAnalyzer {
    fn analyze(&self, text: &str) -> Result<Vec<AnalyzedToken>> {
        let chars: Vec<(usize, char)> = text.char_indices().collect();
        let mut tokens = Vec::new();
        let mut i = 0;

        while i < chars.len() {
            let c = chars[i].1;
            if c.is_whitespace() {
                i += 1;
                continue;
            }

            let start = byte_at(text, &chars, i);

            if let Some((end, entry)) = self.longest_match(text, &chars, i) {
                let stop = byte_at(text, &chars, end);
                let mut token = AnalyzedToken::new(&text[start..stop], tokens.len(), start, stop);
                token.reading = entry.reading.clone();
                token.part_of_speech = entry.part_of_speech.clone();
                tokens.push(token);
                i = end;
                continue;
            }

            let script = kana::script_of(c);
            let mut end = i + 1;
            if script != Script::Symbol {
                while end < chars.len()
                    && kana::script_of(chars[end].1) == script
                    && self.longest_match(text, &chars, end).is_none()
                {
                    end += 1;
                }
            }

            let stop = byte_at(text, &chars, end);
            let surface = &text[start..stop];
            let mut token = AnalyzedToken::new(surface, tokens.len(), start, stop);
            match script {
                Script::Hiragana | Script::Katakana => {
                    token = token.with_reading(kana::hiragana_to_katakana(surface));
                }
                Script::Symbol => {
                    token = token.with_part_of_speech(SYMBOL_POS);
                }
                _ => {}
            }
            tokens.push(token);
            i = end;
        }

        Ok(tokens)
    }

    fn name(&self) -> &'static str {
        "dictionary"
    }
}
