//! Reading conversion.
//!
//! A [`ReadingConverter`] maps one candidate string to one or more candidate
//! readings. A [`ReadingConverterChain`] applies converters in registration
//! order: every candidate produced so far is fed to the next converter and its
//! results are appended, de-duplicated in first-seen order. Earlier candidates
//! stay in the set, so a kana reading remains matchable next to its romanized
//! spellings.
//!
//! ```text
//! "検索" → Katakana → ["検索", "ケンサク"] → Alphabet → ["検索", "ケンサク", "kennsaku", "kensaku"]
//! ```
//!
//! # Examples
//!
//! ```
//! use sarissa_suggest::converter::ReadingConverterChain;
//! use sarissa_suggest::converter::alphabet::AlphabetConverter;
//! use sarissa_suggest::converter::katakana::KatakanaConverter;
//!
//! let chain = ReadingConverterChain::new()
//!     .with_converter(Box::new(KatakanaConverter::new()))
//!     .with_converter(Box::new(AlphabetConverter::new()));
//!
//! let readings = chain.convert("けんさく");
//! assert!(readings.contains(&"ケンサク".to_string()));
//! assert!(readings.contains(&"kensaku".to_string()));
//! ```

use std::sync::atomic::{AtomicBool, Ordering};

use ahash::AHashSet;

use crate::error::Result;

/// A string → strings reading capability.
pub trait ReadingConverter: Send + Sync + std::fmt::Debug {
    /// One-time initialization, invoked by the chain before first use.
    fn start(&self) -> Result<()> {
        Ok(())
    }

    /// Convert one candidate. Never returns an empty list: a converter with
    /// nothing to contribute returns the input unchanged.
    fn convert(&self, text: &str) -> Vec<String>;

    /// Get the name of this converter (for debugging and configuration).
    fn name(&self) -> &'static str;
}

/// Ordered list of converters applied one after another.
#[derive(Debug, Default)]
pub struct ReadingConverterChain {
    converters: Vec<Box<dyn ReadingConverter>>,
    max_candidates: Option<usize>,
    started: AtomicBool,
}

impl ReadingConverterChain {
    /// Create an empty chain. An empty chain returns its input unchanged.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a converter.
    pub fn add_converter(&mut self, converter: Box<dyn ReadingConverter>) {
        self.converters.push(converter);
    }

    /// Builder-style variant of [`add_converter`](Self::add_converter).
    pub fn with_converter(mut self, converter: Box<dyn ReadingConverter>) -> Self {
        self.add_converter(converter);
        self
    }

    /// Bound the number of candidates returned per input.
    pub fn with_max_candidates(mut self, max: usize) -> Self {
        self.max_candidates = Some(max);
        self
    }

    /// Names of the registered converters, in order.
    pub fn converter_names(&self) -> Vec<&'static str> {
        self.converters.iter().map(|c| c.name()).collect()
    }

    /// Run every converter's `start` hook. Later calls are no-ops.
    pub fn start(&self) -> Result<()> {
        if self.started.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        for converter in &self.converters {
            if let Err(e) = converter.start() {
                self.started.store(false, Ordering::Release);
                return Err(e);
            }
        }
        Ok(())
    }

    /// Convert a token into its candidate readings. The input itself is
    /// always the first candidate.
    pub fn convert(&self, text: &str) -> Vec<String> {
        let mut candidates = vec![text.to_string()];
        let mut seen: AHashSet<String> = AHashSet::new();
        seen.insert(text.to_string());

        for converter in &self.converters {
            let mut produced = Vec::new();
            for candidate in &candidates {
                for converted in converter.convert(candidate) {
                    if !converted.is_empty() && seen.insert(converted.clone()) {
                        produced.push(converted);
                    }
                }
            }
            candidates.extend(produced);
        }

        if let Some(max) = self.max_candidates {
            candidates.truncate(max.max(1));
        }
        candidates
    }
}

pub mod alphabet;
pub mod katakana;
