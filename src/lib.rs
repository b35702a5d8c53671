//! # Sarissa Suggest
//!
//! Search-as-you-type suggestions for Japanese and Latin text, inspired by
//! Fess Suggest.
//!
//! ## Features
//!
//! - Kana → romaji reading expansion with a bounded candidate set
//! - Merge-by-key suggestion corpus with score accumulation
//! - Indexing from query strings, query logs and paged document sources
//! - Background indexing on a bounded worker pool with backpressure
//! - Prefix suggestions with role, kind, tag and bad-word filtering
//! - Elevate words and score-weighted popular words sampling

pub mod analysis;
pub mod config;
pub mod converter;
pub mod entity;
pub mod error;
pub mod indexer;
pub mod normalize;
pub mod query;
pub mod request;
pub mod settings;
pub mod store;
pub mod suggester;
pub mod util;

pub mod prelude {
    pub use crate::config::SuggestConfig;
    pub use crate::entity::{Document, ElevateWord, QueryLog, SuggestItem, SuggestItemKind};
    pub use crate::error::{Result, SuggestError};
    pub use crate::indexer::{IndexResponse, IndexingHandle, IndexingOptions};
    pub use crate::request::{PopularWordsResponse, SuggestResponse};
    pub use crate::suggester::Suggester;
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
