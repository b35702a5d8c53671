//! Entities flowing through the suggestion pipeline.

pub mod document;
pub mod elevate_word;
pub mod item;
pub mod query_log;

pub use document::{Document, DocumentBuilder, FieldValue};
pub use elevate_word::ElevateWord;
pub use item::{SuggestItem, SuggestItemKind};
pub use query_log::QueryLog;
