//! Indexing pipeline.
//!
//! [`SuggestIndexer`] accepts ready-made items, logged query strings, query
//! log streams and document streams. Streams run on a bounded worker pool and
//! report through an [`IndexingHandle`](status::IndexingHandle).

pub mod extract;
pub mod pipeline;
pub mod query_string;
pub mod reader;
pub mod status;
pub mod suggest_indexer;

pub use extract::ItemExtractor;
pub use pipeline::IndexingOptions;
pub use reader::{DocumentReader, QueryLogReader, VecDocumentReader, VecQueryLogReader};
pub use status::{IndexResponse, IndexingError, IndexingHandle, IndexingState, IndexingStatus};
pub use suggest_indexer::SuggestIndexer;
