//! Input sources for long-running indexing.

use crate::entity::document::Document;
use crate::entity::query_log::QueryLog;
use crate::error::Result;

/// Produces query log entries one at a time.
pub trait QueryLogReader: Send {
    /// Next entry, or `None` once the log is exhausted.
    fn read(&mut self) -> Option<QueryLog>;
}

/// Produces source documents page by page, so large corpora never have to be
/// held in memory at once.
pub trait DocumentReader: Send {
    /// Next page, or `None` at end of stream.
    fn next_page(&mut self) -> Result<Option<Vec<Document>>>;
}

/// Query log reader over an in-memory list.
#[derive(Debug, Default)]
pub struct VecQueryLogReader {
    logs: std::vec::IntoIter<QueryLog>,
}

impl VecQueryLogReader {
    pub fn new(logs: Vec<QueryLog>) -> Self {
        VecQueryLogReader {
            logs: logs.into_iter(),
        }
    }

    /// Reader over bare query strings.
    pub fn from_query_strings<I, S>(queries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(queries.into_iter().map(QueryLog::new).collect())
    }
}

impl QueryLogReader for VecQueryLogReader {
    fn read(&mut self) -> Option<QueryLog> {
        self.logs.next()
    }
}

/// Document reader over an in-memory list, served in fixed-size pages.
#[derive(Debug)]
pub struct VecDocumentReader {
    documents: std::vec::IntoIter<Document>,
    page_size: usize,
}

impl VecDocumentReader {
    pub fn new(documents: Vec<Document>, page_size: usize) -> Self {
        VecDocumentReader {
            documents: documents.into_iter(),
            page_size: page_size.max(1),
        }
    }
}

impl DocumentReader for VecDocumentReader {
    fn next_page(&mut self) -> Result<Option<Vec<Document>>> {
        let page: Vec<Document> = self.documents.by_ref().take(self.page_size).collect();
        if page.is_empty() {
            Ok(None)
        } else {
            Ok(Some(page))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_log_reader_exhausts() {
        let mut reader = VecQueryLogReader::from_query_strings(vec!["content:a", "content:b"]);
        assert_eq!(reader.read().map(|l| l.query_string), Some("content:a".to_string()));
        assert!(reader.read().is_some());
        assert!(reader.read().is_none());
        assert!(reader.read().is_none());
    }

    #[test]
    fn test_document_reader_pages() {
        let docs = (0..5)
            .map(|i| Document::builder().add_integer("id", i).build())
            .collect();
        let mut reader = VecDocumentReader::new(docs, 2);

        let sizes: Vec<usize> = std::iter::from_fn(|| reader.next_page().unwrap())
            .map(|page| page.len())
            .collect();
        assert_eq!(sizes, vec![2, 2, 1]);
    }
}
