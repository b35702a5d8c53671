use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use crossbeam_channel::{Receiver, Sender, bounded, unbounded};

use sarissa_suggest::config::SuggestConfig;
use sarissa_suggest::entity::{Document, DocumentBuilder, QueryLog, SuggestItem, SuggestItemKind};
use sarissa_suggest::error::{Result, SuggestError};
use sarissa_suggest::indexer::{
    DocumentReader, IndexResponse, IndexingOptions, IndexingState, VecDocumentReader,
    VecQueryLogReader,
};
use sarissa_suggest::store::{
    BulkResponse, MemorySuggestStore, StoreSearchRequest, StoreSearchResult, SuggestStore,
};
use sarissa_suggest::suggester::Suggester;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn config(workers: usize) -> SuggestConfig {
    let mut config = SuggestConfig::default();
    config.indexing.thread_pool_size = Some(workers);
    config
}

fn documents(count: usize) -> Vec<Document> {
    (0..count)
        .map(|i| {
            DocumentBuilder::new()
                .add_text("content", format!("word{i}"))
                .build()
        })
        .collect()
}

/// Delegates to a memory store, but holds every write until the gate opens
/// and rejects items containing "fail".
#[derive(Debug)]
struct TestStore {
    inner: MemorySuggestStore,
    gate: Option<Receiver<()>>,
    reject_batches: bool,
}

impl TestStore {
    fn new() -> Self {
        TestStore {
            inner: MemorySuggestStore::new(),
            gate: None,
            reject_batches: false,
        }
    }

    fn gated() -> (Self, Sender<()>) {
        let (open, gate) = bounded(0);
        let store = TestStore {
            gate: Some(gate),
            ..Self::new()
        };
        (store, open)
    }
}

impl SuggestStore for TestStore {
    fn upsert(&self, item: SuggestItem) -> Result<()> {
        if let Some(gate) = &self.gate {
            // Returns once the sender is dropped.
            let _ = gate.recv();
        }
        if item.display_text().contains("fail") {
            return Err(SuggestError::store("write rejected"));
        }
        self.inner.upsert(item)
    }

    fn bulk_upsert(&self, items: Vec<SuggestItem>) -> Result<BulkResponse> {
        if self.reject_batches {
            return Err(SuggestError::store("store unavailable"));
        }
        let mut response = BulkResponse::default();
        for item in items {
            match self.upsert(item.clone()) {
                Ok(()) => response.succeeded += 1,
                Err(error) => response
                    .failures
                    .push(sarissa_suggest::store::BulkFailure { item, error }),
            }
        }
        Ok(response)
    }

    fn get(&self, id: &str) -> Result<Option<SuggestItem>> {
        self.inner.get(id)
    }

    fn delete(&self, id: &str) -> Result<bool> {
        self.inner.delete(id)
    }

    fn delete_older_than(
        &self,
        threshold: DateTime<Utc>,
        protected: &HashSet<String>,
    ) -> Result<usize> {
        self.inner.delete_older_than(threshold, protected)
    }

    fn delete_all(&self) -> Result<usize> {
        self.inner.delete_all()
    }

    fn search(&self, request: &StoreSearchRequest) -> Result<StoreSearchResult> {
        self.inner.search(request)
    }

    fn count(&self) -> Result<usize> {
        self.inner.count()
    }

    fn name(&self) -> &'static str {
        "test"
    }
}

/// Pages through documents and counts the pages handed out.
struct CountingReader {
    inner: VecDocumentReader,
    pages: Arc<AtomicUsize>,
}

impl DocumentReader for CountingReader {
    fn next_page(&mut self) -> Result<Option<Vec<Document>>> {
        let page = self.inner.next_page()?;
        if page.is_some() {
            self.pages.fetch_add(1, Ordering::SeqCst);
        }
        Ok(page)
    }
}

struct FailingReader {
    calls: usize,
}

impl DocumentReader for FailingReader {
    fn next_page(&mut self) -> Result<Option<Vec<Document>>> {
        self.calls += 1;
        if self.calls == 1 {
            Ok(Some(documents(2)))
        } else {
            Err(SuggestError::store("source unavailable"))
        }
    }
}

#[test]
fn test_query_log_handle_polling() {
    init_logger();
    let suggester = Suggester::builder().config(config(2)).build().unwrap();
    let logs: Vec<QueryLog> = (0..50)
        .map(|i| QueryLog::new(format!("content:word{}", i % 10)))
        .collect();

    let handle = suggester
        .indexer()
        .index_from_query_log_reader(
            VecQueryLogReader::new(logs),
            IndexingOptions::default().with_batch_size(7),
        )
        .unwrap();

    let mut waited = Duration::ZERO;
    while !handle.is_done() && waited < Duration::from_secs(10) {
        std::thread::sleep(Duration::from_millis(10));
        waited += Duration::from_millis(10);
    }

    let status = handle.status();
    assert_eq!(status.state, IndexingState::Completed);
    assert_eq!(status.num_input_docs, 50);
    assert_eq!(status.num_errors, 0);

    let response = handle.wait().unwrap();
    assert_eq!(response.num_suggest_docs, 50);
    assert_eq!(suggester.store().count().unwrap(), 10);
}

#[test]
fn test_query_log_with_callback() {
    init_logger();
    let suggester = Suggester::builder().config(config(2)).build().unwrap();
    let (tx, rx) = unbounded::<IndexResponse>();

    let handle = suggester
        .indexer()
        .index_from_query_log_reader_with_callback(
            VecQueryLogReader::from_query_strings(["content:fess", "content:suggest", "broken"]),
            IndexingOptions::default(),
            move |response: &IndexResponse| {
                let _ = tx.send(response.clone());
            },
            |error: &SuggestError| panic!("unexpected failure: {error}"),
        )
        .unwrap();

    let response = rx.recv_timeout(Duration::from_secs(10)).unwrap();
    assert_eq!(response.num_input_docs, 3);
    assert_eq!(response.num_suggest_docs, 2);
    assert_eq!(response.errors.len(), 1);
    assert_eq!(response.errors[0].input, "broken");
    assert_eq!(handle.wait().unwrap(), response);
}

#[test]
fn test_document_reader_as_future() {
    init_logger();
    let suggester = Suggester::builder().config(config(3)).build().unwrap();
    let handle = suggester
        .indexer()
        .index_from_document_reader(
            VecDocumentReader::new(documents(25), 4),
            IndexingOptions::default().with_batch_size(5),
        )
        .unwrap();

    let response = futures::executor::block_on(handle).unwrap();
    assert_eq!(response.num_input_docs, 25);
    assert_eq!(response.num_suggest_docs, 25);
    assert_eq!(suggester.suggest().query("word1").size(20).execute().unwrap().num(), 11);
}

#[test]
fn test_document_reader_failure_reaches_callback() {
    init_logger();
    let suggester = Suggester::builder().config(config(1)).build().unwrap();
    let (tx, rx) = unbounded::<String>();

    let handle = suggester
        .indexer()
        .index_from_document_reader_with_callback(
            FailingReader { calls: 0 },
            IndexingOptions::default(),
            |_: &IndexResponse| panic!("unexpected success"),
            move |error: &SuggestError| {
                let _ = tx.send(error.to_string());
            },
        )
        .unwrap();

    let message = rx.recv_timeout(Duration::from_secs(10)).unwrap();
    assert!(message.contains("source unavailable"));
    assert!(matches!(handle.wait(), Err(SuggestError::Store(_))));
}

#[test]
fn test_backpressure_bounds_pages_in_flight() {
    init_logger();
    let (store, open) = TestStore::gated();
    let suggester = Suggester::builder()
        .config(config(1))
        .store(Arc::new(store))
        .build()
        .unwrap();

    let pages = Arc::new(AtomicUsize::new(0));
    let reader = CountingReader {
        inner: VecDocumentReader::new(documents(10), 1),
        pages: Arc::clone(&pages),
    };
    let handle = suggester
        .indexer()
        .index_from_document_reader(
            reader,
            IndexingOptions::default()
                .with_batch_size(1)
                .with_queue_capacity(1),
        )
        .unwrap();

    std::thread::sleep(Duration::from_millis(300));
    // One batch held by the worker, one queued, one waiting to be queued.
    assert!(pages.load(Ordering::SeqCst) <= 3);
    assert!(!handle.is_done());

    drop(open);
    let response = handle.wait().unwrap();
    assert_eq!(pages.load(Ordering::SeqCst), 10);
    assert_eq!(response.num_suggest_docs, 10);
}

#[test]
fn test_store_failures_are_recorded_per_item() {
    init_logger();
    let suggester = Suggester::builder()
        .store(Arc::new(TestStore::new()))
        .build()
        .unwrap();

    let item = |word: &str| {
        SuggestItem::new(
            vec![word.to_string()],
            vec![vec![word.to_string()]],
            SuggestItemKind::Document,
        )
        .unwrap()
    };
    let response = suggester
        .indexer()
        .index(vec![item("fess"), item("failure"), item("suggest")]);

    assert_eq!(response.num_input_docs, 3);
    assert_eq!(response.num_suggest_docs, 2);
    assert!(response.has_error());
    assert_eq!(response.errors[0].kind, "store");
    assert_eq!(response.errors[0].input, "failure");
    assert_eq!(suggester.store().count().unwrap(), 2);
}

#[test]
fn test_rejected_batch_records_every_item() {
    init_logger();
    let store = TestStore {
        reject_batches: true,
        ..TestStore::new()
    };
    let suggester = Suggester::builder().store(Arc::new(store)).build().unwrap();

    let response = suggester
        .indexer()
        .index_from_query_string("content:fess AND title:ignored")
        .unwrap();
    assert_eq!(response.num_suggest_docs, 0);
    assert_eq!(response.errors.len(), 1);
    assert_eq!(response.errors[0].input, "fess");
}

#[test]
fn test_missing_supported_fields_is_a_configuration_error() {
    init_logger();
    let mut config = SuggestConfig::default();
    config.supported_fields.clear();
    let suggester = Suggester::builder().config(config).build().unwrap();

    let result = suggester.indexer().index_from_query_string("content:fess");
    assert!(matches!(result, Err(SuggestError::Configuration(_))));

    let result = suggester.indexer().index_from_documents(documents(1));
    assert!(matches!(result, Err(SuggestError::Configuration(_))));

    let result = suggester.indexer().index_from_query_log_reader(
        VecQueryLogReader::from_query_strings(["content:fess"]),
        IndexingOptions::default(),
    );
    assert!(matches!(result, Err(SuggestError::Configuration(_))));

    suggester.settings().add_supported_field("content").unwrap();
    let response = suggester
        .indexer()
        .index_from_query_string("content:fess")
        .unwrap();
    assert_eq!(response.num_suggest_docs, 1);
}

#[test]
fn test_invalid_options_are_rejected() {
    init_logger();
    let suggester = Suggester::builder().build().unwrap();
    let result = suggester.indexer().index_from_document_reader_blocking(
        VecDocumentReader::new(documents(1), 1),
        IndexingOptions::default().with_queue_capacity(0),
    );
    assert!(matches!(result, Err(SuggestError::InvalidArgument(_))));
}

#[test]
fn test_query_log_tags_and_roles() {
    init_logger();
    let suggester = Suggester::builder().build().unwrap();
    suggester
        .indexer()
        .index_from_query_log(
            &QueryLog::new("content:fess")
                .with_filter_query("label:docs AND role:staff")
                .with_user("u1"),
        )
        .unwrap();

    let visible = |roles: &[&str]| {
        suggester
            .suggest()
            .query("fess")
            .roles(roles.iter().copied())
            .execute()
            .unwrap()
            .num()
    };
    assert_eq!(visible(&["staff"]), 1);
    assert_eq!(visible(&["guest"]), 0);

    let tagged = suggester
        .suggest()
        .query("fess")
        .tags(["docs"])
        .execute()
        .unwrap();
    assert_eq!(tagged.num(), 1);
}
