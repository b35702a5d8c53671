//! Write side of the suggester.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use log::{debug, info, warn};

use crate::entity::document::Document;
use crate::entity::elevate_word::ElevateWord;
use crate::entity::item::{SuggestItem, SuggestItemKind};
use crate::entity::query_log::QueryLog;
use crate::error::{Result, SuggestError};
use crate::indexer::extract::ItemExtractor;
use crate::indexer::pipeline::{BatchPipeline, IndexingOptions};
use crate::indexer::reader::{DocumentReader, QueryLogReader};
use crate::indexer::status::{
    IndexResponse, IndexingError, IndexingHandle, ProgressRecorder, indexing_task,
};
use crate::settings::SuggestSettings;
use crate::store::SuggestStore;

/// Turns inputs into suggestion items and maintains the corpus.
///
/// Per-input failures never abort a run: they are collected in the returned
/// [`IndexResponse`]. Only configuration faults (no supported fields) and
/// invalid arguments are returned as `Err`.
#[derive(Debug, Clone)]
pub struct SuggestIndexer {
    store: Arc<dyn SuggestStore>,
    settings: SuggestSettings,
    extractor: ItemExtractor,
    pipeline: BatchPipeline,
    default_options: IndexingOptions,
}

impl SuggestIndexer {
    pub(crate) fn new(
        store: Arc<dyn SuggestStore>,
        settings: SuggestSettings,
        extractor: ItemExtractor,
        pipeline: BatchPipeline,
        default_options: IndexingOptions,
    ) -> Self {
        SuggestIndexer {
            store,
            settings,
            extractor,
            pipeline,
            default_options,
        }
    }

    /// Batching limits used by the reader-based entry points by default.
    pub fn default_options(&self) -> IndexingOptions {
        self.default_options
    }

    /// Write already-built items, merging them by key.
    pub fn index(&self, items: Vec<SuggestItem>) -> IndexResponse {
        let start = Instant::now();
        let mut response = IndexResponse {
            num_input_docs: items.len(),
            ..Default::default()
        };
        write_items(self.store.as_ref(), items, &mut response);
        response.took = start.elapsed();
        response
    }

    /// Index a `field:value [AND field:value]*` query as QUERY-kind items.
    pub fn index_from_query_string(&self, query: &str) -> Result<IndexResponse> {
        self.index_from_query_string_as(query, SuggestItemKind::Query)
    }

    /// Index a `field:value [AND field:value]*` query with the given origin.
    pub fn index_from_query_string_as(
        &self,
        query: &str,
        kind: SuggestItemKind,
    ) -> Result<IndexResponse> {
        let fields = self.settings.require_supported_fields()?;
        let start = Instant::now();
        let mut response = IndexResponse {
            num_input_docs: 1,
            ..Default::default()
        };
        match self.extractor.from_query_string(query, &fields, kind) {
            Ok(items) => write_items(self.store.as_ref(), items, &mut response),
            Err(e) => record_input_error(&mut response, &e, query),
        }
        response.took = start.elapsed();
        Ok(response)
    }

    /// Index a single query log entry on the calling thread.
    pub fn index_from_query_log(&self, log: &QueryLog) -> Result<IndexResponse> {
        let fields = self.settings.require_supported_fields()?;
        let start = Instant::now();
        let mut response = process_query_logs(
            &self.extractor,
            self.store.as_ref(),
            &fields,
            std::slice::from_ref(log),
        );
        response.took = start.elapsed();
        Ok(response)
    }

    /// Drain a query log reader in the background.
    pub fn index_from_query_log_reader<R>(
        &self,
        reader: R,
        options: IndexingOptions,
    ) -> Result<IndexingHandle>
    where
        R: QueryLogReader + 'static,
    {
        let (recorder, handle) = indexing_task();
        self.spawn_query_log_run(reader, options, recorder)?;
        Ok(handle)
    }

    /// Drain a query log reader, blocking until every entry is indexed.
    pub fn index_from_query_log_reader_blocking<R>(
        &self,
        reader: R,
        options: IndexingOptions,
    ) -> Result<IndexResponse>
    where
        R: QueryLogReader + 'static,
    {
        self.index_from_query_log_reader(reader, options)?.wait()
    }

    /// Drain a query log reader in the background and report the outcome to
    /// one of the callbacks.
    pub fn index_from_query_log_reader_with_callback<R, S, F>(
        &self,
        reader: R,
        options: IndexingOptions,
        on_success: S,
        on_failure: F,
    ) -> Result<IndexingHandle>
    where
        R: QueryLogReader + 'static,
        S: FnOnce(&IndexResponse) + Send + 'static,
        F: FnOnce(&SuggestError) + Send + 'static,
    {
        let (recorder, handle) = indexing_task();
        let recorder = recorder.with_callbacks(Box::new(on_success), Box::new(on_failure));
        self.spawn_query_log_run(reader, options, recorder)?;
        Ok(handle)
    }

    fn spawn_query_log_run<R>(
        &self,
        mut reader: R,
        options: IndexingOptions,
        recorder: ProgressRecorder,
    ) -> Result<()>
    where
        R: QueryLogReader + 'static,
    {
        let fields = self.settings.require_supported_fields()?;
        let extractor = self.extractor.clone();
        let store = Arc::clone(&self.store);
        debug!(
            "Indexing query logs with {} workers, options {:?}",
            self.pipeline.workers(),
            options
        );
        self.pipeline.spawn(
            move || Ok(reader.read().map(|log| vec![log])),
            move |logs: Vec<QueryLog>| {
                process_query_logs(&extractor, store.as_ref(), &fields, &logs)
            },
            options,
            recorder,
        )
    }

    /// Index in-memory documents, blocking until done.
    pub fn index_from_documents(&self, documents: Vec<Document>) -> Result<IndexResponse> {
        let mut pages = std::iter::once(documents);
        let (recorder, handle) = indexing_task();
        self.spawn_document_run(move || Ok(pages.next()), self.default_options, recorder)?;
        handle.wait()
    }

    /// Drive a paging document reader to exhaustion in the background.
    pub fn index_from_document_reader<R>(
        &self,
        reader: R,
        options: IndexingOptions,
    ) -> Result<IndexingHandle>
    where
        R: DocumentReader + 'static,
    {
        let (recorder, handle) = indexing_task();
        let mut reader = reader;
        self.spawn_document_run(move || reader.next_page(), options, recorder)?;
        Ok(handle)
    }

    /// Drive a paging document reader to exhaustion, blocking until done.
    pub fn index_from_document_reader_blocking<R>(
        &self,
        reader: R,
        options: IndexingOptions,
    ) -> Result<IndexResponse>
    where
        R: DocumentReader + 'static,
    {
        self.index_from_document_reader(reader, options)?.wait()
    }

    /// Drive a paging document reader in the background and report the
    /// outcome to one of the callbacks.
    pub fn index_from_document_reader_with_callback<R, S, F>(
        &self,
        reader: R,
        options: IndexingOptions,
        on_success: S,
        on_failure: F,
    ) -> Result<IndexingHandle>
    where
        R: DocumentReader + 'static,
        S: FnOnce(&IndexResponse) + Send + 'static,
        F: FnOnce(&SuggestError) + Send + 'static,
    {
        let (recorder, handle) = indexing_task();
        let recorder = recorder.with_callbacks(Box::new(on_success), Box::new(on_failure));
        let mut reader = reader;
        self.spawn_document_run(move || reader.next_page(), options, recorder)?;
        Ok(handle)
    }

    fn spawn_document_run<S>(
        &self,
        source: S,
        options: IndexingOptions,
        recorder: ProgressRecorder,
    ) -> Result<()>
    where
        S: FnMut() -> Result<Option<Vec<Document>>> + Send + 'static,
    {
        let fields = self.settings.require_supported_fields()?;
        let extractor = self.extractor.clone();
        let store = Arc::clone(&self.store);
        self.pipeline.spawn(
            source,
            move |documents: Vec<Document>| {
                let mut response = IndexResponse {
                    num_input_docs: documents.len(),
                    ..Default::default()
                };
                let mut items = Vec::new();
                for document in &documents {
                    match extractor.from_document(document, &fields) {
                        Ok(mut extracted) => items.append(&mut extracted),
                        Err(e) => {
                            let input = serde_json::to_string(document)
                                .unwrap_or_else(|_| format!("{document:?}"));
                            record_input_error(&mut response, &e, input);
                        }
                    }
                }
                write_items(store.as_ref(), items, &mut response);
                response
            },
            options,
            recorder,
        )
    }

    /// Remove one item by id. Returns whether it existed.
    pub fn delete(&self, id: &str) -> Result<bool> {
        self.store.delete(id)
    }

    /// Remove every item.
    pub fn delete_all(&self) -> Result<usize> {
        let removed = self.store.delete_all()?;
        info!("Deleted all {removed} suggestion items");
        Ok(removed)
    }

    /// Remove items last updated before `threshold`. Items standing for a
    /// persisted elevate word are kept.
    pub fn delete_old_words(&self, threshold: DateTime<Utc>) -> Result<usize> {
        let protected: HashSet<String> = self
            .settings
            .elevate_words()?
            .iter()
            .filter_map(|word| word.item_id().ok())
            .collect();
        let removed = self.store.delete_older_than(threshold, &protected)?;
        info!(
            "Deleted {removed} suggestion items older than {threshold} ({} protected)",
            protected.len()
        );
        Ok(removed)
    }

    /// Persist an elevate word and merge its boosted item into the corpus.
    pub fn add_elevate_word(&self, word: ElevateWord) -> Result<IndexResponse> {
        let item = self.extractor.from_elevate_word(&word)?;
        self.settings.add_elevate_word(&word)?;
        Ok(self.index(vec![item]))
    }

    /// Forget an elevate word and remove its item. Returns whether the word
    /// was persisted.
    pub fn delete_elevate_word(&self, word: &str) -> Result<bool> {
        match self.settings.delete_elevate_word(word)? {
            Some(removed) => {
                let id = removed.item_id()?;
                self.store.delete(&id)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Re-merge every persisted elevate word into the corpus.
    pub fn restore_elevate_word(&self) -> Result<IndexResponse> {
        let start = Instant::now();
        let words = self.settings.elevate_words()?;
        let mut response = IndexResponse {
            num_input_docs: words.len(),
            ..Default::default()
        };
        let mut items = Vec::with_capacity(words.len());
        for word in &words {
            match self.extractor.from_elevate_word(word) {
                Ok(item) => items.push(item),
                Err(e) => record_input_error(&mut response, &e, word.word.as_str()),
            }
        }
        write_items(self.store.as_ref(), items, &mut response);
        response.took = start.elapsed();
        info!("Restored {} elevate words", response.num_suggest_docs);
        Ok(response)
    }

    /// Persist a bad word. Matching items are filtered out at query time.
    pub fn add_bad_word(&self, word: &str) -> Result<()> {
        self.settings.add_bad_word(word)
    }

    pub fn delete_bad_word(&self, word: &str) -> Result<bool> {
        self.settings.delete_bad_word(word)
    }
}

fn process_query_logs(
    extractor: &ItemExtractor,
    store: &dyn SuggestStore,
    fields: &[String],
    logs: &[QueryLog],
) -> IndexResponse {
    let mut response = IndexResponse {
        num_input_docs: logs.len(),
        ..Default::default()
    };
    let mut items = Vec::new();
    for log in logs {
        match extractor.from_query_log(log, fields) {
            Ok(mut extracted) => items.append(&mut extracted),
            Err(e) => record_input_error(&mut response, &e, log.query_string.as_str()),
        }
    }
    write_items(store, items, &mut response);
    response
}

fn record_input_error<S: Into<String>>(
    response: &mut IndexResponse,
    error: &SuggestError,
    input: S,
) {
    let error = IndexingError::new(error, input);
    warn!("Skipping input {:?}: {}", error.input, error.message);
    response.errors.push(error);
}

fn write_items(store: &dyn SuggestStore, items: Vec<SuggestItem>, response: &mut IndexResponse) {
    if items.is_empty() {
        return;
    }
    let texts: Vec<String> = items.iter().map(SuggestItem::display_text).collect();
    match store.bulk_upsert(items) {
        Ok(bulk) => {
            response.num_suggest_docs += bulk.succeeded;
            for failure in bulk.failures {
                let error = IndexingError::new(&failure.error, failure.item.display_text());
                warn!("Failed to write {:?}: {}", error.input, error.message);
                response.errors.push(error);
            }
        }
        Err(e) => {
            warn!("Store {} rejected a batch of {} items: {e}", store.name(), texts.len());
            response
                .errors
                .extend(texts.into_iter().map(|text| IndexingError::new(&e, text)));
        }
    }
}
