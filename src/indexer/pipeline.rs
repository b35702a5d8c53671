//! Batched indexing on a bounded worker pool.
//!
//! A reader thread pulls records from the source, groups them into batches of
//! `batch_size` and pushes them into a bounded queue of `queue_capacity`
//! batches. Once the queue is full the reader blocks, so a fast source never
//! buffers more than `queue_capacity × batch_size` records. Workers on a rayon
//! pool drain the queue and report per-batch results into the run's progress.

use std::sync::Arc;
use std::thread;

use crossbeam_channel::bounded;
use log::{debug, error, info, warn};
use rayon::{ThreadPool, ThreadPoolBuilder};
use serde::{Deserialize, Serialize};

use crate::config::IndexingConfig;
use crate::error::{Result, SuggestError};
use crate::indexer::status::{IndexResponse, ProgressRecorder};

/// Batching limits of one indexing run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexingOptions {
    /// Records per batch handed to a worker.
    pub batch_size: usize,
    /// Batches that may wait in the queue before the reader blocks.
    pub queue_capacity: usize,
}

impl Default for IndexingOptions {
    fn default() -> Self {
        IndexingOptions::from(&IndexingConfig::default())
    }
}

impl From<&IndexingConfig> for IndexingOptions {
    fn from(config: &IndexingConfig) -> Self {
        IndexingOptions {
            batch_size: config.batch_size,
            queue_capacity: config.queue_capacity,
        }
    }
}

impl IndexingOptions {
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_queue_capacity(mut self, queue_capacity: usize) -> Self {
        self.queue_capacity = queue_capacity;
        self
    }

    fn validate(&self) -> Result<()> {
        if self.batch_size == 0 || self.queue_capacity == 0 {
            return Err(SuggestError::invalid_argument(format!(
                "batch_size and queue_capacity must be at least 1: {self:?}"
            )));
        }
        Ok(())
    }
}

/// Worker pool shared by every run of an indexer.
#[derive(Debug, Clone)]
pub(crate) struct BatchPipeline {
    pool: Arc<ThreadPool>,
    workers: usize,
}

impl BatchPipeline {
    pub(crate) fn new(config: &IndexingConfig) -> Result<Self> {
        let workers = config.worker_count();
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("suggest-indexer-{i}"))
            .panic_handler(|_| error!("Indexing worker panicked"))
            .build()
            .map_err(|e| SuggestError::indexing(format!("Failed to create thread pool: {e}")))?;

        Ok(BatchPipeline {
            pool: Arc::new(pool),
            workers,
        })
    }

    pub(crate) fn workers(&self) -> usize {
        self.workers
    }

    /// Start a run. Returns once the reader thread and workers are started;
    /// completion is reported through `recorder`.
    pub(crate) fn spawn<T, S, F>(
        &self,
        mut source: S,
        process: F,
        options: IndexingOptions,
        recorder: ProgressRecorder,
    ) -> Result<()>
    where
        T: Send + 'static,
        S: FnMut() -> Result<Option<Vec<T>>> + Send + 'static,
        F: Fn(Vec<T>) -> IndexResponse + Send + Sync + 'static,
    {
        options.validate()?;

        let (batch_tx, batch_rx) = bounded::<Vec<T>>(options.queue_capacity);
        let (done_tx, done_rx) = bounded::<()>(self.workers);
        let process = Arc::new(process);
        let sink = recorder.sink();

        for worker_id in 0..self.workers {
            let batches = batch_rx.clone();
            let done = done_tx.clone();
            let process = Arc::clone(&process);
            let sink = sink.clone();
            self.pool.spawn(move || {
                for batch in batches.iter() {
                    let size = batch.len();
                    let response = process(batch);
                    debug!(
                        "Worker {worker_id} processed {size} inputs: {} suggestions, {} errors",
                        response.num_suggest_docs,
                        response.errors.len()
                    );
                    sink.record(response);
                }
                let _ = done.send(());
            });
        }
        drop(batch_rx);
        drop(done_tx);

        let workers = self.workers;
        thread::Builder::new()
            .name("suggest-index-reader".to_string())
            .spawn(move || {
                let mut outcome = Ok(());
                let mut pending: Vec<T> = Vec::with_capacity(options.batch_size);

                'read: loop {
                    match source() {
                        Ok(Some(records)) => {
                            for record in records {
                                pending.push(record);
                                if pending.len() >= options.batch_size {
                                    let batch = std::mem::replace(
                                        &mut pending,
                                        Vec::with_capacity(options.batch_size),
                                    );
                                    if batch_tx.send(batch).is_err() {
                                        outcome = Err(SuggestError::indexing(
                                            "All indexing workers stopped",
                                        ));
                                        break 'read;
                                    }
                                }
                            }
                        }
                        Ok(None) => break,
                        Err(e) => {
                            outcome = Err(e);
                            break;
                        }
                    }
                }

                if outcome.is_ok() && !pending.is_empty() && batch_tx.send(pending).is_err() {
                    outcome = Err(SuggestError::indexing("All indexing workers stopped"));
                }
                drop(batch_tx);

                for _ in 0..workers {
                    if done_rx.recv().is_err() {
                        break;
                    }
                }

                match outcome {
                    Ok(()) => {
                        info!("Indexing run finished");
                        recorder.complete();
                    }
                    Err(e) => {
                        warn!("Indexing run failed: {e}");
                        recorder.fail(e);
                    }
                }
            })
            .map_err(|e| SuggestError::indexing(format!("Failed to spawn reader thread: {e}")))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indexer::status::{IndexingState, indexing_task};
    use parking_lot::Mutex;

    fn pipeline(workers: usize) -> BatchPipeline {
        let config = IndexingConfig {
            thread_pool_size: Some(workers),
            ..Default::default()
        };
        BatchPipeline::new(&config).unwrap()
    }

    #[test]
    fn test_batches_cover_every_record() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let batch_sizes = Arc::new(Mutex::new(Vec::new()));
        let mut pages = vec![vec![1, 2, 3], vec![4, 5], vec![6, 7, 8, 9, 10]].into_iter();

        let (recorder, handle) = indexing_task();
        let seen_in_worker = Arc::clone(&seen);
        let sizes_in_worker = Arc::clone(&batch_sizes);
        pipeline(2)
            .spawn(
                move || Ok(pages.next()),
                move |batch: Vec<i32>| {
                    sizes_in_worker.lock().push(batch.len());
                    seen_in_worker.lock().extend(batch.iter().copied());
                    IndexResponse {
                        num_input_docs: batch.len(),
                        num_suggest_docs: batch.len(),
                        ..Default::default()
                    }
                },
                IndexingOptions::default().with_batch_size(4).with_queue_capacity(1),
                recorder,
            )
            .unwrap();

        let response = handle.wait().unwrap();
        assert_eq!(response.num_input_docs, 10);

        let mut seen = seen.lock().clone();
        seen.sort();
        assert_eq!(seen, (1..=10).collect::<Vec<_>>());

        let mut sizes = batch_sizes.lock().clone();
        sizes.sort();
        assert_eq!(sizes, vec![2, 4, 4]);
    }

    #[test]
    fn test_source_error_fails_the_run() {
        let mut calls = 0;
        let (recorder, handle) = indexing_task();
        pipeline(1)
            .spawn(
                move || {
                    calls += 1;
                    if calls == 1 {
                        Ok(Some(vec![1]))
                    } else {
                        Err(SuggestError::store("page fetch failed"))
                    }
                },
                |batch: Vec<i32>| IndexResponse {
                    num_input_docs: batch.len(),
                    ..Default::default()
                },
                IndexingOptions::default(),
                recorder,
            )
            .unwrap();

        assert!(matches!(handle.wait(), Err(SuggestError::Store(_))));
    }

    #[test]
    fn test_invalid_options_are_rejected() {
        let (recorder, handle) = indexing_task();
        let result = pipeline(1).spawn(
            || Ok(None::<Vec<i32>>),
            |_batch: Vec<i32>| IndexResponse::default(),
            IndexingOptions::default().with_batch_size(0),
            recorder,
        );
        assert!(result.is_err());
        assert_eq!(handle.state(), IndexingState::Failed);
    }
}
