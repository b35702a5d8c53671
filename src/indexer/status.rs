//! Progress and outcome of indexing runs.
//!
//! Every indexing entry point produces an [`IndexResponse`]. Long-running
//! runs (query logs, document streams) hand out an [`IndexingHandle`] right
//! away: it can be polled through [`IndexingHandle::status`] /
//! [`IndexingHandle::is_done`], blocked on with [`IndexingHandle::wait`], or
//! awaited as a future.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::{Duration, Instant};

use futures::channel::oneshot;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SuggestError};

/// One input that could not be turned into suggestions or written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexingError {
    /// Error category, see [`SuggestError::kind`].
    pub kind: String,
    /// The offending input, rendered for diagnostics.
    pub input: String,
    pub message: String,
}

impl IndexingError {
    pub fn new<S: Into<String>>(error: &SuggestError, input: S) -> Self {
        IndexingError {
            kind: error.kind().to_string(),
            input: input.into(),
            message: error.to_string(),
        }
    }
}

/// Counts and errors of a finished indexing run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexResponse {
    /// Inputs consumed (items, query strings, query logs or documents).
    pub num_input_docs: usize,
    /// Suggestion items written to the store.
    pub num_suggest_docs: usize,
    pub errors: Vec<IndexingError>,
    pub took: Duration,
}

impl IndexResponse {
    pub fn has_error(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Add the counts and errors of `other`. `took` is left to the caller.
    pub fn absorb(&mut self, other: IndexResponse) {
        self.num_input_docs += other.num_input_docs;
        self.num_suggest_docs += other.num_suggest_docs;
        self.errors.extend(other.errors);
    }
}

/// Lifecycle of an indexing run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IndexingState {
    Running,
    Completed,
    /// The run stopped early, e.g. because its input source failed.
    Failed,
}

/// Point-in-time view of an indexing run.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexingStatus {
    pub state: IndexingState,
    pub num_input_docs: usize,
    pub num_suggest_docs: usize,
    pub num_errors: usize,
    pub elapsed: Duration,
    /// Reason of a failed run.
    pub failure: Option<String>,
}

impl IndexingStatus {
    pub fn is_done(&self) -> bool {
        self.state != IndexingState::Running
    }
}

type SuccessCallback = Box<dyn FnOnce(&IndexResponse) + Send>;
type FailureCallback = Box<dyn FnOnce(&SuggestError) + Send>;

#[derive(Debug)]
struct Progress {
    state: IndexingState,
    response: IndexResponse,
    failure: Option<String>,
    finished_at: Option<Instant>,
}

#[derive(Debug)]
struct Shared {
    progress: Mutex<Progress>,
    started_at: Instant,
}

/// Write side of a run, owned by the pipeline.
pub(crate) struct ProgressRecorder {
    shared: Arc<Shared>,
    sender: Option<oneshot::Sender<Result<IndexResponse>>>,
    on_success: Option<SuccessCallback>,
    on_failure: Option<FailureCallback>,
}

impl std::fmt::Debug for ProgressRecorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressRecorder")
            .field("shared", &self.shared)
            .field("has_callbacks", &self.on_success.is_some())
            .finish()
    }
}

/// Create the two halves of a new run.
pub(crate) fn indexing_task() -> (ProgressRecorder, IndexingHandle) {
    let shared = Arc::new(Shared {
        progress: Mutex::new(Progress {
            state: IndexingState::Running,
            response: IndexResponse::default(),
            failure: None,
            finished_at: None,
        }),
        started_at: Instant::now(),
    });
    let (sender, receiver) = oneshot::channel();
    (
        ProgressRecorder {
            shared: Arc::clone(&shared),
            sender: Some(sender),
            on_success: None,
            on_failure: None,
        },
        IndexingHandle { shared, receiver },
    )
}

impl ProgressRecorder {
    pub(crate) fn with_callbacks(
        mut self,
        on_success: SuccessCallback,
        on_failure: FailureCallback,
    ) -> Self {
        self.on_success = Some(on_success);
        self.on_failure = Some(on_failure);
        self
    }

    /// Shareable sink for workers.
    pub(crate) fn sink(&self) -> ProgressSink {
        ProgressSink {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Freeze the run as completed and notify the waiters.
    pub(crate) fn complete(mut self) {
        let response = {
            let mut progress = self.shared.progress.lock();
            progress.state = IndexingState::Completed;
            progress.response.took = self.shared.started_at.elapsed();
            progress.finished_at = Some(Instant::now());
            progress.response.clone()
        };
        if let Some(callback) = self.on_success.take() {
            callback(&response);
        }
        if let Some(sender) = self.sender.take() {
            // The handle may have been dropped.
            let _ = sender.send(Ok(response));
        }
    }

    /// Freeze the run as failed and notify the waiters.
    pub(crate) fn fail(mut self, error: SuggestError) {
        {
            let mut progress = self.shared.progress.lock();
            progress.state = IndexingState::Failed;
            progress.response.took = self.shared.started_at.elapsed();
            progress.failure = Some(error.to_string());
            progress.finished_at = Some(Instant::now());
        }
        if let Some(callback) = self.on_failure.take() {
            callback(&error);
        }
        if let Some(sender) = self.sender.take() {
            let _ = sender.send(Err(error));
        }
    }
}

impl Drop for ProgressRecorder {
    fn drop(&mut self) {
        if self.sender.is_some() {
            let mut progress = self.shared.progress.lock();
            progress.state = IndexingState::Failed;
            progress.failure = Some("indexing run terminated unexpectedly".to_string());
            progress.finished_at = Some(Instant::now());
        }
    }
}

/// Cloneable progress writer handed to the workers.
#[derive(Debug, Clone)]
pub(crate) struct ProgressSink {
    shared: Arc<Shared>,
}

impl ProgressSink {
    pub(crate) fn record(&self, batch: IndexResponse) {
        self.shared.progress.lock().response.absorb(batch);
    }
}

/// Read side of a run.
///
/// Implements [`Future`], resolving to the final [`IndexResponse`] or to the
/// error that stopped the run. Dropping the handle does not stop the run.
#[derive(Debug)]
pub struct IndexingHandle {
    shared: Arc<Shared>,
    receiver: oneshot::Receiver<Result<IndexResponse>>,
}

impl IndexingHandle {
    /// Snapshot of the current progress.
    pub fn status(&self) -> IndexingStatus {
        let progress = self.shared.progress.lock();
        let elapsed = progress
            .finished_at
            .map(|at| at.duration_since(self.shared.started_at))
            .unwrap_or_else(|| self.shared.started_at.elapsed());
        IndexingStatus {
            state: progress.state,
            num_input_docs: progress.response.num_input_docs,
            num_suggest_docs: progress.response.num_suggest_docs,
            num_errors: progress.response.errors.len(),
            elapsed,
            failure: progress.failure.clone(),
        }
    }

    pub fn state(&self) -> IndexingState {
        self.shared.progress.lock().state
    }

    pub fn is_done(&self) -> bool {
        self.state() != IndexingState::Running
    }

    /// Block the calling thread until the run finishes.
    pub fn wait(self) -> Result<IndexResponse> {
        futures::executor::block_on(self)
    }
}

impl Future for IndexingHandle {
    type Output = Result<IndexResponse>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.receiver).poll(cx) {
            Poll::Ready(Ok(outcome)) => Poll::Ready(outcome),
            Poll::Ready(Err(oneshot::Canceled)) => Poll::Ready(Err(SuggestError::indexing(
                "Indexing run terminated without reporting a result",
            ))),
            Poll::Pending => Poll::Pending,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[test]
    fn test_complete_freezes_progress() {
        let (recorder, handle) = indexing_task();
        assert_eq!(handle.state(), IndexingState::Running);

        let sink = recorder.sink();
        sink.record(IndexResponse {
            num_input_docs: 2,
            num_suggest_docs: 3,
            ..Default::default()
        });
        sink.record(IndexResponse {
            num_input_docs: 1,
            errors: vec![IndexingError::new(&SuggestError::invalid_input("bad"), "x")],
            ..Default::default()
        });
        assert_eq!(handle.status().num_input_docs, 3);
        assert!(!handle.is_done());

        recorder.complete();
        let status = handle.status();
        assert!(status.is_done());
        assert_eq!(status.state, IndexingState::Completed);

        let response = handle.wait().unwrap();
        assert_eq!(response.num_input_docs, 3);
        assert_eq!(response.num_suggest_docs, 3);
        assert!(response.has_error());
        assert_eq!(response.errors[0].kind, "invalid_input");
    }

    #[test]
    fn test_fail_reaches_callback_and_future() {
        let called = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&called);
        let (recorder, handle) = indexing_task();
        let recorder = recorder.with_callbacks(
            Box::new(|_: &IndexResponse| panic!("success callback must not run")),
            Box::new(move |error: &SuggestError| {
                assert!(matches!(error, SuggestError::Store(_)));
                flag.store(true, Ordering::SeqCst);
            }),
        );

        recorder.fail(SuggestError::store("source unavailable"));
        assert!(called.load(Ordering::SeqCst));
        assert_eq!(handle.state(), IndexingState::Failed);
        assert!(handle.status().failure.is_some());
        assert!(futures::executor::block_on(handle).is_err());
    }

    #[test]
    fn test_dropped_recorder_resolves_with_error() {
        let (recorder, handle) = indexing_task();
        drop(recorder);
        assert_eq!(handle.state(), IndexingState::Failed);
        assert!(matches!(handle.wait(), Err(SuggestError::Indexing(_))));
    }
}
