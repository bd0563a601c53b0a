//! The serialized retry queue.

use std::collections::VecDeque;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use tokio::sync::{Mutex, oneshot};
use tracing::{debug, warn};

use super::entry::{AttemptFuture, OperationFn, Submission, SubmissionRecord, TypedOperation};
use super::policy::{BackoffPolicy, PacingPolicy};
use crate::domain::SubmissionId;
use crate::error::SluiceError;
use crate::observability::QueueStats;

/// Queue configuration.
#[derive(Debug, Clone, Default)]
pub struct QueueConfig {
    pub backoff: BackoffPolicy,
    pub pacing: PacingPolicy,

    /// Attempt cap. `None` (the default) retries a failing operation
    /// indefinitely, so a permanently failing head blocks everything queued
    /// behind it. `Some(n)` abandons an item after its nth failed attempt
    /// and settles its handle with [`SluiceError::Abandoned`].
    pub max_attempts: Option<u32>,
}

/// Internal queue state.
///
/// Mutated only at the defined points: append on submit, pop-head on
/// dequeue, push-head on retry. Everything goes through the one mutex.
struct QueueState {
    pending: VecDeque<SubmissionRecord>,
    draining: bool,
    executing: bool,
    resolved: u64,
    abandoned: u64,
    attempts: u64,
}

impl QueueState {
    fn new() -> Self {
        Self {
            pending: VecDeque::new(),
            draining: false,
            executing: false,
            resolved: 0,
            abandoned: 0,
            attempts: 0,
        }
    }

    fn stats(&self) -> QueueStats {
        QueueStats {
            pending: self.pending.len(),
            draining: self.draining,
            executing: self.executing,
            resolved: self.resolved,
            abandoned: self.abandoned,
            attempts: self.attempts,
            oldest_pending: self.pending.front().map(|record| record.submitted_at),
            head_error: self
                .pending
                .front()
                .and_then(|record| record.last_error.clone()),
        }
    }
}

/// Serializes heterogeneous asynchronous operations into one ordered
/// execution stream.
///
/// - At most one operation executes at a time per queue instance.
/// - FIFO among items that have not failed; a failed item is reinserted at
///   the head and retried before anything submitted after it.
/// - Every failure is followed by an exponential backoff, every success by
///   a randomized pacing delay, so the downstream dependency sees neither
///   concurrent nor bursty access.
///
/// Share one instance (behind `Arc`) per rate-limited downstream dependency
/// so all calls to that dependency funnel through the same stream. Separate
/// instances are independent serialization domains and may run concurrently
/// with each other.
pub struct SerializedRetryQueue {
    state: Arc<Mutex<QueueState>>,
    config: QueueConfig,
}

impl SerializedRetryQueue {
    pub fn new(config: QueueConfig) -> Self {
        Self {
            state: Arc::new(Mutex::new(QueueState::new())),
            config,
        }
    }

    /// Append `operation` at the tail and start the drain task if none is
    /// active. The returned [`Submission`] settles at the operation's first
    /// success; see its docs for the terminal error cases.
    ///
    /// `operation` is re-invoked for every retry, so it is an `FnMut`
    /// producing a fresh future per attempt. Its error type only needs to
    /// render; the queue stores and logs the message, nothing more.
    pub async fn submit<T, F, Fut, E>(&self, mut operation: F) -> Submission<T>
    where
        T: Send + 'static,
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        E: fmt::Display,
    {
        let run: OperationFn<T> = Box::new(move || -> AttemptFuture<T> {
            let attempt = operation();
            Box::pin(async move { attempt.await.map_err(|error| error.to_string()) })
        });

        let id = SubmissionId::generate();
        let (reply_tx, reply_rx) = oneshot::channel();
        let record = SubmissionRecord::new(id, Box::new(TypedOperation::new(run, reply_tx)));

        let mut state = self.state.lock().await;
        state.pending.push_back(record);
        debug!(submission = %id, pending = state.pending.len(), "submission queued");
        if !state.draining {
            state.draining = true;
            tokio::spawn(drain_loop(Arc::clone(&self.state), self.config.clone()));
        }

        Submission::new(id, reply_rx)
    }

    /// Number of pending items (excludes the one currently executing).
    pub async fn len(&self) -> usize {
        self.state.lock().await.pending.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.lock().await.pending.is_empty()
    }

    /// Whether a drain loop is currently active.
    pub async fn is_draining(&self) -> bool {
        self.state.lock().await.draining
    }

    pub async fn stats(&self) -> QueueStats {
        self.state.lock().await.stats()
    }
}

impl Default for SerializedRetryQueue {
    fn default() -> Self {
        Self::new(QueueConfig::default())
    }
}

/// The drain loop. At most one instance runs per queue: `submit` spawns it
/// only when the `draining` flag is clear, and the loop clears the flag in
/// the same critical section in which it observes the deque empty, so a
/// racing submission either sees the flag set or the loop sees the new tail.
async fn drain_loop(state: Arc<Mutex<QueueState>>, config: QueueConfig) {
    loop {
        let mut record = {
            let mut state = state.lock().await;
            let Some(mut record) = state.pending.pop_front() else {
                state.draining = false;
                debug!("queue drained, loop parked");
                return;
            };
            record.start_attempt();
            state.executing = true;
            state.attempts += 1;
            record
        };

        // The attempt runs outside the lock: submissions keep landing in the
        // deque while the operation (or a delay below) is in flight.
        match record.op.attempt().await {
            Ok(()) => {
                record.mark_resolved();
                debug!(
                    submission = %record.id,
                    attempts = record.attempts,
                    state = ?record.state,
                    "submission resolved"
                );
                {
                    let mut state = state.lock().await;
                    state.executing = false;
                    state.resolved += 1;
                }
                tokio::time::sleep(config.pacing.delay()).await;
            }
            Err(error) => {
                let capped = config
                    .max_attempts
                    .is_some_and(|cap| record.attempts >= cap);
                if capped {
                    record.op.abandon(SluiceError::Abandoned {
                        attempts: record.attempts,
                    });
                    record.mark_abandoned(error.clone());
                    warn!(
                        submission = %record.id,
                        attempts = record.attempts,
                        state = ?record.state,
                        %error,
                        "attempt cap reached, submission abandoned"
                    );
                    let mut state = state.lock().await;
                    state.executing = false;
                    state.abandoned += 1;
                } else {
                    let id = record.id;
                    let attempts = record.attempts;
                    record.requeue(error.clone());
                    let delay = {
                        let mut state = state.lock().await;
                        state.executing = false;
                        state.pending.push_front(record);
                        config.backoff.delay(state.pending.len(), attempts)
                    };
                    warn!(
                        submission = %id,
                        attempts,
                        %error,
                        delay_ms = delay.as_millis() as u64,
                        "attempt failed, retrying from the head"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}
