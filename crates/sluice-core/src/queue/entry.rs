//! Submission plumbing: the pairing of a queued operation with its caller.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::oneshot;

use crate::domain::{ItemState, SubmissionId};
use crate::error::SluiceError;

/// One attempt of an operation, with the error already rendered.
pub(crate) type AttemptFuture<T> = Pin<Box<dyn Future<Output = Result<T, String>> + Send>>;

/// A re-invocable operation: called once per attempt, yielding a fresh future.
pub(crate) type OperationFn<T> = Box<dyn FnMut() -> AttemptFuture<T> + Send>;

/// A type-erased queued operation.
///
/// Design intent:
/// - The queue drives attempts and owns every scheduling decision.
/// - The operation owns its caller's result channel and settles it exactly
///   once: at first success, or via `abandon`.
#[async_trait]
pub(crate) trait QueuedOperation: Send {
    /// Run one attempt. On success the caller's handle is settled before
    /// this returns; on failure the rendered error comes back to the queue.
    async fn attempt(&mut self) -> Result<(), String>;

    /// Settle the caller's handle with a terminal error instead of retrying.
    fn abandon(&mut self, error: SluiceError);
}

pub(crate) struct TypedOperation<T> {
    run: OperationFn<T>,
    reply: Option<oneshot::Sender<Result<T, SluiceError>>>,
}

impl<T> TypedOperation<T> {
    pub(crate) fn new(
        run: OperationFn<T>,
        reply: oneshot::Sender<Result<T, SluiceError>>,
    ) -> Self {
        Self {
            run,
            reply: Some(reply),
        }
    }
}

#[async_trait]
impl<T: Send> QueuedOperation for TypedOperation<T> {
    async fn attempt(&mut self) -> Result<(), String> {
        let value = (self.run)().await?;
        // A caller that dropped its handle still counts as resolved.
        if let Some(reply) = self.reply.take() {
            let _ = reply.send(Ok(value));
        }
        Ok(())
    }

    fn abandon(&mut self, error: SluiceError) {
        if let Some(reply) = self.reply.take() {
            let _ = reply.send(Err(error));
        }
    }
}

/// Metadata + operation for one item in the queue.
///
/// Design:
/// - This is the single source of truth for per-item state.
/// - The deque holds these records directly: an item's scheduling identity
///   is its slot, and `id` exists for log correlation only.
pub(crate) struct SubmissionRecord {
    pub id: SubmissionId,
    pub op: Box<dyn QueuedOperation>,
    pub state: ItemState,

    /// Number of attempts so far (including the current one if Executing).
    pub attempts: u32,

    /// Last rendered error (if any).
    pub last_error: Option<String>,

    pub submitted_at: DateTime<Utc>,
}

impl SubmissionRecord {
    pub fn new(id: SubmissionId, op: Box<dyn QueuedOperation>) -> Self {
        Self {
            id,
            op,
            state: ItemState::Queued,
            attempts: 0,
            last_error: None,
            submitted_at: Utc::now(),
        }
    }

    /// Mark as executing (increments the attempt counter).
    pub fn start_attempt(&mut self) {
        self.state = ItemState::Executing;
        self.attempts += 1;
    }

    /// Back to the front of the queue after a failed attempt.
    pub fn requeue(&mut self, error: String) {
        self.state = ItemState::Queued;
        self.last_error = Some(error);
    }

    pub fn mark_resolved(&mut self) {
        self.state = ItemState::Resolved;
    }

    pub fn mark_abandoned(&mut self, error: String) {
        self.state = ItemState::Abandoned;
        self.last_error = Some(error);
    }
}

/// Caller-held handle for one submitted operation.
///
/// Settles with `Ok` at the operation's first success. With the default
/// configuration it never settles while the operation keeps failing (retries
/// do not expire); it yields [`SluiceError::QueueClosed`] if the queue is
/// dropped first, and [`SluiceError::Abandoned`] only under a configured
/// attempt cap.
pub struct Submission<T> {
    id: SubmissionId,
    reply: oneshot::Receiver<Result<T, SluiceError>>,
}

impl<T> Submission<T> {
    pub(crate) fn new(
        id: SubmissionId,
        reply: oneshot::Receiver<Result<T, SluiceError>>,
    ) -> Self {
        Self { id, reply }
    }

    pub fn id(&self) -> SubmissionId {
        self.id
    }
}

impl<T> Future for Submission<T> {
    type Output = Result<T, SluiceError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        match Pin::new(&mut this.reply).poll(cx) {
            Poll::Ready(Ok(result)) => Poll::Ready(result),
            Poll::Ready(Err(_)) => Poll::Ready(Err(SluiceError::QueueClosed)),
            Poll::Pending => Poll::Pending,
        }
    }
}
