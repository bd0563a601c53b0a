//! Per-item state machine for the queue.

use serde::{Deserialize, Serialize};

/// State of one submitted item.
///
/// State transitions:
/// - Queued -> Executing -> Resolved
/// - Queued -> Executing -> Queued (failed attempt, reinserted at the head)
/// - Queued -> Executing -> Abandoned (only when an attempt cap is configured)
///
/// `Executing` is exclusive across a whole queue instance: never more than
/// one item is in this state at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemState {
    /// Waiting in the queue (initial submission or after a failed attempt).
    Queued,

    /// Currently being executed by the drain loop.
    Executing,

    /// Resolved with a success value; the caller's handle is settled.
    Resolved,

    /// Gave up after a configured attempt cap. Unreachable with the default
    /// configuration, which retries indefinitely.
    Abandoned,
}

impl ItemState {
    /// Is this a terminal state (no further transitions)?
    pub fn is_terminal(self) -> bool {
        matches!(self, ItemState::Resolved | ItemState::Abandoned)
    }

    /// Is this item eligible for the next attempt?
    pub fn is_runnable(self) -> bool {
        matches!(self, ItemState::Queued)
    }
}
