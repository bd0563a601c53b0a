//! Status views over a queue's internal state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A point-in-time snapshot of one queue instance.
///
/// `oldest_pending` and `head_error` describe the current head; when
/// head-of-line blocking is suspected, these are the fields to look at.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueueStats {
    /// Items waiting in the queue (excludes the one currently executing).
    pub pending: usize,

    /// Whether a drain loop is active.
    pub draining: bool,

    /// Whether an item is currently executing.
    pub executing: bool,

    /// Items resolved with a success value since the queue was created.
    pub resolved: u64,

    /// Items abandoned under a configured attempt cap.
    pub abandoned: u64,

    /// Total attempts across all items, including retries.
    pub attempts: u64,

    /// Submission timestamp of the current head.
    pub oldest_pending: Option<DateTime<Utc>>,

    /// Last rendered error of the current head, if it has failed before.
    pub head_error: Option<String>,
}
