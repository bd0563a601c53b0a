//! sluice-core
//!
//! Core building blocks for the sluice request-serialization queue.
//!
//! # Module layout
//! - **domain**: domain model (ids, item state machine)
//! - **queue**: the serialized retry queue, its policies, and submission handles
//! - **observability**: status views
//! - **error**: error types
//!
//! One [`SerializedRetryQueue`] instance turns every operation submitted to
//! it into a single ordered execution stream with retry-at-head and
//! randomized pacing. The intended deployment is one shared instance per
//! rate-limited downstream dependency, so all calls to that dependency
//! funnel through a single serialization point.

pub mod domain;
pub mod error;
pub mod observability;
pub mod queue;

pub use error::SluiceError;
pub use observability::QueueStats;
pub use queue::{
    BackoffKey, BackoffPolicy, PacingPolicy, QueueConfig, SerializedRetryQueue, Submission,
};
