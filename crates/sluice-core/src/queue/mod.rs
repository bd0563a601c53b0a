//! Queue module: policies, submission plumbing, and the serialized queue.

mod entry;
mod policy;
mod serialized;

pub use entry::Submission;
pub use policy::{BackoffKey, BackoffPolicy, PacingPolicy};
pub use serialized::{QueueConfig, SerializedRetryQueue};
