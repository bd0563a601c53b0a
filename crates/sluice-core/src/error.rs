use thiserror::Error;

/// Errors surfaced through a [`crate::queue::Submission`] handle.
///
/// Failures of the submitted operation itself are never surfaced here: the
/// queue treats them as transient, logs them, and retries. These variants
/// cover the only two ways a handle can settle without a success value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SluiceError {
    #[error("queue dropped before the operation resolved")]
    QueueClosed,

    #[error("operation abandoned after {attempts} attempts")]
    Abandoned { attempts: u32 },
}
