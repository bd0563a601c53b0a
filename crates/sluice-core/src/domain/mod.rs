//! Domain model (ids, item state machine).

pub mod ids;
pub mod state;

pub use ids::SubmissionId;
pub use state::ItemState;
