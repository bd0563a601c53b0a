//! Domain identifiers (strongly-typed IDs).
//!
//! ULID-backed so ids in log output sort by creation time. The phantom
//! marker keeps differently-purposed id families from mixing at compile
//! time, with a single generic implementation behind them.
//!
//! Note that a [`SubmissionId`] is attached for log correlation only: the
//! queue identifies an item by its slot, and the id never participates in
//! scheduling decisions.

use std::fmt;
use std::marker::PhantomData;

use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Marker trait for an id family.
///
/// Provides the prefix used by `Display` (e.g. "sub-").
pub trait IdMarker: Send + Sync + 'static {
    fn prefix() -> &'static str;
}

/// Generic id type.
///
/// `T` is a zero-sized marker; two ids with different markers are different
/// types and cannot be confused.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Id<T: IdMarker> {
    ulid: Ulid,
    #[serde(skip)]
    _marker: PhantomData<T>,
}

impl<T: IdMarker> Id<T> {
    /// Generate a fresh id from the current time.
    pub fn generate() -> Self {
        Self::from_ulid(Ulid::new())
    }

    pub fn from_ulid(ulid: Ulid) -> Self {
        Self {
            ulid,
            _marker: PhantomData,
        }
    }

    pub fn as_ulid(&self) -> Ulid {
        self.ulid
    }
}

impl<T: IdMarker> From<Ulid> for Id<T> {
    fn from(ulid: Ulid) -> Self {
        Self::from_ulid(ulid)
    }
}

impl<T: IdMarker> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", T::prefix(), self.ulid)
    }
}

/// Marker for submissions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Submission {}

impl IdMarker for Submission {
    fn prefix() -> &'static str {
        "sub-"
    }
}

/// Identifier of one submitted operation.
pub type SubmissionId = Id<Submission>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_unique() {
        let a = SubmissionId::generate();
        let b = SubmissionId::generate();
        assert_ne!(a, b);
    }

    #[test]
    fn ids_sort_by_creation_time() {
        let a = SubmissionId::generate();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let b = SubmissionId::generate();
        assert!(a < b);
    }

    #[test]
    fn display_uses_prefix() {
        let id = SubmissionId::generate();
        assert!(id.to_string().starts_with("sub-"));
    }

    #[test]
    fn serde_roundtrip() {
        let id = SubmissionId::generate();
        let serialized = serde_json::to_string(&id).unwrap();
        let back: SubmissionId = serde_json::from_str(&serialized).unwrap();
        assert_eq!(id, back);
    }

    #[test]
    fn marker_does_not_consume_memory() {
        use std::mem::size_of;
        assert_eq!(size_of::<SubmissionId>(), size_of::<Ulid>());
    }
}
