//! Generated identifiers (strongly-typed, ULID based).
//!
//! Workflows, invocations and events that are not given an explicit id get a
//! ULID wrapped in `Id<T>`. The marker type `T` only exists at compile time and
//! selects the textual prefix (`wf-`, `wfi-`, `ev-`).
//!
//! Note that a workflow id is not always one of these: callers may force an id
//! and dynamic workflows use a content hash. Aggregates therefore store ids as
//! plain strings and `Id<T>` is only the generator's output type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;
use ulid::Ulid;

/// Marker trait for each id kind.
pub trait IdMarker: Send + Sync + 'static {
    /// Prefix used by `Display` (e.g. "wf-").
    fn prefix() -> &'static str;
}

/// Generic ULID-backed id.
///
/// ```ignore
/// let wf: WorkflowId = Id::from(Ulid::new());
/// let wfi: InvocationId = Id::from(Ulid::new());
/// // wf and wfi are different types and cannot be mixed up
/// ```
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Id<T: IdMarker> {
    ulid: Ulid,
    #[serde(skip)]
    _marker: PhantomData<T>,
}

impl<T: IdMarker> Id<T> {
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

// ========================================
// Markers
// ========================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Workflow {}

impl IdMarker for Workflow {
    fn prefix() -> &'static str {
        "wf-"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Invocation {}

impl IdMarker for Invocation {
    fn prefix() -> &'static str {
        "wfi-"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Event {}

impl IdMarker for Event {
    fn prefix() -> &'static str {
        "ev-"
    }
}

/// Identifier of a workflow definition.
pub type WorkflowId = Id<Workflow>;

/// Identifier of one execution of a workflow.
pub type InvocationId = Id<Invocation>;

/// Identifier of a single appended event.
pub type EventId = Id<Event>;

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const ULID: &str = "01HZX3J8Q4T6V9W2Y5A7C0E3G6";

    fn ulid() -> Ulid {
        Ulid::from_string(ULID).unwrap()
    }

    #[rstest]
    #[case::workflow(WorkflowId::from(ulid()).to_string(), "wf-")]
    #[case::invocation(InvocationId::from(ulid()).to_string(), "wfi-")]
    #[case::event(EventId::from(ulid()).to_string(), "ev-")]
    fn display_is_prefix_then_ulid(#[case] rendered: String, #[case] prefix: &str) {
        assert_eq!(rendered, format!("{prefix}{ULID}"));
    }

    #[test]
    fn ids_order_by_timestamp() {
        let earlier = InvocationId::from(Ulid::from_parts(1_000, u128::MAX >> 48));
        let later = InvocationId::from(Ulid::from_parts(1_001, 0));

        assert!(earlier < later);
        assert_eq!(later.as_ulid().timestamp_ms(), 1_001);
    }

    #[test]
    fn marker_is_zero_sized() {
        assert_eq!(std::mem::size_of::<WorkflowId>(), std::mem::size_of::<Ulid>());
    }
}
