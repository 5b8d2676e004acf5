//! IdGenerator port - id generation.
//!
//! # Implementation
//! - **UlidGenerator**: ULID based, timestamp taken from a `Clock`

use crate::domain::ids::{EventId, InvocationId, WorkflowId};
use crate::ports::Clock;
use ulid::Ulid;

/// Generates ids for entities that were not given one.
///
/// ULIDs sort by creation time and can be generated on many nodes without
/// coordination.
pub trait IdGenerator: Send + Sync {
    fn generate_workflow_id(&self) -> WorkflowId;

    fn generate_invocation_id(&self) -> InvocationId;

    fn generate_event_id(&self) -> EventId;
}

/// ULID generator whose timestamp part comes from `C`.
pub struct UlidGenerator<C> {
    clock: C,
}

impl<C: Clock> UlidGenerator<C> {
    pub fn new(clock: C) -> Self {
        Self { clock }
    }

    fn next_ulid(&self) -> Ulid {
        let timestamp_ms = self.clock.now().timestamp_millis() as u64;
        Ulid::from_parts(timestamp_ms, rand::random())
    }
}

impl<C: Clock> IdGenerator for UlidGenerator<C> {
    fn generate_workflow_id(&self) -> WorkflowId {
        WorkflowId::from(self.next_ulid())
    }

    fn generate_invocation_id(&self) -> InvocationId {
        InvocationId::from(self.next_ulid())
    }

    fn generate_event_id(&self) -> EventId {
        EventId::from(self.next_ulid())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{FixedClock, SystemClock};
    use chrono::{TimeZone, Utc};

    #[test]
    fn ulid_generator_generates_unique_ids() {
        let id_gen = UlidGenerator::new(SystemClock);

        let id1 = id_gen.generate_workflow_id();
        let id2 = id_gen.generate_workflow_id();
        let id3 = id_gen.generate_workflow_id();

        assert_ne!(id1, id2);
        assert_ne!(id2, id3);
        assert_ne!(id1, id3);
    }

    #[test]
    fn ulid_generator_with_fixed_clock_shares_timestamp() {
        let fixed_time = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let id_gen = UlidGenerator::new(FixedClock::new(fixed_time));

        let id1 = id_gen.generate_event_id();
        let id2 = id_gen.generate_event_id();

        // random part differs, timestamp part does not
        assert_ne!(id1, id2);
        assert_eq!(id1.as_ulid().timestamp_ms(), id2.as_ulid().timestamp_ms());
        assert_eq!(
            id1.as_ulid().timestamp_ms(),
            fixed_time.timestamp_millis() as u64
        );
    }

    #[test]
    fn different_id_kinds_have_different_prefixes() {
        let id_gen = UlidGenerator::new(SystemClock);

        assert!(id_gen.generate_workflow_id().to_string().starts_with("wf-"));
        assert!(id_gen.generate_invocation_id().to_string().starts_with("wfi-"));
        assert!(id_gen.generate_event_id().to_string().starts_with("ev-"));
    }
}
