//! Aggregates: entities whose state is the ordered fold of their events.
//!
//! Design intent:
//! - Each concrete aggregate implements `Aggregator` directly; there is no
//!   shared base object holding a back-reference to it.
//! - `replay` is a pure fold. It reads the log and never writes to it, so any
//!   number of readers may replay concurrently.
//! - A failing event aborts the replay; partial state is never returned.

pub mod invocation;
pub mod workflow;

pub use self::invocation::InvocationAggregate;
pub use self::workflow::WorkflowAggregate;

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::domain::{Aggregate, AggregateError, Event};
use crate::ports::EventStore;

/// Capability set of an event-sourced entity.
pub trait Aggregator: Sized {
    /// The zero value of the entity, before any event.
    fn empty(aggregate: Aggregate) -> Self;

    fn aggregate(&self) -> &Aggregate;

    /// Applies one event. Unknown event types are skipped; a payload that
    /// cannot be decoded is an error.
    fn apply_event(&mut self, event: &Event) -> Result<(), AggregateError>;

    /// Replaces this entity's state with `new_state` in place.
    ///
    /// For callers holding a reference to an entity that was rebuilt
    /// elsewhere. Fails if the two do not share the same identity.
    fn update_state(&mut self, new_state: Self) -> Result<(), AggregateError>;
}

/// Folds `events` onto the zero value of `A`.
pub fn fold<A: Aggregator>(aggregate: Aggregate, events: &[Event]) -> Result<A, AggregateError> {
    let mut entity = A::empty(aggregate);
    for event in events {
        if event.aggregate != *entity.aggregate() {
            return Err(AggregateError::AggregateMismatch {
                expected: entity.aggregate().clone(),
                actual: event.aggregate.clone(),
            });
        }
        entity.apply_event(event)?;
    }
    Ok(entity)
}

/// Loads an aggregate by replaying its history from the log.
pub async fn replay<A: Aggregator>(
    store: &dyn EventStore,
    aggregate: Aggregate,
) -> Result<A, AggregateError> {
    let events = store.get(&aggregate).await?;
    debug!(aggregate = %aggregate, events = events.len(), "replay");
    fold(aggregate, &events)
}

/// Decodes the payload of a recognized event.
pub(crate) fn decode<T: DeserializeOwned>(event: &Event) -> Result<T, AggregateError> {
    serde_json::from_slice(&event.data).map_err(|source| AggregateError::Decode {
        event_type: event.event_type.clone(),
        aggregate: event.aggregate.clone(),
        source,
    })
}

/// Rejects a state transplant between different entities.
pub(crate) fn ensure_same_identity(
    current: &Aggregate,
    new_state: &Aggregate,
) -> Result<(), AggregateError> {
    if current != new_state {
        return Err(AggregateError::AggregateMismatch {
            expected: current.clone(),
            actual: new_state.clone(),
        });
    }
    Ok(())
}
