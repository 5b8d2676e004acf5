//! EventStore port - the append-only event log.

use async_trait::async_trait;

use crate::domain::{Aggregate, Event, StoreError};

/// Append-only, per-aggregate ordered event log.
///
/// # Contract
/// - `append` fails with `StoreError::InvalidAggregate` when the event's
///   aggregate has no type or no id.
/// - `get` returns the events of one aggregate in append order, and an empty
///   vector (not an error) for an aggregate without history.
/// - Appends to the same aggregate are totally ordered; appends to different
///   aggregates may proceed concurrently.
/// - There is no update or delete. Deleting an entity is itself an event.
#[async_trait]
pub trait EventStore: Send + Sync {
    async fn append(&self, event: Event) -> Result<(), StoreError>;

    async fn get(&self, aggregate: &Aggregate) -> Result<Vec<Event>, StoreError>;

    async fn exists(&self, aggregate: &Aggregate) -> Result<bool, StoreError> {
        Ok(!self.get(aggregate).await?.is_empty())
    }

    /// Appends `event` only if its aggregate has no history yet.
    ///
    /// Returns whether the event was appended. This default is a plain
    /// check-then-append and is only advisory under concurrent callers;
    /// stores that can do better must override it with an atomic version.
    async fn append_if_absent(&self, event: Event) -> Result<bool, StoreError> {
        if self.exists(&event.aggregate).await? {
            return Ok(false);
        }
        self.append(event).await?;
        Ok(true)
    }
}
