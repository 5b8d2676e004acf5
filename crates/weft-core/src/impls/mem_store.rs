//! In-memory event store.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::domain::{Aggregate, Event, StoreError};
use crate::ports::EventStore;

/// In-memory event log.
///
/// Design:
/// - One lock over all streams: appends are totally ordered, which trivially
///   gives the per-aggregate order the port requires.
/// - `append_if_absent` runs under the write lock, so it is atomic here.
#[derive(Default)]
pub struct InMemoryEventStore {
    streams: RwLock<HashMap<Aggregate, Vec<Event>>>,
}

impl InMemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// All events of all aggregates (debug/test only).
    ///
    /// Order is preserved within an aggregate, not across aggregates.
    pub async fn snapshot(&self) -> Vec<Event> {
        let streams = self.streams.read().await;
        streams.values().flatten().cloned().collect()
    }

    /// Number of aggregates with at least one event.
    pub async fn aggregate_count(&self) -> usize {
        self.streams.read().await.len()
    }
}

#[async_trait]
impl EventStore for InMemoryEventStore {
    async fn append(&self, event: Event) -> Result<(), StoreError> {
        event.aggregate.validate()?;
        debug!(aggregate = %event.aggregate, event_type = %event.event_type, "append");
        let mut streams = self.streams.write().await;
        streams
            .entry(event.aggregate.clone())
            .or_default()
            .push(event);
        Ok(())
    }

    async fn get(&self, aggregate: &Aggregate) -> Result<Vec<Event>, StoreError> {
        let streams = self.streams.read().await;
        Ok(streams.get(aggregate).cloned().unwrap_or_default())
    }

    async fn exists(&self, aggregate: &Aggregate) -> Result<bool, StoreError> {
        let streams = self.streams.read().await;
        Ok(streams.get(aggregate).is_some_and(|events| !events.is_empty()))
    }

    async fn append_if_absent(&self, event: Event) -> Result<bool, StoreError> {
        event.aggregate.validate()?;
        let mut streams = self.streams.write().await;
        let stream = streams.entry(event.aggregate.clone()).or_default();
        if !stream.is_empty() {
            return Ok(false);
        }
        debug!(aggregate = %event.aggregate, event_type = %event.event_type, "append (first)");
        stream.push(event);
        Ok(true)
    }
}
