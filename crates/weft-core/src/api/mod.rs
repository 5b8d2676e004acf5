//! API - command surface on top of the event log.
//!
//! # Components
//! - **WorkflowApi**: create / delete / parse workflows
//! - **InvocationApi**: invoke workflows and graft tasks into running invocations
//! - **DynamicApi**: turn runtime-produced specs into nested workflows

pub mod dynamic;
pub mod invocation;
pub mod workflow;

pub use self::dynamic::{content_id, DynamicApi};
pub use self::invocation::InvocationApi;
pub use self::workflow::WorkflowApi;

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::domain::{Aggregate, Event};
use crate::ports::{Clock, IdGenerator, SystemClock, UlidGenerator};

/// Stamps new events with an id and the current time.
#[derive(Clone)]
pub struct EventFactory {
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
}

impl EventFactory {
    pub fn new(clock: Arc<dyn Clock>, ids: Arc<dyn IdGenerator>) -> Self {
        Self { clock, ids }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn ids(&self) -> &dyn IdGenerator {
        self.ids.as_ref()
    }

    pub fn event(&self, event_type: &str, aggregate: Aggregate, data: Vec<u8>) -> Event {
        Event::new(
            self.ids.generate_event_id().to_string(),
            event_type,
            aggregate,
            self.clock.now(),
            data,
        )
    }
}

impl Default for EventFactory {
    fn default() -> Self {
        Self::new(
            Arc::new(SystemClock),
            Arc::new(UlidGenerator::new(SystemClock)),
        )
    }
}
