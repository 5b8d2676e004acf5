//! Events and aggregate identities.
//!
//! Design:
//! - An `Event` is immutable once appended to the log.
//! - The `event_type` is stored as a string so that logs written by newer
//!   versions can still be replayed; each aggregate maps it onto a closed enum
//!   (`WorkflowEvent`, `InvocationEvent`) and skips anything it does not know.
//! - The payload is opaque bytes (serde_json encoding of a spec or status).

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::errors::StoreError;

/// Aggregate type tag for workflows.
pub const TYPE_WORKFLOW: &str = "workflow";

/// Aggregate type tag for workflow invocations.
pub const TYPE_INVOCATION: &str = "invocation";

/// Identity of an aggregate: `(type, id)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Aggregate {
    #[serde(rename = "type")]
    pub aggregate_type: String,
    pub id: String,
}

impl Aggregate {
    pub fn new(aggregate_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            aggregate_type: aggregate_type.into(),
            id: id.into(),
        }
    }

    pub fn workflow(id: impl Into<String>) -> Self {
        Self::new(TYPE_WORKFLOW, id)
    }

    pub fn invocation(id: impl Into<String>) -> Self {
        Self::new(TYPE_INVOCATION, id)
    }

    /// Both fields must be non-empty for the aggregate to be stored.
    pub fn validate(&self) -> Result<(), StoreError> {
        if self.id.is_empty() {
            return Err(StoreError::InvalidAggregate("aggregate does not contain id"));
        }
        if self.aggregate_type.is_empty() {
            return Err(StoreError::InvalidAggregate("aggregate does not contain type"));
        }
        Ok(())
    }
}

impl fmt::Display for Aggregate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.aggregate_type, self.id)
    }
}

/// Hints attached to an event for consumers of the log.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventHints {
    /// The aggregate reached a terminal state with this event.
    pub completed: bool,
}

impl EventHints {
    pub fn completed() -> Self {
        Self { completed: true }
    }
}

/// A single entry of the event log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub event_type: String,
    pub aggregate: Aggregate,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub data: Vec<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hints: Option<EventHints>,
}

impl Event {
    pub fn new(
        id: impl Into<String>,
        event_type: impl Into<String>,
        aggregate: Aggregate,
        timestamp: DateTime<Utc>,
        data: Vec<u8>,
    ) -> Self {
        Self {
            id: id.into(),
            event_type: event_type.into(),
            aggregate,
            timestamp,
            data,
            parent: None,
            hints: None,
        }
    }

    pub fn with_hints(mut self, hints: EventHints) -> Self {
        self.hints = Some(hints);
        self
    }

    /// Does this event mark its aggregate as finished?
    pub fn is_completing(&self) -> bool {
        self.hints.as_ref().is_some_and(|h| h.completed)
    }
}

/// Event kinds understood by the workflow aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkflowEvent {
    Created,
    Parsed,
    Deleted,
}

impl WorkflowEvent {
    pub fn as_str(self) -> &'static str {
        match self {
            WorkflowEvent::Created => "WORKFLOW_CREATED",
            WorkflowEvent::Parsed => "WORKFLOW_PARSED",
            WorkflowEvent::Deleted => "WORKFLOW_DELETED",
        }
    }

    /// Returns `None` for event types this version does not know about.
    pub fn parse(event_type: &str) -> Option<Self> {
        match event_type {
            "WORKFLOW_CREATED" => Some(WorkflowEvent::Created),
            "WORKFLOW_PARSED" => Some(WorkflowEvent::Parsed),
            "WORKFLOW_DELETED" => Some(WorkflowEvent::Deleted),
            _ => None,
        }
    }
}

/// Event kinds understood by the invocation aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InvocationEvent {
    Created,
    TaskAdded,
    Completed,
    Canceled,
}

impl InvocationEvent {
    pub fn as_str(self) -> &'static str {
        match self {
            InvocationEvent::Created => "INVOCATION_CREATED",
            InvocationEvent::TaskAdded => "TASK_ADDED",
            InvocationEvent::Completed => "INVOCATION_COMPLETED",
            InvocationEvent::Canceled => "INVOCATION_CANCELED",
        }
    }

    pub fn parse(event_type: &str) -> Option<Self> {
        match event_type {
            "INVOCATION_CREATED" => Some(InvocationEvent::Created),
            "TASK_ADDED" => Some(InvocationEvent::TaskAdded),
            "INVOCATION_COMPLETED" => Some(InvocationEvent::Completed),
            "INVOCATION_CANCELED" => Some(InvocationEvent::Canceled),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::missing_id(Aggregate::workflow(""))]
    #[case::missing_type(Aggregate::new("", "wf-1"))]
    fn malformed_aggregates_are_rejected(#[case] aggregate: Aggregate) {
        assert!(matches!(
            aggregate.validate(),
            Err(StoreError::InvalidAggregate(_))
        ));
    }

    #[test]
    fn aggregate_displays_as_type_and_id() {
        assert_eq!(Aggregate::invocation("wfi-1").to_string(), "invocation/wfi-1");
    }

    #[rstest]
    #[case(WorkflowEvent::Created)]
    #[case(WorkflowEvent::Parsed)]
    #[case(WorkflowEvent::Deleted)]
    fn workflow_event_names_are_stable(#[case] kind: WorkflowEvent) {
        assert_eq!(WorkflowEvent::parse(kind.as_str()), Some(kind));
    }

    #[test]
    fn unknown_event_types_parse_to_none() {
        assert_eq!(WorkflowEvent::parse("WORKFLOW_ARCHIVED"), None);
        assert_eq!(InvocationEvent::parse("WORKFLOW_CREATED"), None);
    }

    #[test]
    fn completed_hint_is_detected() {
        let event = Event::new(
            "ev-1",
            WorkflowEvent::Deleted.as_str(),
            Aggregate::workflow("wf-1"),
            Utc::now(),
            Vec::new(),
        );
        assert!(!event.is_completing());
        assert!(event.with_hints(EventHints::completed()).is_completing());
    }
}
