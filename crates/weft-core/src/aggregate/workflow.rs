//! Workflow aggregate.
//!
//! | state     | event            | next      |
//! |-----------|------------------|-----------|
//! | Uncreated | WORKFLOW_CREATED | Unknown   |
//! | Unknown   | WORKFLOW_PARSED  | Ready     |
//! | Ready     | WORKFLOW_PARSED  | Ready     |
//! | any       | WORKFLOW_DELETED | Deleted   |
//! | any       | unknown type     | unchanged |
//!
//! A second WORKFLOW_CREATED (two creators raced on the same id) is ignored:
//! the first creation wins, which keeps replay idempotent under duplicates.

use tracing::{debug, warn};

use super::{decode, ensure_same_identity, Aggregator};
use crate::domain::{
    Aggregate, AggregateError, Event, ObjectMetadata, Workflow, WorkflowEvent, WorkflowSpec,
    WorkflowState, WorkflowStatus,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowAggregate {
    aggregate: Aggregate,
    workflow: Workflow,
}

impl WorkflowAggregate {
    pub fn state(&self) -> WorkflowState {
        self.workflow.status.status
    }

    pub fn workflow(&self) -> &Workflow {
        &self.workflow
    }

    fn invalid_transition(&self, event: &Event) -> AggregateError {
        AggregateError::InvalidTransition {
            event_type: event.event_type.clone(),
            aggregate: self.aggregate.clone(),
            state: self.state().to_string(),
        }
    }
}

impl Aggregator for WorkflowAggregate {
    fn empty(aggregate: Aggregate) -> Self {
        Self {
            aggregate,
            workflow: Workflow::default(),
        }
    }

    fn aggregate(&self) -> &Aggregate {
        &self.aggregate
    }

    fn apply_event(&mut self, event: &Event) -> Result<(), AggregateError> {
        let Some(kind) = WorkflowEvent::parse(&event.event_type) else {
            warn!(
                aggregate = %self.aggregate,
                event_type = %event.event_type,
                event_id = %event.id,
                "skipping unimplemented event"
            );
            return Ok(());
        };

        match kind {
            WorkflowEvent::Created => {
                let spec: WorkflowSpec = decode(event)?;
                if self.state() != WorkflowState::Uncreated {
                    debug!(aggregate = %self.aggregate, event_id = %event.id, "ignoring duplicate creation");
                    return Ok(());
                }
                self.workflow = Workflow {
                    metadata: ObjectMetadata::new(self.aggregate.id.clone(), event.timestamp),
                    spec,
                    status: WorkflowStatus {
                        status: WorkflowState::Unknown,
                        updated_at: Some(event.timestamp),
                        resolved_tasks: Default::default(),
                    },
                };
            }
            WorkflowEvent::Parsed => {
                let status: WorkflowStatus = decode(event)?;
                match self.state() {
                    WorkflowState::Uncreated => return Err(self.invalid_transition(event)),
                    WorkflowState::Deleted => {
                        debug!(aggregate = %self.aggregate, "ignoring parse of deleted workflow");
                    }
                    WorkflowState::Unknown | WorkflowState::Ready => {
                        self.workflow.status.status = WorkflowState::Ready;
                        self.workflow.status.updated_at = Some(event.timestamp);
                        self.workflow.status.resolved_tasks = status.resolved_tasks;
                    }
                }
            }
            WorkflowEvent::Deleted => {
                self.workflow.status.status = WorkflowState::Deleted;
                self.workflow.status.updated_at = Some(event.timestamp);
            }
        }
        Ok(())
    }

    fn update_state(&mut self, new_state: Self) -> Result<(), AggregateError> {
        ensure_same_identity(&self.aggregate, &new_state.aggregate)?;
        let Workflow {
            metadata,
            spec,
            status,
        } = new_state.workflow;
        self.workflow.metadata = metadata;
        self.workflow.spec = spec;
        self.workflow.status = status;
        Ok(())
    }
}
