//! Invocation aggregate.
//!
//! State transitions:
//! - Uncreated -> InProgress (INVOCATION_CREATED)
//! - InProgress -> InProgress (TASK_ADDED)
//! - InProgress -> Succeeded (INVOCATION_COMPLETED)
//! - InProgress -> Aborted (INVOCATION_CANCELED)
//!
//! Once Succeeded or Aborted, later TASK_ADDED / COMPLETED / CANCELED events
//! are skipped. Commands check state before appending without holding a lock,
//! so such events can land after the terminal one.

use tracing::{debug, warn};

use super::{decode, ensure_same_identity, Aggregator};
use crate::domain::{
    Aggregate, AggregateError, Event, Invocation, InvocationEvent, InvocationSpec,
    InvocationState, InvocationStatus, ObjectMetadata, Task, TypedValue,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationAggregate {
    aggregate: Aggregate,
    invocation: Invocation,
}

impl InvocationAggregate {
    pub fn state(&self) -> InvocationState {
        self.invocation.status.status
    }

    pub fn invocation(&self) -> &Invocation {
        &self.invocation
    }

    pub fn task(&self, task_id: &str) -> Option<&Task> {
        self.invocation.status.dynamic_tasks.get(task_id)
    }

    fn invalid_transition(&self, event: &Event) -> AggregateError {
        AggregateError::InvalidTransition {
            event_type: event.event_type.clone(),
            aggregate: self.aggregate.clone(),
            state: self.state().to_string(),
        }
    }
}

impl Aggregator for InvocationAggregate {
    fn empty(aggregate: Aggregate) -> Self {
        Self {
            aggregate,
            invocation: Invocation::default(),
        }
    }

    fn aggregate(&self) -> &Aggregate {
        &self.aggregate
    }

    fn apply_event(&mut self, event: &Event) -> Result<(), AggregateError> {
        let Some(kind) = InvocationEvent::parse(&event.event_type) else {
            warn!(
                aggregate = %self.aggregate,
                event_type = %event.event_type,
                event_id = %event.id,
                "skipping unimplemented event"
            );
            return Ok(());
        };

        match kind {
            InvocationEvent::Created => {
                let spec: InvocationSpec = decode(event)?;
                if self.state() != InvocationState::Uncreated {
                    return Err(self.invalid_transition(event));
                }
                self.invocation = Invocation {
                    metadata: ObjectMetadata::new(self.aggregate.id.clone(), event.timestamp),
                    spec,
                    status: InvocationStatus {
                        status: InvocationState::InProgress,
                        updated_at: Some(event.timestamp),
                        ..InvocationStatus::default()
                    },
                };
            }
            InvocationEvent::TaskAdded => {
                let task: Task = decode(event)?;
                if self.state().is_terminal() {
                    // raced with completion; the invocation is already settled
                    debug!(aggregate = %self.aggregate, task = %task.id(), "ignoring task added after finish");
                    return Ok(());
                }
                if self.state() != InvocationState::InProgress {
                    return Err(self.invalid_transition(event));
                }
                let tasks = &mut self.invocation.status.dynamic_tasks;
                if tasks.contains_key(task.id()) {
                    // concurrent identical expansions may both have appended
                    debug!(aggregate = %self.aggregate, task = %task.id(), "ignoring duplicate task");
                    return Ok(());
                }
                tasks.insert(task.id().to_string(), task);
                self.invocation.status.updated_at = Some(event.timestamp);
            }
            InvocationEvent::Completed => {
                let output: Option<TypedValue> = if event.data.is_empty() {
                    None
                } else {
                    decode(event)?
                };
                if self.state().is_terminal() {
                    debug!(aggregate = %self.aggregate, state = %self.state(), "ignoring completion of finished invocation");
                    return Ok(());
                }
                if self.state() != InvocationState::InProgress {
                    return Err(self.invalid_transition(event));
                }
                self.invocation.status.status = InvocationState::Succeeded;
                self.invocation.status.output = output;
                self.invocation.status.updated_at = Some(event.timestamp);
            }
            InvocationEvent::Canceled => {
                if self.state().is_terminal() {
                    debug!(aggregate = %self.aggregate, "ignoring cancel of finished invocation");
                    return Ok(());
                }
                if self.state() == InvocationState::Uncreated {
                    return Err(self.invalid_transition(event));
                }
                self.invocation.status.status = InvocationState::Aborted;
                self.invocation.status.updated_at = Some(event.timestamp);
            }
        }
        Ok(())
    }

    fn update_state(&mut self, new_state: Self) -> Result<(), AggregateError> {
        ensure_same_identity(&self.aggregate, &new_state.aggregate)?;
        let Invocation {
            metadata,
            spec,
            status,
        } = new_state.invocation;
        self.invocation.metadata = metadata;
        self.invocation.spec = spec;
        self.invocation.status = status;
        Ok(())
    }
}
