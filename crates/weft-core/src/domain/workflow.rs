//! Workflow and task records as projected from the event log.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::fnref::FnRef;
use super::spec::{TaskSpec, WorkflowSpec};
use super::state::{TaskState, WorkflowState};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectMetadata {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl ObjectMetadata {
    pub fn new(id: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            created_at: Some(created_at),
        }
    }
}

/// A workflow: its definition plus resolution status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workflow {
    pub metadata: ObjectMetadata,
    pub spec: WorkflowSpec,
    pub status: WorkflowStatus,
}

impl Workflow {
    pub fn id(&self) -> &str {
        &self.metadata.id
    }
}

/// Resolution status of a workflow. Also the payload of WORKFLOW_PARSED.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowStatus {
    pub status: WorkflowState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,

    /// task name -> resolved function and task state.
    #[serde(default)]
    pub resolved_tasks: BTreeMap<String, TaskStatus>,
}

impl WorkflowStatus {
    pub fn add_task_status(&mut self, task: impl Into<String>, status: TaskStatus) {
        self.resolved_tasks.insert(task.into(), status);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskStatus {
    pub status: TaskState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fn_ref: Option<FnRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl TaskStatus {
    pub fn ready(fn_ref: FnRef, updated_at: DateTime<Utc>) -> Self {
        Self {
            status: TaskState::Ready,
            fn_ref: Some(fn_ref),
            updated_at: Some(updated_at),
        }
    }
}

/// A task instance, e.g. one added to a running invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub metadata: ObjectMetadata,
    pub spec: TaskSpec,
    pub status: TaskStatus,
}

impl Task {
    pub fn id(&self) -> &str {
        &self.metadata.id
    }
}
