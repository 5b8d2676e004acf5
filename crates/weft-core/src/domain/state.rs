//! Lifecycle states of workflows, invocations and tasks.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Workflow lifecycle.
///
/// State transitions:
/// - Uncreated -> Unknown (WORKFLOW_CREATED)
/// - Unknown -> Ready (WORKFLOW_PARSED)
/// - Ready -> Ready (WORKFLOW_PARSED, re-resolution)
/// - any -> Deleted (WORKFLOW_DELETED)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkflowState {
    /// No event has been applied yet.
    #[default]
    Uncreated,

    /// Spec is known, function references are not resolved yet.
    Unknown,

    /// Every task has a resolved function reference.
    Ready,

    /// Terminal.
    Deleted,
}

impl WorkflowState {
    pub fn is_terminal(self) -> bool {
        matches!(self, WorkflowState::Deleted)
    }
}

/// Invocation lifecycle.
///
/// State transitions:
/// - Uncreated -> InProgress (INVOCATION_CREATED)
/// - InProgress -> Succeeded (INVOCATION_COMPLETED)
/// - InProgress -> Aborted (INVOCATION_CANCELED)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvocationState {
    #[default]
    Uncreated,
    InProgress,
    Succeeded,
    Aborted,
}

impl InvocationState {
    /// Finished invocations no longer accept new tasks.
    pub fn is_terminal(self) -> bool {
        matches!(self, InvocationState::Succeeded | InvocationState::Aborted)
    }
}

/// Per-task state as far as workflow resolution is concerned.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskState {
    /// Function reference not resolved yet.
    #[default]
    Unknown,

    /// Function reference resolved; the task can be scheduled.
    Ready,
}

impl fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl fmt::Display for InvocationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
