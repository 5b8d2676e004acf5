//! Input specs (Workflow / Task / Invocation).
//!
//! All maps are `BTreeMap`, so the serde_json encoding of a spec is canonical:
//! two equal specs always serialize to the same bytes regardless of the order
//! in which tasks or inputs were inserted. Content-addressed workflow ids rely
//! on this.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::typed_value::TypedValue;

/// The only workflow API version this engine understands.
pub const WORKFLOW_API_VERSION: &str = "v1";

/// Definition of a workflow: a graph of named tasks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,

    /// Task whose result is the result of the workflow.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_task: Option<String>,

    #[serde(default)]
    pub tasks: BTreeMap<String, TaskSpec>,

    /// Generated at run time by dynamic expansion.
    #[serde(default)]
    pub dynamic: bool,

    /// Caller-chosen id. Never honored for dynamic workflows, whose id is
    /// derived from their content instead.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub force_id: Option<String>,
}

impl WorkflowSpec {
    pub fn new() -> Self {
        Self {
            api_version: Some(WORKFLOW_API_VERSION.to_string()),
            ..Self::default()
        }
    }

    pub fn with_output(mut self, task: impl Into<String>) -> Self {
        self.output_task = Some(task.into());
        self
    }

    pub fn with_task(mut self, name: impl Into<String>, task: TaskSpec) -> Self {
        self.tasks.insert(name.into(), task);
        self
    }

    pub fn with_force_id(mut self, id: impl Into<String>) -> Self {
        self.force_id = Some(id.into());
        self
    }

    /// The forced id, if one is set and non-empty.
    pub fn forced_id(&self) -> Option<&str> {
        self.force_id.as_deref().filter(|id| !id.is_empty())
    }
}

/// A task inside a workflow.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSpec {
    /// Function to run: `runtime://name` or a bare name.
    #[serde(default)]
    pub function_ref: String,

    #[serde(default)]
    pub inputs: BTreeMap<String, TypedValue>,

    /// Tasks this task depends on.
    #[serde(default)]
    pub requires: BTreeMap<String, TaskDependencyParameters>,
}

impl TaskSpec {
    pub fn new(function_ref: impl Into<String>) -> Self {
        Self {
            function_ref: function_ref.into(),
            ..Self::default()
        }
    }

    pub fn with_input(mut self, name: impl Into<String>, value: TypedValue) -> Self {
        self.inputs.insert(name.into(), value);
        self
    }

    pub fn with_dependency(mut self, task: impl Into<String>, kind: DependencyKind) -> Self {
        self.requires
            .insert(task.into(), TaskDependencyParameters { kind });
        self
    }
}

/// How a task depends on another task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DependencyKind {
    /// Waits for the output of the other task.
    #[default]
    Data,

    /// Waits for completion only; the output is not consumed.
    Control,

    /// Satisfied once the nested invocation spawned by the other task
    /// completes.
    DynamicOutput,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDependencyParameters {
    #[serde(default, rename = "type")]
    pub kind: DependencyKind,
}

impl TaskDependencyParameters {
    pub fn dynamic_output() -> Self {
        Self {
            kind: DependencyKind::DynamicOutput,
        }
    }
}

/// Request to execute a workflow.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvocationSpec {
    pub workflow_id: String,

    #[serde(default)]
    pub inputs: BTreeMap<String, TypedValue>,
}

impl InvocationSpec {
    pub fn new(workflow_id: impl Into<String>) -> Self {
        Self {
            workflow_id: workflow_id.into(),
            inputs: BTreeMap::new(),
        }
    }
}
