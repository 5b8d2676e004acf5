//! Invocation records as projected from the event log.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::spec::InvocationSpec;
use super::state::InvocationState;
use super::typed_value::TypedValue;
use super::workflow::{ObjectMetadata, Task};

/// One execution of a workflow.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invocation {
    pub metadata: ObjectMetadata,
    pub spec: InvocationSpec,
    pub status: InvocationStatus,
}

impl Invocation {
    pub fn id(&self) -> &str {
        &self.metadata.id
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvocationStatus {
    pub status: InvocationState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,

    /// Tasks added while the invocation runs (e.g. proxy tasks).
    #[serde(default)]
    pub dynamic_tasks: BTreeMap<String, Task>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<TypedValue>,
}
