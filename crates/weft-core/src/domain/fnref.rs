//! Function references.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Runtime name under which workflows themselves are callable as functions.
pub const WORKFLOWS_RUNTIME: &str = "workflows";

const SEPARATOR: &str = "://";

/// A resolved function: the runtime that executes it plus its id there.
///
/// Rendered as `runtime://id`. A reference parsed from a bare name has an
/// empty runtime and still has to be resolved.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FnRef {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub runtime: String,
    pub id: String,
}

impl FnRef {
    pub fn new(runtime: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            runtime: runtime.into(),
            id: id.into(),
        }
    }

    /// Reference to a workflow invoked as an ordinary function.
    pub fn workflow(workflow_id: impl Into<String>) -> Self {
        Self::new(WORKFLOWS_RUNTIME, workflow_id)
    }

    /// Parses `runtime://id` or a bare `id`.
    pub fn parse(target: &str) -> Self {
        match target.split_once(SEPARATOR) {
            Some((runtime, id)) => Self::new(runtime, id),
            None => Self::new("", target),
        }
    }

    pub fn has_runtime(&self) -> bool {
        !self.runtime.is_empty()
    }
}

impl fmt::Display for FnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.has_runtime() {
            write!(f, "{}{}{}", self.runtime, SEPARATOR, self.id)
        } else {
            self.id.fmt(f)
        }
    }
}
