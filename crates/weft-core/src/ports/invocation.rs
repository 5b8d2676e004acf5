//! InvocationClient port - the controller of running invocations.

use async_trait::async_trait;

use crate::domain::{EngineError, InvocationSpec, Task};

/// What the dynamic expansion protocol needs from invocations.
#[async_trait]
pub trait InvocationClient: Send + Sync {
    /// Starts a new invocation and returns its id.
    async fn invoke(&self, spec: InvocationSpec) -> Result<String, EngineError>;

    /// Grafts `task` into the graph of a running invocation.
    async fn add_task(&self, invocation_id: &str, task: Task) -> Result<(), EngineError>;
}
