//! Function resolvers.
//!
//! - **MetaResolver**: routes a target to one of several runtimes
//! - **StaticResolver**: fixed function table (tests, demo)
//! - **WorkflowRuntimeResolver**: workflows registered in the event log

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::aggregate::{replay, WorkflowAggregate};
use crate::domain::{Aggregate, FnRef, ResolveError, WorkflowState, WORKFLOWS_RUNTIME};
use crate::ports::{EventStore, Resolver, RuntimeResolver};

/// Resolver over several named runtimes.
///
/// - `runtime://name` is sent to that runtime only.
/// - A bare `name` is tried on every runtime in name order; the first runtime
///   that knows it wins.
#[derive(Default)]
pub struct MetaResolver {
    runtimes: BTreeMap<String, Arc<dyn RuntimeResolver>>,
}

impl MetaResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_runtime(
        mut self,
        name: impl Into<String>,
        resolver: Arc<dyn RuntimeResolver>,
    ) -> Self {
        self.runtimes.insert(name.into(), resolver);
        self
    }
}

#[async_trait]
impl Resolver for MetaResolver {
    async fn resolve(&self, target: &str) -> Result<FnRef, ResolveError> {
        let fn_ref = FnRef::parse(target);
        if fn_ref.has_runtime() {
            let runtime = self
                .runtimes
                .get(&fn_ref.runtime)
                .ok_or_else(|| ResolveError::UnknownRuntime(fn_ref.runtime.clone()))?;
            let id = runtime.resolve(&fn_ref.id).await?;
            return Ok(FnRef::new(fn_ref.runtime, id));
        }

        for (name, runtime) in &self.runtimes {
            match runtime.resolve(&fn_ref.id).await {
                Ok(id) => return Ok(FnRef::new(name.clone(), id)),
                Err(err) => debug!(runtime = %name, target, error = %err, "runtime did not resolve"),
            }
        }
        Err(ResolveError::NotFound(target.to_string()))
    }
}

/// Runtime with a fixed set of functions; every name resolves to itself.
pub struct StaticResolver {
    functions: Option<BTreeSet<String>>,
}

impl StaticResolver {
    pub fn new<I, S>(functions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            functions: Some(functions.into_iter().map(Into::into).collect()),
        }
    }

    /// Resolves any non-empty name.
    pub fn allow_all() -> Self {
        Self { functions: None }
    }
}

#[async_trait]
impl RuntimeResolver for StaticResolver {
    async fn resolve(&self, name: &str) -> Result<String, ResolveError> {
        let known = match &self.functions {
            Some(functions) => functions.contains(name),
            None => !name.is_empty(),
        };
        if known {
            Ok(name.to_string())
        } else {
            Err(ResolveError::NotFound(name.to_string()))
        }
    }
}

/// Runtime that executes workflows: a name resolves iff a workflow with that
/// id has been created and not deleted.
pub struct WorkflowRuntimeResolver {
    store: Arc<dyn EventStore>,
}

impl WorkflowRuntimeResolver {
    pub fn new(store: Arc<dyn EventStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl RuntimeResolver for WorkflowRuntimeResolver {
    async fn resolve(&self, name: &str) -> Result<String, ResolveError> {
        if name.is_empty() {
            return Err(ResolveError::NotFound(name.to_string()));
        }
        let workflow: WorkflowAggregate =
            replay(self.store.as_ref(), Aggregate::workflow(name)).await?;
        match workflow.state() {
            WorkflowState::Uncreated => Err(ResolveError::NotFound(name.to_string())),
            WorkflowState::Deleted => {
                debug!(runtime = WORKFLOWS_RUNTIME, workflow = %name, "workflow is deleted");
                Err(ResolveError::NotFound(name.to_string()))
            }
            WorkflowState::Unknown | WorkflowState::Ready => Ok(name.to_string()),
        }
    }
}
