//! Dynamic expansion.
//!
//! A running task may produce more work: a single task spec or a whole
//! workflow spec. That work is registered as a workflow of its own and a
//! proxy task calling it is grafted into the parent invocation:
//!
//! ```text
//! invocation:  parent ──(dynamic output)──> parent_child ──> <hash>
//! ```
//!
//! The proxy's `function_ref` is the bare workflow id; its status carries the
//! resolved `workflows://<hash>` reference.
//!
//! Generated workflows are content-addressed. Expanding the same spec twice,
//! or from two places at once, lands on one workflow id.

use std::sync::Arc;

use serde_json::Value;
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use super::{EventFactory, WorkflowApi};
use crate::config::EngineConfig;
use crate::domain::{
    EngineError, FnRef, ObjectMetadata, Task, TaskDependencyParameters, TaskSpec, TaskStatus,
    WorkflowSpec, WorkflowState,
};
use crate::ports::{InvocationClient, ValueCodec};
use crate::validate::{validate_task_spec, validate_workflow_spec};

/// SHA-256 of the canonical JSON encoding of `spec`, hex encoded.
pub fn content_id(spec: &WorkflowSpec) -> Result<String, serde_json::Error> {
    let bytes = serde_json::to_vec(spec)?;
    Ok(hex::encode(Sha256::digest(&bytes)))
}

pub struct DynamicApi {
    workflows: Arc<WorkflowApi>,
    invocations: Arc<dyn InvocationClient>,
    codec: Arc<dyn ValueCodec>,
    config: EngineConfig,
    events: EventFactory,
}

impl DynamicApi {
    pub fn new(
        workflows: Arc<WorkflowApi>,
        invocations: Arc<dyn InvocationClient>,
        codec: Arc<dyn ValueCodec>,
        config: EngineConfig,
    ) -> Self {
        Self {
            workflows,
            invocations,
            codec,
            config,
            events: EventFactory::default(),
        }
    }

    pub fn with_events(mut self, events: EventFactory) -> Self {
        self.events = events;
        self
    }

    /// Runs `task` as a one-task workflow and hooks it behind `parent_task_id`.
    ///
    /// Returns the proxy task added to the invocation.
    pub async fn add_dynamic_task(
        &self,
        invocation_id: &str,
        parent_task_id: &str,
        task: TaskSpec,
    ) -> Result<Task, EngineError> {
        let output = self.config.dynamic_output_task.clone();
        let spec = WorkflowSpec {
            api_version: Some(self.config.api_version.clone()),
            output_task: Some(output.clone()),
            dynamic: true,
            ..WorkflowSpec::default()
        }
        .with_task(output, task.clone());

        self.register(invocation_id, parent_task_id, spec, task).await
    }

    /// Runs `spec` as a nested workflow and hooks it behind `parent_task_id`.
    pub async fn add_dynamic_workflow(
        &self,
        invocation_id: &str,
        parent_task_id: &str,
        spec: WorkflowSpec,
    ) -> Result<Task, EngineError> {
        self.register(invocation_id, parent_task_id, spec, TaskSpec::default())
            .await
    }

    async fn register(
        &self,
        invocation_id: &str,
        parent_task_id: &str,
        mut spec: WorkflowSpec,
        stub: TaskSpec,
    ) -> Result<Task, EngineError> {
        if invocation_id.is_empty() {
            return Err(EngineError::MissingId("invocation id"));
        }
        if parent_task_id.is_empty() {
            return Err(EngineError::MissingId("parent task id"));
        }

        self.sanitize(&mut spec);
        let forced = match content_id(&spec) {
            Ok(id) => id,
            Err(err) => {
                let id = self.events.ids().generate_workflow_id().to_string();
                warn!(error = %err, fallback = %id, "failed to hash dynamic workflow, using random id");
                id
            }
        };
        spec.force_id = Some(forced);

        validate_workflow_spec(&spec)?;

        let workflow_id = match self.workflows.create(&spec).await {
            Ok(id) => id,
            Err(EngineError::AlreadyExists(id)) => {
                if self.workflows.get(&id).await?.state() == WorkflowState::Deleted {
                    return Err(EngineError::Deleted(id));
                }
                debug!(workflow = %id, "reusing registered dynamic workflow");
                id
            }
            Err(err) => return Err(err),
        };

        let proxy = self.proxy_task(invocation_id, parent_task_id, &workflow_id, stub)?;
        validate_task_spec(&proxy.spec)?;

        self.invocations.add_task(invocation_id, proxy.clone()).await?;

        info!(
            invocation = %invocation_id,
            parent = %parent_task_id,
            proxy = %proxy.id(),
            workflow = %workflow_id,
            "dynamic workflow attached"
        );
        Ok(proxy)
    }

    /// Dynamic workflows always carry an api version and never a caller id.
    fn sanitize(&self, spec: &mut WorkflowSpec) {
        if spec.api_version.as_deref().is_none_or(str::is_empty) {
            spec.api_version = Some(self.config.api_version.clone());
        }
        spec.dynamic = true;
        spec.force_id = None;
    }

    fn proxy_task(
        &self,
        invocation_id: &str,
        parent_task_id: &str,
        workflow_id: &str,
        stub: TaskSpec,
    ) -> Result<Task, EngineError> {
        let fn_ref = FnRef::workflow(workflow_id);
        let parent = self
            .codec
            .parse(&Value::String(invocation_id.to_string()))?;

        let mut spec = stub;
        spec.function_ref = workflow_id.to_string();
        spec.inputs.insert(self.config.parent_input.clone(), parent);
        // the parent is the only edge, whatever the stub carried
        spec.requires.clear();
        spec.requires.insert(
            parent_task_id.to_string(),
            TaskDependencyParameters::dynamic_output(),
        );

        let now = self.events.now();
        Ok(Task {
            metadata: ObjectMetadata::new(
                format!("{parent_task_id}{}", self.config.proxy_task_suffix),
                now,
            ),
            spec,
            status: TaskStatus::ready(fn_ref, now),
        })
    }
}
