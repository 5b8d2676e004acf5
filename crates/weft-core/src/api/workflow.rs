//! Workflow API.

use std::sync::Arc;

use tracing::info;

use super::EventFactory;
use crate::aggregate::{replay, WorkflowAggregate};
use crate::domain::{
    Aggregate, EngineError, EventHints, TaskStatus, Workflow, WorkflowEvent, WorkflowSpec,
    WorkflowState, WorkflowStatus,
};
use crate::ports::{resolve_tasks, EventStore, Resolver};
use crate::validate::validate_workflow_spec;

pub struct WorkflowApi {
    store: Arc<dyn EventStore>,
    resolver: Arc<dyn Resolver>,
    events: EventFactory,
}

impl WorkflowApi {
    pub fn new(store: Arc<dyn EventStore>, resolver: Arc<dyn Resolver>) -> Self {
        Self {
            store,
            resolver,
            events: EventFactory::default(),
        }
    }

    pub fn with_events(mut self, events: EventFactory) -> Self {
        self.events = events;
        self
    }

    /// Validates `spec` and appends WORKFLOW_CREATED. Returns the workflow id.
    ///
    /// The id is `spec.force_id` when set, a fresh `wf-…` id otherwise. If a
    /// workflow with that id already exists this fails with
    /// `EngineError::AlreadyExists(id)`, carrying the id so callers that
    /// expect the collision can keep going.
    pub async fn create(&self, spec: &WorkflowSpec) -> Result<String, EngineError> {
        validate_workflow_spec(spec)?;

        let id = match spec.forced_id() {
            Some(id) => id.to_string(),
            None => self.events.ids().generate_workflow_id().to_string(),
        };
        let aggregate = Aggregate::workflow(&id);

        // cheap early exit; append_if_absent below decides
        if self.store.exists(&aggregate).await? {
            return Err(EngineError::AlreadyExists(id));
        }

        let data = serde_json::to_vec(spec)?;
        let event = self
            .events
            .event(WorkflowEvent::Created.as_str(), aggregate, data);
        if !self.store.append_if_absent(event).await? {
            return Err(EngineError::AlreadyExists(id));
        }

        info!(workflow = %id, tasks = spec.tasks.len(), dynamic = spec.dynamic, "workflow created");
        Ok(id)
    }

    /// Appends WORKFLOW_DELETED, hinted as completed.
    pub async fn delete(&self, id: &str) -> Result<(), EngineError> {
        if id.is_empty() {
            return Err(EngineError::MissingId("workflow id"));
        }

        let event = self
            .events
            .event(WorkflowEvent::Deleted.as_str(), Aggregate::workflow(id), Vec::new())
            .with_hints(EventHints::completed());
        self.store.append(event).await?;

        info!(workflow = %id, "workflow deleted");
        Ok(())
    }

    /// Resolves the function of every task and appends WORKFLOW_PARSED.
    ///
    /// If any function cannot be resolved nothing is appended.
    pub async fn parse(&self, workflow: &Workflow) -> Result<WorkflowStatus, EngineError> {
        if workflow.id().is_empty() {
            return Err(EngineError::MissingId("workflow id"));
        }
        validate_workflow_spec(&workflow.spec)?;

        let resolved = resolve_tasks(self.resolver.as_ref(), &workflow.spec.tasks).await?;

        let now = self.events.now();
        let mut status = WorkflowStatus {
            status: WorkflowState::Ready,
            updated_at: Some(now),
            ..WorkflowStatus::default()
        };
        for (name, task) in &workflow.spec.tasks {
            let fn_ref = resolved
                .get(&task.function_ref)
                .cloned()
                .ok_or_else(|| EngineError::NotFound(format!("function {}", task.function_ref)))?;
            status.add_task_status(name.clone(), TaskStatus::ready(fn_ref, now));
        }

        let data = serde_json::to_vec(&status)?;
        let event = self.events.event(
            WorkflowEvent::Parsed.as_str(),
            Aggregate::workflow(workflow.id()),
            data,
        );
        self.store.append(event).await?;

        info!(workflow = %workflow.id(), tasks = status.resolved_tasks.len(), "workflow parsed");
        Ok(status)
    }

    /// Rebuilds a workflow from its events.
    pub async fn get(&self, id: &str) -> Result<WorkflowAggregate, EngineError> {
        if id.is_empty() {
            return Err(EngineError::MissingId("workflow id"));
        }
        let workflow: WorkflowAggregate =
            replay(self.store.as_ref(), Aggregate::workflow(id)).await?;
        if workflow.state() == WorkflowState::Uncreated {
            return Err(EngineError::NotFound(format!("workflow {id}")));
        }
        Ok(workflow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DependencyKind, FnRef, TaskSpec, TaskState};
    use crate::impls::{InMemoryEventStore, MetaResolver, StaticResolver};

    fn setup() -> (WorkflowApi, Arc<InMemoryEventStore>) {
        let store = Arc::new(InMemoryEventStore::new());
        let resolver = MetaResolver::new()
            .with_runtime("mock", Arc::new(StaticResolver::new(["someFn", "otherFn"])));
        (WorkflowApi::new(store.clone(), Arc::new(resolver)), store)
    }

    fn spec() -> WorkflowSpec {
        WorkflowSpec::new()
            .with_output("task2")
            .with_task("task1", TaskSpec::new("someFn"))
            .with_task(
                "task2",
                TaskSpec::new("otherFn").with_dependency("task1", DependencyKind::Data),
            )
    }

    #[tokio::test]
    async fn create_generates_id_and_appends_one_event() {
        let (api, store) = setup();

        let id = api.create(&spec()).await.unwrap();

        assert!(id.starts_with("wf-"));
        let events = store.get(&Aggregate::workflow(&id)).await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type, WorkflowEvent::Created.as_str());

        let wf = api.get(&id).await.unwrap();
        assert_eq!(wf.state(), WorkflowState::Unknown);
        assert_eq!(wf.workflow().spec, spec());
    }

    #[tokio::test]
    async fn create_with_forced_id_twice_is_already_exists() {
        let (api, store) = setup();
        let spec = spec().with_force_id("forcedId");

        assert_eq!(api.create(&spec).await.unwrap(), "forcedId");
        let err = api.create(&spec).await.unwrap_err();

        assert!(matches!(err, EngineError::AlreadyExists(ref id) if id == "forcedId"));
        assert_eq!(store.snapshot().await.len(), 1);
    }

    #[tokio::test]
    async fn invalid_spec_never_reaches_the_log() {
        let (api, store) = setup();
        let broken = spec().with_output("ghost");

        let err = api.create(&broken).await.unwrap_err();

        assert!(matches!(err, EngineError::Validation(_)));
        assert!(store.snapshot().await.is_empty());
    }

    #[tokio::test]
    async fn parse_resolves_every_task_and_marks_ready() {
        let (api, _store) = setup();
        let id = api.create(&spec()).await.unwrap();
        let wf = api.get(&id).await.unwrap();

        let status = api.parse(wf.workflow()).await.unwrap();

        assert_eq!(status.status, WorkflowState::Ready);
        assert_eq!(
            status.resolved_tasks["task1"].fn_ref,
            Some(FnRef::new("mock", "someFn"))
        );
        assert!(status
            .resolved_tasks
            .values()
            .all(|t| t.status == TaskState::Ready));

        let wf = api.get(&id).await.unwrap();
        assert_eq!(wf.state(), WorkflowState::Ready);
        let resolved: Vec<_> = wf.workflow().status.resolved_tasks.keys().collect();
        let tasks: Vec<_> = wf.workflow().spec.tasks.keys().collect();
        assert_eq!(resolved, tasks);
    }

    #[tokio::test]
    async fn parse_failure_appends_nothing() {
        let (api, store) = setup();
        let spec = spec().with_task("task3", TaskSpec::new("unknownFn"));
        let id = api.create(&spec).await.unwrap();
        let wf = api.get(&id).await.unwrap();

        let err = api.parse(wf.workflow()).await.unwrap_err();

        assert!(matches!(err, EngineError::Resolution(_)));
        assert_eq!(store.get(&Aggregate::workflow(&id)).await.unwrap().len(), 1);
        assert_eq!(api.get(&id).await.unwrap().state(), WorkflowState::Unknown);
    }

    #[tokio::test]
    async fn delete_marks_workflow_terminal() {
        let (api, store) = setup();
        let id = api.create(&spec()).await.unwrap();

        api.delete(&id).await.unwrap();

        let events = store.get(&Aggregate::workflow(&id)).await.unwrap();
        assert!(events.last().unwrap().is_completing());
        assert_eq!(api.get(&id).await.unwrap().state(), WorkflowState::Deleted);
    }

    #[tokio::test]
    async fn delete_requires_an_id() {
        let (api, store) = setup();
        assert!(matches!(
            api.delete("").await,
            Err(EngineError::MissingId(_))
        ));
        assert!(store.snapshot().await.is_empty());
    }

    #[tokio::test]
    async fn get_unknown_workflow_is_not_found() {
        let (api, _store) = setup();
        assert!(matches!(
            api.get("wf-missing").await,
            Err(EngineError::NotFound(_))
        ));
    }
}
