//! Invocation API.
//!
//! The minimal controller behind `InvocationClient`: it starts invocations,
//! grafts tasks into them and records how they ended. Scheduling is not its
//! concern.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use super::EventFactory;
use crate::aggregate::{replay, Aggregator, InvocationAggregate};
use crate::domain::{
    Aggregate, EngineError, EventHints, InvocationEvent, InvocationSpec, InvocationState, Task,
    TypedValue,
};
use crate::ports::{EventStore, InvocationClient};
use crate::validate::validate_task_spec;

pub struct InvocationApi {
    store: Arc<dyn EventStore>,
    events: EventFactory,
}

impl InvocationApi {
    pub fn new(store: Arc<dyn EventStore>) -> Self {
        Self {
            store,
            events: EventFactory::default(),
        }
    }

    pub fn with_events(mut self, events: EventFactory) -> Self {
        self.events = events;
        self
    }

    /// Marks the invocation as succeeded, optionally with its output.
    pub async fn complete(
        &self,
        invocation_id: &str,
        output: Option<TypedValue>,
    ) -> Result<(), EngineError> {
        let invocation = self.running(invocation_id).await?;

        let data = match &output {
            Some(value) => serde_json::to_vec(value)?,
            None => Vec::new(),
        };
        let event = self
            .events
            .event(
                InvocationEvent::Completed.as_str(),
                invocation.aggregate().clone(),
                data,
            )
            .with_hints(EventHints::completed());
        self.store.append(event).await?;

        info!(invocation = %invocation_id, "invocation completed");
        Ok(())
    }

    /// Aborts the invocation. Canceling a finished invocation is a no-op.
    pub async fn cancel(&self, invocation_id: &str) -> Result<(), EngineError> {
        let invocation = self.get(invocation_id).await?;
        if invocation.state().is_terminal() {
            debug!(invocation = %invocation_id, state = %invocation.state(), "already finished");
            return Ok(());
        }

        let event = self
            .events
            .event(
                InvocationEvent::Canceled.as_str(),
                invocation.aggregate().clone(),
                Vec::new(),
            )
            .with_hints(EventHints::completed());
        self.store.append(event).await?;

        info!(invocation = %invocation_id, "invocation canceled");
        Ok(())
    }

    pub async fn get(&self, invocation_id: &str) -> Result<InvocationAggregate, EngineError> {
        if invocation_id.is_empty() {
            return Err(EngineError::MissingId("invocation id"));
        }
        let invocation: InvocationAggregate =
            replay(self.store.as_ref(), Aggregate::invocation(invocation_id)).await?;
        if invocation.state() == InvocationState::Uncreated {
            return Err(EngineError::NotFound(format!("invocation {invocation_id}")));
        }
        Ok(invocation)
    }

    async fn running(&self, invocation_id: &str) -> Result<InvocationAggregate, EngineError> {
        let invocation = self.get(invocation_id).await?;
        if invocation.state().is_terminal() {
            return Err(EngineError::InvocationRejected(format!(
                "invocation {invocation_id} is {}",
                invocation.state()
            )));
        }
        Ok(invocation)
    }
}

#[async_trait]
impl InvocationClient for InvocationApi {
    async fn invoke(&self, spec: InvocationSpec) -> Result<String, EngineError> {
        if spec.workflow_id.is_empty() {
            return Err(EngineError::MissingId("workflow id"));
        }

        let id = self.events.ids().generate_invocation_id().to_string();
        let data = serde_json::to_vec(&spec)?;
        let event = self.events.event(
            InvocationEvent::Created.as_str(),
            Aggregate::invocation(&id),
            data,
        );
        self.store.append(event).await?;

        info!(invocation = %id, workflow = %spec.workflow_id, "invocation created");
        Ok(id)
    }

    async fn add_task(&self, invocation_id: &str, task: Task) -> Result<(), EngineError> {
        if task.id().is_empty() {
            return Err(EngineError::MissingId("task id"));
        }
        let invocation = self.running(invocation_id).await?;
        validate_task_spec(&task.spec)?;

        if let Some(existing) = invocation.task(task.id()) {
            if existing.spec == task.spec {
                debug!(invocation = %invocation_id, task = %task.id(), "task already present");
                return Ok(());
            }
            return Err(EngineError::InvocationRejected(format!(
                "task {} already exists in invocation {invocation_id} with a different spec",
                task.id()
            )));
        }

        let data = serde_json::to_vec(&task)?;
        let event = self.events.event(
            InvocationEvent::TaskAdded.as_str(),
            invocation.aggregate().clone(),
            data,
        );
        self.store.append(event).await?;

        info!(invocation = %invocation_id, task = %task.id(), "task added");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Event, ObjectMetadata, StoreError, TaskSpec};
    use crate::impls::InMemoryEventStore;
    use crate::ports::{FixedClock, UlidGenerator};
    use chrono::{TimeZone, Utc};
    use std::time::Duration;

    /// Returns what was in the log, but only after a delay.
    #[derive(Default)]
    struct SlowReads {
        inner: InMemoryEventStore,
    }

    #[async_trait]
    impl EventStore for SlowReads {
        async fn append(&self, event: Event) -> Result<(), StoreError> {
            self.inner.append(event).await
        }

        async fn get(&self, aggregate: &Aggregate) -> Result<Vec<Event>, StoreError> {
            let events = self.inner.get(aggregate).await;
            tokio::time::sleep(Duration::from_millis(20)).await;
            events
        }
    }

    fn setup() -> (InvocationApi, Arc<InMemoryEventStore>) {
        let store = Arc::new(InMemoryEventStore::new());
        let clock = FixedClock::new(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap());
        let events = EventFactory::new(
            Arc::new(clock),
            Arc::new(UlidGenerator::new(clock)),
        );
        (InvocationApi::new(store.clone()).with_events(events), store)
    }

    fn task(id: &str, function_ref: &str) -> Task {
        Task {
            metadata: ObjectMetadata {
                id: id.to_string(),
                created_at: None,
            },
            spec: TaskSpec::new(function_ref),
            ..Task::default()
        }
    }

    #[tokio::test]
    async fn invoke_creates_running_invocation() {
        let (api, store) = setup();

        let id = api.invoke(InvocationSpec::new("wf-1")).await.unwrap();

        assert!(id.starts_with("wfi-"));
        assert_eq!(store.snapshot().await.len(), 1);
        let invocation = api.get(&id).await.unwrap();
        assert_eq!(invocation.state(), InvocationState::InProgress);
        assert_eq!(invocation.invocation().spec.workflow_id, "wf-1");
    }

    #[tokio::test]
    async fn invoke_requires_workflow_id() {
        let (api, store) = setup();
        assert!(matches!(
            api.invoke(InvocationSpec::default()).await,
            Err(EngineError::MissingId(_))
        ));
        assert!(store.snapshot().await.is_empty());
    }

    #[tokio::test]
    async fn add_task_grafts_into_invocation() {
        let (api, _store) = setup();
        let id = api.invoke(InvocationSpec::new("wf-1")).await.unwrap();

        api.add_task(&id, task("t1", "someFn")).await.unwrap();

        let invocation = api.get(&id).await.unwrap();
        assert_eq!(invocation.task("t1").unwrap().spec.function_ref, "someFn");
    }

    #[tokio::test]
    async fn add_same_task_twice_is_a_no_op() {
        let (api, store) = setup();
        let id = api.invoke(InvocationSpec::new("wf-1")).await.unwrap();

        api.add_task(&id, task("t1", "someFn")).await.unwrap();
        api.add_task(&id, task("t1", "someFn")).await.unwrap();

        assert_eq!(store.get(&Aggregate::invocation(&id)).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn conflicting_task_is_rejected() {
        let (api, _store) = setup();
        let id = api.invoke(InvocationSpec::new("wf-1")).await.unwrap();
        api.add_task(&id, task("t1", "someFn")).await.unwrap();

        let err = api.add_task(&id, task("t1", "otherFn")).await.unwrap_err();

        assert!(matches!(err, EngineError::InvocationRejected(_)));
    }

    #[tokio::test]
    async fn add_task_to_unknown_invocation_fails() {
        let (api, store) = setup();
        let err = api.add_task("wfi-missing", task("t1", "f")).await.unwrap_err();
        assert!(matches!(err, EngineError::NotFound(_)));
        assert!(store.snapshot().await.is_empty());
    }

    #[tokio::test]
    async fn invalid_task_is_rejected() {
        let (api, _store) = setup();
        let id = api.invoke(InvocationSpec::new("wf-1")).await.unwrap();
        let err = api.add_task(&id, task("t1", "")).await.unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
    }

    #[tokio::test]
    async fn finished_invocation_rejects_tasks() {
        let (api, _store) = setup();
        let id = api.invoke(InvocationSpec::new("wf-1")).await.unwrap();
        let output = TypedValue::new("json/string", b"\"done\"".to_vec());

        api.complete(&id, Some(output.clone())).await.unwrap();

        let invocation = api.get(&id).await.unwrap();
        assert_eq!(invocation.state(), InvocationState::Succeeded);
        assert_eq!(invocation.invocation().status.output, Some(output));
        assert!(matches!(
            api.add_task(&id, task("t1", "f")).await,
            Err(EngineError::InvocationRejected(_))
        ));
        assert!(matches!(
            api.complete(&id, None).await,
            Err(EngineError::InvocationRejected(_))
        ));
    }

    #[tokio::test]
    async fn cancel_aborts_once() {
        let (api, store) = setup();
        let id = api.invoke(InvocationSpec::new("wf-1")).await.unwrap();

        api.cancel(&id).await.unwrap();
        api.cancel(&id).await.unwrap();

        assert_eq!(api.get(&id).await.unwrap().state(), InvocationState::Aborted);
        let events = store.get(&Aggregate::invocation(&id)).await.unwrap();
        assert_eq!(events.len(), 2);
        assert!(events[1].is_completing());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn racing_completions_keep_invocation_readable() {
        let api = Arc::new(InvocationApi::new(Arc::new(SlowReads::default())));
        let id = api.invoke(InvocationSpec::new("wf-1")).await.unwrap();

        let first = tokio::spawn({
            let (api, id) = (api.clone(), id.clone());
            async move { api.complete(&id, None).await }
        });
        let second = tokio::spawn({
            let (api, id) = (api.clone(), id.clone());
            async move { api.complete(&id, None).await }
        });
        for result in [first.await.unwrap(), second.await.unwrap()] {
            assert!(matches!(result, Ok(()) | Err(EngineError::InvocationRejected(_))));
        }

        let invocation = api.get(&id).await.unwrap();
        assert_eq!(invocation.state(), InvocationState::Succeeded);
        assert!(api.cancel(&id).await.is_ok());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn task_added_while_completing_keeps_invocation_readable() {
        let api = Arc::new(InvocationApi::new(Arc::new(SlowReads::default())));
        let id = api.invoke(InvocationSpec::new("wf-1")).await.unwrap();

        let adding = tokio::spawn({
            let (api, id) = (api.clone(), id.clone());
            async move { api.add_task(&id, task("t_child", "someFn")).await }
        });
        let completing = tokio::spawn({
            let (api, id) = (api.clone(), id.clone());
            async move { api.complete(&id, None).await }
        });
        let added = adding.await.unwrap();
        completing.await.unwrap().unwrap();
        assert!(matches!(added, Ok(()) | Err(EngineError::InvocationRejected(_))));

        let invocation = api.get(&id).await.unwrap();
        assert_eq!(invocation.state(), InvocationState::Succeeded);
        assert!(matches!(
            api.add_task(&id, task("t2", "someFn")).await,
            Err(EngineError::InvocationRejected(_))
        ));
    }
}
