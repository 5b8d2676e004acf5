//! weft: runs a dynamic expansion against an in-memory event log and prints
//! the resulting events.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use serde_json::{json, Value};
use tracing::info;
use tracing_subscriber::EnvFilter;

use weft_core::domain::{InvocationSpec, TaskSpec, WorkflowSpec, WORKFLOWS_RUNTIME};
use weft_core::impls::{
    InMemoryEventStore, JsonCodec, MetaResolver, StaticResolver, WorkflowRuntimeResolver,
};
use weft_core::ports::InvocationClient;
use weft_core::{DynamicApi, EngineConfig, InvocationApi, WorkflowApi};

#[derive(Debug, Parser)]
#[command(name = "weft", about = "Expand a task of a running invocation into a nested workflow")]
struct Args {
    /// Engine config (JSON). Defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Function run by the root task and by the generated task.
    #[arg(long, default_value = "someFn")]
    function: String,

    /// Task of the root workflow that produces the dynamic task.
    #[arg(long, default_value = "task-parent")]
    parent_task: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => EngineConfig::default(),
    };

    // (A) log + collaborators
    let store = Arc::new(InMemoryEventStore::new());
    let resolver = MetaResolver::new()
        .with_runtime("mock", Arc::new(StaticResolver::allow_all()))
        .with_runtime(
            WORKFLOWS_RUNTIME,
            Arc::new(WorkflowRuntimeResolver::new(store.clone())),
        );
    let workflows = Arc::new(WorkflowApi::new(store.clone(), Arc::new(resolver)));
    let invocations = Arc::new(InvocationApi::new(store.clone()));
    let dynamic = DynamicApi::new(
        workflows.clone(),
        invocations.clone(),
        Arc::new(JsonCodec::new()),
        config,
    );

    // (B) root workflow, parsed and invoked
    let spec = WorkflowSpec::new()
        .with_output(args.parent_task.clone())
        .with_task(args.parent_task.clone(), TaskSpec::new(args.function.clone()));
    let workflow_id = workflows.create(&spec).await.context("creating workflow")?;
    let workflow = workflows.get(&workflow_id).await?;
    workflows
        .parse(workflow.workflow())
        .await
        .context("parsing workflow")?;
    let invocation_id = invocations
        .invoke(InvocationSpec::new(workflow_id.clone()))
        .await
        .context("invoking workflow")?;

    // (C) the parent task produces more work
    let proxy = dynamic
        .add_dynamic_task(&invocation_id, &args.parent_task, TaskSpec::new(args.function))
        .await
        .context("expanding parent task")?;
    info!(proxy = %proxy.id(), function = %proxy.spec.function_ref, "expansion done");

    let events: Vec<Value> = store
        .snapshot()
        .await
        .into_iter()
        .map(|event| {
            let data = serde_json::from_slice(&event.data).unwrap_or(Value::Null);
            json!({
                "id": event.id,
                "type": event.event_type,
                "aggregate": event.aggregate.to_string(),
                "timestamp": event.timestamp,
                "data": data,
            })
        })
        .collect();
    println!("{}", serde_json::to_string_pretty(&events)?);
    Ok(())
}
