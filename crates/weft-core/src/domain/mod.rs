//! Domain model (ids, events, specs, projected records, errors).

pub mod errors;
pub mod event;
pub mod fnref;
pub mod ids;
pub mod invocation;
pub mod spec;
pub mod state;
pub mod typed_value;
pub mod workflow;

pub use self::errors::{
    AggregateError, CodecError, EngineError, ErrorKind, ResolveError, StoreError, ValidationError,
};
pub use self::event::{
    Aggregate, Event, EventHints, InvocationEvent, WorkflowEvent, TYPE_INVOCATION, TYPE_WORKFLOW,
};
pub use self::fnref::{FnRef, WORKFLOWS_RUNTIME};
pub use self::ids::{EventId, InvocationId, WorkflowId};
pub use self::invocation::{Invocation, InvocationStatus};
pub use self::spec::{
    DependencyKind, InvocationSpec, TaskDependencyParameters, TaskSpec, WorkflowSpec,
    WORKFLOW_API_VERSION,
};
pub use self::state::{InvocationState, TaskState, WorkflowState};
pub use self::typed_value::TypedValue;
pub use self::workflow::{ObjectMetadata, Task, TaskStatus, Workflow, WorkflowStatus};
