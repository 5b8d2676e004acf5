//! weft-core
//!
//! Event-sourced workflow engine core: the event log, the aggregates folded
//! from it, and dynamic expansion of running invocations.
//!
//! # Modules
//! - **domain**: specs, events, states, errors
//! - **ports**: EventStore, Resolver, InvocationClient, ValueCodec, Clock, IdGenerator
//! - **aggregate**: Workflow and Invocation projections of the log
//! - **validate**: spec validation and the task dependency graph
//! - **api**: WorkflowApi, InvocationApi, DynamicApi
//! - **impls**: in-memory store, resolvers, JSON codec
//! - **config**: engine settings

pub mod aggregate;
pub mod api;
pub mod config;
pub mod domain;
pub mod impls;
pub mod ports;
pub mod validate;

pub use api::{content_id, DynamicApi, EventFactory, InvocationApi, WorkflowApi};
pub use config::{ConfigError, EngineConfig};
pub use domain::{EngineError, ErrorKind};
