//! Impls - in-memory and development implementations of the ports.
//!
//! # Included
//! - **InMemoryEventStore**: event log for tests and the demo CLI
//! - **MetaResolver**, **StaticResolver**, **WorkflowRuntimeResolver**: function resolution
//! - **JsonCodec**: typed values backed by JSON
//!
//! Persistent stores and real function runtimes live outside this crate.

pub mod json_codec;
pub mod mem_store;
pub mod resolver;

pub use self::json_codec::JsonCodec;
pub use self::mem_store::InMemoryEventStore;
pub use self::resolver::{MetaResolver, StaticResolver, WorkflowRuntimeResolver};
