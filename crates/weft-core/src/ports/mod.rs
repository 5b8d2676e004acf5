//! Ports - the seams between the core and its collaborators.
//!
//! Each trait hides an external system: the event log, function runtimes,
//! the invocation controller, the value marshalling layer, time and ids.
//!
//! # Design principles
//! - The event log is the single source of truth.
//! - Aggregates are rebuilt from it on demand; nothing else holds state.

pub mod clock;
pub mod codec;
pub mod event_store;
pub mod id_generator;
pub mod invocation;
pub mod resolver;

pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::codec::ValueCodec;
pub use self::event_store::EventStore;
pub use self::id_generator::{IdGenerator, UlidGenerator};
pub use self::invocation::InvocationClient;
pub use self::resolver::{resolve_tasks, Resolver, RuntimeResolver};
