//! Append-only audit log for published domain events.
//!
//! - [`EventStore`] trait with in-memory and PostgreSQL implementations
//! - [`EventEnvelope`] record with builder
//! - [`EventQuery`] filters for reading the log back

pub mod error;
pub mod event;
pub mod memory;
pub mod postgres;
pub mod query;
pub mod store;

pub use common::AggregateId;
pub use error::{EventStoreError, Result};
pub use event::{EventEnvelope, EventEnvelopeBuilder, EventId, Position, Version};
pub use memory::InMemoryEventStore;
pub use postgres::PostgresEventStore;
pub use query::EventQuery;
pub use store::{EventStore, EventStoreExt, EventStream};
