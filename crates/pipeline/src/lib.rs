//! Command pipeline.
//!
//! Every state-changing operation runs the same lifecycle:
//!
//! 1. the [`Command`] validates itself
//! 2. the handler checks its preconditions against storage
//! 3. the handler stages the mutation in a [`UnitOfWork`]
//! 4. the unit of work commits atomically
//! 5. on success exactly one [`DomainEvent`] is published through the [`Bus`]
//!
//! Business failures never surface as errors; they come back as ordered
//! [`DomainNotification`]s inside the [`CommandOutcome`].

pub mod audit;
pub mod bus;
pub mod command;
pub mod config;
pub mod error;
pub mod event;
pub mod handler;
pub mod notification;
pub mod repository;
pub mod telemetry;
pub mod uow;

#[cfg(test)]
pub(crate) mod testing;

pub use audit::AuditTrail;
pub use bus::{Bus, BusBuilder, EventPublisher, PublishReport};
pub use command::{Command, FieldError, Rule, ToModel, Validated, ValidationResult};
pub use common::AggregateId;
pub use config::{ConfigError, LogFormat, PipelineConfig};
pub use error::{PipelineError, Result};
pub use event::{DomainEvent, Event, EventSubscriber, SubscriberError};
pub use handler::{CommandHandler, CommandOutcome, LifecycleStage, Precondition, Rejection};
pub use notification::{DomainNotification, Notifications};
pub use repository::{Entity, Repository, StorageError};
pub use tokio_util::sync::CancellationToken;
pub use uow::{CommitError, MemorySession, MemoryStore, UnitOfWork};
