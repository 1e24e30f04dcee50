//! Pipeline error types.

use thiserror::Error;

use crate::config::ConfigError;
use crate::repository::StorageError;

/// Hard failures of the pipeline.
///
/// Rejected commands are not errors: validation and precondition failures are
/// reported as notifications on the outcome. These variants cover wiring
/// mistakes and faults below the repository interface.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// No handler was registered for the dispatched command type.
    #[error("No handler registered for command {0}")]
    NoHandlerRegistered(&'static str),

    /// Two handlers were registered for the same command type.
    #[error("Duplicate handler registered for command {0}")]
    DuplicateHandler(&'static str),

    /// The bus was built without any event subscriber.
    #[error("No event subscribers registered")]
    NoSubscribers,

    /// A repository read or staging call failed unexpectedly.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// The event payload could not be serialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The operation was cancelled before its commit.
    #[error("Command {0} cancelled before commit")]
    Cancelled(&'static str),

    /// A handler received a command of a type it was not registered for.
    #[error("Handler for {expected} received a command of another type")]
    CommandTypeMismatch { expected: &'static str },

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;
