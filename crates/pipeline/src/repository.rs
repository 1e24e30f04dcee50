//! Repository seam between handlers and storage.

use async_trait::async_trait;
use thiserror::Error;

/// Unexpected storage faults.
///
/// Missing or duplicate records found by a precondition check are business
/// outcomes and never use this type; these variants mean a staged mutation or
/// a read could not be carried out.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    /// A staged mutation referred to a record that does not exist.
    #[error("{entity} '{key}' not found")]
    NotFound { entity: &'static str, key: String },

    /// A staged insert collided with an existing record.
    #[error("{entity} '{key}' already exists")]
    Conflict { entity: &'static str, key: String },

    /// A fault injected by the storage for testing.
    #[error("Injected storage fault")]
    Injected,

    /// The backing storage could not be reached.
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// A record addressed by a natural key.
pub trait Entity: Clone + Send + Sync + 'static {
    const NAME: &'static str;

    fn key(&self) -> &str;
}

/// Generic repository.
///
/// Reads see committed state only. Mutations are staged on the current unit
/// of work and become visible when it commits.
#[async_trait]
pub trait Repository<T: Entity>: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<T>, StorageError>;

    async fn list(&self) -> Result<Vec<T>, StorageError>;

    fn add(&mut self, entity: T);

    fn update(&mut self, entity: T);

    fn remove(&mut self, key: &str);
}
