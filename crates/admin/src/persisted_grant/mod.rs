//! Revocation of grants issued by the identity server.

mod commands;
mod events;
mod handler;

pub use commands::RemovePersistedGrant;
pub use events::{PersistedGrantEvent, PersistedGrantRemovedData};
pub use handler::PersistedGrantHandler;
