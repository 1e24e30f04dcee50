//! API scopes: named permissions owned by an API resource.

mod commands;
mod events;
mod handler;

pub use commands::{RemoveApiScope, SaveApiScope};
pub use events::{ApiScopeEvent, ApiScopeRemovedData, ApiScopeSavedData};
pub use handler::ApiScopeHandler;
