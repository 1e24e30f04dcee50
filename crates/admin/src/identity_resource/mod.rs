//! Identity resources: the user claim groups clients request as scopes.

mod commands;
mod events;
mod handler;

pub use commands::{RegisterIdentityResource, RemoveIdentityResource, UpdateIdentityResource};
pub use events::{
    IdentityResourceEvent, IdentityResourceRegisteredData, IdentityResourceRemovedData,
    IdentityResourceUpdatedData,
};
pub use handler::IdentityResourceHandler;
