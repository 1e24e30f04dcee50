//! API resources and their secrets.

mod commands;
mod events;
mod handler;

pub use commands::{
    RegisterApiResource, RemoveApiResource, RemoveApiSecret, SaveApiSecret, UpdateApiResource,
};
pub use events::{
    ApiResourceEvent, ApiResourceRegisteredData, ApiResourceRemovedData, ApiResourceUpdatedData,
    ApiSecretData,
};
pub use handler::ApiResourceHandler;
