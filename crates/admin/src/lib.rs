//! Identity administration on top of the command pipeline.
//!
//! Each aggregate (API resources, API scopes, identity resources, clients,
//! users and persisted grants) contributes commands, events and a handler.
//! [`store`] keeps them in memory behind the repository traits of
//! [`repository`], and [`registry`] registers every handler on one
//! [`pipeline::Bus`].

pub mod api_resource;
pub mod api_scope;
pub mod client;
pub mod identity_resource;
pub mod model;
pub mod persisted_grant;
pub mod registry;
pub mod repository;
pub mod runtime;
pub mod store;
pub mod user;
pub mod validation;

pub use model::{
    ApiResource, ApiScope, Claim, Client, IdentityResource, Lifetimes, PersistedGrant, Secret,
    User,
};
pub use registry::build_bus;
pub use runtime::{AdminRuntime, RuntimeError};
pub use store::{AdminSession, AdminStore, AdminTables};
