//! OAuth clients and their secrets, claims and properties.

mod commands;
mod events;
mod handler;

pub use commands::{
    INTERACTIVE_GRANT_TYPES, RemoveClient, RemoveClientClaim, RemoveClientProperty,
    RemoveClientSecret, SaveClient, SaveClientClaim, SaveClientProperty, SaveClientSecret,
    UpdateClient,
};
pub use events::{
    ClientClaimData, ClientEvent, ClientPropertyData, ClientRemovedData, ClientSavedData,
    ClientSecretData, ClientUpdatedData,
};
pub use handler::ClientHandler;
