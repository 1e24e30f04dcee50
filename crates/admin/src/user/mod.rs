//! Users: roles, claims and claim synchronisation.

mod commands;
mod events;
mod handler;

pub use commands::{
    RemoveUserClaim, RemoveUserRole, SaveUserClaim, SaveUserRole, SynchronizeClaims,
};
pub use events::{ClaimsSynchronizedData, UserClaimData, UserEvent, UserRoleData};
pub use handler::{ClaimChange, UserHandler, claim_changes};
