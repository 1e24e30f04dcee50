use pipeline::Event;
use serde::{Deserialize, Serialize};

use crate::model::Claim;

/// Events that can occur on a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum UserEvent {
    UserClaimSaved(UserClaimData),
    UserClaimRemoved(UserClaimData),
    UserRoleSaved(UserRoleData),
    UserRoleRemoved(UserRoleData),
    ClaimsSynchronized(ClaimsSynchronizedData),
}

impl Event for UserEvent {
    const AGGREGATE_TYPE: &'static str = "User";

    fn kind(&self) -> &'static str {
        match self {
            UserEvent::UserClaimSaved(_) => "UserClaimSaved",
            UserEvent::UserClaimRemoved(_) => "UserClaimRemoved",
            UserEvent::UserRoleSaved(_) => "UserRoleSaved",
            UserEvent::UserRoleRemoved(_) => "UserRoleRemoved",
            UserEvent::ClaimsSynchronized(_) => "ClaimsSynchronized",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserClaimData {
    pub username: String,
    pub claim: Claim,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRoleData {
    pub username: String,
    pub role: String,
}

/// Carries the full requested set, not only the changed claims.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimsSynchronizedData {
    pub username: String,
    pub claims: Vec<Claim>,
}
