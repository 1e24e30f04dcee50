use pipeline::Event;
use serde::{Deserialize, Serialize};

use crate::model::IdentityResource;

/// Events that can occur on an identity resource.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum IdentityResourceEvent {
    IdentityResourceRegistered(IdentityResourceRegisteredData),
    IdentityResourceUpdated(IdentityResourceUpdatedData),
    IdentityResourceRemoved(IdentityResourceRemovedData),
}

impl Event for IdentityResourceEvent {
    const AGGREGATE_TYPE: &'static str = "IdentityResource";

    fn kind(&self) -> &'static str {
        match self {
            IdentityResourceEvent::IdentityResourceRegistered(_) => "IdentityResourceRegistered",
            IdentityResourceEvent::IdentityResourceUpdated(_) => "IdentityResourceUpdated",
            IdentityResourceEvent::IdentityResourceRemoved(_) => "IdentityResourceRemoved",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityResourceRegisteredData {
    pub resource: IdentityResource,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityResourceUpdatedData {
    pub old_name: String,
    pub resource: IdentityResource,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityResourceRemovedData {
    pub name: String,
}
