use pipeline::Event;
use serde::{Deserialize, Serialize};

use crate::model::ApiResource;

/// Events that can occur on an API resource.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ApiResourceEvent {
    ApiResourceRegistered(ApiResourceRegisteredData),
    ApiResourceUpdated(ApiResourceUpdatedData),
    ApiResourceRemoved(ApiResourceRemovedData),
    ApiSecretSaved(ApiSecretData),
    ApiSecretRemoved(ApiSecretData),
}

impl Event for ApiResourceEvent {
    const AGGREGATE_TYPE: &'static str = "ApiResource";

    fn kind(&self) -> &'static str {
        match self {
            ApiResourceEvent::ApiResourceRegistered(_) => "ApiResourceRegistered",
            ApiResourceEvent::ApiResourceUpdated(_) => "ApiResourceUpdated",
            ApiResourceEvent::ApiResourceRemoved(_) => "ApiResourceRemoved",
            ApiResourceEvent::ApiSecretSaved(_) => "ApiSecretSaved",
            ApiResourceEvent::ApiSecretRemoved(_) => "ApiSecretRemoved",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResourceRegisteredData {
    pub resource: ApiResource,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResourceUpdatedData {
    pub old_name: String,
    pub resource: ApiResource,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResourceRemovedData {
    pub name: String,
}

/// Secret values never leave the store; events carry the type only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiSecretData {
    pub resource_name: String,
    pub secret_type: String,
}
