//! API scope domain events.

use pipeline::Event;
use serde::{Deserialize, Serialize};

use crate::model::ApiScope;

/// Events that can occur on an API scope.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ApiScopeEvent {
    ApiScopeSaved(ApiScopeSavedData),
    ApiScopeRemoved(ApiScopeRemovedData),
}

impl Event for ApiScopeEvent {
    const AGGREGATE_TYPE: &'static str = "ApiScope";

    fn kind(&self) -> &'static str {
        match self {
            ApiScopeEvent::ApiScopeSaved(_) => "ApiScopeSaved",
            ApiScopeEvent::ApiScopeRemoved(_) => "ApiScopeRemoved",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiScopeSavedData {
    pub resource_name: String,
    pub scope: ApiScope,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiScopeRemovedData {
    pub name: String,
}
