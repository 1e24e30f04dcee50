use pipeline::Event;
use serde::{Deserialize, Serialize};

use crate::model::{Claim, Client};

/// Events that can occur on a client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ClientEvent {
    ClientSaved(ClientSavedData),
    ClientUpdated(ClientUpdatedData),
    ClientRemoved(ClientRemovedData),
    ClientSecretSaved(ClientSecretData),
    ClientSecretRemoved(ClientSecretData),
    ClientClaimSaved(ClientClaimData),
    ClientClaimRemoved(ClientClaimData),
    ClientPropertySaved(ClientPropertyData),
    ClientPropertyRemoved(ClientPropertyData),
}

impl Event for ClientEvent {
    const AGGREGATE_TYPE: &'static str = "Client";

    fn kind(&self) -> &'static str {
        match self {
            ClientEvent::ClientSaved(_) => "ClientSaved",
            ClientEvent::ClientUpdated(_) => "ClientUpdated",
            ClientEvent::ClientRemoved(_) => "ClientRemoved",
            ClientEvent::ClientSecretSaved(_) => "ClientSecretSaved",
            ClientEvent::ClientSecretRemoved(_) => "ClientSecretRemoved",
            ClientEvent::ClientClaimSaved(_) => "ClientClaimSaved",
            ClientEvent::ClientClaimRemoved(_) => "ClientClaimRemoved",
            ClientEvent::ClientPropertySaved(_) => "ClientPropertySaved",
            ClientEvent::ClientPropertyRemoved(_) => "ClientPropertyRemoved",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientSavedData {
    pub client: Client,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientUpdatedData {
    pub old_client_id: String,
    pub client: Client,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientRemovedData {
    pub client_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientSecretData {
    pub client_id: String,
    pub secret_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientClaimData {
    pub client_id: String,
    pub claim: Claim,
}

/// `value` is absent on removal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientPropertyData {
    pub client_id: String,
    pub key: String,
    pub value: Option<String>,
}
