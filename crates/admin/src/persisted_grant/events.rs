use pipeline::Event;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum PersistedGrantEvent {
    PersistedGrantRemoved(PersistedGrantRemovedData),
}

impl Event for PersistedGrantEvent {
    const AGGREGATE_TYPE: &'static str = "PersistedGrant";

    fn kind(&self) -> &'static str {
        match self {
            PersistedGrantEvent::PersistedGrantRemoved(_) => "PersistedGrantRemoved",
        }
    }
}

/// The grant's data blob is not carried.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedGrantRemovedData {
    pub key: String,
    pub grant_type: String,
    pub client_id: String,
    pub subject_id: String,
}
