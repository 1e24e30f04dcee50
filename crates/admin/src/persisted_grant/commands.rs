use common::AggregateId;
use pipeline::command::required;
use pipeline::{Command, ValidationResult};

/// Revokes the grant stored under `key`.
#[derive(Debug, Clone)]
pub struct RemovePersistedGrant {
    pub key: String,
}

impl RemovePersistedGrant {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

impl Command for RemovePersistedGrant {
    const NAME: &'static str = "RemovePersistedGrant";

    fn aggregate_id(&self) -> AggregateId {
        AggregateId::new(&self.key)
    }

    fn validate(&self) -> ValidationResult {
        required("Key", &self.key, "Grant key is required")
    }
}
