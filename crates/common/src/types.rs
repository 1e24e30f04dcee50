use serde::{Deserialize, Serialize};

/// Stable business key of an aggregate.
///
/// Administration aggregates are addressed by natural keys (a scope name, a
/// client id, a username) rather than surrogate UUIDs, so the identifier wraps
/// a string. An empty key is representable: commands carry whatever the caller
/// sent and validation reports the defect.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AggregateId(String);

impl AggregateId {
    /// Creates an aggregate ID from any string-like key.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Returns the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if the key is empty or only whitespace.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Consumes the ID and returns the owned key.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for AggregateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for AggregateId {
    fn from(key: String) -> Self {
        Self(key)
    }
}

impl From<&str> for AggregateId {
    fn from(key: &str) -> Self {
        Self(key.to_string())
    }
}

impl From<&String> for AggregateId {
    fn from(key: &String) -> Self {
        Self(key.clone())
    }
}

impl From<AggregateId> for String {
    fn from(id: AggregateId) -> Self {
        id.0
    }
}

impl AsRef<str> for AggregateId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aggregate_id_preserves_key() {
        let id = AggregateId::new("billing-api");
        assert_eq!(id.as_str(), "billing-api");
        assert_eq!(id.to_string(), "billing-api");
    }

    #[test]
    fn blank_keys_are_detected() {
        assert!(AggregateId::new("").is_blank());
        assert!(AggregateId::new("   ").is_blank());
        assert!(!AggregateId::new("client-1").is_blank());
    }

    #[test]
    fn aggregate_id_serializes_as_plain_string() {
        let id = AggregateId::from("alice");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"alice\"");
        let back: AggregateId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
