//! Structured failure notices for one operation.

use chrono::{DateTime, Utc};
use common::AggregateId;
use serde::Serialize;

use crate::command::ValidationResult;

/// A validation or precondition failure reported to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DomainNotification {
    key: String,
    message: String,
    aggregate_id: AggregateId,
    timestamp: DateTime<Utc>,
}

impl DomainNotification {
    pub fn new(
        key: impl Into<String>,
        message: impl Into<String>,
        aggregate_id: AggregateId,
    ) -> Self {
        Self {
            key: key.into(),
            message: message.into(),
            aggregate_id,
            timestamp: Utc::now(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn aggregate_id(&self) -> &AggregateId {
        &self.aggregate_id
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// Ordered notification sink owned by a single operation.
///
/// Insertion order is preserved and nothing is deduplicated.
#[derive(Debug, Clone, Default)]
pub struct Notifications {
    items: Vec<DomainNotification>,
}

impl Notifications {
    pub fn new() -> Self {
        Self::default()
    }

    /// One notification per field error, keyed by the field name.
    pub fn from_validation(result: &ValidationResult, aggregate_id: &AggregateId) -> Self {
        result
            .errors()
            .iter()
            .map(|e| DomainNotification::new(&e.field, &e.message, aggregate_id.clone()))
            .collect()
    }

    pub fn add(&mut self, notification: DomainNotification) {
        self.items.push(notification);
    }

    pub fn has_notifications(&self) -> bool {
        !self.items.is_empty()
    }

    pub fn all(&self) -> &[DomainNotification] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DomainNotification> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn into_vec(self) -> Vec<DomainNotification> {
        self.items
    }
}

impl FromIterator<DomainNotification> for Notifications {
    fn from_iter<I: IntoIterator<Item = DomainNotification>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Notifications {
    type Item = DomainNotification;
    type IntoIter = std::vec::IntoIter<DomainNotification>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a Notifications {
    type Item = &'a DomainNotification;
    type IntoIter = std::slice::Iter<'a, DomainNotification>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preserves_insertion_order_without_dedup() {
        let id = AggregateId::new("billing-api");
        let mut sink = Notifications::new();
        assert!(!sink.has_notifications());

        sink.add(DomainNotification::new("Api", "Api not found", id.clone()));
        sink.add(DomainNotification::new("Api Scope", "Scope not found", id.clone()));
        sink.add(DomainNotification::new("Api", "Api not found", id));

        assert!(sink.has_notifications());
        let keys: Vec<_> = sink.iter().map(|n| n.key()).collect();
        assert_eq!(keys, vec!["Api", "Api Scope", "Api"]);
    }

    #[test]
    fn one_notification_per_field_error() {
        let mut result = ValidationResult::error("Name", "Invalid scope");
        result.push("ResourceName", "Invalid resource");

        let sink = Notifications::from_validation(&result, &AggregateId::new(""));
        assert_eq!(sink.len(), 2);
        assert_eq!(sink.all()[0].key(), "Name");
        assert_eq!(sink.all()[1].message(), "Invalid resource");
    }
}
