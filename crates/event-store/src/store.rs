use std::pin::Pin;

use async_trait::async_trait;
use futures_core::Stream;

use crate::{AggregateId, EventEnvelope, EventQuery, EventStoreError, Position, Result};

/// A stream of recorded events.
pub type EventStream = Pin<Box<dyn Stream<Item = Result<EventEnvelope>> + Send>>;

/// Core trait for audit log implementations.
///
/// The log is append-only: entries are never updated or removed, and reads
/// return them ordered by timestamp, then by position. All implementations
/// must be thread-safe (Send + Sync).
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Appends one event to the log and returns its position.
    async fn append(&self, event: EventEnvelope) -> Result<Position>;

    /// Retrieves all events recorded for a specific aggregate.
    async fn get_events_for_aggregate(
        &self,
        aggregate_id: &AggregateId,
    ) -> Result<Vec<EventEnvelope>>;

    /// Retrieves events matching a query.
    async fn query_events(&self, query: EventQuery) -> Result<Vec<EventEnvelope>>;

    /// Retrieves events by type.
    async fn get_events_by_type(&self, event_type: &str) -> Result<Vec<EventEnvelope>>;

    /// Streams all events in the log.
    async fn stream_all_events(&self) -> Result<EventStream>;

    /// Returns the number of recorded events.
    async fn event_count(&self) -> Result<u64>;
}

/// Extension trait providing convenience methods for event stores.
#[async_trait]
pub trait EventStoreExt: EventStore {
    /// Checks if any event was recorded for an aggregate.
    async fn has_events(&self, aggregate_id: &AggregateId) -> Result<bool> {
        Ok(!self.get_events_for_aggregate(aggregate_id).await?.is_empty())
    }

    /// Returns the most recent event recorded for an aggregate.
    async fn latest_for_aggregate(
        &self,
        aggregate_id: &AggregateId,
    ) -> Result<Option<EventEnvelope>> {
        Ok(self.get_events_for_aggregate(aggregate_id).await?.pop())
    }
}

// Blanket implementation for all EventStore implementations
impl<T: EventStore + ?Sized> EventStoreExt for T {}

/// Validates an event before appending.
pub fn validate_event_for_append(event: &EventEnvelope) -> Result<()> {
    if event.event_type.trim().is_empty() {
        return Err(EventStoreError::InvalidEvent(
            "event_type must not be empty".to_string(),
        ));
    }
    if event.aggregate_type.trim().is_empty() {
        return Err(EventStoreError::InvalidEvent(
            "aggregate_type must not be empty".to_string(),
        ));
    }
    if event.aggregate_id.is_blank() {
        return Err(EventStoreError::InvalidEvent(format!(
            "{} event has no aggregate id",
            event.event_type
        )));
    }
    Ok(())
}
