//! Domain events and the subscriber seam.

use chrono::{DateTime, Utc};
use common::AggregateId;
use event_store::{EventEnvelope, EventId, EventStoreError};
use serde::Serialize;
use thiserror::Error;

/// Trait for the events a handler emits.
///
/// Events are facts, named in past tense. The payload is the serialized
/// value itself.
pub trait Event: Serialize + Send + Sync + 'static {
    /// Aggregate type recorded with every event of this type.
    const AGGREGATE_TYPE: &'static str;

    /// Event kind, used for subscription routing.
    fn kind(&self) -> &'static str;
}

/// An event serialized ahead of commit, not yet a fact.
///
/// Identity and timestamp are assigned by [`PendingEvent::committed`], which
/// the lifecycle calls only once the unit of work has committed.
#[derive(Debug)]
pub(crate) struct PendingEvent {
    aggregate_id: AggregateId,
    aggregate_type: &'static str,
    kind: &'static str,
    payload: serde_json::Value,
}

impl PendingEvent {
    pub(crate) fn new<E: Event>(
        aggregate_id: AggregateId,
        event: &E,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self {
            aggregate_id,
            aggregate_type: E::AGGREGATE_TYPE,
            kind: event.kind(),
            payload: serde_json::to_value(event)?,
        })
    }

    pub(crate) fn kind(&self) -> &'static str {
        self.kind
    }

    pub(crate) fn committed(self) -> DomainEvent {
        DomainEvent {
            event_id: EventId::new(),
            aggregate_id: self.aggregate_id,
            aggregate_type: self.aggregate_type,
            kind: self.kind,
            payload: self.payload,
            timestamp: Utc::now(),
        }
    }
}

/// A committed fact, as published on the bus.
///
/// Created only after a successful commit and never mutated afterwards;
/// subscribers receive a shared reference.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DomainEvent {
    event_id: EventId,
    aggregate_id: AggregateId,
    aggregate_type: &'static str,
    kind: &'static str,
    payload: serde_json::Value,
    timestamp: DateTime<Utc>,
}

impl DomainEvent {
    /// Serializes `event` into a domain event for `aggregate_id`, stamped now.
    #[cfg(test)]
    pub(crate) fn from_event<E: Event>(
        aggregate_id: AggregateId,
        event: &E,
    ) -> Result<Self, serde_json::Error> {
        PendingEvent::new(aggregate_id, event).map(PendingEvent::committed)
    }

    pub fn event_id(&self) -> EventId {
        self.event_id
    }

    pub fn aggregate_id(&self) -> &AggregateId {
        &self.aggregate_id
    }

    pub fn aggregate_type(&self) -> &'static str {
        self.aggregate_type
    }

    pub fn kind(&self) -> &'static str {
        self.kind
    }

    pub fn payload(&self) -> &serde_json::Value {
        &self.payload
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Converts the event into an audit log record.
    pub fn to_envelope(&self) -> Result<EventEnvelope, EventStoreError> {
        EventEnvelope::builder()
            .event_id(self.event_id)
            .event_type(self.kind)
            .aggregate_id(self.aggregate_id.clone())
            .aggregate_type(self.aggregate_type)
            .timestamp(self.timestamp)
            .payload_raw(self.payload.clone())
            .build()
    }
}

/// Errors a subscriber reports back to the publisher.
#[derive(Debug, Error)]
pub enum SubscriberError {
    /// The subscriber's downstream channel is gone.
    #[error("Subscriber channel closed")]
    ChannelClosed,

    /// The event could not be converted for the subscriber.
    #[error("Event rejected: {0}")]
    Rejected(#[from] EventStoreError),

    #[error("{0}")]
    Other(String),
}

/// Receives published events.
///
/// `handle` runs synchronously inside publication and must not block.
/// A failure is logged and counted by the publisher; it never undoes the
/// commit that produced the event.
pub trait EventSubscriber: Send + Sync {
    fn name(&self) -> &'static str;

    fn handle(&self, event: &DomainEvent) -> Result<(), SubscriberError>;
}
