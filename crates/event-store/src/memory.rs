use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{
    AggregateId, EventEnvelope, EventQuery, Position, Result,
    store::{EventStore, EventStream, validate_event_for_append},
};

/// In-memory audit log.
///
/// Keeps every appended event in memory and provides the same interface as
/// the PostgreSQL implementation. Clones share the same log.
#[derive(Clone, Default)]
pub struct InMemoryEventStore {
    entries: Arc<RwLock<Vec<(Position, EventEnvelope)>>>,
}

impl InMemoryEventStore {
    /// Creates a new empty in-memory event store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears all events.
    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    async fn sorted_where<F>(&self, keep: F) -> Vec<EventEnvelope>
    where
        F: Fn(&EventEnvelope) -> bool,
    {
        let entries = self.entries.read().await;
        let mut selected: Vec<_> = entries.iter().filter(|(_, e)| keep(e)).collect();
        selected.sort_by(|(pa, a), (pb, b)| a.timestamp.cmp(&b.timestamp).then(pa.cmp(pb)));
        selected.into_iter().map(|(_, e)| e.clone()).collect()
    }
}

#[async_trait]
impl EventStore for InMemoryEventStore {
    async fn append(&self, event: EventEnvelope) -> Result<Position> {
        validate_event_for_append(&event)?;

        let mut entries = self.entries.write().await;
        let position = Position::new(entries.len() as i64 + 1);
        entries.push((position, event));

        Ok(position)
    }

    async fn get_events_for_aggregate(
        &self,
        aggregate_id: &AggregateId,
    ) -> Result<Vec<EventEnvelope>> {
        Ok(self.sorted_where(|e| &e.aggregate_id == aggregate_id).await)
    }

    async fn query_events(&self, query: EventQuery) -> Result<Vec<EventEnvelope>> {
        let events = self.sorted_where(|e| query.matches(e)).await;
        Ok(query.paginate(events))
    }

    async fn get_events_by_type(&self, event_type: &str) -> Result<Vec<EventEnvelope>> {
        Ok(self.sorted_where(|e| e.event_type == event_type).await)
    }

    async fn stream_all_events(&self) -> Result<EventStream> {
        use futures_util::stream;

        let events = self.sorted_where(|_| true).await;
        let stream = stream::iter(events.into_iter().map(Ok));
        Ok(Box::pin(stream))
    }

    async fn event_count(&self) -> Result<u64> {
        Ok(self.entries.read().await.len() as u64)
    }
}
