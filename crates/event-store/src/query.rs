//! Filters for reading the audit log back, e.g. the change history of one
//! client or every removal of a given kind.

use chrono::{DateTime, Utc};

use crate::{AggregateId, EventEnvelope};

/// Selection and paging over the audit log.
///
/// Unset filters match everything. Results keep log order (timestamp, then
/// position); `offset` and `limit` apply after filtering.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventQuery {
    pub aggregate_id: Option<AggregateId>,
    pub aggregate_type: Option<String>,
    /// Any of these kinds; empty matches every kind.
    pub event_types: Vec<String>,
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
    pub offset: usize,
    pub limit: Option<usize>,
}

impl EventQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// History of one aggregate.
    pub fn for_aggregate(aggregate_id: impl Into<AggregateId>) -> Self {
        Self::new().aggregate_id(aggregate_id)
    }

    pub fn for_event_type(event_type: impl Into<String>) -> Self {
        Self::new().event_type(event_type)
    }

    pub fn aggregate_id(mut self, id: impl Into<AggregateId>) -> Self {
        self.aggregate_id = Some(id.into());
        self
    }

    pub fn aggregate_type(mut self, aggregate_type: impl Into<String>) -> Self {
        self.aggregate_type = Some(aggregate_type.into());
        self
    }

    /// Adds `event_type` to the accepted kinds.
    pub fn event_type(mut self, event_type: impl Into<String>) -> Self {
        self.event_types.push(event_type.into());
        self
    }

    /// Keeps events recorded within `[since, until]`.
    pub fn recorded_between(mut self, since: DateTime<Utc>, until: DateTime<Utc>) -> Self {
        self.since = Some(since);
        self.until = Some(until);
        self
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// One page of `size` entries, counting pages from zero.
    pub fn page(self, index: usize, size: usize) -> Self {
        self.offset(index * size).limit(size)
    }

    /// Whether `event` passes every filter. Paging is not considered.
    pub fn matches(&self, event: &EventEnvelope) -> bool {
        self.aggregate_id
            .as_ref()
            .is_none_or(|id| *id == event.aggregate_id)
            && self
                .aggregate_type
                .as_ref()
                .is_none_or(|t| *t == event.aggregate_type)
            && (self.event_types.is_empty() || self.event_types.contains(&event.event_type))
            && self.since.is_none_or(|since| event.timestamp >= since)
            && self.until.is_none_or(|until| event.timestamp <= until)
    }

    /// Applies `offset` and `limit` to already ordered, filtered results.
    pub fn paginate<T>(&self, items: Vec<T>) -> Vec<T> {
        let items = items.into_iter().skip(self.offset);
        match self.limit {
            Some(limit) => items.take(limit).collect(),
            None => items.collect(),
        }
    }
}
