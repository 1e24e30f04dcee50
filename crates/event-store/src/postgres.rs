use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use crate::{
    AggregateId, EventEnvelope, EventId, EventQuery, Position, Result, Version,
    store::{EventStore, EventStream, validate_event_for_append},
};

const SELECT_COLUMNS: &str =
    "SELECT id, event_type, aggregate_id, aggregate_type, version, timestamp, payload, metadata FROM audit_log";

/// PostgreSQL-backed audit log.
#[derive(Clone)]
pub struct PostgresEventStore {
    pool: PgPool,
}

impl PostgresEventStore {
    /// Creates a new PostgreSQL event store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects a pool to `database_url` and wraps it.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        Ok(())
    }

    fn row_to_event(row: PgRow) -> Result<EventEnvelope> {
        let metadata_json: serde_json::Value = row.try_get("metadata")?;
        let metadata: HashMap<String, serde_json::Value> = serde_json::from_value(metadata_json)?;

        Ok(EventEnvelope {
            event_id: EventId::from_uuid(row.try_get::<Uuid, _>("id")?),
            event_type: row.try_get("event_type")?,
            aggregate_id: AggregateId::new(row.try_get::<String, _>("aggregate_id")?),
            aggregate_type: row.try_get("aggregate_type")?,
            version: row.try_get::<Option<i64>, _>("version")?.map(Version::new),
            timestamp: row.try_get("timestamp")?,
            payload: row.try_get("payload")?,
            metadata,
        })
    }
}

#[async_trait]
impl EventStore for PostgresEventStore {
    async fn append(&self, event: EventEnvelope) -> Result<Position> {
        validate_event_for_append(&event)?;

        let metadata_json = serde_json::to_value(&event.metadata)?;

        let position: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO audit_log (id, event_type, aggregate_id, aggregate_type, version, timestamp, payload, metadata)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING position
            "#,
        )
        .bind(event.event_id.as_uuid())
        .bind(&event.event_type)
        .bind(event.aggregate_id.as_str())
        .bind(&event.aggregate_type)
        .bind(event.version.map(|v| v.as_i64()))
        .bind(event.timestamp)
        .bind(&event.payload)
        .bind(metadata_json)
        .fetch_one(&self.pool)
        .await?;

        Ok(Position::new(position))
    }

    async fn get_events_for_aggregate(
        &self,
        aggregate_id: &AggregateId,
    ) -> Result<Vec<EventEnvelope>> {
        let sql = format!("{SELECT_COLUMNS} WHERE aggregate_id = $1 ORDER BY timestamp ASC, position ASC");
        let rows = sqlx::query(&sql)
            .bind(aggregate_id.as_str())
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Self::row_to_event).collect()
    }

    async fn query_events(&self, query: EventQuery) -> Result<Vec<EventEnvelope>> {
        let mut sql = format!("{SELECT_COLUMNS} WHERE 1=1");
        let mut param_count = 0;

        // Build dynamic query
        if query.aggregate_id.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND aggregate_id = ${param_count}"));
        }
        if query.aggregate_type.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND aggregate_type = ${param_count}"));
        }
        if !query.event_types.is_empty() {
            param_count += 1;
            sql.push_str(&format!(" AND event_type = ANY(${param_count})"));
        }
        if query.since.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND timestamp >= ${param_count}"));
        }
        if query.until.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND timestamp <= ${param_count}"));
        }

        sql.push_str(" ORDER BY timestamp ASC, position ASC");

        if query.limit.is_some() {
            param_count += 1;
            sql.push_str(&format!(" LIMIT ${param_count}"));
        }
        if query.offset > 0 {
            param_count += 1;
            sql.push_str(&format!(" OFFSET ${param_count}"));
        }

        let mut sqlx_query = sqlx::query(&sql);

        if let Some(id) = query.aggregate_id {
            sqlx_query = sqlx_query.bind(id.into_string());
        }
        if let Some(agg_type) = query.aggregate_type {
            sqlx_query = sqlx_query.bind(agg_type);
        }
        if !query.event_types.is_empty() {
            sqlx_query = sqlx_query.bind(query.event_types);
        }
        if let Some(since) = query.since {
            sqlx_query = sqlx_query.bind(since);
        }
        if let Some(until) = query.until {
            sqlx_query = sqlx_query.bind(until);
        }
        if let Some(limit) = query.limit {
            sqlx_query = sqlx_query.bind(limit as i64);
        }
        if query.offset > 0 {
            sqlx_query = sqlx_query.bind(query.offset as i64);
        }

        let rows = sqlx_query.fetch_all(&self.pool).await?;
        rows.into_iter().map(Self::row_to_event).collect()
    }

    async fn get_events_by_type(&self, event_type: &str) -> Result<Vec<EventEnvelope>> {
        let sql = format!("{SELECT_COLUMNS} WHERE event_type = $1 ORDER BY timestamp ASC, position ASC");
        let rows = sqlx::query(&sql)
            .bind(event_type)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Self::row_to_event).collect()
    }

    async fn stream_all_events(&self) -> Result<EventStream> {
        use futures_util::stream;

        let sql = format!("{SELECT_COLUMNS} ORDER BY timestamp ASC, position ASC");
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        let events: Vec<Result<EventEnvelope>> = rows.into_iter().map(Self::row_to_event).collect();

        Ok(Box::pin(stream::iter(events)))
    }

    async fn event_count(&self) -> Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM audit_log")
            .fetch_one(&self.pool)
            .await?;
        Ok(count as u64)
    }
}
