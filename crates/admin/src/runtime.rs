//! Process-level assembly: audit backend, writer task, store and bus.

use std::sync::Arc;

use event_store::{
    AggregateId, EventEnvelope, EventQuery, EventStore, EventStoreError, InMemoryEventStore,
    PostgresEventStore,
};
use pipeline::{
    AuditTrail, Bus, Command, CommandOutcome, EventSubscriber, PipelineConfig, PipelineError,
    SubscriberError,
};
use thiserror::Error;
use tokio::task::{JoinError, JoinHandle};

use crate::registry;
use crate::store::AdminStore;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("Audit log error: {0}")]
    AuditLog(#[from] EventStoreError),

    #[error("Bus wiring error: {0}")]
    Wiring(#[from] PipelineError),

    #[error("Audit trail error: {0}")]
    AuditTrail(#[from] SubscriberError),

    #[error("Audit writer failed: {0}")]
    Writer(#[from] JoinError),
}

/// A running administration backend.
pub struct AdminRuntime {
    store: AdminStore,
    bus: Bus,
    audit: AuditTrail,
    audit_log: Arc<dyn EventStore>,
    writer: JoinHandle<()>,
}

impl AdminRuntime {
    /// Starts with an empty store and no extra subscribers.
    pub async fn start(config: &PipelineConfig) -> Result<Self, RuntimeError> {
        Self::start_with(config, AdminStore::default(), Vec::new()).await
    }

    /// Selects the audit backend from `config`, spawns the audit writer and
    /// wires the bus around `store`.
    #[tracing::instrument(skip_all, fields(audit_backend = tracing::field::Empty))]
    pub async fn start_with(
        config: &PipelineConfig,
        store: AdminStore,
        extra: Vec<Arc<dyn EventSubscriber>>,
    ) -> Result<Self, RuntimeError> {
        let audit_log: Arc<dyn EventStore>;
        let (audit, writer) = match config.audit_database_url.as_deref() {
            Some(url) => {
                tracing::Span::current().record("audit_backend", "postgres");
                let log = PostgresEventStore::connect(url, config.audit_max_connections).await?;
                log.run_migrations().await?;
                audit_log = Arc::new(log.clone());
                AuditTrail::spawn(log)
            }
            None => {
                tracing::Span::current().record("audit_backend", "memory");
                let log = InMemoryEventStore::new();
                audit_log = Arc::new(log.clone());
                AuditTrail::spawn(log)
            }
        };

        let bus = registry::build_bus(&store, audit.clone(), extra)?;
        tracing::info!("admin runtime started");

        Ok(Self {
            store,
            bus,
            audit,
            audit_log,
            writer,
        })
    }

    pub fn store(&self) -> &AdminStore {
        &self.store
    }

    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// Read access to the audit log.
    pub fn audit_log(&self) -> &dyn EventStore {
        self.audit_log.as_ref()
    }

    /// One page of the recorded changes to `aggregate_id`, oldest first.
    ///
    /// Pages count from zero. Events still in the audit channel are not
    /// included; call [`flush_audit`](Self::flush_audit) first when that
    /// matters.
    pub async fn history(
        &self,
        aggregate_id: impl Into<AggregateId>,
        page: usize,
        page_size: usize,
    ) -> Result<Vec<EventEnvelope>, RuntimeError> {
        let query = EventQuery::for_aggregate(aggregate_id).page(page, page_size);
        Ok(self.audit_log.query_events(query).await?)
    }

    pub async fn dispatch<C: Command>(&self, command: C) -> Result<CommandOutcome, PipelineError> {
        self.bus.dispatch(command).await
    }

    /// Waits until every event published so far has reached the audit log.
    pub async fn flush_audit(&self) -> Result<(), RuntimeError> {
        Ok(self.audit.flush().await?)
    }

    /// Drains the audit channel and stops the writer.
    pub async fn shutdown(self) -> Result<(), RuntimeError> {
        self.audit.flush().await?;
        drop(self.bus);
        drop(self.audit);
        self.writer.await?;
        tracing::info!("admin runtime stopped");
        Ok(())
    }
}
