//! Audit trail: appends every published event to an [`EventStore`].
//!
//! Publication is synchronous and never waits on storage, so the subscriber
//! only hands the record to a background writer task over an unbounded
//! channel. The writer appends in hand-off order and numbers each
//! aggregate's records with consecutive revisions.

use event_store::{EventEnvelope, EventStore, EventStoreExt, Position, Version};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::event::{DomainEvent, EventSubscriber, SubscriberError};

enum AuditCommand {
    Append(EventEnvelope),
    Flush(oneshot::Sender<()>),
}

/// Subscriber feeding the audit writer.
///
/// Clones share the same writer. The writer stops once every clone is
/// dropped and the channel has drained.
#[derive(Clone)]
pub struct AuditTrail {
    sender: mpsc::UnboundedSender<AuditCommand>,
}

impl AuditTrail {
    /// Spawns the writer for `store` on the current runtime.
    pub fn spawn<S>(store: S) -> (Self, JoinHandle<()>)
    where
        S: EventStore + 'static,
    {
        let (sender, receiver) = mpsc::unbounded_channel();
        let handle = tokio::spawn(run_writer(store, receiver));
        (Self { sender }, handle)
    }

    /// Waits until every event handed off before this call has been
    /// written (or has failed to be written).
    pub async fn flush(&self) -> Result<(), SubscriberError> {
        let (done, wait) = oneshot::channel();
        self.sender
            .send(AuditCommand::Flush(done))
            .map_err(|_| SubscriberError::ChannelClosed)?;
        wait.await.map_err(|_| SubscriberError::ChannelClosed)
    }
}

impl EventSubscriber for AuditTrail {
    fn name(&self) -> &'static str {
        "audit-trail"
    }

    fn handle(&self, event: &DomainEvent) -> Result<(), SubscriberError> {
        let envelope = event.to_envelope()?;
        self.sender
            .send(AuditCommand::Append(envelope))
            .map_err(|_| SubscriberError::ChannelClosed)
    }
}

async fn run_writer<S: EventStore>(store: S, mut receiver: mpsc::UnboundedReceiver<AuditCommand>) {
    tracing::debug!("audit writer started");

    while let Some(command) = receiver.recv().await {
        match command {
            AuditCommand::Append(envelope) => {
                let kind = envelope.event_type.clone();
                let aggregate_id = envelope.aggregate_id.clone();
                match append_next_revision(&store, envelope).await {
                    Ok(position) => {
                        tracing::debug!(%position, %kind, %aggregate_id, "event recorded");
                        metrics::counter!("audit_events_appended_total").increment(1);
                    }
                    Err(error) => {
                        tracing::error!(%kind, %aggregate_id, %error, "failed to record event");
                        metrics::counter!("audit_append_failures_total").increment(1);
                    }
                }
            }
            AuditCommand::Flush(done) => {
                let _ = done.send(());
            }
        }
    }

    tracing::debug!("audit writer stopped");
}

/// Appends `envelope` as the revision after the aggregate's latest record.
async fn append_next_revision<S: EventStore>(
    store: &S,
    mut envelope: EventEnvelope,
) -> event_store::Result<Position> {
    let latest = store.latest_for_aggregate(&envelope.aggregate_id).await?;
    let revision = latest
        .and_then(|recorded| recorded.version)
        .map_or(Version::new(1), |version| version.next());
    envelope.version = Some(revision);
    store.append(envelope).await
}
