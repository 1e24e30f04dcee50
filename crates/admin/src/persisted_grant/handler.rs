use async_trait::async_trait;
use pipeline::{CommandHandler, PipelineError, Precondition, Repository, Validated};

use super::{PersistedGrantEvent, PersistedGrantRemovedData, RemovePersistedGrant};
use crate::model::PersistedGrant;
use crate::store::{AdminSession, AdminStore};

#[derive(Clone)]
pub struct PersistedGrantHandler {
    store: AdminStore,
}

impl PersistedGrantHandler {
    pub fn new(store: AdminStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl CommandHandler<RemovePersistedGrant> for PersistedGrantHandler {
    type Session = AdminSession;
    type Target = PersistedGrant;
    type Event = PersistedGrantEvent;

    fn begin(&self) -> AdminSession {
        self.store.session()
    }

    async fn check(
        &self,
        command: &Validated<RemovePersistedGrant>,
        session: &AdminSession,
    ) -> Result<Precondition<PersistedGrant>, PipelineError> {
        Ok(
            match Repository::<PersistedGrant>::get(session, &command.key).await? {
                Some(grant) => Precondition::Satisfied(grant),
                None => Precondition::rejected("Persisted Grant", "Grant not found"),
            },
        )
    }

    async fn apply(
        &self,
        _command: &Validated<RemovePersistedGrant>,
        grant: PersistedGrant,
        session: &mut AdminSession,
    ) -> Result<PersistedGrantEvent, PipelineError> {
        Repository::<PersistedGrant>::remove(session, &grant.key);
        Ok(PersistedGrantEvent::PersistedGrantRemoved(
            PersistedGrantRemovedData {
                key: grant.key,
                grant_type: grant.grant_type,
                client_id: grant.client_id,
                subject_id: grant.subject_id,
            },
        ))
    }
}
