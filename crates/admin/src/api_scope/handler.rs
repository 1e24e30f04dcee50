use async_trait::async_trait;
use pipeline::{CommandHandler, PipelineError, Precondition, Repository, Validated};

use super::{ApiScopeEvent, ApiScopeRemovedData, ApiScopeSavedData, RemoveApiScope, SaveApiScope};
use crate::model::{ApiResource, ApiScope};
use crate::repository::ApiScopeRepository;
use crate::store::{AdminSession, AdminStore};

/// Handles the API scope commands.
#[derive(Clone)]
pub struct ApiScopeHandler {
    store: AdminStore,
}

impl ApiScopeHandler {
    pub fn new(store: AdminStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl CommandHandler<SaveApiScope> for ApiScopeHandler {
    type Session = AdminSession;
    type Target = ();
    type Event = ApiScopeEvent;

    fn begin(&self) -> AdminSession {
        self.store.session()
    }

    async fn check(
        &self,
        command: &Validated<SaveApiScope>,
        session: &AdminSession,
    ) -> Result<Precondition<()>, PipelineError> {
        if Repository::<ApiResource>::get(session, &command.resource_name)
            .await?
            .is_none()
        {
            return Ok(Precondition::rejected("Api", "Api not found"));
        }
        if Repository::<ApiScope>::get(session, &command.scope.name)
            .await?
            .is_some()
        {
            return Ok(Precondition::rejected("Api Scope", "Scope already exists"));
        }
        Ok(Precondition::Satisfied(()))
    }

    async fn apply(
        &self,
        command: &Validated<SaveApiScope>,
        _target: (),
        session: &mut AdminSession,
    ) -> Result<ApiScopeEvent, PipelineError> {
        let scope = command.to_model();
        session.add_scope(scope.clone());
        Ok(ApiScopeEvent::ApiScopeSaved(ApiScopeSavedData {
            resource_name: command.resource_name.clone(),
            scope,
        }))
    }
}

#[async_trait]
impl CommandHandler<RemoveApiScope> for ApiScopeHandler {
    type Session = AdminSession;
    type Target = ();
    type Event = ApiScopeEvent;

    fn begin(&self) -> AdminSession {
        self.store.session()
    }

    async fn check(
        &self,
        command: &Validated<RemoveApiScope>,
        session: &AdminSession,
    ) -> Result<Precondition<()>, PipelineError> {
        if Repository::<ApiScope>::get(session, &command.name)
            .await?
            .is_none()
        {
            return Ok(Precondition::rejected("Api Scope", "Scope not found"));
        }
        Ok(Precondition::Satisfied(()))
    }

    async fn apply(
        &self,
        command: &Validated<RemoveApiScope>,
        _target: (),
        session: &mut AdminSession,
    ) -> Result<ApiScopeEvent, PipelineError> {
        session.remove_scope(&command.name);
        Ok(ApiScopeEvent::ApiScopeRemoved(ApiScopeRemovedData {
            name: command.name.clone(),
        }))
    }
}
