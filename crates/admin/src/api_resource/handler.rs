use async_trait::async_trait;
use pipeline::{CommandHandler, PipelineError, Precondition, Repository, Validated};

use super::{
    ApiResourceEvent, ApiResourceRegisteredData, ApiResourceRemovedData, ApiResourceUpdatedData,
    ApiSecretData, RegisterApiResource, RemoveApiResource, RemoveApiSecret, SaveApiSecret,
    UpdateApiResource,
};
use crate::model::{ApiResource, ApiScope};
use crate::repository::{ApiResourceRepository, ApiScopeRepository};
use crate::store::{AdminSession, AdminStore};

/// Handles the API resource and API secret commands.
#[derive(Clone)]
pub struct ApiResourceHandler {
    store: AdminStore,
}

impl ApiResourceHandler {
    pub fn new(store: AdminStore) -> Self {
        Self { store }
    }
}

async fn resource(session: &AdminSession, name: &str) -> Result<Option<ApiResource>, PipelineError> {
    Ok(Repository::<ApiResource>::get(session, name).await?)
}

#[async_trait]
impl CommandHandler<RegisterApiResource> for ApiResourceHandler {
    type Session = AdminSession;
    type Target = ();
    type Event = ApiResourceEvent;

    fn begin(&self) -> AdminSession {
        self.store.session()
    }

    async fn check(
        &self,
        command: &Validated<RegisterApiResource>,
        session: &AdminSession,
    ) -> Result<Precondition<()>, PipelineError> {
        let name = &command.resource.name;
        if resource(session, name).await?.is_some() {
            return Ok(Precondition::rejected("Api", "Resource already exists"));
        }
        if Repository::<ApiScope>::get(session, name).await?.is_some() {
            return Ok(Precondition::rejected("Api Scope", "Scope already exists"));
        }
        Ok(Precondition::Satisfied(()))
    }

    async fn apply(
        &self,
        command: &Validated<RegisterApiResource>,
        _target: (),
        session: &mut AdminSession,
    ) -> Result<ApiResourceEvent, PipelineError> {
        let resource = command.to_model();
        let name = resource.name.clone();
        session.add(resource.clone());
        session.add_scope(ApiScope::new(&name, &name));
        Ok(ApiResourceEvent::ApiResourceRegistered(
            ApiResourceRegisteredData { resource },
        ))
    }
}

#[async_trait]
impl CommandHandler<UpdateApiResource> for ApiResourceHandler {
    type Session = AdminSession;
    type Target = ();
    type Event = ApiResourceEvent;

    fn begin(&self) -> AdminSession {
        self.store.session()
    }

    async fn check(
        &self,
        command: &Validated<UpdateApiResource>,
        session: &AdminSession,
    ) -> Result<Precondition<()>, PipelineError> {
        if resource(session, &command.old_name).await?.is_none() {
            return Ok(Precondition::rejected("Api", "Resource not found"));
        }
        if command.is_rename() && resource(session, &command.resource.name).await?.is_some() {
            return Ok(Precondition::rejected("Api", "Resource already exists"));
        }
        Ok(Precondition::Satisfied(()))
    }

    async fn apply(
        &self,
        command: &Validated<UpdateApiResource>,
        _target: (),
        session: &mut AdminSession,
    ) -> Result<ApiResourceEvent, PipelineError> {
        let resource = command.to_model();
        session.update_resource_with_children(&command.old_name, resource.clone());
        Ok(ApiResourceEvent::ApiResourceUpdated(ApiResourceUpdatedData {
            old_name: command.old_name.clone(),
            resource,
        }))
    }
}

#[async_trait]
impl CommandHandler<RemoveApiResource> for ApiResourceHandler {
    type Session = AdminSession;
    type Target = ();
    type Event = ApiResourceEvent;

    fn begin(&self) -> AdminSession {
        self.store.session()
    }

    async fn check(
        &self,
        command: &Validated<RemoveApiResource>,
        session: &AdminSession,
    ) -> Result<Precondition<()>, PipelineError> {
        if resource(session, &command.name).await?.is_none() {
            return Ok(Precondition::rejected("Api", "Resource not found"));
        }
        Ok(Precondition::Satisfied(()))
    }

    async fn apply(
        &self,
        command: &Validated<RemoveApiResource>,
        _target: (),
        session: &mut AdminSession,
    ) -> Result<ApiResourceEvent, PipelineError> {
        session.remove_resource(&command.name);
        Ok(ApiResourceEvent::ApiResourceRemoved(ApiResourceRemovedData {
            name: command.name.clone(),
        }))
    }
}

#[async_trait]
impl CommandHandler<SaveApiSecret> for ApiResourceHandler {
    type Session = AdminSession;
    type Target = ();
    type Event = ApiResourceEvent;

    fn begin(&self) -> AdminSession {
        self.store.session()
    }

    async fn check(
        &self,
        command: &Validated<SaveApiSecret>,
        session: &AdminSession,
    ) -> Result<Precondition<()>, PipelineError> {
        if resource(session, &command.resource_name).await?.is_none() {
            return Ok(Precondition::rejected("Api", "Api not found"));
        }
        Ok(Precondition::Satisfied(()))
    }

    async fn apply(
        &self,
        command: &Validated<SaveApiSecret>,
        _target: (),
        session: &mut AdminSession,
    ) -> Result<ApiResourceEvent, PipelineError> {
        let secret = command.to_model();
        let secret_type = secret.secret_type.clone();
        session.add_api_secret(&command.resource_name, secret);
        Ok(ApiResourceEvent::ApiSecretSaved(ApiSecretData {
            resource_name: command.resource_name.clone(),
            secret_type,
        }))
    }
}

#[async_trait]
impl CommandHandler<RemoveApiSecret> for ApiResourceHandler {
    type Session = AdminSession;
    type Target = ();
    type Event = ApiResourceEvent;

    fn begin(&self) -> AdminSession {
        self.store.session()
    }

    async fn check(
        &self,
        command: &Validated<RemoveApiSecret>,
        session: &AdminSession,
    ) -> Result<Precondition<()>, PipelineError> {
        let Some(resource) = resource(session, &command.resource_name).await? else {
            return Ok(Precondition::rejected("Api", "Api not found"));
        };
        let present = resource
            .secrets
            .iter()
            .any(|s| s.matches(&command.secret_type, &command.value));
        if !present {
            return Ok(Precondition::rejected("Secret", "Invalid secret"));
        }
        Ok(Precondition::Satisfied(()))
    }

    async fn apply(
        &self,
        command: &Validated<RemoveApiSecret>,
        _target: (),
        session: &mut AdminSession,
    ) -> Result<ApiResourceEvent, PipelineError> {
        session.remove_api_secret(&command.resource_name, &command.secret_type, &command.value);
        Ok(ApiResourceEvent::ApiSecretRemoved(ApiSecretData {
            resource_name: command.resource_name.clone(),
            secret_type: command.secret_type.clone(),
        }))
    }
}
