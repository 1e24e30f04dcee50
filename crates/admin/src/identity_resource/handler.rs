use async_trait::async_trait;
use pipeline::{CommandHandler, PipelineError, Precondition, Repository, Validated};

use super::{
    IdentityResourceEvent, IdentityResourceRegisteredData, IdentityResourceRemovedData,
    IdentityResourceUpdatedData, RegisterIdentityResource, RemoveIdentityResource,
    UpdateIdentityResource,
};
use crate::model::IdentityResource;
use crate::repository::IdentityResourceRepository;
use crate::store::{AdminSession, AdminStore};

const KEY: &str = "Identity Resource";

#[derive(Clone)]
pub struct IdentityResourceHandler {
    store: AdminStore,
}

impl IdentityResourceHandler {
    pub fn new(store: AdminStore) -> Self {
        Self { store }
    }
}

async fn exists(session: &AdminSession, name: &str) -> Result<bool, PipelineError> {
    Ok(Repository::<IdentityResource>::get(session, name)
        .await?
        .is_some())
}

#[async_trait]
impl CommandHandler<RegisterIdentityResource> for IdentityResourceHandler {
    type Session = AdminSession;
    type Target = ();
    type Event = IdentityResourceEvent;

    fn begin(&self) -> AdminSession {
        self.store.session()
    }

    async fn check(
        &self,
        command: &Validated<RegisterIdentityResource>,
        session: &AdminSession,
    ) -> Result<Precondition<()>, PipelineError> {
        if exists(session, &command.resource.name).await? {
            return Ok(Precondition::rejected(KEY, "Resource already exists"));
        }
        Ok(Precondition::Satisfied(()))
    }

    async fn apply(
        &self,
        command: &Validated<RegisterIdentityResource>,
        _target: (),
        session: &mut AdminSession,
    ) -> Result<IdentityResourceEvent, PipelineError> {
        let resource = command.to_model();
        session.add(resource.clone());
        Ok(IdentityResourceEvent::IdentityResourceRegistered(
            IdentityResourceRegisteredData { resource },
        ))
    }
}

#[async_trait]
impl CommandHandler<UpdateIdentityResource> for IdentityResourceHandler {
    type Session = AdminSession;
    type Target = ();
    type Event = IdentityResourceEvent;

    fn begin(&self) -> AdminSession {
        self.store.session()
    }

    async fn check(
        &self,
        command: &Validated<UpdateIdentityResource>,
        session: &AdminSession,
    ) -> Result<Precondition<()>, PipelineError> {
        if !exists(session, &command.old_name).await? {
            return Ok(Precondition::rejected(KEY, "Resource not found"));
        }
        if command.is_rename() && exists(session, &command.resource.name).await? {
            return Ok(Precondition::rejected(KEY, "Resource already exists"));
        }
        Ok(Precondition::Satisfied(()))
    }

    async fn apply(
        &self,
        command: &Validated<UpdateIdentityResource>,
        _target: (),
        session: &mut AdminSession,
    ) -> Result<IdentityResourceEvent, PipelineError> {
        let resource = command.to_model();
        session.replace_identity_resource(&command.old_name, resource.clone());
        Ok(IdentityResourceEvent::IdentityResourceUpdated(
            IdentityResourceUpdatedData {
                old_name: command.old_name.clone(),
                resource,
            },
        ))
    }
}

#[async_trait]
impl CommandHandler<RemoveIdentityResource> for IdentityResourceHandler {
    type Session = AdminSession;
    type Target = ();
    type Event = IdentityResourceEvent;

    fn begin(&self) -> AdminSession {
        self.store.session()
    }

    async fn check(
        &self,
        command: &Validated<RemoveIdentityResource>,
        session: &AdminSession,
    ) -> Result<Precondition<()>, PipelineError> {
        if !exists(session, &command.name).await? {
            return Ok(Precondition::rejected(KEY, "Resource not found"));
        }
        Ok(Precondition::Satisfied(()))
    }

    async fn apply(
        &self,
        command: &Validated<RemoveIdentityResource>,
        _target: (),
        session: &mut AdminSession,
    ) -> Result<IdentityResourceEvent, PipelineError> {
        Repository::<IdentityResource>::remove(session, &command.name);
        Ok(IdentityResourceEvent::IdentityResourceRemoved(
            IdentityResourceRemovedData {
                name: command.name.clone(),
            },
        ))
    }
}
