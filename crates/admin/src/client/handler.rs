use async_trait::async_trait;
use pipeline::{CommandHandler, PipelineError, Precondition, Repository, Validated};

use super::{
    ClientClaimData, ClientEvent, ClientPropertyData, ClientRemovedData, ClientSavedData,
    ClientSecretData, ClientUpdatedData, RemoveClient, RemoveClientClaim, RemoveClientProperty,
    RemoveClientSecret, SaveClient, SaveClientClaim, SaveClientProperty, SaveClientSecret,
    UpdateClient,
};
use crate::model::Client;
use crate::repository::ClientRepository;
use crate::store::{AdminSession, AdminStore};

/// Handles every client command.
#[derive(Clone)]
pub struct ClientHandler {
    store: AdminStore,
}

impl ClientHandler {
    pub fn new(store: AdminStore) -> Self {
        Self { store }
    }
}

async fn existing_client(
    session: &AdminSession,
    client_id: &str,
) -> Result<Precondition<Client>, PipelineError> {
    Ok(match Repository::<Client>::get(session, client_id).await? {
        Some(client) => Precondition::Satisfied(client),
        None => Precondition::rejected("Client", "Client not found"),
    })
}

#[async_trait]
impl CommandHandler<SaveClient> for ClientHandler {
    type Session = AdminSession;
    type Target = ();
    type Event = ClientEvent;

    fn begin(&self) -> AdminSession {
        self.store.session()
    }

    async fn check(
        &self,
        command: &Validated<SaveClient>,
        session: &AdminSession,
    ) -> Result<Precondition<()>, PipelineError> {
        if Repository::<Client>::get(session, &command.client.client_id)
            .await?
            .is_some()
        {
            return Ok(Precondition::rejected("Client", "Client already exists"));
        }
        Ok(Precondition::Satisfied(()))
    }

    async fn apply(
        &self,
        command: &Validated<SaveClient>,
        _target: (),
        session: &mut AdminSession,
    ) -> Result<ClientEvent, PipelineError> {
        let client = command.to_model();
        session.add(client.clone());
        Ok(ClientEvent::ClientSaved(ClientSavedData { client }))
    }
}

#[async_trait]
impl CommandHandler<UpdateClient> for ClientHandler {
    type Session = AdminSession;
    type Target = ();
    type Event = ClientEvent;

    fn begin(&self) -> AdminSession {
        self.store.session()
    }

    async fn check(
        &self,
        command: &Validated<UpdateClient>,
        session: &AdminSession,
    ) -> Result<Precondition<()>, PipelineError> {
        if let Precondition::Rejected(rejection) =
            existing_client(session, &command.old_client_id).await?
        {
            return Ok(Precondition::Rejected(rejection));
        }
        if command.is_rename()
            && Repository::<Client>::get(session, &command.client.client_id)
                .await?
                .is_some()
        {
            return Ok(Precondition::rejected("Client", "Client already exists"));
        }
        Ok(Precondition::Satisfied(()))
    }

    async fn apply(
        &self,
        command: &Validated<UpdateClient>,
        _target: (),
        session: &mut AdminSession,
    ) -> Result<ClientEvent, PipelineError> {
        let client = command.to_model();
        session.update_client_with_children(&command.old_client_id, client.clone());
        Ok(ClientEvent::ClientUpdated(ClientUpdatedData {
            old_client_id: command.old_client_id.clone(),
            client,
        }))
    }
}

#[async_trait]
impl CommandHandler<RemoveClient> for ClientHandler {
    type Session = AdminSession;
    type Target = Client;
    type Event = ClientEvent;

    fn begin(&self) -> AdminSession {
        self.store.session()
    }

    async fn check(
        &self,
        command: &Validated<RemoveClient>,
        session: &AdminSession,
    ) -> Result<Precondition<Client>, PipelineError> {
        existing_client(session, &command.client_id).await
    }

    async fn apply(
        &self,
        _command: &Validated<RemoveClient>,
        client: Client,
        session: &mut AdminSession,
    ) -> Result<ClientEvent, PipelineError> {
        Repository::<Client>::remove(session, &client.client_id);
        Ok(ClientEvent::ClientRemoved(ClientRemovedData {
            client_id: client.client_id,
        }))
    }
}

#[async_trait]
impl CommandHandler<SaveClientSecret> for ClientHandler {
    type Session = AdminSession;
    type Target = Client;
    type Event = ClientEvent;

    fn begin(&self) -> AdminSession {
        self.store.session()
    }

    async fn check(
        &self,
        command: &Validated<SaveClientSecret>,
        session: &AdminSession,
    ) -> Result<Precondition<Client>, PipelineError> {
        existing_client(session, &command.client_id).await
    }

    async fn apply(
        &self,
        command: &Validated<SaveClientSecret>,
        client: Client,
        session: &mut AdminSession,
    ) -> Result<ClientEvent, PipelineError> {
        let secret = command.to_model();
        let secret_type = secret.secret_type.clone();
        session.add_client_secret(&client.client_id, secret);
        Ok(ClientEvent::ClientSecretSaved(ClientSecretData {
            client_id: client.client_id,
            secret_type,
        }))
    }
}

#[async_trait]
impl CommandHandler<RemoveClientSecret> for ClientHandler {
    type Session = AdminSession;
    type Target = Client;
    type Event = ClientEvent;

    fn begin(&self) -> AdminSession {
        self.store.session()
    }

    async fn check(
        &self,
        command: &Validated<RemoveClientSecret>,
        session: &AdminSession,
    ) -> Result<Precondition<Client>, PipelineError> {
        let client = match existing_client(session, &command.client_id).await? {
            Precondition::Satisfied(client) => client,
            rejected => return Ok(rejected),
        };
        if !client
            .secrets
            .iter()
            .any(|s| s.matches(&command.secret_type, &command.value))
        {
            return Ok(Precondition::rejected("Secret", "Invalid secret"));
        }
        Ok(Precondition::Satisfied(client))
    }

    async fn apply(
        &self,
        command: &Validated<RemoveClientSecret>,
        client: Client,
        session: &mut AdminSession,
    ) -> Result<ClientEvent, PipelineError> {
        session.remove_client_secret(&client.client_id, &command.secret_type, &command.value);
        Ok(ClientEvent::ClientSecretRemoved(ClientSecretData {
            client_id: client.client_id,
            secret_type: command.secret_type.clone(),
        }))
    }
}

#[async_trait]
impl CommandHandler<SaveClientClaim> for ClientHandler {
    type Session = AdminSession;
    type Target = Client;
    type Event = ClientEvent;

    fn begin(&self) -> AdminSession {
        self.store.session()
    }

    async fn check(
        &self,
        command: &Validated<SaveClientClaim>,
        session: &AdminSession,
    ) -> Result<Precondition<Client>, PipelineError> {
        existing_client(session, &command.client_id).await
    }

    async fn apply(
        &self,
        command: &Validated<SaveClientClaim>,
        client: Client,
        session: &mut AdminSession,
    ) -> Result<ClientEvent, PipelineError> {
        session.add_client_claim(&client.client_id, command.claim.clone());
        Ok(ClientEvent::ClientClaimSaved(ClientClaimData {
            client_id: client.client_id,
            claim: command.claim.clone(),
        }))
    }
}

#[async_trait]
impl CommandHandler<RemoveClientClaim> for ClientHandler {
    type Session = AdminSession;
    type Target = Client;
    type Event = ClientEvent;

    fn begin(&self) -> AdminSession {
        self.store.session()
    }

    async fn check(
        &self,
        command: &Validated<RemoveClientClaim>,
        session: &AdminSession,
    ) -> Result<Precondition<Client>, PipelineError> {
        let client = match existing_client(session, &command.client_id).await? {
            Precondition::Satisfied(client) => client,
            rejected => return Ok(rejected),
        };
        if !client.claims.contains(&command.claim) {
            return Ok(Precondition::rejected("Claim", "Invalid claim"));
        }
        Ok(Precondition::Satisfied(client))
    }

    async fn apply(
        &self,
        command: &Validated<RemoveClientClaim>,
        client: Client,
        session: &mut AdminSession,
    ) -> Result<ClientEvent, PipelineError> {
        let claim = command.claim.clone();
        session.remove_client_claim(&client.client_id, &claim.claim_type, &claim.value);
        Ok(ClientEvent::ClientClaimRemoved(ClientClaimData {
            client_id: client.client_id,
            claim,
        }))
    }
}

#[async_trait]
impl CommandHandler<SaveClientProperty> for ClientHandler {
    type Session = AdminSession;
    type Target = Client;
    type Event = ClientEvent;

    fn begin(&self) -> AdminSession {
        self.store.session()
    }

    async fn check(
        &self,
        command: &Validated<SaveClientProperty>,
        session: &AdminSession,
    ) -> Result<Precondition<Client>, PipelineError> {
        existing_client(session, &command.client_id).await
    }

    async fn apply(
        &self,
        command: &Validated<SaveClientProperty>,
        client: Client,
        session: &mut AdminSession,
    ) -> Result<ClientEvent, PipelineError> {
        session.add_client_property(&client.client_id, &command.key, &command.value);
        Ok(ClientEvent::ClientPropertySaved(ClientPropertyData {
            client_id: client.client_id,
            key: command.key.clone(),
            value: Some(command.value.clone()),
        }))
    }
}

#[async_trait]
impl CommandHandler<RemoveClientProperty> for ClientHandler {
    type Session = AdminSession;
    type Target = Client;
    type Event = ClientEvent;

    fn begin(&self) -> AdminSession {
        self.store.session()
    }

    async fn check(
        &self,
        command: &Validated<RemoveClientProperty>,
        session: &AdminSession,
    ) -> Result<Precondition<Client>, PipelineError> {
        let client = match existing_client(session, &command.client_id).await? {
            Precondition::Satisfied(client) => client,
            rejected => return Ok(rejected),
        };
        if !client.properties.contains_key(&command.key) {
            return Ok(Precondition::rejected("Property", "Property not found"));
        }
        Ok(Precondition::Satisfied(client))
    }

    async fn apply(
        &self,
        command: &Validated<RemoveClientProperty>,
        client: Client,
        session: &mut AdminSession,
    ) -> Result<ClientEvent, PipelineError> {
        session.remove_client_property(&client.client_id, &command.key);
        Ok(ClientEvent::ClientPropertyRemoved(ClientPropertyData {
            client_id: client.client_id,
            key: command.key.clone(),
            value: None,
        }))
    }
}
