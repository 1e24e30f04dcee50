use common::AggregateId;
use pipeline::command::{positive, required, run_rules};
use pipeline::{Command, ToModel, ValidationResult};

use crate::model::{Claim, Client, Secret};
use crate::validation;

/// Grant types of which a client may allow at most one.
pub const INTERACTIVE_GRANT_TYPES: [&str; 3] = ["implicit", "authorization_code", "hybrid"];

/// Creates a client. Secrets are never taken from the input.
#[derive(Debug, Clone)]
pub struct SaveClient {
    pub client: Client,
}

impl SaveClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl Command for SaveClient {
    const NAME: &'static str = "SaveClient";

    fn aggregate_id(&self) -> AggregateId {
        AggregateId::new(&self.client.client_id)
    }

    fn validate(&self) -> ValidationResult {
        let mut result = identity(&self.client);
        result.merge(lifetimes(&self.client));
        result
    }
}

impl ToModel for SaveClient {
    type Model = Client;

    fn project(&self) -> Client {
        Client {
            secrets: Vec::new(),
            ..self.client.clone()
        }
    }
}

/// Replaces the client stored under `old_client_id`. Stored secrets are kept.
#[derive(Debug, Clone)]
pub struct UpdateClient {
    pub client: Client,
    pub old_client_id: String,
}

impl UpdateClient {
    pub fn new(old_client_id: impl Into<String>, client: Client) -> Self {
        Self {
            client,
            old_client_id: old_client_id.into(),
        }
    }

    pub fn is_rename(&self) -> bool {
        self.client.client_id != self.old_client_id
    }
}

impl Command for UpdateClient {
    const NAME: &'static str = "UpdateClient";

    fn aggregate_id(&self) -> AggregateId {
        AggregateId::new(&self.old_client_id)
    }

    fn validate(&self) -> ValidationResult {
        run_rules(
            self,
            &[
                update_identity,
                old_client_id,
                grant_types,
                update_lifetimes,
                post_logout_uris,
                client_uri,
            ],
        )
    }
}

impl ToModel for UpdateClient {
    type Model = Client;

    fn project(&self) -> Client {
        Client {
            secrets: Vec::new(),
            ..self.client.clone()
        }
    }
}

#[derive(Debug, Clone)]
pub struct RemoveClient {
    pub client_id: String,
}

impl RemoveClient {
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
        }
    }
}

impl Command for RemoveClient {
    const NAME: &'static str = "RemoveClient";

    fn aggregate_id(&self) -> AggregateId {
        AggregateId::new(&self.client_id)
    }

    fn validate(&self) -> ValidationResult {
        client_id(&self.client_id)
    }
}

/// Adds a secret to a client. Shared secrets are stored hashed.
#[derive(Debug, Clone)]
pub struct SaveClientSecret {
    pub client_id: String,
    pub secret: Secret,
}

impl SaveClientSecret {
    pub fn new(client_id: impl Into<String>, secret: Secret) -> Self {
        Self {
            client_id: client_id.into(),
            secret,
        }
    }
}

impl Command for SaveClientSecret {
    const NAME: &'static str = "SaveClientSecret";

    fn aggregate_id(&self) -> AggregateId {
        AggregateId::new(&self.client_id)
    }

    fn validate(&self) -> ValidationResult {
        let mut result = client_id(&self.client_id);
        result.merge(validation::secret(&self.secret));
        result
    }
}

impl ToModel for SaveClientSecret {
    type Model = Secret;

    fn project(&self) -> Secret {
        self.secret.clone().hashed()
    }
}

/// Removes a secret. `value` is compared against the stored form.
#[derive(Debug, Clone)]
pub struct RemoveClientSecret {
    pub client_id: String,
    pub secret_type: String,
    pub value: String,
}

impl RemoveClientSecret {
    pub fn new(
        client_id: impl Into<String>,
        secret_type: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            secret_type: secret_type.into(),
            value: value.into(),
        }
    }
}

impl Command for RemoveClientSecret {
    const NAME: &'static str = "RemoveClientSecret";

    fn aggregate_id(&self) -> AggregateId {
        AggregateId::new(&self.client_id)
    }

    fn validate(&self) -> ValidationResult {
        let mut result = client_id(&self.client_id);
        result.merge(required("Type", &self.secret_type, "Secret type is required"));
        result.merge(required("Value", &self.value, "Secret value is required"));
        result
    }
}

#[derive(Debug, Clone)]
pub struct SaveClientClaim {
    pub client_id: String,
    pub claim: Claim,
}

impl SaveClientClaim {
    pub fn new(client_id: impl Into<String>, claim: Claim) -> Self {
        Self {
            client_id: client_id.into(),
            claim,
        }
    }
}

impl Command for SaveClientClaim {
    const NAME: &'static str = "SaveClientClaim";

    fn aggregate_id(&self) -> AggregateId {
        AggregateId::new(&self.client_id)
    }

    fn validate(&self) -> ValidationResult {
        let mut result = client_id(&self.client_id);
        result.merge(validation::claim(&self.claim));
        result
    }
}

#[derive(Debug, Clone)]
pub struct RemoveClientClaim {
    pub client_id: String,
    pub claim: Claim,
}

impl RemoveClientClaim {
    pub fn new(client_id: impl Into<String>, claim: Claim) -> Self {
        Self {
            client_id: client_id.into(),
            claim,
        }
    }
}

impl Command for RemoveClientClaim {
    const NAME: &'static str = "RemoveClientClaim";

    fn aggregate_id(&self) -> AggregateId {
        AggregateId::new(&self.client_id)
    }

    fn validate(&self) -> ValidationResult {
        let mut result = client_id(&self.client_id);
        result.merge(validation::claim(&self.claim));
        result
    }
}

#[derive(Debug, Clone)]
pub struct SaveClientProperty {
    pub client_id: String,
    pub key: String,
    pub value: String,
}

impl SaveClientProperty {
    pub fn new(
        client_id: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            key: key.into(),
            value: value.into(),
        }
    }
}

impl Command for SaveClientProperty {
    const NAME: &'static str = "SaveClientProperty";

    fn aggregate_id(&self) -> AggregateId {
        AggregateId::new(&self.client_id)
    }

    fn validate(&self) -> ValidationResult {
        let mut result = client_id(&self.client_id);
        result.merge(required("Key", &self.key, "Property key is required"));
        result.merge(required("Value", &self.value, "Property value is required"));
        result
    }
}

#[derive(Debug, Clone)]
pub struct RemoveClientProperty {
    pub client_id: String,
    pub key: String,
}

impl RemoveClientProperty {
    pub fn new(client_id: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            key: key.into(),
        }
    }
}

impl Command for RemoveClientProperty {
    const NAME: &'static str = "RemoveClientProperty";

    fn aggregate_id(&self) -> AggregateId {
        AggregateId::new(&self.client_id)
    }

    fn validate(&self) -> ValidationResult {
        let mut result = client_id(&self.client_id);
        result.merge(required("Key", &self.key, "Property key is required"));
        result
    }
}

fn client_id(value: &str) -> ValidationResult {
    required("ClientId", value, "Invalid client id")
}

fn identity(client: &Client) -> ValidationResult {
    let mut result = client_id(&client.client_id);
    result.merge(required(
        "ClientName",
        &client.client_name,
        "Invalid client name",
    ));
    result
}

fn lifetimes(client: &Client) -> ValidationResult {
    let l = &client.lifetimes;
    [
        ("IdentityTokenLifetime", l.identity_token),
        ("AccessTokenLifetime", l.access_token),
        ("AuthorizationCodeLifetime", l.authorization_code),
        ("AbsoluteRefreshTokenLifetime", l.absolute_refresh_token),
        ("SlidingRefreshTokenLifetime", l.sliding_refresh_token),
        ("DeviceCodeLifetime", l.device_code),
    ]
    .into_iter()
    .flat_map(|(field, value)| positive(field, value, "Lifetime must be greater than zero"))
    .collect()
}

fn update_identity(command: &UpdateClient) -> ValidationResult {
    identity(&command.client)
}

fn old_client_id(command: &UpdateClient) -> ValidationResult {
    required("OldClientId", &command.old_client_id, "Invalid old client id")
}

fn grant_types(command: &UpdateClient) -> ValidationResult {
    let interactive: Vec<&str> = INTERACTIVE_GRANT_TYPES
        .into_iter()
        .filter(|g| command.client.allowed_grant_types.iter().any(|a| a == g))
        .collect();
    match interactive.as_slice() {
        [first, second, ..] => ValidationResult::error(
            "AllowedGrantTypes",
            format!("Grant types list cannot contain both {first} and {second}"),
        ),
        _ => ValidationResult::new(),
    }
}

fn update_lifetimes(command: &UpdateClient) -> ValidationResult {
    lifetimes(&command.client)
}

fn post_logout_uris(command: &UpdateClient) -> ValidationResult {
    command
        .client
        .post_logout_redirect_uris
        .iter()
        .flat_map(|uri| validation::absolute_uri("PostLogoutRedirectUris", uri))
        .collect()
}

fn client_uri(command: &UpdateClient) -> ValidationResult {
    match command.client.client_uri.as_deref() {
        Some(uri) => validation::absolute_uri("ClientUri", uri),
        None => ValidationResult::new(),
    }
}
