//! Persisted administration records.

use std::collections::BTreeMap;

use base64::{Engine as _, engine::general_purpose};
use chrono::{DateTime, Utc};
use pipeline::Entity;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Secret type whose value is stored as a digest.
pub const SHARED_SECRET: &str = "SharedSecret";

/// Digest stored for a shared secret: SHA-256, base64 encoded.
pub fn hash_secret(value: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());
    general_purpose::STANDARD.encode(hasher.finalize())
}

/// A credential attached to an API resource or a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Secret {
    pub secret_type: String,
    pub value: String,
    pub description: Option<String>,
    pub expiration: Option<DateTime<Utc>>,
}

impl Secret {
    pub fn new(secret_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            secret_type: secret_type.into(),
            value: value.into(),
            description: None,
            expiration: None,
        }
    }

    pub fn shared(value: impl Into<String>) -> Self {
        Self::new(SHARED_SECRET, value)
    }

    /// The form in which the secret is stored.
    pub fn hashed(mut self) -> Self {
        if self.secret_type == SHARED_SECRET {
            self.value = hash_secret(&self.value);
        }
        self
    }

    pub fn matches(&self, secret_type: &str, value: &str) -> bool {
        self.secret_type == secret_type && self.value == value
    }
}

/// A (type, value) claim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Claim {
    pub claim_type: String,
    pub value: String,
}

impl Claim {
    pub fn new(claim_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            claim_type: claim_type.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ApiResource {
    pub name: String,
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub enabled: bool,
    pub scopes: Vec<String>,
    pub user_claims: Vec<String>,
    pub secrets: Vec<Secret>,
}

impl ApiResource {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            enabled: true,
            ..Default::default()
        }
    }
}

impl Entity for ApiResource {
    const NAME: &'static str = "ApiResource";

    fn key(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ApiScope {
    pub name: String,
    pub resource_name: String,
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub required: bool,
    pub emphasize: bool,
    pub user_claims: Vec<String>,
}

impl ApiScope {
    pub fn new(resource_name: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            resource_name: resource_name.into(),
            ..Default::default()
        }
    }
}

impl Entity for ApiScope {
    const NAME: &'static str = "ApiScope";

    fn key(&self) -> &str {
        &self.name
    }
}

/// A named group of user claims a client may request as an identity scope.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct IdentityResource {
    pub name: String,
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub enabled: bool,
    pub required: bool,
    pub emphasize: bool,
    pub show_in_discovery_document: bool,
    pub user_claims: Vec<String>,
}

impl IdentityResource {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            enabled: true,
            show_in_discovery_document: true,
            ..Default::default()
        }
    }
}

impl Entity for IdentityResource {
    const NAME: &'static str = "IdentityResource";

    fn key(&self) -> &str {
        &self.name
    }
}

/// Token and code lifetimes of a client, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lifetimes {
    pub identity_token: i64,
    pub access_token: i64,
    pub authorization_code: i64,
    pub absolute_refresh_token: i64,
    pub sliding_refresh_token: i64,
    pub device_code: i64,
}

impl Default for Lifetimes {
    fn default() -> Self {
        Self {
            identity_token: 300,
            access_token: 3600,
            authorization_code: 300,
            absolute_refresh_token: 2_592_000,
            sliding_refresh_token: 1_296_000,
            device_code: 300,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Client {
    pub client_id: String,
    pub client_name: String,
    pub client_uri: Option<String>,
    pub enabled: bool,
    pub allowed_grant_types: Vec<String>,
    pub redirect_uris: Vec<String>,
    pub post_logout_redirect_uris: Vec<String>,
    pub allowed_scopes: Vec<String>,
    pub lifetimes: Lifetimes,
    pub secrets: Vec<Secret>,
    pub claims: Vec<Claim>,
    pub properties: BTreeMap<String, String>,
}

impl Client {
    pub fn new(client_id: impl Into<String>, client_name: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_name: client_name.into(),
            enabled: true,
            ..Default::default()
        }
    }
}

impl Entity for Client {
    const NAME: &'static str = "Client";

    fn key(&self) -> &str {
        &self.client_id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    pub roles: Vec<String>,
    pub claims: Vec<Claim>,
}

impl User {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            ..Default::default()
        }
    }
}

impl Entity for User {
    const NAME: &'static str = "User";

    fn key(&self) -> &str {
        &self.username
    }
}

/// A token, code or consent issued by the identity server.
///
/// Grants are created by the server itself; administration only lists and
/// revokes them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedGrant {
    pub key: String,
    pub grant_type: String,
    pub subject_id: String,
    pub client_id: String,
    pub creation_time: DateTime<Utc>,
    pub expiration: Option<DateTime<Utc>>,
    pub data: String,
}

impl PersistedGrant {
    pub fn new(
        key: impl Into<String>,
        grant_type: impl Into<String>,
        subject_id: impl Into<String>,
        client_id: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            grant_type: grant_type.into(),
            subject_id: subject_id.into(),
            client_id: client_id.into(),
            creation_time: Utc::now(),
            expiration: None,
            data: String::new(),
        }
    }
}

impl Entity for PersistedGrant {
    const NAME: &'static str = "PersistedGrant";

    fn key(&self) -> &str {
        &self.key
    }
}
