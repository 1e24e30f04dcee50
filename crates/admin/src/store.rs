//! In-memory storage for the administration aggregates.

use std::collections::BTreeMap;

use async_trait::async_trait;
use pipeline::{
    CommitError, Entity, MemorySession, MemoryStore, Repository, StorageError, UnitOfWork,
};

use crate::model::{
    ApiResource, ApiScope, Claim, Client, IdentityResource, PersistedGrant, Secret, User,
};
use crate::repository::{
    ApiResourceRepository, ApiScopeRepository, ClientRepository, IdentityResourceRepository,
    UserRepository,
};

/// All administration records, keyed by natural key.
#[derive(Debug, Clone, Default)]
pub struct AdminTables {
    pub api_resources: BTreeMap<String, ApiResource>,
    pub api_scopes: BTreeMap<String, ApiScope>,
    pub identity_resources: BTreeMap<String, IdentityResource>,
    pub clients: BTreeMap<String, Client>,
    pub users: BTreeMap<String, User>,
    pub persisted_grants: BTreeMap<String, PersistedGrant>,
}

impl AdminTables {
    /// Adds `entity`, replacing any record with the same key.
    pub fn with<T: Table>(mut self, entity: T) -> Self {
        T::rows_mut(&mut self).insert(entity.key().to_string(), entity);
        self
    }
}

/// Maps an entity type to its table.
pub trait Table: Entity {
    fn rows(tables: &AdminTables) -> &BTreeMap<String, Self>;

    fn rows_mut(tables: &mut AdminTables) -> &mut BTreeMap<String, Self>;
}

impl Table for ApiResource {
    fn rows(tables: &AdminTables) -> &BTreeMap<String, Self> {
        &tables.api_resources
    }

    fn rows_mut(tables: &mut AdminTables) -> &mut BTreeMap<String, Self> {
        &mut tables.api_resources
    }
}

impl Table for ApiScope {
    fn rows(tables: &AdminTables) -> &BTreeMap<String, Self> {
        &tables.api_scopes
    }

    fn rows_mut(tables: &mut AdminTables) -> &mut BTreeMap<String, Self> {
        &mut tables.api_scopes
    }
}

impl Table for IdentityResource {
    fn rows(tables: &AdminTables) -> &BTreeMap<String, Self> {
        &tables.identity_resources
    }

    fn rows_mut(tables: &mut AdminTables) -> &mut BTreeMap<String, Self> {
        &mut tables.identity_resources
    }
}

impl Table for Client {
    fn rows(tables: &AdminTables) -> &BTreeMap<String, Self> {
        &tables.clients
    }

    fn rows_mut(tables: &mut AdminTables) -> &mut BTreeMap<String, Self> {
        &mut tables.clients
    }
}

impl Table for User {
    fn rows(tables: &AdminTables) -> &BTreeMap<String, Self> {
        &tables.users
    }

    fn rows_mut(tables: &mut AdminTables) -> &mut BTreeMap<String, Self> {
        &mut tables.users
    }
}

impl Table for PersistedGrant {
    fn rows(tables: &AdminTables) -> &BTreeMap<String, Self> {
        &tables.persisted_grants
    }

    fn rows_mut(tables: &mut AdminTables) -> &mut BTreeMap<String, Self> {
        &mut tables.persisted_grants
    }
}

fn not_found<T: Entity>(key: &str) -> StorageError {
    StorageError::NotFound {
        entity: T::NAME,
        key: key.to_string(),
    }
}

fn existing<'a, T: Table>(
    tables: &'a mut AdminTables,
    key: &str,
) -> Result<&'a mut T, StorageError> {
    T::rows_mut(tables).get_mut(key).ok_or_else(|| not_found::<T>(key))
}

fn take<T: Table>(tables: &mut AdminTables, key: &str) -> Result<T, StorageError> {
    T::rows_mut(tables).remove(key).ok_or_else(|| not_found::<T>(key))
}

fn insert_new<T: Table>(tables: &mut AdminTables, entity: T) -> Result<(), StorageError> {
    let rows = T::rows_mut(tables);
    if rows.contains_key(entity.key()) {
        return Err(StorageError::Conflict {
            entity: T::NAME,
            key: entity.key().to_string(),
        });
    }
    rows.insert(entity.key().to_string(), entity);
    Ok(())
}

/// Shared administration store. Clones share the same tables.
#[derive(Clone, Default)]
pub struct AdminStore {
    inner: MemoryStore<AdminTables>,
}

impl AdminStore {
    pub fn new(tables: AdminTables) -> Self {
        Self {
            inner: MemoryStore::new(tables),
        }
    }

    /// Opens an operation-scoped session.
    pub fn session(&self) -> AdminSession {
        AdminSession {
            inner: self.inner.session(),
        }
    }

    /// Reads a committed record.
    pub async fn find<T: Table>(&self, key: &str) -> Option<T> {
        self.inner
            .read(|tables| T::rows(tables).get(key).cloned())
            .await
    }

    pub async fn count<T: Table>(&self) -> usize {
        self.inner.read(|tables| T::rows(tables).len()).await
    }

    pub fn commit_count(&self) -> u64 {
        self.inner.commit_count()
    }

    /// Makes the `n`th staged mutation of the next commit fail.
    pub fn fail_on_mutation(&self, n: usize) {
        self.inner.fail_on_mutation(n);
    }
}

/// One operation's view of the store: committed reads, staged writes.
pub struct AdminSession {
    inner: MemorySession<AdminTables>,
}

impl AdminSession {
    fn modify<T, F>(&mut self, key: &str, change: F)
    where
        T: Table,
        F: FnOnce(&mut T) + Send + Sync + 'static,
    {
        let key = key.to_string();
        self.inner.stage(move |tables| {
            change(existing::<T>(tables, &key)?);
            Ok(())
        });
    }
}

#[async_trait]
impl UnitOfWork for AdminSession {
    async fn commit(&mut self) -> Result<(), CommitError> {
        self.inner.commit().await
    }

    fn pending(&self) -> usize {
        self.inner.pending()
    }
}

#[async_trait]
impl<T: Table> Repository<T> for AdminSession {
    async fn get(&self, key: &str) -> Result<Option<T>, StorageError> {
        Ok(self
            .inner
            .read(|tables| T::rows(tables).get(key).cloned())
            .await)
    }

    async fn list(&self) -> Result<Vec<T>, StorageError> {
        Ok(self
            .inner
            .read(|tables| T::rows(tables).values().cloned().collect())
            .await)
    }

    fn add(&mut self, entity: T) {
        self.inner.stage(move |tables| insert_new(tables, entity));
    }

    fn update(&mut self, entity: T) {
        self.inner.stage(move |tables| {
            let current = existing::<T>(tables, entity.key())?;
            *current = entity;
            Ok(())
        });
    }

    fn remove(&mut self, key: &str) {
        let key = key.to_string();
        self.inner
            .stage(move |tables| take::<T>(tables, &key).map(|_| ()));
    }
}

impl ApiResourceRepository for AdminSession {
    fn update_resource_with_children(&mut self, old_name: &str, mut resource: ApiResource) {
        let old_name = old_name.to_string();
        self.inner.stage(move |tables| {
            let current = take::<ApiResource>(tables, &old_name)?;
            resource.secrets = current.secrets;
            resource.scopes = current.scopes;
            if resource.name != old_name {
                for scope in tables.api_scopes.values_mut() {
                    if scope.resource_name == old_name {
                        scope.resource_name = resource.name.clone();
                    }
                }
            }
            insert_new(tables, resource)
        });
    }

    fn remove_resource(&mut self, name: &str) {
        let name = name.to_string();
        self.inner.stage(move |tables| {
            take::<ApiResource>(tables, &name)?;
            tables.api_scopes.retain(|_, scope| scope.resource_name != name);
            Ok(())
        });
    }

    fn add_api_secret(&mut self, resource_name: &str, secret: Secret) {
        self.modify::<ApiResource, _>(resource_name, move |resource| {
            resource.secrets.push(secret)
        });
    }

    fn remove_api_secret(&mut self, resource_name: &str, secret_type: &str, value: &str) {
        let (secret_type, value) = (secret_type.to_string(), value.to_string());
        self.modify::<ApiResource, _>(resource_name, move |resource| {
            resource.secrets.retain(|s| !s.matches(&secret_type, &value))
        });
    }
}

impl ApiScopeRepository for AdminSession {
    fn add_scope(&mut self, scope: ApiScope) {
        self.inner.stage(move |tables| {
            let resource = existing::<ApiResource>(tables, &scope.resource_name)?;
            if !resource.scopes.contains(&scope.name) {
                resource.scopes.push(scope.name.clone());
            }
            insert_new(tables, scope)
        });
    }

    fn remove_scope(&mut self, name: &str) {
        let name = name.to_string();
        self.inner.stage(move |tables| {
            let scope = take::<ApiScope>(tables, &name)?;
            if let Some(resource) = tables.api_resources.get_mut(&scope.resource_name) {
                resource.scopes.retain(|s| *s != name);
            }
            Ok(())
        });
    }
}

impl IdentityResourceRepository for AdminSession {
    fn replace_identity_resource(&mut self, old_name: &str, resource: IdentityResource) {
        let old_name = old_name.to_string();
        self.inner.stage(move |tables| {
            take::<IdentityResource>(tables, &old_name)?;
            insert_new(tables, resource)
        });
    }
}

impl ClientRepository for AdminSession {
    fn update_client_with_children(&mut self, old_client_id: &str, mut client: Client) {
        let old_client_id = old_client_id.to_string();
        self.inner.stage(move |tables| {
            let current = take::<Client>(tables, &old_client_id)?;
            client.secrets = current.secrets;
            insert_new(tables, client)
        });
    }

    fn add_client_secret(&mut self, client_id: &str, secret: Secret) {
        self.modify::<Client, _>(client_id, move |client| client.secrets.push(secret));
    }

    fn remove_client_secret(&mut self, client_id: &str, secret_type: &str, value: &str) {
        let (secret_type, value) = (secret_type.to_string(), value.to_string());
        self.modify::<Client, _>(client_id, move |client| {
            client.secrets.retain(|s| !s.matches(&secret_type, &value))
        });
    }

    fn add_client_claim(&mut self, client_id: &str, claim: Claim) {
        self.modify::<Client, _>(client_id, move |client| client.claims.push(claim));
    }

    fn remove_client_claim(&mut self, client_id: &str, claim_type: &str, value: &str) {
        let (claim_type, value) = (claim_type.to_string(), value.to_string());
        self.modify::<Client, _>(client_id, move |client| {
            client
                .claims
                .retain(|c| !(c.claim_type == claim_type && c.value == value))
        });
    }

    fn add_client_property(&mut self, client_id: &str, key: &str, value: &str) {
        let (key, value) = (key.to_string(), value.to_string());
        self.modify::<Client, _>(client_id, move |client| {
            client.properties.insert(key, value);
        });
    }

    fn remove_client_property(&mut self, client_id: &str, key: &str) {
        let key = key.to_string();
        self.modify::<Client, _>(client_id, move |client| {
            client.properties.remove(&key);
        });
    }
}

impl UserRepository for AdminSession {
    fn add_user_claim(&mut self, username: &str, claim: Claim) {
        self.modify::<User, _>(username, move |user| user.claims.push(claim));
    }

    fn remove_user_claim(&mut self, username: &str, claim_type: &str, value: &str) {
        let (claim_type, value) = (claim_type.to_string(), value.to_string());
        self.modify::<User, _>(username, move |user| {
            user.claims
                .retain(|c| !(c.claim_type == claim_type && c.value == value))
        });
    }

    fn add_user_role(&mut self, username: &str, role: &str) {
        let role = role.to_string();
        self.modify::<User, _>(username, move |user| {
            if !user.roles.contains(&role) {
                user.roles.push(role);
            }
        });
    }

    fn remove_user_role(&mut self, username: &str, role: &str) {
        let role = role.to_string();
        self.modify::<User, _>(username, move |user| user.roles.retain(|r| *r != role));
    }
}
