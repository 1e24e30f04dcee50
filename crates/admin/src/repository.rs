//! Aggregate-specific repositories.
//!
//! Each extends the generic [`Repository`] with the narrow mutators its
//! handlers need. Every mutator only stages; nothing is visible until the
//! unit of work commits.

use pipeline::Repository;

use crate::model::{ApiResource, ApiScope, Claim, Client, IdentityResource, Secret, User};

pub trait ApiResourceRepository: Repository<ApiResource> {
    /// Replaces the resource stored under `old_name`. Stored secrets and
    /// the scope list are kept; scope rows follow a rename.
    fn update_resource_with_children(&mut self, old_name: &str, resource: ApiResource);

    /// Removes the resource and its scopes.
    fn remove_resource(&mut self, name: &str);

    fn add_api_secret(&mut self, resource_name: &str, secret: Secret);

    fn remove_api_secret(&mut self, resource_name: &str, secret_type: &str, value: &str);
}

pub trait ApiScopeRepository: Repository<ApiScope> {
    /// Adds the scope and attaches its name to the owning resource.
    fn add_scope(&mut self, scope: ApiScope);

    /// Removes the scope and detaches it from the owning resource.
    fn remove_scope(&mut self, name: &str);
}

pub trait IdentityResourceRepository: Repository<IdentityResource> {
    /// Replaces the resource stored under `old_name`, possibly renaming it.
    fn replace_identity_resource(&mut self, old_name: &str, resource: IdentityResource);
}

pub trait ClientRepository: Repository<Client> {
    /// Replaces the client stored under `old_client_id`, keeping its secrets.
    fn update_client_with_children(&mut self, old_client_id: &str, client: Client);

    fn add_client_secret(&mut self, client_id: &str, secret: Secret);

    fn remove_client_secret(&mut self, client_id: &str, secret_type: &str, value: &str);

    fn add_client_claim(&mut self, client_id: &str, claim: Claim);

    fn remove_client_claim(&mut self, client_id: &str, claim_type: &str, value: &str);

    fn add_client_property(&mut self, client_id: &str, key: &str, value: &str);

    fn remove_client_property(&mut self, client_id: &str, key: &str);
}

pub trait UserRepository: Repository<User> {
    fn add_user_claim(&mut self, username: &str, claim: Claim);

    fn remove_user_claim(&mut self, username: &str, claim_type: &str, value: &str);

    fn add_user_role(&mut self, username: &str, role: &str);

    fn remove_user_role(&mut self, username: &str, role: &str);
}
