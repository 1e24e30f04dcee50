//! Bus wiring for the administration commands.

use std::sync::Arc;

use pipeline::{AuditTrail, Bus, EventSubscriber, PipelineError};

use crate::api_resource::{
    ApiResourceHandler, RegisterApiResource, RemoveApiResource, RemoveApiSecret, SaveApiSecret,
    UpdateApiResource,
};
use crate::api_scope::{ApiScopeHandler, RemoveApiScope, SaveApiScope};
use crate::client::{
    ClientHandler, RemoveClient, RemoveClientClaim, RemoveClientProperty, RemoveClientSecret,
    SaveClient, SaveClientClaim, SaveClientProperty, SaveClientSecret, UpdateClient,
};
use crate::identity_resource::{
    IdentityResourceHandler, RegisterIdentityResource, RemoveIdentityResource,
    UpdateIdentityResource,
};
use crate::persisted_grant::{PersistedGrantHandler, RemovePersistedGrant};
use crate::store::AdminStore;
use crate::user::{
    RemoveUserClaim, RemoveUserRole, SaveUserClaim, SaveUserRole, SynchronizeClaims, UserHandler,
};

/// Builds the bus with every administration handler registered against
/// `store`.
///
/// The audit trail is always the first subscriber; `extra` subscribers
/// receive every event after it, in the given order.
pub fn build_bus(
    store: &AdminStore,
    audit: AuditTrail,
    extra: impl IntoIterator<Item = Arc<dyn EventSubscriber>>,
) -> Result<Bus, PipelineError> {
    let scopes = ApiScopeHandler::new(store.clone());
    let resources = ApiResourceHandler::new(store.clone());
    let identity_resources = IdentityResourceHandler::new(store.clone());
    let clients = ClientHandler::new(store.clone());
    let users = UserHandler::new(store.clone());
    let grants = PersistedGrantHandler::new(store.clone());

    let mut builder = Bus::builder()
        .register_handler::<SaveApiScope, _>(scopes.clone())
        .register_handler::<RemoveApiScope, _>(scopes)
        .register_handler::<RegisterApiResource, _>(resources.clone())
        .register_handler::<UpdateApiResource, _>(resources.clone())
        .register_handler::<RemoveApiResource, _>(resources.clone())
        .register_handler::<SaveApiSecret, _>(resources.clone())
        .register_handler::<RemoveApiSecret, _>(resources)
        .register_handler::<RegisterIdentityResource, _>(identity_resources.clone())
        .register_handler::<UpdateIdentityResource, _>(identity_resources.clone())
        .register_handler::<RemoveIdentityResource, _>(identity_resources)
        .register_handler::<SaveClient, _>(clients.clone())
        .register_handler::<UpdateClient, _>(clients.clone())
        .register_handler::<RemoveClient, _>(clients.clone())
        .register_handler::<SaveClientSecret, _>(clients.clone())
        .register_handler::<RemoveClientSecret, _>(clients.clone())
        .register_handler::<SaveClientClaim, _>(clients.clone())
        .register_handler::<RemoveClientClaim, _>(clients.clone())
        .register_handler::<SaveClientProperty, _>(clients.clone())
        .register_handler::<RemoveClientProperty, _>(clients)
        .register_handler::<SaveUserClaim, _>(users.clone())
        .register_handler::<RemoveUserClaim, _>(users.clone())
        .register_handler::<SaveUserRole, _>(users.clone())
        .register_handler::<RemoveUserRole, _>(users.clone())
        .register_handler::<SynchronizeClaims, _>(users)
        .register_handler::<RemovePersistedGrant, _>(grants)
        .subscribe_all(Arc::new(audit));

    for subscriber in extra {
        builder = builder.subscribe_all(subscriber);
    }

    builder.build()
}
