//! Integration tests for the administration commands.
//!
//! Every test runs commands through a fully wired runtime: in-memory admin
//! store, bus, audit trail and a recording subscriber.

use std::sync::{Arc, Mutex};

use admin::api_resource::{RegisterApiResource, SaveApiSecret, UpdateApiResource};
use admin::api_scope::{RemoveApiScope, SaveApiScope};
use admin::client::{
    RemoveClient, RemoveClientProperty, RemoveClientSecret, SaveClient, SaveClientProperty,
    SaveClientSecret, UpdateClient,
};
use admin::identity_resource::{
    RegisterIdentityResource, RemoveIdentityResource, UpdateIdentityResource,
};
use admin::model::hash_secret;
use admin::persisted_grant::RemovePersistedGrant;
use admin::user::{RemoveUserRole, SaveUserRole, SynchronizeClaims};
use admin::{
    AdminRuntime, AdminStore, AdminTables, ApiResource, ApiScope, Claim, Client,
    IdentityResource, PersistedGrant, Secret, User,
};
use common::AggregateId;
use event_store::EventStore;
use pipeline::{
    CancellationToken, CommandOutcome, CommitError, DomainEvent, EventSubscriber, LifecycleStage,
    PipelineConfig, PipelineError, SubscriberError,
};
use serde_json::json;

#[derive(Default)]
struct Recorder {
    events: Mutex<Vec<DomainEvent>>,
}

impl Recorder {
    fn events(&self) -> Vec<DomainEvent> {
        self.events.lock().unwrap().clone()
    }

    fn kinds(&self) -> Vec<&'static str> {
        self.events().iter().map(DomainEvent::kind).collect()
    }
}

impl EventSubscriber for Recorder {
    fn name(&self) -> &'static str {
        "recorder"
    }

    fn handle(&self, event: &DomainEvent) -> Result<(), SubscriberError> {
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }
}

fn seeded() -> AdminTables {
    let mut billing = ApiResource::new("billing");
    billing.scopes = vec!["billing".to_string(), "billing-api".to_string()];
    billing.secrets.push(Secret::shared("resource-secret").hashed());

    let mut web = Client::new("web", "Web App");
    web.secrets.push(Secret::shared("client-secret").hashed());
    web.properties
        .insert("theme".to_string(), "dark".to_string());

    let mut alice = User::new("alice");
    alice.roles.push("admin".to_string());
    alice.claims = vec![
        Claim::new("email", "old@example.com"),
        Claim::new("name", "Alice"),
    ];

    let mut profile = IdentityResource::new("profile");
    profile.user_claims = vec!["name".to_string(), "website".to_string()];

    AdminTables::default()
        .with(billing)
        .with(ApiScope::new("billing", "billing"))
        .with(ApiScope::new("billing", "billing-api"))
        .with(profile)
        .with(IdentityResource::new("email"))
        .with(web)
        .with(alice)
        .with(PersistedGrant::new("grant-1", "refresh_token", "alice", "web"))
}

async fn start(tables: AdminTables) -> (AdminRuntime, Arc<Recorder>) {
    let recorder = Arc::new(Recorder::default());
    let runtime = AdminRuntime::start_with(
        &PipelineConfig::default(),
        AdminStore::new(tables),
        vec![recorder.clone() as Arc<dyn EventSubscriber>],
    )
    .await
    .unwrap();
    (runtime, recorder)
}

fn notices(outcome: &CommandOutcome) -> Vec<(String, String, String)> {
    outcome
        .notifications()
        .iter()
        .map(|n| {
            (
                n.key().to_string(),
                n.message().to_string(),
                n.aggregate_id().as_str().to_string(),
            )
        })
        .collect()
}

fn notice(key: &str, message: &str, aggregate_id: &str) -> (String, String, String) {
    (key.to_string(), message.to_string(), aggregate_id.to_string())
}

mod scenarios {
    use super::*;

    #[tokio::test]
    async fn removing_missing_scope_is_rejected() {
        let (runtime, recorder) = start(AdminTables::default()).await;

        let outcome = runtime
            .dispatch(RemoveApiScope::new("billing-api"))
            .await
            .unwrap();

        assert!(!outcome.is_accepted());
        assert_eq!(outcome.rejected_at(), Some(LifecycleStage::Precondition));
        assert_eq!(
            notices(&outcome),
            vec![notice("Api Scope", "Scope not found", "billing-api")]
        );
        assert_eq!(runtime.store().commit_count(), 0);
        assert!(recorder.events().is_empty());
    }

    #[tokio::test]
    async fn removing_existing_scope_commits_and_publishes_once() {
        let (runtime, recorder) = start(seeded()).await;

        let outcome = runtime
            .dispatch(RemoveApiScope::new("billing-api"))
            .await
            .unwrap();

        assert!(outcome.is_accepted());
        assert!(outcome.notifications().is_empty());
        assert_eq!(runtime.store().commit_count(), 1);
        assert!(
            runtime
                .store()
                .find::<ApiScope>("billing-api")
                .await
                .is_none()
        );
        let billing = runtime
            .store()
            .find::<ApiResource>("billing")
            .await
            .unwrap();
        assert_eq!(billing.scopes, vec!["billing"]);

        let events = recorder.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind(), "ApiScopeRemoved");
        assert_eq!(events[0].aggregate_id().as_str(), "billing-api");
        assert_eq!(
            events[0].payload(),
            &json!({"type": "ApiScopeRemoved", "data": {"name": "billing-api"}})
        );
    }

    #[tokio::test]
    async fn registering_existing_resource_is_rejected() {
        let (runtime, recorder) = start(seeded()).await;

        let outcome = runtime
            .dispatch(RegisterApiResource::new(ApiResource::new("billing")))
            .await
            .unwrap();

        assert!(!outcome.is_accepted());
        assert_eq!(
            notices(&outcome),
            vec![notice("Api", "Resource already exists", "billing")]
        );
        assert_eq!(runtime.store().count::<ApiResource>().await, 1);
        assert_eq!(runtime.store().commit_count(), 0);
        assert!(recorder.events().is_empty());
    }

    #[tokio::test]
    async fn client_uri_with_trailing_slash_fails_validation() {
        let (runtime, recorder) = start(seeded()).await;
        let mut client = Client::new("web", "Web App");
        client.client_uri = Some("https://app.example.com/".to_string());

        let outcome = runtime
            .dispatch(UpdateClient::new("web", client))
            .await
            .unwrap();

        assert!(!outcome.is_accepted());
        assert_eq!(outcome.rejected_at(), Some(LifecycleStage::Validation));
        assert_eq!(
            notices(&outcome),
            vec![notice(
                "ClientUri",
                "URI must not end with '/': https://app.example.com/",
                "web"
            )]
        );
        assert_eq!(runtime.store().commit_count(), 0);
        assert!(recorder.events().is_empty());
    }

    #[tokio::test]
    async fn synchronizing_claims_replaces_differing_value() {
        let (runtime, recorder) = start(seeded()).await;
        let requested = vec![
            Claim::new("email", "new@example.com"),
            Claim::new("name", "Alice"),
        ];

        let outcome = runtime
            .dispatch(SynchronizeClaims::new("alice", requested.clone()))
            .await
            .unwrap();

        assert!(outcome.is_accepted());
        assert_eq!(runtime.store().commit_count(), 1);
        let alice = runtime.store().find::<User>("alice").await.unwrap();
        assert_eq!(
            alice.claims,
            vec![
                Claim::new("name", "Alice"),
                Claim::new("email", "new@example.com"),
            ]
        );

        let events = recorder.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind(), "ClaimsSynchronized");
        assert_eq!(
            events[0].payload()["data"]["claims"],
            serde_json::to_value(&requested).unwrap()
        );
    }
}

mod protocol {
    use super::*;

    #[tokio::test]
    async fn validation_errors_arrive_in_rule_order() {
        let (runtime, recorder) = start(seeded()).await;
        let mut client = Client::new("", "");
        client.allowed_grant_types = vec!["implicit".into(), "authorization_code".into()];

        let outcome = runtime
            .dispatch(UpdateClient::new("", client))
            .await
            .unwrap();

        let keys: Vec<_> = notices(&outcome).into_iter().map(|(k, _, _)| k).collect();
        assert_eq!(
            keys,
            vec!["ClientId", "ClientName", "OldClientId", "AllowedGrantTypes"]
        );
        assert_eq!(runtime.store().commit_count(), 0);
        assert!(recorder.events().is_empty());
    }

    #[tokio::test]
    async fn one_event_per_accepted_command() {
        let (runtime, recorder) = start(seeded()).await;

        let outcomes = vec![
            runtime
                .dispatch(SaveClient::new(Client::new("mobile", "Mobile")))
                .await
                .unwrap(),
            runtime
                .dispatch(SaveClient::new(Client::new("mobile", "Mobile")))
                .await
                .unwrap(),
            runtime
                .dispatch(SaveUserRole::new("alice", "auditor"))
                .await
                .unwrap(),
            runtime
                .dispatch(SaveApiScope::new("billing", ApiScope::new("", "billing-read")))
                .await
                .unwrap(),
        ];

        let accepted = outcomes.iter().filter(|o| o.is_accepted()).count();
        assert_eq!(accepted, 3);
        assert_eq!(runtime.store().commit_count(), 3);
        assert_eq!(
            recorder.kinds(),
            vec!["ClientSaved", "UserRoleSaved", "ApiScopeSaved"]
        );
    }

    #[tokio::test]
    async fn removing_absent_client_twice_is_rejected_twice() {
        let (runtime, recorder) = start(seeded()).await;

        let first = runtime.dispatch(RemoveClient::new("ghost")).await.unwrap();
        let second = runtime.dispatch(RemoveClient::new("ghost")).await.unwrap();

        assert!(!first.is_accepted());
        assert!(!second.is_accepted());
        assert_eq!(notices(&first), notices(&second));
        assert_eq!(
            notices(&first),
            vec![notice("Client", "Client not found", "ghost")]
        );
        assert!(recorder.events().is_empty());
    }

    #[tokio::test]
    async fn failed_commit_leaves_nothing_behind() {
        let (runtime, recorder) = start(seeded()).await;
        runtime.store().fail_on_mutation(2);

        let outcome = runtime
            .dispatch(SynchronizeClaims::new(
                "alice",
                vec![Claim::new("email", "new@example.com")],
            ))
            .await
            .unwrap();

        assert!(!outcome.is_accepted());
        assert_eq!(outcome.rejected_at(), Some(LifecycleStage::Commit));
        assert!(outcome.notifications().is_empty());
        assert!(matches!(
            outcome.commit_failure(),
            Some(CommitError::Mutation { index: 2, .. })
        ));

        let alice = runtime.store().find::<User>("alice").await.unwrap();
        assert!(alice.claims.contains(&Claim::new("email", "old@example.com")));
        assert!(!alice.claims.contains(&Claim::new("email", "new@example.com")));
        assert!(recorder.events().is_empty());

        // fault injection is one-shot
        let retry = runtime
            .dispatch(SynchronizeClaims::new(
                "alice",
                vec![Claim::new("email", "new@example.com")],
            ))
            .await
            .unwrap();
        assert!(retry.is_accepted());
        assert_eq!(recorder.kinds(), vec!["ClaimsSynchronized"]);
    }

    #[tokio::test]
    async fn failed_registration_does_not_leave_resource() {
        let (runtime, recorder) = start(AdminTables::default()).await;
        runtime.store().fail_on_mutation(2);

        let outcome = runtime
            .dispatch(RegisterApiResource::new(ApiResource::new("orders")))
            .await
            .unwrap();

        assert!(!outcome.is_accepted());
        assert!(runtime.store().find::<ApiResource>("orders").await.is_none());
        assert_eq!(runtime.store().count::<ApiScope>().await, 0);
        assert!(recorder.events().is_empty());
    }

    #[tokio::test]
    async fn cancelled_dispatch_changes_nothing() {
        let (runtime, recorder) = start(seeded()).await;
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = runtime
            .bus()
            .dispatch_with_cancel(RemoveClient::new("web"), &cancel)
            .await;

        assert!(matches!(result, Err(PipelineError::Cancelled("RemoveClient"))));
        assert!(runtime.store().find::<Client>("web").await.is_some());
        assert_eq!(runtime.store().commit_count(), 0);
        assert!(recorder.events().is_empty());
    }
}

mod api_resources {
    use super::*;

    #[tokio::test]
    async fn registered_resource_gets_its_own_scope() {
        let (runtime, _recorder) = start(AdminTables::default()).await;

        let outcome = runtime
            .dispatch(RegisterApiResource::new(ApiResource::new("orders")))
            .await
            .unwrap();

        assert!(outcome.is_accepted());
        let scope = runtime.store().find::<ApiScope>("orders").await.unwrap();
        assert_eq!(scope.resource_name, "orders");
        let resource = runtime
            .store()
            .find::<ApiResource>("orders")
            .await
            .unwrap();
        assert_eq!(resource.scopes, vec!["orders"]);
    }

    #[tokio::test]
    async fn rename_keeps_secrets_and_moves_scopes() {
        let (runtime, _recorder) = start(seeded()).await;
        let mut renamed = ApiResource::new("payments");
        renamed.display_name = Some("Payments".to_string());

        let outcome = runtime
            .dispatch(UpdateApiResource::new("billing", renamed))
            .await
            .unwrap();

        assert!(outcome.is_accepted());
        assert!(runtime.store().find::<ApiResource>("billing").await.is_none());
        let payments = runtime
            .store()
            .find::<ApiResource>("payments")
            .await
            .unwrap();
        assert_eq!(payments.secrets.len(), 1);
        assert_eq!(payments.scopes, vec!["billing", "billing-api"]);
        assert_eq!(payments.display_name.as_deref(), Some("Payments"));
        let scope = runtime
            .store()
            .find::<ApiScope>("billing-api")
            .await
            .unwrap();
        assert_eq!(scope.resource_name, "payments");
    }

    #[tokio::test]
    async fn scope_for_unknown_resource_is_rejected() {
        let (runtime, _recorder) = start(AdminTables::default()).await;

        let outcome = runtime
            .dispatch(SaveApiScope::new("nowhere", ApiScope::new("", "read")))
            .await
            .unwrap();

        assert_eq!(
            notices(&outcome),
            vec![notice("Api", "Api not found", "read")]
        );
    }

    #[tokio::test]
    async fn api_secret_is_stored_hashed() {
        let (runtime, recorder) = start(seeded()).await;

        let outcome = runtime
            .dispatch(SaveApiSecret::new("billing", Secret::shared("second")))
            .await
            .unwrap();

        assert!(outcome.is_accepted());
        let billing = runtime
            .store()
            .find::<ApiResource>("billing")
            .await
            .unwrap();
        assert!(billing.secrets.iter().any(|s| s.value == hash_secret("second")));
        assert!(!billing.secrets.iter().any(|s| s.value == "second"));
        assert_eq!(
            recorder.events()[0].payload()["data"],
            json!({"resource_name": "billing", "secret_type": "SharedSecret"})
        );
    }
}

mod identity_resources {
    use super::*;

    #[tokio::test]
    async fn registered_resource_is_stored_and_announced() {
        let (runtime, recorder) = start(AdminTables::default()).await;
        let mut openid = IdentityResource::new("openid");
        openid.required = true;
        openid.user_claims = vec!["sub".to_string()];

        let outcome = runtime
            .dispatch(RegisterIdentityResource::new(openid.clone()))
            .await
            .unwrap();

        assert!(outcome.is_accepted());
        assert_eq!(
            runtime.store().find::<IdentityResource>("openid").await,
            Some(openid)
        );
        assert_eq!(recorder.kinds(), vec!["IdentityResourceRegistered"]);
    }

    #[tokio::test]
    async fn registering_existing_name_is_rejected() {
        let (runtime, recorder) = start(seeded()).await;

        let outcome = runtime
            .dispatch(RegisterIdentityResource::new(IdentityResource::new("profile")))
            .await
            .unwrap();

        assert_eq!(
            notices(&outcome),
            vec![notice("Identity Resource", "Resource already exists", "profile")]
        );
        assert!(recorder.events().is_empty());
    }

    #[tokio::test]
    async fn rename_replaces_the_stored_resource() {
        let (runtime, recorder) = start(seeded()).await;
        let mut renamed = IdentityResource::new("public-profile");
        renamed.user_claims = vec!["name".to_string()];

        let outcome = runtime
            .dispatch(UpdateIdentityResource::new("profile", renamed))
            .await
            .unwrap();

        assert!(outcome.is_accepted());
        let store = runtime.store();
        assert!(store.find::<IdentityResource>("profile").await.is_none());
        let stored = store
            .find::<IdentityResource>("public-profile")
            .await
            .unwrap();
        assert_eq!(stored.user_claims, vec!["name"]);
        assert_eq!(
            recorder.events()[0].payload()["data"]["old_name"],
            json!("profile")
        );
    }

    #[tokio::test]
    async fn rename_onto_existing_resource_is_rejected() {
        let (runtime, _recorder) = start(seeded()).await;

        let outcome = runtime
            .dispatch(UpdateIdentityResource::new(
                "profile",
                IdentityResource::new("email"),
            ))
            .await
            .unwrap();

        assert_eq!(
            notices(&outcome),
            vec![notice("Identity Resource", "Resource already exists", "profile")]
        );
        assert_eq!(runtime.store().count::<IdentityResource>().await, 2);
    }

    #[tokio::test]
    async fn updating_or_removing_unknown_resource_is_rejected() {
        let (runtime, _recorder) = start(AdminTables::default()).await;

        let update = runtime
            .dispatch(UpdateIdentityResource::new(
                "address",
                IdentityResource::new("address"),
            ))
            .await
            .unwrap();
        let remove = runtime
            .dispatch(RemoveIdentityResource::new("address"))
            .await
            .unwrap();

        for outcome in [update, remove] {
            assert_eq!(
                notices(&outcome),
                vec![notice("Identity Resource", "Resource not found", "address")]
            );
        }
        assert_eq!(runtime.store().commit_count(), 0);
    }

    #[tokio::test]
    async fn removal_deletes_the_resource() {
        let (runtime, recorder) = start(seeded()).await;

        let outcome = runtime
            .dispatch(RemoveIdentityResource::new("email"))
            .await
            .unwrap();

        assert!(outcome.is_accepted());
        assert!(runtime.store().find::<IdentityResource>("email").await.is_none());
        assert_eq!(recorder.kinds(), vec!["IdentityResourceRemoved"]);
    }
}

mod persisted_grants {
    use super::*;

    #[tokio::test]
    async fn revoking_a_grant_removes_it() {
        let (runtime, recorder) = start(seeded()).await;

        let outcome = runtime
            .dispatch(RemovePersistedGrant::new("grant-1"))
            .await
            .unwrap();

        assert!(outcome.is_accepted());
        assert_eq!(runtime.store().count::<PersistedGrant>().await, 0);
        let events = recorder.events();
        assert_eq!(events[0].kind(), "PersistedGrantRemoved");
        assert_eq!(
            events[0].payload()["data"],
            json!({
                "key": "grant-1",
                "grant_type": "refresh_token",
                "client_id": "web",
                "subject_id": "alice",
            })
        );
    }

    #[tokio::test]
    async fn unknown_grant_is_rejected() {
        let (runtime, recorder) = start(seeded()).await;

        let outcome = runtime
            .dispatch(RemovePersistedGrant::new("grant-2"))
            .await
            .unwrap();

        assert_eq!(
            notices(&outcome),
            vec![notice("Persisted Grant", "Grant not found", "grant-2")]
        );
        assert_eq!(runtime.store().count::<PersistedGrant>().await, 1);
        assert!(recorder.events().is_empty());
    }

    #[tokio::test]
    async fn blank_key_fails_validation() {
        let (runtime, _recorder) = start(seeded()).await;

        let outcome = runtime
            .dispatch(RemovePersistedGrant::new(""))
            .await
            .unwrap();

        assert_eq!(outcome.rejected_at(), Some(LifecycleStage::Validation));
        assert_eq!(
            notices(&outcome),
            vec![notice("Key", "Grant key is required", "")]
        );
    }
}

mod clients {
    use super::*;

    #[tokio::test]
    async fn saved_client_never_takes_input_secrets() {
        let (runtime, _recorder) = start(AdminTables::default()).await;
        let mut client = Client::new("mobile", "Mobile");
        client.secrets.push(Secret::shared("smuggled"));

        let outcome = runtime.dispatch(SaveClient::new(client)).await.unwrap();

        assert!(outcome.is_accepted());
        let stored = runtime.store().find::<Client>("mobile").await.unwrap();
        assert!(stored.secrets.is_empty());
    }

    #[tokio::test]
    async fn update_keeps_stored_secrets() {
        let (runtime, _recorder) = start(seeded()).await;
        let mut client = Client::new("web", "Web Portal");
        client.client_uri = Some("https://portal.example.com".to_string());

        let outcome = runtime
            .dispatch(UpdateClient::new("web", client))
            .await
            .unwrap();

        assert!(outcome.is_accepted());
        let stored = runtime.store().find::<Client>("web").await.unwrap();
        assert_eq!(stored.client_name, "Web Portal");
        assert_eq!(stored.secrets.len(), 1);
    }

    #[tokio::test]
    async fn secrets_are_removed_by_stored_value() {
        let (runtime, _recorder) = start(seeded()).await;

        let wrong = runtime
            .dispatch(RemoveClientSecret::new("web", "SharedSecret", "client-secret"))
            .await
            .unwrap();
        assert_eq!(
            notices(&wrong),
            vec![notice("Secret", "Invalid secret", "web")]
        );

        let added = runtime
            .dispatch(SaveClientSecret::new("web", Secret::shared("other")))
            .await
            .unwrap();
        assert!(added.is_accepted());

        let removed = runtime
            .dispatch(RemoveClientSecret::new(
                "web",
                "SharedSecret",
                hash_secret("client-secret"),
            ))
            .await
            .unwrap();
        assert!(removed.is_accepted());

        let stored = runtime.store().find::<Client>("web").await.unwrap();
        assert_eq!(stored.secrets, vec![Secret::shared("other").hashed()]);
    }

    #[tokio::test]
    async fn properties_round_through_the_store() {
        let (runtime, recorder) = start(seeded()).await;

        let missing = runtime
            .dispatch(RemoveClientProperty::new("web", "locale"))
            .await
            .unwrap();
        assert_eq!(
            notices(&missing),
            vec![notice("Property", "Property not found", "web")]
        );

        runtime
            .dispatch(SaveClientProperty::new("web", "locale", "en"))
            .await
            .unwrap();
        runtime
            .dispatch(RemoveClientProperty::new("web", "theme"))
            .await
            .unwrap();

        let stored = runtime.store().find::<Client>("web").await.unwrap();
        assert_eq!(stored.properties.get("locale").map(String::as_str), Some("en"));
        assert!(!stored.properties.contains_key("theme"));
        assert_eq!(
            recorder.kinds(),
            vec!["ClientPropertySaved", "ClientPropertyRemoved"]
        );
    }
}

mod users {
    use super::*;

    #[tokio::test]
    async fn unknown_user_is_reported_by_username() {
        let (runtime, _recorder) = start(seeded()).await;

        let outcome = runtime
            .dispatch(SaveUserRole::new("bob", "admin"))
            .await
            .unwrap();

        assert_eq!(
            notices(&outcome),
            vec![notice("Username", "User not found", "bob")]
        );
    }

    #[tokio::test]
    async fn identical_claims_commit_without_changes() {
        let (runtime, recorder) = start(seeded()).await;

        let outcome = runtime
            .dispatch(SynchronizeClaims::new(
                "alice",
                vec![Claim::new("name", "Alice")],
            ))
            .await
            .unwrap();

        assert!(outcome.is_accepted());
        let alice = runtime.store().find::<User>("alice").await.unwrap();
        assert_eq!(alice.claims.len(), 2);
        assert_eq!(recorder.kinds(), vec!["ClaimsSynchronized"]);
    }

    #[tokio::test]
    async fn role_removal_requires_assignment() {
        let (runtime, _recorder) = start(seeded()).await;

        let missing = runtime
            .dispatch(RemoveUserRole::new("alice", "auditor"))
            .await
            .unwrap();
        assert_eq!(
            notices(&missing),
            vec![notice("Role", "Invalid role", "alice")]
        );

        let removed = runtime
            .dispatch(RemoveUserRole::new("alice", "admin"))
            .await
            .unwrap();
        assert!(removed.is_accepted());
        let alice = runtime.store().find::<User>("alice").await.unwrap();
        assert!(alice.roles.is_empty());
    }
}

mod audit {
    use super::*;

    #[tokio::test]
    async fn accepted_commands_reach_the_audit_log_in_order() {
        let (runtime, _recorder) = start(seeded()).await;

        runtime
            .dispatch(SaveUserRole::new("alice", "auditor"))
            .await
            .unwrap();
        runtime
            .dispatch(RemoveClient::new("ghost"))
            .await
            .unwrap();
        runtime
            .dispatch(RemoveApiScope::new("billing-api"))
            .await
            .unwrap();
        runtime.flush_audit().await.unwrap();

        let log = runtime.audit_log();
        assert_eq!(log.event_count().await.unwrap(), 2);

        let alice = log
            .get_events_for_aggregate(&AggregateId::new("alice"))
            .await
            .unwrap();
        assert_eq!(alice.len(), 1);
        assert_eq!(alice[0].event_type, "UserRoleSaved");
        assert_eq!(alice[0].aggregate_type, "User");

        let removed = log.get_events_by_type("ApiScopeRemoved").await.unwrap();
        assert_eq!(removed.len(), 1);
        assert_eq!(removed[0].aggregate_id.as_str(), "billing-api");

        runtime.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn history_pages_through_numbered_revisions() {
        let (runtime, _recorder) = start(seeded()).await;

        for (key, value) in [("locale", "en"), ("region", "eu")] {
            runtime
                .dispatch(SaveClientProperty::new("web", key, value))
                .await
                .unwrap();
        }
        runtime
            .dispatch(RemoveClientProperty::new("web", "theme"))
            .await
            .unwrap();
        runtime
            .dispatch(SaveUserRole::new("alice", "auditor"))
            .await
            .unwrap();
        runtime.flush_audit().await.unwrap();

        let first = runtime.history("web", 0, 2).await.unwrap();
        let kinds: Vec<_> = first.iter().map(|e| e.event_type.as_str()).collect();
        assert_eq!(kinds, vec!["ClientPropertySaved", "ClientPropertySaved"]);
        let revisions: Vec<_> = first.iter().filter_map(|e| e.version).map(|v| v.as_i64()).collect();
        assert_eq!(revisions, vec![1, 2]);

        let second = runtime.history("web", 1, 2).await.unwrap();
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].event_type, "ClientPropertyRemoved");
        assert_eq!(second[0].version.map(|v| v.as_i64()), Some(3));

        let alice = runtime.history("alice", 0, 10).await.unwrap();
        assert_eq!(alice.len(), 1);
        assert_eq!(alice[0].version.map(|v| v.as_i64()), Some(1));
        assert!(runtime.history("web", 5, 2).await.unwrap().is_empty());
    }
}
