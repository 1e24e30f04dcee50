use async_trait::async_trait;
use pipeline::{CommandHandler, PipelineError, Precondition, Repository, Validated};

use super::{
    ClaimsSynchronizedData, RemoveUserClaim, RemoveUserRole, SaveUserClaim, SaveUserRole,
    SynchronizeClaims, UserClaimData, UserEvent, UserRoleData,
};
use crate::model::{Claim, User};
use crate::repository::UserRepository;
use crate::store::{AdminSession, AdminStore};

/// One staged step of a claims synchronisation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimChange {
    Add(Claim),
    Remove(Claim),
}

/// Diffs `requested` against `current`, matching claims by type.
///
/// A missing type yields one add. A differing value yields a remove of the
/// current claim followed by an add. An identical claim yields nothing.
pub fn claim_changes(current: &[Claim], requested: &[Claim]) -> Vec<ClaimChange> {
    let mut changes = Vec::new();
    for claim in requested {
        match current.iter().find(|c| c.claim_type == claim.claim_type) {
            None => changes.push(ClaimChange::Add(claim.clone())),
            Some(existing) if existing.value != claim.value => {
                changes.push(ClaimChange::Remove(existing.clone()));
                changes.push(ClaimChange::Add(claim.clone()));
            }
            Some(_) => {}
        }
    }
    changes
}

/// Handles every user command.
#[derive(Clone)]
pub struct UserHandler {
    store: AdminStore,
}

impl UserHandler {
    pub fn new(store: AdminStore) -> Self {
        Self { store }
    }
}

async fn existing_user(
    session: &AdminSession,
    username: &str,
) -> Result<Precondition<User>, PipelineError> {
    Ok(match Repository::<User>::get(session, username).await? {
        Some(user) => Precondition::Satisfied(user),
        None => Precondition::rejected("Username", "User not found"),
    })
}

#[async_trait]
impl CommandHandler<SaveUserClaim> for UserHandler {
    type Session = AdminSession;
    type Target = User;
    type Event = UserEvent;

    fn begin(&self) -> AdminSession {
        self.store.session()
    }

    async fn check(
        &self,
        command: &Validated<SaveUserClaim>,
        session: &AdminSession,
    ) -> Result<Precondition<User>, PipelineError> {
        existing_user(session, &command.username).await
    }

    async fn apply(
        &self,
        command: &Validated<SaveUserClaim>,
        user: User,
        session: &mut AdminSession,
    ) -> Result<UserEvent, PipelineError> {
        session.add_user_claim(&user.username, command.claim.clone());
        Ok(UserEvent::UserClaimSaved(UserClaimData {
            username: user.username,
            claim: command.claim.clone(),
        }))
    }
}

#[async_trait]
impl CommandHandler<RemoveUserClaim> for UserHandler {
    type Session = AdminSession;
    type Target = User;
    type Event = UserEvent;

    fn begin(&self) -> AdminSession {
        self.store.session()
    }

    async fn check(
        &self,
        command: &Validated<RemoveUserClaim>,
        session: &AdminSession,
    ) -> Result<Precondition<User>, PipelineError> {
        let user = match existing_user(session, &command.username).await? {
            Precondition::Satisfied(user) => user,
            rejected => return Ok(rejected),
        };
        if !user.claims.contains(&command.claim) {
            return Ok(Precondition::rejected("Claim", "Invalid claim"));
        }
        Ok(Precondition::Satisfied(user))
    }

    async fn apply(
        &self,
        command: &Validated<RemoveUserClaim>,
        user: User,
        session: &mut AdminSession,
    ) -> Result<UserEvent, PipelineError> {
        let claim = command.claim.clone();
        session.remove_user_claim(&user.username, &claim.claim_type, &claim.value);
        Ok(UserEvent::UserClaimRemoved(UserClaimData {
            username: user.username,
            claim,
        }))
    }
}

#[async_trait]
impl CommandHandler<SaveUserRole> for UserHandler {
    type Session = AdminSession;
    type Target = User;
    type Event = UserEvent;

    fn begin(&self) -> AdminSession {
        self.store.session()
    }

    async fn check(
        &self,
        command: &Validated<SaveUserRole>,
        session: &AdminSession,
    ) -> Result<Precondition<User>, PipelineError> {
        let user = match existing_user(session, &command.username).await? {
            Precondition::Satisfied(user) => user,
            rejected => return Ok(rejected),
        };
        if user.roles.contains(&command.role) {
            return Ok(Precondition::rejected("Role", "Role already assigned"));
        }
        Ok(Precondition::Satisfied(user))
    }

    async fn apply(
        &self,
        command: &Validated<SaveUserRole>,
        user: User,
        session: &mut AdminSession,
    ) -> Result<UserEvent, PipelineError> {
        session.add_user_role(&user.username, &command.role);
        Ok(UserEvent::UserRoleSaved(UserRoleData {
            username: user.username,
            role: command.role.clone(),
        }))
    }
}

#[async_trait]
impl CommandHandler<RemoveUserRole> for UserHandler {
    type Session = AdminSession;
    type Target = User;
    type Event = UserEvent;

    fn begin(&self) -> AdminSession {
        self.store.session()
    }

    async fn check(
        &self,
        command: &Validated<RemoveUserRole>,
        session: &AdminSession,
    ) -> Result<Precondition<User>, PipelineError> {
        let user = match existing_user(session, &command.username).await? {
            Precondition::Satisfied(user) => user,
            rejected => return Ok(rejected),
        };
        if !user.roles.contains(&command.role) {
            return Ok(Precondition::rejected("Role", "Invalid role"));
        }
        Ok(Precondition::Satisfied(user))
    }

    async fn apply(
        &self,
        command: &Validated<RemoveUserRole>,
        user: User,
        session: &mut AdminSession,
    ) -> Result<UserEvent, PipelineError> {
        session.remove_user_role(&user.username, &command.role);
        Ok(UserEvent::UserRoleRemoved(UserRoleData {
            username: user.username,
            role: command.role.clone(),
        }))
    }
}

#[async_trait]
impl CommandHandler<SynchronizeClaims> for UserHandler {
    type Session = AdminSession;
    type Target = User;
    type Event = UserEvent;

    fn begin(&self) -> AdminSession {
        self.store.session()
    }

    async fn check(
        &self,
        command: &Validated<SynchronizeClaims>,
        session: &AdminSession,
    ) -> Result<Precondition<User>, PipelineError> {
        existing_user(session, &command.username).await
    }

    async fn apply(
        &self,
        command: &Validated<SynchronizeClaims>,
        user: User,
        session: &mut AdminSession,
    ) -> Result<UserEvent, PipelineError> {
        let changes = claim_changes(&user.claims, &command.claims);
        tracing::debug!(username = %user.username, changes = changes.len(), "synchronizing claims");
        for change in changes {
            match change {
                ClaimChange::Add(claim) => session.add_user_claim(&user.username, claim),
                ClaimChange::Remove(claim) => {
                    session.remove_user_claim(&user.username, &claim.claim_type, &claim.value)
                }
            }
        }
        Ok(UserEvent::ClaimsSynchronized(ClaimsSynchronizedData {
            username: user.username,
            claims: command.claims.clone(),
        }))
    }
}
