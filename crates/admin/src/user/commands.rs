use std::collections::BTreeSet;

use common::AggregateId;
use pipeline::command::{required, run_rules};
use pipeline::{Command, FieldError, ValidationResult};

use crate::model::Claim;
use crate::validation;

#[derive(Debug, Clone)]
pub struct SaveUserClaim {
    pub username: String,
    pub claim: Claim,
}

impl SaveUserClaim {
    pub fn new(username: impl Into<String>, claim: Claim) -> Self {
        Self {
            username: username.into(),
            claim,
        }
    }
}

impl Command for SaveUserClaim {
    const NAME: &'static str = "SaveUserClaim";

    fn aggregate_id(&self) -> AggregateId {
        AggregateId::new(&self.username)
    }

    fn validate(&self) -> ValidationResult {
        let mut result = username(&self.username);
        result.merge(validation::claim(&self.claim));
        result
    }
}

#[derive(Debug, Clone)]
pub struct RemoveUserClaim {
    pub username: String,
    pub claim: Claim,
}

impl RemoveUserClaim {
    pub fn new(username: impl Into<String>, claim: Claim) -> Self {
        Self {
            username: username.into(),
            claim,
        }
    }
}

impl Command for RemoveUserClaim {
    const NAME: &'static str = "RemoveUserClaim";

    fn aggregate_id(&self) -> AggregateId {
        AggregateId::new(&self.username)
    }

    fn validate(&self) -> ValidationResult {
        let mut result = username(&self.username);
        result.merge(validation::claim(&self.claim));
        result
    }
}

#[derive(Debug, Clone)]
pub struct SaveUserRole {
    pub username: String,
    pub role: String,
}

impl SaveUserRole {
    pub fn new(username: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            role: role.into(),
        }
    }
}

impl Command for SaveUserRole {
    const NAME: &'static str = "SaveUserRole";

    fn aggregate_id(&self) -> AggregateId {
        AggregateId::new(&self.username)
    }

    fn validate(&self) -> ValidationResult {
        let mut result = username(&self.username);
        result.merge(role(&self.role));
        result
    }
}

#[derive(Debug, Clone)]
pub struct RemoveUserRole {
    pub username: String,
    pub role: String,
}

impl RemoveUserRole {
    pub fn new(username: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            role: role.into(),
        }
    }
}

impl Command for RemoveUserRole {
    const NAME: &'static str = "RemoveUserRole";

    fn aggregate_id(&self) -> AggregateId {
        AggregateId::new(&self.username)
    }

    fn validate(&self) -> ValidationResult {
        let mut result = username(&self.username);
        result.merge(role(&self.role));
        result
    }
}

/// Brings a user's claims in line with the requested set.
///
/// Claims are matched by type. Types the request does not mention are left
/// alone.
#[derive(Debug, Clone)]
pub struct SynchronizeClaims {
    pub username: String,
    pub claims: Vec<Claim>,
}

impl SynchronizeClaims {
    pub fn new(username: impl Into<String>, claims: Vec<Claim>) -> Self {
        Self {
            username: username.into(),
            claims,
        }
    }
}

impl Command for SynchronizeClaims {
    const NAME: &'static str = "SynchronizeClaims";

    fn aggregate_id(&self) -> AggregateId {
        AggregateId::new(&self.username)
    }

    fn validate(&self) -> ValidationResult {
        run_rules(self, &[sync_username, claims_valid, claim_types_unique])
    }
}

fn username(value: &str) -> ValidationResult {
    required("Username", value, "Invalid username")
}

fn role(value: &str) -> ValidationResult {
    required("Role", value, "Invalid role")
}

fn sync_username(command: &SynchronizeClaims) -> ValidationResult {
    username(&command.username)
}

fn claims_valid(command: &SynchronizeClaims) -> ValidationResult {
    command.claims.iter().flat_map(validation::claim).collect()
}

fn claim_types_unique(command: &SynchronizeClaims) -> ValidationResult {
    let mut seen = BTreeSet::new();
    command
        .claims
        .iter()
        .filter(|claim| !seen.insert(claim.claim_type.as_str()))
        .map(|claim| {
            FieldError::new(
                "Claims",
                format!("Duplicate claim type: {}", claim.claim_type),
            )
        })
        .collect()
}
