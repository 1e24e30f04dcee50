use common::AggregateId;
use pipeline::command::{required, run_rules};
use pipeline::{Command, ToModel, ValidationResult};

use crate::model::IdentityResource;

#[derive(Debug, Clone)]
pub struct RegisterIdentityResource {
    pub resource: IdentityResource,
}

impl RegisterIdentityResource {
    pub fn new(resource: IdentityResource) -> Self {
        Self { resource }
    }
}

impl Command for RegisterIdentityResource {
    const NAME: &'static str = "RegisterIdentityResource";

    fn aggregate_id(&self) -> AggregateId {
        AggregateId::new(&self.resource.name)
    }

    fn validate(&self) -> ValidationResult {
        run_rules(&self.resource, &[resource_name, user_claims])
    }
}

impl ToModel for RegisterIdentityResource {
    type Model = IdentityResource;

    fn project(&self) -> IdentityResource {
        IdentityResource {
            user_claims: first_occurrences(&self.resource.user_claims),
            ..self.resource.clone()
        }
    }
}

/// Replaces the resource stored under `old_name`, possibly renaming it.
#[derive(Debug, Clone)]
pub struct UpdateIdentityResource {
    pub resource: IdentityResource,
    pub old_name: String,
}

impl UpdateIdentityResource {
    pub fn new(old_name: impl Into<String>, resource: IdentityResource) -> Self {
        Self {
            resource,
            old_name: old_name.into(),
        }
    }

    pub fn is_rename(&self) -> bool {
        self.resource.name != self.old_name
    }
}

impl Command for UpdateIdentityResource {
    const NAME: &'static str = "UpdateIdentityResource";

    fn aggregate_id(&self) -> AggregateId {
        AggregateId::new(&self.old_name)
    }

    fn validate(&self) -> ValidationResult {
        let mut result = run_rules(&self.resource, &[resource_name, user_claims]);
        result.merge(required(
            "OldName",
            &self.old_name,
            "Invalid old resource name",
        ));
        result
    }
}

impl ToModel for UpdateIdentityResource {
    type Model = IdentityResource;

    fn project(&self) -> IdentityResource {
        IdentityResource {
            user_claims: first_occurrences(&self.resource.user_claims),
            ..self.resource.clone()
        }
    }
}

#[derive(Debug, Clone)]
pub struct RemoveIdentityResource {
    pub name: String,
}

impl RemoveIdentityResource {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Command for RemoveIdentityResource {
    const NAME: &'static str = "RemoveIdentityResource";

    fn aggregate_id(&self) -> AggregateId {
        AggregateId::new(&self.name)
    }

    fn validate(&self) -> ValidationResult {
        required("Name", &self.name, "Invalid resource name")
    }
}

fn resource_name(resource: &IdentityResource) -> ValidationResult {
    required("Name", &resource.name, "Invalid resource name")
}

fn user_claims(resource: &IdentityResource) -> ValidationResult {
    if resource.user_claims.iter().any(|c| c.trim().is_empty()) {
        return ValidationResult::error("UserClaims", "Claim type is required");
    }
    ValidationResult::new()
}

fn first_occurrences(claims: &[String]) -> Vec<String> {
    let mut unique: Vec<String> = Vec::with_capacity(claims.len());
    for claim in claims {
        if !unique.contains(claim) {
            unique.push(claim.clone());
        }
    }
    unique
}
