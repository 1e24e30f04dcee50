use common::AggregateId;
use pipeline::command::{required, run_rules};
use pipeline::{Command, ToModel, ValidationResult};

use crate::model::{ApiResource, Secret};
use crate::validation;

/// Registers a new API resource.
///
/// The stored resource always owns a scope named after itself. Secrets are
/// added separately through [`SaveApiSecret`].
#[derive(Debug, Clone)]
pub struct RegisterApiResource {
    pub resource: ApiResource,
}

impl RegisterApiResource {
    pub fn new(resource: ApiResource) -> Self {
        Self { resource }
    }
}

impl Command for RegisterApiResource {
    const NAME: &'static str = "RegisterApiResource";

    fn aggregate_id(&self) -> AggregateId {
        AggregateId::new(&self.resource.name)
    }

    fn validate(&self) -> ValidationResult {
        resource_name(&self.resource.name)
    }
}

impl ToModel for RegisterApiResource {
    type Model = ApiResource;

    fn project(&self) -> ApiResource {
        let mut resource = ApiResource {
            secrets: Vec::new(),
            ..self.resource.clone()
        };
        if !resource.scopes.contains(&resource.name) {
            resource.scopes.push(resource.name.clone());
        }
        resource
    }
}

/// Replaces the resource stored under `old_name`, possibly renaming it.
#[derive(Debug, Clone)]
pub struct UpdateApiResource {
    pub resource: ApiResource,
    pub old_name: String,
}

impl UpdateApiResource {
    pub fn new(old_name: impl Into<String>, resource: ApiResource) -> Self {
        Self {
            resource,
            old_name: old_name.into(),
        }
    }

    pub fn is_rename(&self) -> bool {
        self.resource.name != self.old_name
    }
}

impl Command for UpdateApiResource {
    const NAME: &'static str = "UpdateApiResource";

    fn aggregate_id(&self) -> AggregateId {
        AggregateId::new(&self.old_name)
    }

    fn validate(&self) -> ValidationResult {
        run_rules(self, &[updated_name, old_name])
    }
}

impl ToModel for UpdateApiResource {
    type Model = ApiResource;

    fn project(&self) -> ApiResource {
        ApiResource {
            secrets: Vec::new(),
            ..self.resource.clone()
        }
    }
}

#[derive(Debug, Clone)]
pub struct RemoveApiResource {
    pub name: String,
}

impl RemoveApiResource {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Command for RemoveApiResource {
    const NAME: &'static str = "RemoveApiResource";

    fn aggregate_id(&self) -> AggregateId {
        AggregateId::new(&self.name)
    }

    fn validate(&self) -> ValidationResult {
        resource_name(&self.name)
    }
}

/// Adds a secret to a resource. Shared secrets are stored hashed.
#[derive(Debug, Clone)]
pub struct SaveApiSecret {
    pub resource_name: String,
    pub secret: Secret,
}

impl SaveApiSecret {
    pub fn new(resource_name: impl Into<String>, secret: Secret) -> Self {
        Self {
            resource_name: resource_name.into(),
            secret,
        }
    }
}

impl Command for SaveApiSecret {
    const NAME: &'static str = "SaveApiSecret";

    fn aggregate_id(&self) -> AggregateId {
        AggregateId::new(&self.resource_name)
    }

    fn validate(&self) -> ValidationResult {
        let mut result = resource_name(&self.resource_name);
        result.merge(validation::secret(&self.secret));
        result
    }
}

impl ToModel for SaveApiSecret {
    type Model = Secret;

    fn project(&self) -> Secret {
        self.secret.clone().hashed()
    }
}

/// Removes a secret. `value` is compared against the stored form.
#[derive(Debug, Clone)]
pub struct RemoveApiSecret {
    pub resource_name: String,
    pub secret_type: String,
    pub value: String,
}

impl RemoveApiSecret {
    pub fn new(
        resource_name: impl Into<String>,
        secret_type: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            resource_name: resource_name.into(),
            secret_type: secret_type.into(),
            value: value.into(),
        }
    }
}

impl Command for RemoveApiSecret {
    const NAME: &'static str = "RemoveApiSecret";

    fn aggregate_id(&self) -> AggregateId {
        AggregateId::new(&self.resource_name)
    }

    fn validate(&self) -> ValidationResult {
        let mut result = resource_name(&self.resource_name);
        result.merge(required("Type", &self.secret_type, "Secret type is required"));
        result.merge(required("Value", &self.value, "Secret value is required"));
        result
    }
}

fn resource_name(name: &str) -> ValidationResult {
    required("Name", name, "Invalid resource name")
}

fn updated_name(command: &UpdateApiResource) -> ValidationResult {
    resource_name(&command.resource.name)
}

fn old_name(command: &UpdateApiResource) -> ValidationResult {
    required("OldName", &command.old_name, "Invalid old resource name")
}

#[cfg(test)]
mod tests {
    use pipeline::Validated;

    use super::*;
    use crate::model::hash_secret;

    #[test]
    fn registered_resource_owns_its_scope() {
        let mut resource = ApiResource::new("billing");
        resource.secrets.push(Secret::shared("leak"));
        let model = Validated::try_new(RegisterApiResource::new(resource))
            .unwrap()
            .to_model();
        assert_eq!(model.scopes, vec!["billing"]);
        assert!(model.secrets.is_empty());
    }

    #[test]
    fn own_scope_is_not_duplicated() {
        let mut resource = ApiResource::new("billing");
        resource.scopes.push("billing".to_string());
        let model = Validated::try_new(RegisterApiResource::new(resource))
            .unwrap()
            .to_model();
        assert_eq!(model.scopes.len(), 1);
    }

    #[test]
    fn update_requires_both_names() {
        let result = UpdateApiResource::new("", ApiResource::new("")).validate();
        let fields: Vec<_> = result.errors().iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["Name", "OldName"]);
    }

    #[test]
    fn saved_secret_is_hashed() {
        let command = SaveApiSecret::new("billing", Secret::shared("s3cret"));
        let model = Validated::try_new(command).unwrap().to_model();
        assert_eq!(model.value, hash_secret("s3cret"));
    }

    #[test]
    fn secret_errors_follow_resource_errors() {
        let result = SaveApiSecret::new("", Secret::new("", "")).validate();
        let fields: Vec<_> = result.errors().iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["Name", "Type", "Value"]);
    }
}
