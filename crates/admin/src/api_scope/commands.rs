//! API scope commands.

use common::AggregateId;
use pipeline::command::{required, run_rules};
use pipeline::{Command, ToModel, ValidationResult};

use crate::model::ApiScope;

/// Command to add a scope to an existing API resource.
#[derive(Debug, Clone)]
pub struct SaveApiScope {
    pub resource_name: String,
    pub scope: ApiScope,
}

impl SaveApiScope {
    pub fn new(resource_name: impl Into<String>, scope: ApiScope) -> Self {
        Self {
            resource_name: resource_name.into(),
            scope,
        }
    }
}

impl Command for SaveApiScope {
    const NAME: &'static str = "SaveApiScope";

    fn aggregate_id(&self) -> AggregateId {
        AggregateId::new(&self.scope.name)
    }

    fn validate(&self) -> ValidationResult {
        run_rules(self, &[scope_name, resource_name])
    }
}

impl ToModel for SaveApiScope {
    type Model = ApiScope;

    fn project(&self) -> ApiScope {
        ApiScope {
            resource_name: self.resource_name.clone(),
            ..self.scope.clone()
        }
    }
}

/// Command to remove a scope.
#[derive(Debug, Clone)]
pub struct RemoveApiScope {
    pub name: String,
}

impl RemoveApiScope {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Command for RemoveApiScope {
    const NAME: &'static str = "RemoveApiScope";

    fn aggregate_id(&self) -> AggregateId {
        AggregateId::new(&self.name)
    }

    fn validate(&self) -> ValidationResult {
        required("Name", &self.name, "Invalid scope")
    }
}

fn scope_name(command: &SaveApiScope) -> ValidationResult {
    required("Name", &command.scope.name, "Invalid scope")
}

fn resource_name(command: &SaveApiScope) -> ValidationResult {
    required("ResourceName", &command.resource_name, "Invalid resource")
}
