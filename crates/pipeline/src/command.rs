//! Commands and their structural validation.

use std::ops::Deref;

use common::AggregateId;
use serde::Serialize;

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Ordered list of field errors produced by validating a command.
///
/// The result is valid exactly when it holds no errors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    errors: Vec<FieldError>,
}

impl ValidationResult {
    /// Creates an empty (valid) result.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a result holding one error.
    pub fn error(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            errors: vec![FieldError::new(field, message)],
        }
    }

    /// Appends an error.
    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(FieldError::new(field, message));
    }

    /// Appends all errors of `other`, keeping their order.
    pub fn merge(&mut self, other: ValidationResult) {
        self.errors.extend(other.errors);
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}

impl FromIterator<FieldError> for ValidationResult {
    fn from_iter<I: IntoIterator<Item = FieldError>>(iter: I) -> Self {
        Self {
            errors: iter.into_iter().collect(),
        }
    }
}

impl Extend<FieldError> for ValidationResult {
    fn extend<I: IntoIterator<Item = FieldError>>(&mut self, iter: I) {
        self.errors.extend(iter);
    }
}

impl IntoIterator for ValidationResult {
    type Item = FieldError;
    type IntoIter = std::vec::IntoIter<FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

/// A validation rule: a pure function of the command's own fields.
pub type Rule<C> = fn(&C) -> ValidationResult;

/// Runs `rules` in order and concatenates their errors.
pub fn run_rules<C>(command: &C, rules: &[Rule<C>]) -> ValidationResult {
    rules.iter().flat_map(|rule| rule(command)).collect()
}

/// Fails with `message` on `field` if `value` is blank.
pub fn required(field: &str, value: &str, message: &str) -> ValidationResult {
    if value.trim().is_empty() {
        ValidationResult::error(field, message)
    } else {
        ValidationResult::new()
    }
}

/// Fails with `message` on `field` unless `value` is strictly positive.
pub fn positive(field: &str, value: i64, message: &str) -> ValidationResult {
    if value > 0 {
        ValidationResult::new()
    } else {
        ValidationResult::error(field, message)
    }
}

/// A request to change state.
///
/// Commands are immutable data. `validate` must not touch storage and may be
/// called any number of times.
pub trait Command: Send + Sync + 'static {
    /// Stable name used in logs, metrics and wiring errors.
    const NAME: &'static str;

    /// Key of the aggregate the command targets.
    fn aggregate_id(&self) -> AggregateId;

    /// Checks the command's structural rules.
    fn validate(&self) -> ValidationResult;
}

/// Projection of a command into the representation it persists.
///
/// Only reachable through [`Validated::to_model`].
pub trait ToModel: Command {
    type Model;

    fn project(&self) -> Self::Model;
}

/// A command whose validation passed.
#[derive(Debug, Clone)]
pub struct Validated<C>(C);

impl<C: Command> Validated<C> {
    /// Validates `command`, returning the failures if there are any.
    pub fn try_new(command: C) -> Result<Self, ValidationResult> {
        let result = command.validate();
        if result.is_valid() {
            Ok(Self(command))
        } else {
            Err(result)
        }
    }

    pub fn into_inner(self) -> C {
        self.0
    }
}

impl<C: ToModel> Validated<C> {
    /// Builds the persisted representation of the command.
    pub fn to_model(&self) -> C::Model {
        self.0.project()
    }
}

impl<C> Deref for Validated<C> {
    type Target = C;

    fn deref(&self) -> &C {
        &self.0
    }
}
