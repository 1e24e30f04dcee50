//! Validation rules shared by several commands.

use chrono::Utc;
use pipeline::ValidationResult;
use pipeline::command::required;
use url::Url;

use crate::model::{Claim, Secret};

/// Fails unless `value` is an absolute URI without a trailing slash.
pub fn absolute_uri(field: &str, value: &str) -> ValidationResult {
    if Url::parse(value).is_err() {
        return ValidationResult::error(field, format!("Invalid URI: {value}"));
    }
    if value.ends_with('/') {
        return ValidationResult::error(field, format!("URI must not end with '/': {value}"));
    }
    ValidationResult::new()
}

/// Secret type and value are required; an expiration must lie ahead.
pub fn secret(secret: &Secret) -> ValidationResult {
    let mut result = required("Type", &secret.secret_type, "Secret type is required");
    result.merge(required("Value", &secret.value, "Secret value is required"));
    if let Some(expiration) = secret.expiration
        && expiration <= Utc::now()
    {
        result.push("Expiration", "Expiration must be in the future");
    }
    result
}

pub fn claim(claim: &Claim) -> ValidationResult {
    let mut result = required("Type", &claim.claim_type, "Claim type is required");
    result.merge(required("Value", &claim.value, "Claim value is required"));
    result
}
