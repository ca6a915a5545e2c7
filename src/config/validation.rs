//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, attempts > 0)
//! - Detect duplicate instance ids
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use thiserror::Error;

use crate::config::schema::{RegistryConfig, ServiceConfig};

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Check a whole service configuration.
pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.trim().is_empty() {
        errors.push(ValidationError::new("listener.bind_address", "must not be empty"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be greater than 0"));
    }
    if config.security.max_body_size == 0 {
        errors.push(ValidationError::new("security.max_body_size", "must be greater than 0"));
    }
    if config.client.service_name.is_empty() {
        errors.push(ValidationError::new("client.service_name", "must not be empty"));
    }

    let retry = &config.client.retry;
    if retry.max_attempts == 0 {
        errors.push(ValidationError::new("client.retry.max_attempts", "must be at least 1"));
    }
    if retry.attempt_timeout_ms == 0 {
        errors.push(ValidationError::new(
            "client.retry.attempt_timeout_ms",
            "must be greater than 0",
        ));
    }
    if retry.base_delay_ms > retry.max_delay_ms {
        errors.push(ValidationError::new(
            "client.retry.base_delay_ms",
            "must not exceed max_delay_ms",
        ));
    }

    let health = &config.health_check;
    if health.enabled && health.interval_secs == 0 {
        errors.push(ValidationError::new("health_check.interval_secs", "must be greater than 0"));
    }
    if health.unhealthy_threshold == 0 || health.healthy_threshold == 0 {
        errors.push(ValidationError::new("health_check", "thresholds must be at least 1"));
    }

    if let Err(mut registry_errors) = validate_registry(&config.client.registry) {
        errors.append(&mut registry_errors);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Check an instance list.
pub fn validate_registry(registry: &RegistryConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();

    for (i, instance) in registry.instances.iter().enumerate() {
        if instance.id.is_empty() {
            errors.push(ValidationError::new(format!("instances[{i}].id"), "must not be empty"));
        } else if !seen.insert(instance.id.as_str()) {
            errors.push(ValidationError::new(
                format!("instances[{i}].id"),
                format!("duplicate instance id {:?}", instance.id),
            ));
        }
        if instance.address.trim().is_empty() {
            errors.push(ValidationError::new(
                format!("instances[{i}].address"),
                "must not be empty",
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
