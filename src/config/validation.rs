//! Configuration validation.
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use alloy::primitives::Address;
use url::Url;

use crate::config::schema::AppConfig;
use crate::network::registry::describe_supported_chain;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// One semantic problem with a config value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

fn check_url(
    errors: &mut Vec<ValidationError>,
    field: &'static str,
    value: &str,
    schemes: &[&str],
) {
    match Url::parse(value) {
        Ok(url) if schemes.contains(&url.scheme()) => {}
        Ok(url) => errors.push(ValidationError::new(
            field,
            format!("scheme '{}' not allowed, expected one of {:?}", url.scheme(), schemes),
        )),
        Err(e) => errors.push(ValidationError::new(field, format!("invalid URL '{}': {}", value, e))),
    }
}

/// Check everything serde cannot.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Some(url) = &config.provider.bridge_url {
        check_url(&mut errors, "provider.bridge_url", url, &["http", "https"]);
    }
    if let Some(url) = &config.provider.events_url {
        check_url(&mut errors, "provider.events_url", url, &["ws", "wss"]);
        if config.provider.bridge_url.is_none() {
            errors.push(ValidationError::new(
                "provider.events_url",
                "requires provider.bridge_url",
            ));
        }
    }
    if config.provider.query_timeout_secs == Some(0) {
        errors.push(ValidationError::new("provider.query_timeout_secs", "must be > 0"));
    }
    if config.provider.approval_timeout_secs == Some(0) {
        errors.push(ValidationError::new("provider.approval_timeout_secs", "must be > 0"));
    }

    if config.contract.address.parse::<Address>().is_err() {
        errors.push(ValidationError::new(
            "contract.address",
            format!("'{}' is not a 20-byte hex address", config.contract.address),
        ));
    }

    if describe_supported_chain(config.onboarding.chain_id).is_none() {
        errors.push(ValidationError::new(
            "onboarding.chain_id",
            format!("chain {} is not in the registry", config.onboarding.chain_id),
        ));
    }
    for url in &config.onboarding.rpc_urls {
        check_url(&mut errors, "onboarding.rpc_urls", url, &["http", "https"]);
    }

    if !LOG_LEVELS.contains(&config.observability.log_level.as_str()) {
        errors.push(ValidationError::new(
            "observability.log_level",
            format!("unknown level '{}'", config.observability.log_level),
        ));
    }
    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<std::net::SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", config.observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
