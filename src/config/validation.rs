//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate addresses, ranges and the geo endpoint template
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GateConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;
use thiserror::Error;
use url::Url;

use crate::config::schema::GateConfig;

/// Placeholder substituted with the client address in the geo endpoint.
pub const ADDRESS_PLACEHOLDER: &str = "{address}";

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid socket address for {field}: {value}")]
    InvalidAddress { field: &'static str, value: String },

    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },

    #[error("geo.endpoint must contain {{address}}")]
    MissingPlaceholder,

    #[error("geo.endpoint is not a valid URL: {0}")]
    InvalidEndpoint(String),

    #[error("protected prefix must start with '/': {0}")]
    InvalidPrefix(String),

    #[error("download_check.allowed_ref_domains contains an empty entry")]
    EmptyRefDomain,
}

/// Validate a parsed configuration.
pub fn validate_config(config: &GateConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::Zero { field: "timeouts.request_secs" });
    }

    for prefix in &config.content.protected_prefixes {
        if !prefix.starts_with('/') {
            errors.push(ValidationError::InvalidPrefix(prefix.clone()));
        }
    }

    if let Some(check) = &config.download_check {
        if check.allowed_ref_domains.iter().any(|d| d.trim().is_empty()) {
            errors.push(ValidationError::EmptyRefDomain);
        }
    }

    if config.geo.enabled {
        if config.geo.max_entries == 0 {
            errors.push(ValidationError::Zero { field: "geo.max_entries" });
        }
        if config.geo.timeout_ms == 0 {
            errors.push(ValidationError::Zero { field: "geo.timeout_ms" });
        }
        if !config.geo.endpoint.contains(ADDRESS_PLACEHOLDER) {
            errors.push(ValidationError::MissingPlaceholder);
        } else {
            let sample_url = config.geo.endpoint.replace(ADDRESS_PLACEHOLDER, "127.0.0.1");
            if let Err(e) = Url::parse(&sample_url) {
                errors.push(ValidationError::InvalidEndpoint(e.to_string()));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
