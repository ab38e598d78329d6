//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Node URLs must be absolute `https://` URLs
//! - Timeouts must be positive
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: OperatorConfig → Result<(), Vec<ValidationError>>

use std::fmt;

use url::Url;

use crate::config::schema::OperatorConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    NodeUrlNotHttps(String),
    NodeUrlInvalid { url: String, reason: String },
    ZeroTimeout,
    EmptyPrivateKeyEnv,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::NodeUrlNotHttps(url) => {
                write!(f, "rpc.node_url '{}' needs to start with https://", url)
            }
            ValidationError::NodeUrlInvalid { url, reason } => {
                write!(f, "rpc.node_url '{}' is invalid: {}", url, reason)
            }
            ValidationError::ZeroTimeout => write!(f, "rpc.timeout_secs must be greater than 0"),
            ValidationError::EmptyPrivateKeyEnv => {
                write!(f, "wallet.private_key_env must not be empty")
            }
        }
    }
}

/// Append a trailing slash so endpoint paths can be joined directly.
pub fn normalize_node_url(url: &str) -> String {
    if url.ends_with('/') {
        url.to_string()
    } else {
        format!("{}/", url)
    }
}

/// Check a node URL in isolation.
pub fn validate_node_url(url: &str) -> Result<(), ValidationError> {
    if !url.starts_with("https://") {
        return Err(ValidationError::NodeUrlNotHttps(url.to_string()));
    }
    Url::parse(url).map_err(|e| ValidationError::NodeUrlInvalid {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    Ok(())
}

/// Validate a whole configuration, collecting every problem.
pub fn validate_config(config: &OperatorConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Err(e) = validate_node_url(&config.rpc.node_url) {
        errors.push(e);
    }
    if config.rpc.timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }
    if config.wallet.private_key_env.trim().is_empty() {
        errors.push(ValidationError::EmptyPrivateKeyEnv);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
