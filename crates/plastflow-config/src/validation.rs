// SPDX-FileCopyrightText: 2026 PlastFlow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as threshold ordering and non-empty paths.

use crate::diagnostic::ConfigError;
use crate::model::PlastflowConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &PlastflowConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    if config.health.degraded_after < 1 {
        errors.push(ConfigError::Validation {
            message: format!(
                "health.degraded_after must be at least 1, got {}",
                config.health.degraded_after
            ),
        });
    }

    if config.health.down_after < config.health.degraded_after {
        errors.push(ConfigError::Validation {
            message: format!(
                "health.down_after ({}) must be >= health.degraded_after ({})",
                config.health.down_after, config.health.degraded_after
            ),
        });
    }

    for (section, base_url) in [
        ("taqnyat", &config.taqnyat.base_url),
        ("twilio", &config.twilio.base_url),
    ] {
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            errors.push(ConfigError::Validation {
                message: format!(
                    "{section}.base_url `{base_url}` must start with http:// or https://"
                ),
            });
        }
    }

    for (section, timeout) in [
        ("taqnyat", config.taqnyat.timeout_secs),
        ("twilio", config.twilio.timeout_secs),
    ] {
        if timeout == 0 {
            errors.push(ConfigError::Validation {
                message: format!("{section}.timeout_secs must be at least 1"),
            });
        }
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}
