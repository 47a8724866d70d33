// SPDX-FileCopyrightText: 2026 PlastFlow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./plastflow.toml` > `~/.config/plastflow/plastflow.toml`
//! > `/etc/plastflow/plastflow.toml` with environment variable overrides via
//! `PLASTFLOW_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::PlastflowConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/plastflow/plastflow.toml` (system-wide)
/// 3. `~/.config/plastflow/plastflow.toml` (user XDG config)
/// 4. `./plastflow.toml` (local directory)
/// 5. `PLASTFLOW_*` environment variables
pub fn load_config() -> Result<PlastflowConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(PlastflowConfig::default()))
        .merge(Toml::file("/etc/plastflow/plastflow.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("plastflow/plastflow.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("plastflow.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env vars).
///
/// Used in tests and wherever an explicit TOML snippet is supplied.
pub fn load_config_from_str(toml_content: &str) -> Result<PlastflowConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(PlastflowConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<PlastflowConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(PlastflowConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `PLASTFLOW_TWILIO_ACCOUNT_SID` must map
/// to `twilio.account_sid`, not `twilio.account.sid`.
fn env_provider() -> Env {
    Env::prefixed("PLASTFLOW_").map(|key| {
        // `key` is the lowercased env var name with prefix stripped.
        // Example: PLASTFLOW_TAQNYAT_API_KEY -> "taqnyat_api_key"
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("service_", "service.", 1)
            .replacen("taqnyat_", "taqnyat.", 1)
            .replacen("twilio_", "twilio.", 1)
            .replacen("health_", "health.", 1)
            .replacen("storage_", "storage.", 1);
        mapped.into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_load_without_any_sources() {
        let config = load_config_from_str("").unwrap();
        assert!(config.taqnyat.api_key.is_none());
        assert!(config.twilio.account_sid.is_none());
        assert_eq!(config.health.degraded_after, 2);
        assert_eq!(config.health.down_after, 5);
        assert_eq!(config.service.log_level, "info");
    }

    #[test]
    fn toml_sections_override_defaults() {
        let config = load_config_from_str(
            r#"
[taqnyat]
api_key = "tk-123"
sender = "PLASTFLOW"

[twilio]
account_sid = "AC-test"
auth_token = "secret"
from_number = "+15550001111"

[health]
degraded_after = 3
down_after = 10
"#,
        )
        .unwrap();

        assert_eq!(config.taqnyat.api_key.as_deref(), Some("tk-123"));
        assert_eq!(config.taqnyat.sender.as_deref(), Some("PLASTFLOW"));
        assert_eq!(config.twilio.from_number.as_deref(), Some("+15550001111"));
        assert_eq!(config.health.degraded_after, 3);
        assert_eq!(config.health.down_after, 10);
        // Untouched sections keep their defaults.
        assert_eq!(config.taqnyat.base_url, "https://api.taqnyat.sa");
        assert_eq!(config.twilio.timeout_secs, 15);
    }

    #[test]
    fn env_vars_override_file_values() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "plastflow.toml",
                r#"
[taqnyat]
api_key = "from-file"
"#,
            )?;
            jail.set_env("PLASTFLOW_TAQNYAT_API_KEY", "from-env");
            jail.set_env("PLASTFLOW_TWILIO_ACCOUNT_SID", "AC-env");
            jail.set_env("PLASTFLOW_HEALTH_DOWN_AFTER", "7");

            let config = load_config().expect("config should load");
            assert_eq!(config.taqnyat.api_key.as_deref(), Some("from-env"));
            assert_eq!(config.twilio.account_sid.as_deref(), Some("AC-env"));
            assert_eq!(config.health.down_after, 7);
            Ok(())
        });
    }

    #[test]
    fn underscore_keys_map_to_correct_sections() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("PLASTFLOW_TWILIO_FROM_NUMBER", "+15559998888");
            jail.set_env("PLASTFLOW_STORAGE_DATABASE_PATH", "/tmp/env.db");

            let config = load_config().expect("config should load");
            assert_eq!(config.twilio.from_number.as_deref(), Some("+15559998888"));
            assert_eq!(config.storage.database_path, "/tmp/env.db");
            Ok(())
        });
    }

    #[test]
    fn unknown_key_is_rejected() {
        let result = load_config_from_str(
            r#"
[taqnyat]
api_kee = "typo"
"#,
        );
        assert!(result.is_err());
    }
}
