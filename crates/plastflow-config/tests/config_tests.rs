// SPDX-FileCopyrightText: 2026 PlastFlow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the full load-and-validate pipeline.

use plastflow_config::{ConfigError, load_and_validate_str};

#[test]
fn minimal_production_config_loads() {
    let config = load_and_validate_str(
        r#"
[taqnyat]
api_key = "tk-prod"
sender = "PLASTFLOW"

[twilio]
account_sid = "ACxxxxxxxx"
auth_token = "token"
from_number = "+15550001111"

[storage]
database_path = "/var/lib/plastflow/plastflow.db"
"#,
    )
    .expect("production config should load");

    assert_eq!(config.taqnyat.sender.as_deref(), Some("PLASTFLOW"));
    assert_eq!(config.twilio.account_sid.as_deref(), Some("ACxxxxxxxx"));
    assert_eq!(config.storage.database_path, "/var/lib/plastflow/plastflow.db");
    assert_eq!(config.health.policy().degraded_after, 2);
}

#[test]
fn empty_config_is_valid_with_unconfigured_providers() {
    // Providers without credentials are a send-time failure, not a
    // startup failure.
    let config = load_and_validate_str("").expect("defaults should validate");
    assert!(config.taqnyat.api_key.is_none());
    assert!(config.twilio.auth_token.is_none());
}

#[test]
fn typo_in_section_key_yields_suggestion() {
    let errors = load_and_validate_str(
        r#"
[taqnyat]
api_kee = "oops"
"#,
    )
    .unwrap_err();

    let found = errors.iter().any(|e| {
        matches!(
            e,
            ConfigError::UnknownKey { key, suggestion, .. }
                if key == "api_kee" && suggestion.as_deref() == Some("api_key")
        )
    });
    assert!(found, "expected an unknown-key diagnostic with suggestion: {errors:?}");
}

#[test]
fn semantic_validation_runs_after_parse() {
    let errors = load_and_validate_str(
        r#"
[health]
degraded_after = 4
down_after = 2
"#,
    )
    .unwrap_err();

    assert!(errors.iter().any(
        |e| matches!(e, ConfigError::Validation { message } if message.contains("down_after"))
    ));
}

#[test]
fn wrong_type_yields_invalid_type_error() {
    let errors = load_and_validate_str(
        r#"
[health]
down_after = "many"
"#,
    )
    .unwrap_err();

    assert!(
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::InvalidType { .. } | ConfigError::Other(_))),
        "expected a type error: {errors:?}"
    );
}
