// SPDX-FileCopyrightText: 2026 PlastFlow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the PlastFlow SMS delivery service.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use plastflow_core::HealthPolicy;
use serde::{Deserialize, Serialize};

/// Top-level PlastFlow configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable
/// overrides. All sections are optional and default to sensible values;
/// provider credentials default to absent, which the adapters report as a
/// "not configured" send failure rather than a startup error.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PlastflowConfig {
    /// Service-wide settings.
    #[serde(default)]
    pub service: ServiceConfig,

    /// Primary SMS gateway (Taqnyat) settings.
    #[serde(default)]
    pub taqnyat: TaqnyatConfig,

    /// Secondary SMS gateway (Twilio) settings.
    #[serde(default)]
    pub twilio: TwilioConfig,

    /// Provider health threshold settings.
    #[serde(default)]
    pub health: HealthConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Service-wide configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Primary gateway configuration (Taqnyat REST API).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TaqnyatConfig {
    /// Bearer API key. `None` leaves the primary unconfigured.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Registered sender identity.
    #[serde(default)]
    pub sender: Option<String>,

    /// API base URL, overridable for testing.
    #[serde(default = "default_taqnyat_base_url")]
    pub base_url: String,

    /// Per-request HTTP timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for TaqnyatConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            sender: None,
            base_url: default_taqnyat_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_taqnyat_base_url() -> String {
    "https://api.taqnyat.sa".to_string()
}

/// Secondary gateway configuration (Twilio Messages API).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TwilioConfig {
    /// Account SID. `None` leaves the secondary unconfigured.
    #[serde(default)]
    pub account_sid: Option<String>,

    /// Auth token paired with the account SID.
    #[serde(default)]
    pub auth_token: Option<String>,

    /// E.164 number messages are sent from.
    #[serde(default)]
    pub from_number: Option<String>,

    /// API base URL, overridable for testing.
    #[serde(default = "default_twilio_base_url")]
    pub base_url: String,

    /// Per-request HTTP timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for TwilioConfig {
    fn default() -> Self {
        Self {
            account_sid: None,
            auth_token: None,
            from_number: None,
            base_url: default_twilio_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_twilio_base_url() -> String {
    "https://api.twilio.com".to_string()
}

fn default_timeout_secs() -> u64 {
    15
}

/// Provider health threshold configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct HealthConfig {
    /// Failure count at which a provider is reported `degraded`.
    #[serde(default = "default_degraded_after")]
    pub degraded_after: u32,

    /// Failure count at which a provider is reported `down`.
    #[serde(default = "default_down_after")]
    pub down_after: u32,

    /// Whether one success zeroes the failure counter in addition to
    /// restoring `healthy` status.
    #[serde(default)]
    pub reset_failures_on_success: bool,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            degraded_after: default_degraded_after(),
            down_after: default_down_after(),
            reset_failures_on_success: false,
        }
    }
}

impl HealthConfig {
    /// Convert into the core policy value consumed by the health tracker.
    pub fn policy(&self) -> HealthPolicy {
        HealthPolicy {
            degraded_after: self.degraded_after,
            down_after: self.down_after,
            reset_failures_on_success: self.reset_failures_on_success,
        }
    }
}

fn default_degraded_after() -> u32 {
    2
}

fn default_down_after() -> u32 {
    5
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("plastflow").join("plastflow.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("plastflow.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}
