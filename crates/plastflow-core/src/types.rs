// SPDX-FileCopyrightText: 2026 PlastFlow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types for outbound SMS messages and provider health records.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Lifecycle state of an outbound message.
///
/// A message is created `pending` and finalized exactly once to `sent` or
/// `failed`; it is never reverted to `pending`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MessageStatus {
    Pending,
    Sent,
    Failed,
}

/// Business category of a notification.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MessageCategory {
    OrderNotification,
    JobOrderUpdate,
    StatusUpdate,
    Custom,
}

/// Delivery priority tag. Informational; the orchestrator does not reorder.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MessagePriority {
    Low,
    Normal,
    High,
    Urgent,
}

/// Rolling health classification of one SMS provider.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ProviderStatus {
    Healthy,
    Degraded,
    Down,
}

/// One outbound SMS attempt and its terminal outcome.
///
/// Timestamps are RFC 3339 UTC text with millisecond precision, matching
/// the storage layer's `strftime('%Y-%m-%dT%H:%M:%fZ', 'now')` format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmsMessage {
    pub id: String,
    /// Destination phone number. E.164 is expected but not validated here.
    pub recipient: String,
    pub body: String,
    pub category: MessageCategory,
    /// Opaque foreign keys owned by the surrounding ERP.
    pub order_id: Option<String>,
    pub job_order_id: Option<String>,
    pub customer_id: Option<String>,
    /// User who triggered the send, if any.
    pub sent_by: Option<String>,
    pub recipient_name: Option<String>,
    pub priority: MessagePriority,
    pub status: MessageStatus,
    /// Name of the provider whose attempt succeeded.
    pub provider: Option<String>,
    /// Gateway-assigned id from the winning provider.
    pub provider_message_id: Option<String>,
    /// Diagnostic text: "sent via {provider}" on success, the combined
    /// per-provider failure diagnostics otherwise.
    pub error_detail: Option<String>,
    pub sent_at: String,
    pub delivered_at: Option<String>,
}

/// Terminal outcome written back to a message after the provider attempts resolve.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageFinal {
    pub status: MessageStatus,
    pub provider: Option<String>,
    pub provider_message_id: Option<String>,
    pub error_detail: Option<String>,
}

/// Per-provider rolling health record, one row per provider name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderHealth {
    pub provider: String,
    pub success_count: i64,
    pub failure_count: i64,
    pub last_success_at: Option<String>,
    pub last_failure_at: Option<String>,
    pub last_error: Option<String>,
    pub status: ProviderStatus,
    pub checked_at: String,
}

/// Successful send receipt from a provider adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendReceipt {
    /// Opaque id assigned by the gateway.
    pub provider_message_id: String,
}

/// Verdict from a provider's delivery-status lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryVerdict {
    /// Accepted by the gateway but not yet confirmed delivered.
    InFlight,
    Delivered,
    Failed,
}

/// Result of polling a provider for the fate of an already-sent message.
#[derive(Debug, Clone, PartialEq)]
pub struct DeliveryUpdate {
    pub verdict: DeliveryVerdict,
    /// Delivery timestamp reported by the gateway, normalized to RFC 3339.
    pub delivered_at: Option<String>,
    pub detail: Option<String>,
}

/// Failure thresholds driving the derived [`ProviderStatus`].
///
/// Thresholds are configuration, not constants buried in the update logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthPolicy {
    /// Failure count at which a provider is reported `degraded`.
    pub degraded_after: u32,
    /// Failure count at which a provider is reported `down`.
    pub down_after: u32,
    /// Whether a success zeroes the failure counter in addition to
    /// restoring `healthy` status.
    pub reset_failures_on_success: bool,
}

impl Default for HealthPolicy {
    fn default() -> Self {
        Self {
            degraded_after: 2,
            down_after: 5,
            reset_failures_on_success: false,
        }
    }
}

impl HealthPolicy {
    /// Derive the status for a provider with `failure_count` recorded failures.
    pub fn classify(&self, failure_count: i64) -> ProviderStatus {
        if failure_count >= i64::from(self.down_after) {
            ProviderStatus::Down
        } else if failure_count >= i64::from(self.degraded_after) {
            ProviderStatus::Degraded
        } else {
            ProviderStatus::Healthy
        }
    }
}
