// SPDX-FileCopyrightText: 2026 PlastFlow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persistence traits for message records and provider health rows.

use async_trait::async_trait;

use crate::error::PlastflowError;
use crate::types::{MessageFinal, MessageStatus, ProviderHealth, SmsMessage};

/// Durable record of every attempted message and its terminal status.
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Persist a freshly created message (status `pending`).
    async fn create_message(&self, message: &SmsMessage) -> Result<(), PlastflowError>;

    /// Write the terminal outcome of a message.
    ///
    /// Only a `pending` row may be finalized; a second finalize attempt is
    /// an error, preserving the single-transition invariant.
    async fn finalize_message(
        &self,
        id: &str,
        outcome: &MessageFinal,
    ) -> Result<(), PlastflowError>;

    /// Apply a delivery-status poll result. Each `None` field leaves the
    /// stored value untouched (partial update, no clobbering).
    async fn record_delivery(
        &self,
        id: &str,
        status: Option<MessageStatus>,
        delivered_at: Option<&str>,
        detail: Option<&str>,
    ) -> Result<(), PlastflowError>;

    async fn get_message(&self, id: &str) -> Result<Option<SmsMessage>, PlastflowError>;

    /// Most recently sent messages, newest first.
    async fn recent_messages(&self, limit: i64) -> Result<Vec<SmsMessage>, PlastflowError>;
}

/// Per-provider rolling health counters.
///
/// Updates must be additive and commutative (increment counters, set
/// "last" timestamps) so concurrent sends compose without a lock. Rows
/// are created lazily on a provider's first recorded outcome.
#[async_trait]
pub trait HealthStore: Send + Sync {
    /// Record one successful send attempt against a provider.
    async fn record_success(&self, provider: &str) -> Result<(), PlastflowError>;

    /// Record one failed send attempt and its diagnostic text.
    async fn record_failure(&self, provider: &str, error: &str) -> Result<(), PlastflowError>;

    async fn get_health(&self, provider: &str)
        -> Result<Option<ProviderHealth>, PlastflowError>;

    async fn list_health(&self) -> Result<Vec<ProviderHealth>, PlastflowError>;
}
