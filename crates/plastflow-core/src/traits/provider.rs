// SPDX-FileCopyrightText: 2026 PlastFlow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider adapter trait for SMS gateway integrations (Taqnyat, Twilio, etc.).

use async_trait::async_trait;

use crate::error::ProviderError;
use crate::types::{DeliveryUpdate, SendReceipt};

/// Adapter wrapping exactly one external SMS gateway.
///
/// Implementations make exactly one outbound network call per `send_sms`
/// invocation and perform no retries; failover between providers belongs
/// to the delivery orchestrator. Every failure mode maps into
/// [`ProviderError`] -- adapters never panic or leak transport errors raw.
#[async_trait]
pub trait SmsProvider: Send + Sync + 'static {
    /// Stable provider name used in message records and health rows.
    fn name(&self) -> &str;

    /// Sends one text message to one phone number.
    ///
    /// Missing credentials fail fast with [`ProviderError::NotConfigured`]
    /// before any network activity.
    async fn send_sms(&self, to: &str, body: &str) -> Result<SendReceipt, ProviderError>;

    /// Polls the gateway for the delivery fate of a previously sent message.
    ///
    /// Returns `Ok(None)` for gateways without a status-lookup API.
    async fn message_status(
        &self,
        provider_message_id: &str,
    ) -> Result<Option<DeliveryUpdate>, ProviderError> {
        let _ = provider_message_id;
        Ok(None)
    }
}
