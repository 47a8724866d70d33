// SPDX-FileCopyrightText: 2026 PlastFlow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Delivery orchestrator.
//!
//! Owns the primary-then-secondary failover sequence and the message
//! lifecycle. Every send persists a `pending` record first, so even total
//! failures are on file, and finalizes it exactly once after the provider
//! attempts resolve. Total failure is a normal return value (a message with
//! `status = failed`), never an error.

use std::sync::Arc;

use chrono::SecondsFormat;
use plastflow_core::{
    DeliveryVerdict, MessageCategory, MessageFinal, MessagePriority, MessageStatus,
    MessageStore, PlastflowError, SmsMessage, SmsProvider,
};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::health::HealthTracker;

/// Optional metadata accompanying a send.
#[derive(Debug, Clone, Default)]
pub struct SendOptions {
    pub sent_by: Option<String>,
    pub recipient_name: Option<String>,
    pub customer_id: Option<String>,
    pub order_id: Option<String>,
    pub job_order_id: Option<String>,
    pub category: Option<MessageCategory>,
    pub priority: Option<MessagePriority>,
}

/// The SMS delivery service.
///
/// This is the only boundary the rest of the application calls; nothing
/// else reaches a provider adapter directly. Failover order is fixed:
/// the primary is the preferred (lower-cost) channel, so the secondary is
/// attempted only after a primary failure, strictly sequentially.
pub struct SmsService {
    primary: Arc<dyn SmsProvider>,
    secondary: Arc<dyn SmsProvider>,
    store: Arc<dyn MessageStore>,
    health: HealthTracker,
}

impl SmsService {
    pub fn new(
        primary: Arc<dyn SmsProvider>,
        secondary: Arc<dyn SmsProvider>,
        store: Arc<dyn MessageStore>,
        health: HealthTracker,
    ) -> Self {
        Self {
            primary,
            secondary,
            store,
            health,
        }
    }

    /// The health tracker, for operator surfaces.
    pub fn health(&self) -> &HealthTracker {
        &self.health
    }

    /// Notify a customer about a sales order.
    pub async fn send_order_notification(
        &self,
        order_id: &str,
        phone: &str,
        message: &str,
        options: SendOptions,
    ) -> Result<SmsMessage, PlastflowError> {
        let mut options = options;
        options.order_id = Some(order_id.to_string());
        options.category = Some(MessageCategory::OrderNotification);
        self.send_message(phone, message, options).await
    }

    /// Notify about a production job order.
    pub async fn send_job_order_update(
        &self,
        job_order_id: &str,
        phone: &str,
        message: &str,
        options: SendOptions,
    ) -> Result<SmsMessage, PlastflowError> {
        let mut options = options;
        options.job_order_id = Some(job_order_id.to_string());
        options.category = Some(MessageCategory::JobOrderUpdate);
        self.send_message(phone, message, options).await
    }

    /// Send a free-form message. Category defaults to `custom`.
    pub async fn send_custom_message(
        &self,
        phone: &str,
        message: &str,
        options: SendOptions,
    ) -> Result<SmsMessage, PlastflowError> {
        self.send_message(phone, message, options).await
    }

    /// Send one message through the failover sequence.
    ///
    /// The initial `pending` persist is the only step whose failure
    /// propagates; afterwards every outcome, including both providers
    /// failing, resolves to a returned message.
    pub async fn send_message(
        &self,
        recipient: &str,
        body: &str,
        options: SendOptions,
    ) -> Result<SmsMessage, PlastflowError> {
        let mut message = SmsMessage {
            id: Uuid::new_v4().to_string(),
            recipient: recipient.to_string(),
            body: body.to_string(),
            category: options.category.unwrap_or(MessageCategory::Custom),
            order_id: options.order_id,
            job_order_id: options.job_order_id,
            customer_id: options.customer_id,
            sent_by: options.sent_by,
            recipient_name: options.recipient_name,
            priority: options.priority.unwrap_or(MessagePriority::Normal),
            status: MessageStatus::Pending,
            provider: None,
            provider_message_id: None,
            error_detail: None,
            sent_at: now_ts(),
            delivered_at: None,
        };

        // Nothing exists yet to carry an error, so this one propagates.
        self.store.create_message(&message).await?;
        debug!(id = %message.id, recipient, "message recorded as pending");

        let outcome = self.attempt_with_failover(recipient, body).await;

        if let Err(e) = self.store.finalize_message(&message.id, &outcome).await {
            // The send already happened; losing the status write must not
            // turn a delivered message into a caller-visible error.
            error!(id = %message.id, error = %e, "failed to persist final message status");
        }

        crate::metrics::record_message(&outcome.status.to_string());
        message.status = outcome.status;
        message.provider = outcome.provider;
        message.provider_message_id = outcome.provider_message_id;
        message.error_detail = outcome.error_detail;
        Ok(message)
    }

    /// Re-poll the winning provider for delivery confirmation.
    ///
    /// Only `sent` messages whose provider supports status lookup are
    /// polled; everything else is returned as stored. A poll failure is
    /// logged, not surfaced -- the stored record remains authoritative.
    pub async fn check_message_status(
        &self,
        id: &str,
    ) -> Result<Option<SmsMessage>, PlastflowError> {
        let Some(mut message) = self.store.get_message(id).await? else {
            return Ok(None);
        };
        if message.status != MessageStatus::Sent {
            return Ok(Some(message));
        }
        let (Some(provider_name), Some(provider_message_id)) =
            (message.provider.clone(), message.provider_message_id.clone())
        else {
            return Ok(Some(message));
        };
        let Some(provider) = self.provider_by_name(&provider_name) else {
            return Ok(Some(message));
        };

        match provider.message_status(&provider_message_id).await {
            Ok(Some(update)) => match update.verdict {
                DeliveryVerdict::Delivered => {
                    let delivered_at = update.delivered_at.unwrap_or_else(now_ts);
                    if let Err(e) = self
                        .store
                        .record_delivery(id, None, Some(&delivered_at), None)
                        .await
                    {
                        error!(id, error = %e, "failed to persist delivery timestamp");
                    }
                    info!(id, provider = %provider_name, "message confirmed delivered");
                    message.delivered_at = Some(delivered_at);
                }
                DeliveryVerdict::Failed => {
                    let detail = update
                        .detail
                        .unwrap_or_else(|| "delivery failed".to_string());
                    if let Err(e) = self
                        .store
                        .record_delivery(id, Some(MessageStatus::Failed), None, Some(&detail))
                        .await
                    {
                        error!(id, error = %e, "failed to persist delivery failure");
                    }
                    warn!(id, provider = %provider_name, detail = %detail, "gateway reported delivery failure");
                    message.status = MessageStatus::Failed;
                    message.error_detail = Some(detail);
                }
                DeliveryVerdict::InFlight => {}
            },
            Ok(None) => {}
            Err(e) => {
                warn!(id, provider = %provider_name, error = %e, "delivery status poll failed");
            }
        }
        Ok(Some(message))
    }

    /// Try the primary, then the secondary, recording health after each
    /// attempt. Returns the terminal outcome to write back.
    async fn attempt_with_failover(&self, to: &str, body: &str) -> MessageFinal {
        let primary_name = self.primary.name().to_string();
        let primary_err = match self.primary.send_sms(to, body).await {
            Ok(receipt) => {
                self.health.record_success(&primary_name).await;
                info!(provider = %primary_name, "sms sent via primary");
                return sent_outcome(&primary_name, receipt.provider_message_id);
            }
            Err(e) => {
                self.health.record_failure(&primary_name, &e.to_string()).await;
                warn!(provider = %primary_name, error = %e, "primary send failed, failing over");
                e
            }
        };

        let secondary_name = self.secondary.name().to_string();
        match self.secondary.send_sms(to, body).await {
            Ok(receipt) => {
                self.health.record_success(&secondary_name).await;
                info!(provider = %secondary_name, "sms sent via secondary");
                sent_outcome(&secondary_name, receipt.provider_message_id)
            }
            Err(secondary_err) => {
                self.health
                    .record_failure(&secondary_name, &secondary_err.to_string())
                    .await;
                let combined = format!(
                    "{primary_name}: {primary_err}; {secondary_name}: {secondary_err}"
                );
                error!(detail = %combined, "all providers failed");
                MessageFinal {
                    status: MessageStatus::Failed,
                    provider: None,
                    provider_message_id: None,
                    error_detail: Some(combined),
                }
            }
        }
    }

    fn provider_by_name(&self, name: &str) -> Option<&Arc<dyn SmsProvider>> {
        if self.primary.name() == name {
            Some(&self.primary)
        } else if self.secondary.name() == name {
            Some(&self.secondary)
        } else {
            None
        }
    }
}

fn sent_outcome(provider: &str, provider_message_id: String) -> MessageFinal {
    MessageFinal {
        status: MessageStatus::Sent,
        provider: Some(provider.to_string()),
        provider_message_id: Some(provider_message_id),
        error_detail: Some(format!("sent via {provider}")),
    }
}

/// Current UTC time in the storage layer's RFC 3339 millisecond format.
fn now_ts() -> String {
    chrono::Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
