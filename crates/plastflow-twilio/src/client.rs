// SPDX-FileCopyrightText: 2026 PlastFlow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the Twilio Messages API.
//!
//! Twilio is the failover gateway. Sends are basic-authenticated
//! form-encoded POSTs returning a message SID; the same resource supports a
//! status lookup used by delivery-status polling.

use std::time::Duration;

use async_trait::async_trait;
use chrono::SecondsFormat;
use plastflow_config::model::TwilioConfig;
use plastflow_core::{
    DeliveryUpdate, DeliveryVerdict, PlastflowError, ProviderError, SendReceipt, SmsProvider,
};
use serde::Deserialize;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct MessageResource {
    sid: Option<String>,
    status: Option<String>,
    date_sent: Option<String>,
    error_message: Option<String>,
    message: Option<String>,
}

struct Credentials<'a> {
    account_sid: &'a str,
    auth_token: &'a str,
    from_number: &'a str,
}

/// Twilio SMS gateway adapter.
///
/// Credentials are injected at construction; when absent, `send_sms` fails
/// fast with `NotConfigured` and never touches the network.
#[derive(Debug, Clone)]
pub struct TwilioSms {
    client: reqwest::Client,
    account_sid: Option<String>,
    auth_token: Option<String>,
    from_number: Option<String>,
    base_url: String,
}

impl TwilioSms {
    /// Creates a new Twilio adapter from configuration.
    pub fn new(config: &TwilioConfig) -> Result<Self, PlastflowError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| PlastflowError::Provider {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            account_sid: config.account_sid.clone(),
            auth_token: config.auth_token.clone(),
            from_number: config.from_number.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Overrides the base URL (for testing with wiremock).
    #[cfg(test)]
    pub fn with_base_url(mut self, url: String) -> Self {
        self.base_url = url;
        self
    }

    fn credentials(&self) -> Result<Credentials<'_>, ProviderError> {
        match (
            self.account_sid.as_deref(),
            self.auth_token.as_deref(),
            self.from_number.as_deref(),
        ) {
            (Some(account_sid), Some(auth_token), Some(from_number)) => Ok(Credentials {
                account_sid,
                auth_token,
                from_number,
            }),
            _ => Err(ProviderError::NotConfigured(
                "Twilio account SID, auth token, or from-number missing".into(),
            )),
        }
    }
}

#[async_trait]
impl SmsProvider for TwilioSms {
    fn name(&self) -> &str {
        "twilio"
    }

    async fn send_sms(&self, to: &str, body: &str) -> Result<SendReceipt, ProviderError> {
        let creds = self.credentials()?;

        let response = self
            .client
            .post(format!(
                "{}/2010-04-01/Accounts/{}/Messages.json",
                self.base_url, creds.account_sid
            ))
            .basic_auth(creds.account_sid, Some(creds.auth_token))
            .form(&[("To", to), ("From", creds.from_number), ("Body", body)])
            .send()
            .await
            .map_err(|e| ProviderError::Transport(format!("request failed: {e}")))?;

        let http_status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ProviderError::Transport(format!("failed to read response body: {e}")))?;
        debug!(status = %http_status, "twilio send response received");

        if !http_status.is_success() {
            let detail = serde_json::from_str::<MessageResource>(&text)
                .ok()
                .and_then(|r| r.message)
                .unwrap_or_else(|| text.trim().to_string());
            return Err(ProviderError::Rejected(format!(
                "Twilio API returned {http_status}: {detail}"
            )));
        }

        let parsed: MessageResource = serde_json::from_str(&text)
            .map_err(|e| ProviderError::Transport(format!("failed to parse API response: {e}")))?;

        match parsed.sid {
            Some(sid) => Ok(SendReceipt {
                provider_message_id: sid,
            }),
            None => Err(ProviderError::Rejected(format!(
                "Twilio response missing message SID: {}",
                text.trim()
            ))),
        }
    }

    async fn message_status(
        &self,
        provider_message_id: &str,
    ) -> Result<Option<DeliveryUpdate>, ProviderError> {
        let creds = self.credentials()?;

        let response = self
            .client
            .get(format!(
                "{}/2010-04-01/Accounts/{}/Messages/{}.json",
                self.base_url, creds.account_sid, provider_message_id
            ))
            .basic_auth(creds.account_sid, Some(creds.auth_token))
            .send()
            .await
            .map_err(|e| ProviderError::Transport(format!("request failed: {e}")))?;

        let http_status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ProviderError::Transport(format!("failed to read response body: {e}")))?;

        if !http_status.is_success() {
            return Err(ProviderError::Rejected(format!(
                "Twilio status lookup returned {http_status}: {}",
                text.trim()
            )));
        }

        let parsed: MessageResource = serde_json::from_str(&text)
            .map_err(|e| ProviderError::Transport(format!("failed to parse API response: {e}")))?;

        let status = parsed.status.unwrap_or_default();
        let update = match status.as_str() {
            "delivered" => DeliveryUpdate {
                verdict: DeliveryVerdict::Delivered,
                delivered_at: parsed.date_sent.as_deref().and_then(normalize_rfc2822),
                detail: None,
            },
            "failed" | "undelivered" => DeliveryUpdate {
                verdict: DeliveryVerdict::Failed,
                delivered_at: None,
                detail: parsed
                    .error_message
                    .or_else(|| Some(format!("Twilio reported status {status}"))),
            },
            // queued / accepted / sending / sent: still in flight.
            _ => DeliveryUpdate {
                verdict: DeliveryVerdict::InFlight,
                delivered_at: None,
                detail: None,
            },
        };
        Ok(Some(update))
    }
}

/// Twilio reports timestamps in RFC 2822; storage uses RFC 3339 UTC text.
fn normalize_rfc2822(raw: &str) -> Option<String> {
    chrono::DateTime::parse_from_rfc2822(raw)
        .ok()
        .map(|dt| {
            dt.with_timezone(&chrono::Utc)
                .to_rfc3339_opts(SecondsFormat::Millis, true)
        })
}
