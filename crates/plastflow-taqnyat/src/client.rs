// SPDX-FileCopyrightText: 2026 PlastFlow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the Taqnyat messaging API.
//!
//! Taqnyat is the preferred (lower-cost) gateway. The send endpoint is a
//! bearer-authenticated JSON POST whose response body carries its own
//! `statusCode` field in addition to the HTTP status.

use std::time::Duration;

use async_trait::async_trait;
use plastflow_config::model::TaqnyatConfig;
use plastflow_core::{PlastflowError, ProviderError, SendReceipt, SmsProvider};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Response `statusCode` values Taqnyat uses for an accepted message.
const ACCEPTED_CODES: [u16; 2] = [200, 201];

#[derive(Debug, Serialize)]
struct SendBody<'a> {
    recipients: [&'a str; 1],
    body: &'a str,
    sender: &'a str,
}

#[derive(Debug, Deserialize)]
struct SendResponse {
    #[serde(rename = "statusCode")]
    status_code: Option<u16>,
    #[serde(rename = "messageId")]
    message_id: Option<serde_json::Value>,
    message: Option<String>,
}

/// Taqnyat SMS gateway adapter.
///
/// Credentials are injected at construction; when absent, `send_sms` fails
/// fast with `NotConfigured` and never touches the network.
#[derive(Debug, Clone)]
pub struct TaqnyatSms {
    client: reqwest::Client,
    api_key: Option<String>,
    sender: Option<String>,
    base_url: String,
}

impl TaqnyatSms {
    /// Creates a new Taqnyat adapter from configuration.
    pub fn new(config: &TaqnyatConfig) -> Result<Self, PlastflowError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| PlastflowError::Provider {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            sender: config.sender.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Overrides the base URL (for testing with wiremock).
    #[cfg(test)]
    pub fn with_base_url(mut self, url: String) -> Self {
        self.base_url = url;
        self
    }

    fn credentials(&self) -> Result<(&str, &str), ProviderError> {
        match (self.api_key.as_deref(), self.sender.as_deref()) {
            (Some(key), Some(sender)) => Ok((key, sender)),
            _ => Err(ProviderError::NotConfigured(
                "Taqnyat API key or sender identity missing".into(),
            )),
        }
    }
}

#[async_trait]
impl SmsProvider for TaqnyatSms {
    fn name(&self) -> &str {
        "taqnyat"
    }

    async fn send_sms(&self, to: &str, body: &str) -> Result<SendReceipt, ProviderError> {
        let (api_key, sender) = self.credentials()?;

        let request = SendBody {
            recipients: [to],
            body,
            sender,
        };

        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::Transport(format!("request failed: {e}")))?;

        let http_status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ProviderError::Transport(format!("failed to read response body: {e}")))?;
        debug!(status = %http_status, "taqnyat send response received");

        if !http_status.is_success() {
            return Err(ProviderError::Rejected(format!(
                "Taqnyat API returned {http_status}: {}",
                text.trim()
            )));
        }

        let parsed: SendResponse = serde_json::from_str(&text)
            .map_err(|e| ProviderError::Transport(format!("failed to parse API response: {e}")))?;

        match parsed.status_code {
            Some(code) if ACCEPTED_CODES.contains(&code) => {
                // The gateway occasionally omits messageId; a local id keeps
                // the receipt usable for record-keeping either way.
                let id = parsed
                    .message_id
                    .map(render_message_id)
                    .unwrap_or_else(|| format!("taqnyat-{}", uuid::Uuid::new_v4()));
                Ok(SendReceipt {
                    provider_message_id: id,
                })
            }
            Some(code) => Err(ProviderError::Rejected(format!(
                "Taqnyat reported status {code}: {}",
                parsed.message.unwrap_or_else(|| "no detail".into())
            ))),
            None => Err(ProviderError::Rejected(format!(
                "Taqnyat response missing statusCode: {}",
                text.trim()
            ))),
        }
    }
}

/// Taqnyat returns `messageId` as a number in some API revisions and a
/// string in others.
fn render_message_id(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    }
}
