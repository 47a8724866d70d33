// SPDX-FileCopyrightText: 2026 PlastFlow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Metric registration and recording helpers.
//!
//! Uses the metrics-rs facade so any recorder (Prometheus, statsd, etc.)
//! can collect these metrics.

use metrics::describe_counter;

/// Register all PlastFlow SMS metric descriptions.
///
/// Called once at startup after the recorder is installed.
pub fn register_metrics() {
    describe_counter!(
        "plastflow_sms_attempts_total",
        "Provider send attempts by provider and outcome"
    );
    describe_counter!(
        "plastflow_sms_messages_total",
        "Finalized messages by terminal status"
    );
}

/// Record one send attempt against a provider.
pub(crate) fn record_attempt(provider: &str, outcome: &str) {
    metrics::counter!(
        "plastflow_sms_attempts_total",
        "provider" => provider.to_string(),
        "outcome" => outcome.to_string()
    )
    .increment(1);
}

/// Record a finalized message.
pub(crate) fn record_message(status: &str) {
    metrics::counter!("plastflow_sms_messages_total", "status" => status.to_string())
        .increment(1);
}
