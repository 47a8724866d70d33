// SPDX-FileCopyrightText: 2026 PlastFlow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider health tracking.
//!
//! The tracker records the outcome of every send attempt, successful or
//! not, against the attempted provider's rolling counters. It is read by
//! operators and reporting surfaces only; the delivery orchestrator never
//! consults it for routing (failover order is fixed primary-then-secondary).

use std::sync::Arc;

use plastflow_core::{HealthStore, PlastflowError, ProviderHealth};
use tracing::warn;

/// Records per-provider send outcomes and exposes health rows to operators.
///
/// Recording is best-effort: a storage failure here must never abort the
/// send that triggered it, so errors are logged and swallowed.
#[derive(Clone)]
pub struct HealthTracker {
    store: Arc<dyn HealthStore>,
}

impl HealthTracker {
    pub fn new(store: Arc<dyn HealthStore>) -> Self {
        Self { store }
    }

    /// Record one successful send attempt against a provider.
    pub async fn record_success(&self, provider: &str) {
        crate::metrics::record_attempt(provider, "success");
        if let Err(e) = self.store.record_success(provider).await {
            warn!(provider, error = %e, "failed to record provider success");
        }
    }

    /// Record one failed send attempt and its diagnostic text.
    pub async fn record_failure(&self, provider: &str, error: &str) {
        crate::metrics::record_attempt(provider, "failure");
        if let Err(e) = self.store.record_failure(provider, error).await {
            warn!(provider, error = %e, "failed to record provider failure");
        }
    }

    /// Health row for one provider, if it has recorded any outcome.
    pub async fn health(
        &self,
        provider: &str,
    ) -> Result<Option<ProviderHealth>, PlastflowError> {
        self.store.get_health(provider).await
    }

    /// All known provider health rows.
    pub async fn all(&self) -> Result<Vec<ProviderHealth>, PlastflowError> {
        self.store.list_health().await
    }
}
