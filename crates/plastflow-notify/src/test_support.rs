// SPDX-FileCopyrightText: 2026 PlastFlow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory doubles for deterministic orchestrator tests.
//!
//! `ScriptedProvider` pops pre-configured send outcomes from a FIFO queue
//! and counts invocations; the memory stores mirror the persistence
//! contracts without touching disk.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use plastflow_core::{
    DeliveryUpdate, HealthPolicy, HealthStore, MessageFinal, MessageStatus, MessageStore,
    PlastflowError, ProviderError, ProviderHealth, ProviderStatus, SendReceipt, SmsMessage,
    SmsProvider,
};

/// An SMS provider that returns pre-configured outcomes in FIFO order.
///
/// When the queue is empty, sends succeed with a default receipt.
pub(crate) struct ScriptedProvider {
    name: &'static str,
    outcomes: Mutex<VecDeque<Result<SendReceipt, ProviderError>>>,
    status_results: Mutex<VecDeque<Result<Option<DeliveryUpdate>, ProviderError>>>,
    calls: AtomicUsize,
    status_calls: AtomicUsize,
}

impl ScriptedProvider {
    pub(crate) fn new(name: &'static str) -> Self {
        Self {
            name,
            outcomes: Mutex::new(VecDeque::new()),
            status_results: Mutex::new(VecDeque::new()),
            calls: AtomicUsize::new(0),
            status_calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn with_outcomes(
        name: &'static str,
        outcomes: Vec<Result<SendReceipt, ProviderError>>,
    ) -> Self {
        let provider = Self::new(name);
        *provider.outcomes.try_lock().expect("fresh mutex") = VecDeque::from(outcomes);
        provider
    }

    /// Queue a result for the next `message_status` poll.
    pub(crate) fn push_status(&self, result: Result<Option<DeliveryUpdate>, ProviderError>) {
        self.status_results
            .try_lock()
            .expect("status queue lock")
            .push_back(result);
    }

    /// Number of `send_sms` invocations so far.
    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Number of `message_status` invocations so far.
    pub(crate) fn status_calls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SmsProvider for ScriptedProvider {
    fn name(&self) -> &str {
        self.name
    }

    async fn send_sms(&self, _to: &str, _body: &str) -> Result<SendReceipt, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.outcomes.lock().await.pop_front().unwrap_or_else(|| {
            Ok(SendReceipt {
                provider_message_id: format!("{}-scripted", self.name),
            })
        })
    }

    async fn message_status(
        &self,
        _provider_message_id: &str,
    ) -> Result<Option<DeliveryUpdate>, ProviderError> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        self.status_results
            .lock()
            .await
            .pop_front()
            .unwrap_or(Ok(None))
    }
}

/// In-memory message store enforcing the same lifecycle rules as SQLite.
pub(crate) struct MemoryMessageStore {
    rows: Mutex<HashMap<String, SmsMessage>>,
    creates: AtomicUsize,
    fail_next_create: AtomicBool,
    fail_next_finalize: AtomicBool,
}

impl MemoryMessageStore {
    pub(crate) fn new() -> Self {
        Self {
            rows: Mutex::new(HashMap::new()),
            creates: AtomicUsize::new(0),
            fail_next_create: AtomicBool::new(false),
            fail_next_finalize: AtomicBool::new(false),
        }
    }

    pub(crate) fn creates(&self) -> usize {
        self.creates.load(Ordering::SeqCst)
    }

    pub(crate) fn fail_next_create(&self) {
        self.fail_next_create.store(true, Ordering::SeqCst);
    }

    pub(crate) fn fail_next_finalize(&self) {
        self.fail_next_finalize.store(true, Ordering::SeqCst);
    }

    pub(crate) async fn get(&self, id: &str) -> Option<SmsMessage> {
        self.rows.lock().await.get(id).cloned()
    }
}

fn storage_error(detail: &str) -> PlastflowError {
    PlastflowError::Storage {
        source: detail.to_string().into(),
    }
}

#[async_trait]
impl MessageStore for MemoryMessageStore {
    async fn create_message(&self, message: &SmsMessage) -> Result<(), PlastflowError> {
        if self.fail_next_create.swap(false, Ordering::SeqCst) {
            return Err(storage_error("injected create failure"));
        }
        self.creates.fetch_add(1, Ordering::SeqCst);
        self.rows
            .lock()
            .await
            .insert(message.id.clone(), message.clone());
        Ok(())
    }

    async fn finalize_message(
        &self,
        id: &str,
        outcome: &MessageFinal,
    ) -> Result<(), PlastflowError> {
        if self.fail_next_finalize.swap(false, Ordering::SeqCst) {
            return Err(storage_error("injected finalize failure"));
        }
        let mut rows = self.rows.lock().await;
        let Some(message) = rows.get_mut(id) else {
            return Err(PlastflowError::Internal(format!("message {id} not found")));
        };
        if message.status != MessageStatus::Pending {
            return Err(PlastflowError::Internal(format!(
                "message {id} is not pending; refusing a second finalization"
            )));
        }
        message.status = outcome.status;
        message.provider = outcome.provider.clone();
        message.provider_message_id = outcome.provider_message_id.clone();
        message.error_detail = outcome.error_detail.clone();
        Ok(())
    }

    async fn record_delivery(
        &self,
        id: &str,
        status: Option<MessageStatus>,
        delivered_at: Option<&str>,
        detail: Option<&str>,
    ) -> Result<(), PlastflowError> {
        let mut rows = self.rows.lock().await;
        if let Some(message) = rows.get_mut(id) {
            if let Some(status) = status {
                message.status = status;
            }
            if let Some(delivered_at) = delivered_at {
                message.delivered_at = Some(delivered_at.to_string());
            }
            if let Some(detail) = detail {
                message.error_detail = Some(detail.to_string());
            }
        }
        Ok(())
    }

    async fn get_message(&self, id: &str) -> Result<Option<SmsMessage>, PlastflowError> {
        Ok(self.rows.lock().await.get(id).cloned())
    }

    async fn recent_messages(&self, limit: i64) -> Result<Vec<SmsMessage>, PlastflowError> {
        let rows = self.rows.lock().await;
        let mut all: Vec<SmsMessage> = rows.values().cloned().collect();
        all.sort_by(|a, b| b.sent_at.cmp(&a.sent_at));
        all.truncate(limit.max(0) as usize);
        Ok(all)
    }
}

/// In-memory health store applying the same policy math as the SQL UPSERTs.
pub(crate) struct MemoryHealthStore {
    policy: HealthPolicy,
    rows: Mutex<HashMap<String, ProviderHealth>>,
}

impl MemoryHealthStore {
    pub(crate) fn new(policy: HealthPolicy) -> Self {
        Self {
            policy,
            rows: Mutex::new(HashMap::new()),
        }
    }

    pub(crate) async fn get(&self, provider: &str) -> Option<ProviderHealth> {
        self.rows.lock().await.get(provider).cloned()
    }
}

fn empty_row(provider: &str) -> ProviderHealth {
    ProviderHealth {
        provider: provider.to_string(),
        success_count: 0,
        failure_count: 0,
        last_success_at: None,
        last_failure_at: None,
        last_error: None,
        status: ProviderStatus::Healthy,
        checked_at: "1970-01-01T00:00:00.000Z".to_string(),
    }
}

const TEST_NOW: &str = "2026-01-01T00:00:00.000Z";

#[async_trait]
impl HealthStore for MemoryHealthStore {
    async fn record_success(&self, provider: &str) -> Result<(), PlastflowError> {
        let mut rows = self.rows.lock().await;
        let row = rows
            .entry(provider.to_string())
            .or_insert_with(|| empty_row(provider));
        row.success_count += 1;
        if self.policy.reset_failures_on_success {
            row.failure_count = 0;
        }
        row.last_success_at = Some(TEST_NOW.to_string());
        row.status = ProviderStatus::Healthy;
        row.checked_at = TEST_NOW.to_string();
        Ok(())
    }

    async fn record_failure(&self, provider: &str, error: &str) -> Result<(), PlastflowError> {
        let mut rows = self.rows.lock().await;
        let row = rows
            .entry(provider.to_string())
            .or_insert_with(|| empty_row(provider));
        row.failure_count += 1;
        row.last_failure_at = Some(TEST_NOW.to_string());
        row.last_error = Some(error.to_string());
        row.status = self.policy.classify(row.failure_count);
        row.checked_at = TEST_NOW.to_string();
        Ok(())
    }

    async fn get_health(
        &self,
        provider: &str,
    ) -> Result<Option<ProviderHealth>, PlastflowError> {
        Ok(self.rows.lock().await.get(provider).cloned())
    }

    async fn list_health(&self) -> Result<Vec<ProviderHealth>, PlastflowError> {
        let rows = self.rows.lock().await;
        let mut all: Vec<ProviderHealth> = rows.values().cloned().collect();
        all.sort_by(|a, b| a.provider.cmp(&b.provider));
        Ok(all)
    }
}
