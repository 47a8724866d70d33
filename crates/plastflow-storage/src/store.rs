// SPDX-FileCopyrightText: 2026 PlastFlow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the message and health store traits.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use plastflow_config::model::StorageConfig;
use plastflow_core::types::{HealthPolicy, MessageFinal, MessageStatus, ProviderHealth, SmsMessage};
use plastflow_core::{HealthStore, MessageStore, PlastflowError};

use crate::database::Database;
use crate::queries;

/// SQLite-backed store for message records and provider health rows.
///
/// Wraps a [`Database`] handle and delegates all query operations to the
/// typed query modules. The database is lazily opened on the first call to
/// [`SqliteStore::initialize`].
pub struct SqliteStore {
    config: StorageConfig,
    policy: HealthPolicy,
    db: OnceCell<Database>,
}

impl SqliteStore {
    /// Create a new store with the given configuration.
    ///
    /// The database connection is not opened until [`initialize`] is called.
    ///
    /// [`initialize`]: SqliteStore::initialize
    pub fn new(config: StorageConfig, policy: HealthPolicy) -> Self {
        Self {
            config,
            policy,
            db: OnceCell::new(),
        }
    }

    /// Open the database at the configured path and run migrations.
    pub async fn initialize(&self) -> Result<(), PlastflowError> {
        let db =
            Database::open_with_options(&self.config.database_path, self.config.wal_mode).await?;
        self.db.set(db).map_err(|_| PlastflowError::Storage {
            source: "store already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite store initialized");
        Ok(())
    }

    /// Checkpoint the WAL before shutdown.
    pub async fn close(&self) -> Result<(), PlastflowError> {
        let db = self.db()?;
        db.connection()
            .call(|conn| {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(crate::database::map_tr_err)?;
        debug!("WAL checkpoint complete");
        Ok(())
    }

    /// Returns the underlying database, or an error if not initialized.
    fn db(&self) -> Result<&Database, PlastflowError> {
        self.db.get().ok_or_else(|| PlastflowError::Storage {
            source: "store not initialized -- call initialize() first".into(),
        })
    }
}

#[async_trait]
impl MessageStore for SqliteStore {
    async fn create_message(&self, message: &SmsMessage) -> Result<(), PlastflowError> {
        queries::messages::insert_message(self.db()?, message).await
    }

    async fn finalize_message(
        &self,
        id: &str,
        outcome: &MessageFinal,
    ) -> Result<(), PlastflowError> {
        queries::messages::finalize_message(self.db()?, id, outcome).await
    }

    async fn record_delivery(
        &self,
        id: &str,
        status: Option<MessageStatus>,
        delivered_at: Option<&str>,
        detail: Option<&str>,
    ) -> Result<(), PlastflowError> {
        queries::messages::record_delivery(self.db()?, id, status, delivered_at, detail).await
    }

    async fn get_message(&self, id: &str) -> Result<Option<SmsMessage>, PlastflowError> {
        queries::messages::get_message(self.db()?, id).await
    }

    async fn recent_messages(&self, limit: i64) -> Result<Vec<SmsMessage>, PlastflowError> {
        queries::messages::recent_messages(self.db()?, limit).await
    }
}

#[async_trait]
impl HealthStore for SqliteStore {
    async fn record_success(&self, provider: &str) -> Result<(), PlastflowError> {
        queries::provider_health::record_success(self.db()?, provider, &self.policy).await
    }

    async fn record_failure(&self, provider: &str, error: &str) -> Result<(), PlastflowError> {
        queries::provider_health::record_failure(self.db()?, provider, error, &self.policy).await
    }

    async fn get_health(
        &self,
        provider: &str,
    ) -> Result<Option<ProviderHealth>, PlastflowError> {
        queries::provider_health::get_health(self.db()?, provider).await
    }

    async fn list_health(&self) -> Result<Vec<ProviderHealth>, PlastflowError> {
        queries::provider_health::list_health(self.db()?).await
    }
}
