// SPDX-FileCopyrightText: 2026 PlastFlow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider health counter operations.
//!
//! Every update is a single UPSERT: counters are incremented additively and
//! the derived status is recomputed in SQL from the post-increment failure
//! count, so concurrent sends compose without a lock.

use plastflow_core::types::{HealthPolicy, ProviderHealth};
use plastflow_core::PlastflowError;
use rusqlite::params;

use crate::database::Database;
use crate::queries::parse_text_column;

const HEALTH_COLUMNS: &str = "provider, success_count, failure_count, last_success_at, \
     last_failure_at, last_error, status, checked_at";

fn row_to_health(row: &rusqlite::Row<'_>) -> Result<ProviderHealth, rusqlite::Error> {
    let status: String = row.get(6)?;
    Ok(ProviderHealth {
        provider: row.get(0)?,
        success_count: row.get(1)?,
        failure_count: row.get(2)?,
        last_success_at: row.get(3)?,
        last_failure_at: row.get(4)?,
        last_error: row.get(5)?,
        status: parse_text_column(6, &status)?,
        checked_at: row.get(7)?,
    })
}

/// Record one successful send attempt against a provider.
///
/// A success always restores `healthy` status; whether it also zeroes the
/// failure counter is governed by the policy.
pub async fn record_success(
    db: &Database,
    provider: &str,
    policy: &HealthPolicy,
) -> Result<(), PlastflowError> {
    let provider = provider.to_string();
    let reset_failures = policy.reset_failures_on_success;
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO provider_health
                     (provider, success_count, failure_count, last_success_at, status, checked_at)
                 VALUES (?1, 1, 0, strftime('%Y-%m-%dT%H:%M:%fZ', 'now'), 'healthy',
                         strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
                 ON CONFLICT(provider) DO UPDATE SET
                     success_count = success_count + 1,
                     failure_count = CASE WHEN ?2 THEN 0 ELSE failure_count END,
                     last_success_at = excluded.last_success_at,
                     status = 'healthy',
                     checked_at = excluded.checked_at",
                params![provider, reset_failures],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Record one failed send attempt and its diagnostic text.
///
/// Status is derived from the post-increment failure count against the
/// configured thresholds, inside the same atomic statement.
pub async fn record_failure(
    db: &Database,
    provider: &str,
    error: &str,
    policy: &HealthPolicy,
) -> Result<(), PlastflowError> {
    let provider = provider.to_string();
    let error = error.to_string();
    let degraded_after = i64::from(policy.degraded_after);
    let down_after = i64::from(policy.down_after);
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO provider_health
                     (provider, success_count, failure_count, last_failure_at, last_error,
                      status, checked_at)
                 VALUES (?1, 0, 1, strftime('%Y-%m-%dT%H:%M:%fZ', 'now'), ?2,
                         CASE WHEN 1 >= ?4 THEN 'down'
                              WHEN 1 >= ?3 THEN 'degraded'
                              ELSE 'healthy' END,
                         strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
                 ON CONFLICT(provider) DO UPDATE SET
                     failure_count = failure_count + 1,
                     last_failure_at = excluded.last_failure_at,
                     last_error = excluded.last_error,
                     status = CASE WHEN failure_count + 1 >= ?4 THEN 'down'
                                   WHEN failure_count + 1 >= ?3 THEN 'degraded'
                                   ELSE 'healthy' END,
                     checked_at = excluded.checked_at",
                params![provider, error, degraded_after, down_after],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get the health row for one provider, if it has recorded any outcome.
pub async fn get_health(
    db: &Database,
    provider: &str,
) -> Result<Option<ProviderHealth>, PlastflowError> {
    let provider = provider.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {HEALTH_COLUMNS} FROM provider_health WHERE provider = ?1"
            ))?;
            let result = stmt.query_row(params![provider], row_to_health);
            match result {
                Ok(health) => Ok(Some(health)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// All known provider health rows, alphabetical by provider name.
pub async fn list_health(db: &Database) -> Result<Vec<ProviderHealth>, PlastflowError> {
    db.connection()
        .call(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {HEALTH_COLUMNS} FROM provider_health ORDER BY provider ASC"
            ))?;
            let rows = stmt.query_map([], row_to_health)?;
            let mut all = Vec::new();
            for row in rows {
                all.push(row?);
            }
            Ok(all)
        })
        .await
        .map_err(crate::database::map_tr_err)
}
