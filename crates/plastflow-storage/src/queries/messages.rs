// SPDX-FileCopyrightText: 2026 PlastFlow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SMS message record operations.

use plastflow_core::types::{MessageFinal, MessageStatus, SmsMessage};
use plastflow_core::PlastflowError;
use rusqlite::params;

use crate::database::Database;
use crate::queries::parse_text_column;

const MESSAGE_COLUMNS: &str = "id, recipient, body, category, order_id, job_order_id, \
     customer_id, sent_by, recipient_name, priority, status, provider, \
     provider_message_id, error_detail, sent_at, delivered_at";

fn row_to_message(row: &rusqlite::Row<'_>) -> Result<SmsMessage, rusqlite::Error> {
    let category: String = row.get(3)?;
    let priority: String = row.get(9)?;
    let status: String = row.get(10)?;
    Ok(SmsMessage {
        id: row.get(0)?,
        recipient: row.get(1)?,
        body: row.get(2)?,
        category: parse_text_column(3, &category)?,
        order_id: row.get(4)?,
        job_order_id: row.get(5)?,
        customer_id: row.get(6)?,
        sent_by: row.get(7)?,
        recipient_name: row.get(8)?,
        priority: parse_text_column(9, &priority)?,
        status: parse_text_column(10, &status)?,
        provider: row.get(11)?,
        provider_message_id: row.get(12)?,
        error_detail: row.get(13)?,
        sent_at: row.get(14)?,
        delivered_at: row.get(15)?,
    })
}

/// Insert a new message record.
pub async fn insert_message(db: &Database, msg: &SmsMessage) -> Result<(), PlastflowError> {
    let msg = msg.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO sms_messages (id, recipient, body, category, order_id, \
                 job_order_id, customer_id, sent_by, recipient_name, priority, status, \
                 provider, provider_message_id, error_detail, sent_at, delivered_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
                params![
                    msg.id,
                    msg.recipient,
                    msg.body,
                    msg.category.to_string(),
                    msg.order_id,
                    msg.job_order_id,
                    msg.customer_id,
                    msg.sent_by,
                    msg.recipient_name,
                    msg.priority.to_string(),
                    msg.status.to_string(),
                    msg.provider,
                    msg.provider_message_id,
                    msg.error_detail,
                    msg.sent_at,
                    msg.delivered_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Write the terminal outcome of a message.
///
/// Guarded on `status = 'pending'` so a message transitions exactly once;
/// finalizing a missing or already-finalized message is an error.
pub async fn finalize_message(
    db: &Database,
    id: &str,
    outcome: &MessageFinal,
) -> Result<(), PlastflowError> {
    let id = id.to_string();
    let outcome = outcome.clone();
    let id_in_closure = id.clone();
    let changed = db
        .connection()
        .call(move |conn| {
            let changed = conn.execute(
                "UPDATE sms_messages
                 SET status = ?1, provider = ?2, provider_message_id = ?3, error_detail = ?4
                 WHERE id = ?5 AND status = 'pending'",
                params![
                    outcome.status.to_string(),
                    outcome.provider,
                    outcome.provider_message_id,
                    outcome.error_detail,
                    id_in_closure,
                ],
            )?;
            Ok(changed)
        })
        .await
        .map_err(crate::database::map_tr_err)?;

    if changed == 0 {
        return Err(PlastflowError::Internal(format!(
            "message {id} is not pending; refusing a second finalization"
        )));
    }
    Ok(())
}

/// Apply a delivery-status poll result as a partial update.
///
/// `None` fields leave the stored value untouched.
pub async fn record_delivery(
    db: &Database,
    id: &str,
    status: Option<MessageStatus>,
    delivered_at: Option<&str>,
    detail: Option<&str>,
) -> Result<(), PlastflowError> {
    let id = id.to_string();
    let status = status.map(|s| s.to_string());
    let delivered_at = delivered_at.map(|s| s.to_string());
    let detail = detail.map(|s| s.to_string());
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE sms_messages
                 SET status = COALESCE(?1, status),
                     delivered_at = COALESCE(?2, delivered_at),
                     error_detail = COALESCE(?3, error_detail)
                 WHERE id = ?4",
                params![status, delivered_at, detail, id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get a message by id.
pub async fn get_message(db: &Database, id: &str) -> Result<Option<SmsMessage>, PlastflowError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {MESSAGE_COLUMNS} FROM sms_messages WHERE id = ?1"
            ))?;
            let result = stmt.query_row(params![id], row_to_message);
            match result {
                Ok(msg) => Ok(Some(msg)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Most recently sent messages, newest first.
pub async fn recent_messages(db: &Database, limit: i64) -> Result<Vec<SmsMessage>, PlastflowError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {MESSAGE_COLUMNS} FROM sms_messages
                 ORDER BY sent_at DESC LIMIT ?1"
            ))?;
            let rows = stmt.query_map(params![limit], row_to_message)?;
            let mut messages = Vec::new();
            for row in rows {
                messages.push(row?);
            }
            Ok(messages)
        })
        .await
        .map_err(crate::database::map_tr_err)
}
