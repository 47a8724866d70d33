// SPDX-FileCopyrightText: 2026 PlastFlow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the PlastFlow SMS delivery service.

use thiserror::Error;

/// The primary error type used across the PlastFlow workspace.
#[derive(Debug, Error)]
pub enum PlastflowError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, migration failure).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// SMS provider errors surfaced outside the normal failover path
    /// (e.g. HTTP client construction).
    #[error("provider error: {message}")]
    Provider {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Failure of a single send attempt against one SMS gateway.
///
/// Adapters are total over this type: every transport problem, rejection,
/// or missing credential is converted into one of these variants, never
/// propagated raw. The orchestrator records the rendered text as the
/// per-provider diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// Required credentials are absent; no network call was attempted.
    #[error("not configured: {0}")]
    NotConfigured(String),

    /// Network-level failure: connect error, timeout, or unreadable body.
    #[error("transport error: {0}")]
    Transport(String),

    /// The gateway answered but refused the message (non-2xx status or a
    /// provider-reported rejection code).
    #[error("rejected: {0}")]
    Rejected(String),
}
