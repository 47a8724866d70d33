// SPDX-FileCopyrightText: 2026 PlastFlow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Delivery orchestration for the PlastFlow SMS service.
//!
//! [`SmsService`] owns the primary-then-secondary failover sequence, the
//! message lifecycle (`pending` -> `sent`/`failed`), and delivery-status
//! polling. [`HealthTracker`] maintains per-provider rolling health for
//! operator surfaces; it never influences routing.

pub mod health;
pub mod metrics;
pub mod service;

#[cfg(test)]
pub(crate) mod test_support;

pub use health::HealthTracker;
pub use metrics::register_metrics;
pub use service::{SendOptions, SmsService};
