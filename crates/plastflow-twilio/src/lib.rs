// SPDX-FileCopyrightText: 2026 PlastFlow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Twilio SMS gateway adapter for PlastFlow (secondary provider).

pub mod client;

pub use client::TwilioSms;
