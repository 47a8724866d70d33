// SPDX-FileCopyrightText: 2026 PlastFlow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Taqnyat SMS gateway adapter for PlastFlow (primary provider).

pub mod client;

pub use client::TaqnyatSms;
