// SPDX-FileCopyrightText: 2026 Handoff Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client implementing the [`InboxBackend`] contract.
//!
//! [`InboxBackend`]: handoff_core::InboxBackend

pub mod http;

pub use http::HttpInboxBackend;
