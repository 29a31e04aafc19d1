// SPDX-FileCopyrightText: 2026 Handoff Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait seams for the two external collaborators the coordinator consumes:
//! the REST backend and the realtime event transport.

pub mod backend;
pub mod realtime;

pub use backend::{HistoryPage, HistoryQuery, InboxBackend, ReadReceipt, SendBody, TakeoverOutcome};
pub use realtime::{RealtimeTransport, TransportEvent};
