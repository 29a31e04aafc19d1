// SPDX-FileCopyrightText: 2026 Handoff Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Handoff inbox coordinator.
//!
//! This crate provides the foundational types, the error enum, and the trait
//! seams for the two external collaborators (REST backend and realtime
//! transport) used throughout the Handoff workspace.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::HandoffError;
pub use traits::{
    HistoryPage, HistoryQuery, InboxBackend, ReadReceipt, RealtimeTransport, SendBody,
    TakeoverOutcome, TransportEvent,
};
pub use types::{
    Channel, DedupKey, Direction, MediaDescriptor, MediaKind, Message, MessageRole,
    MessageSource, TakeoverMode, TakeoverState, Thread, ThreadKey,
};
