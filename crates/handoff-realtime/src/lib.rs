// SPDX-FileCopyrightText: 2026 Handoff Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Realtime side of the Handoff inbox coordinator.
//!
//! The [`EventRouter`] owns the process-wide push connection, normalizes
//! heterogeneous event payloads into typed [`InboxEvent`]s, and fans them
//! out to named listeners. [`WsTransport`] is the production transport;
//! anything implementing `handoff_core::RealtimeTransport` can stand in.

pub mod events;
pub mod normalize;
pub mod router;
pub mod ws;

pub use events::{names, ConnectionState, InboxEvent};
pub use router::EventRouter;
pub use ws::WsTransport;
