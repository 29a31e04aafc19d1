// SPDX-FileCopyrightText: 2026 Handoff Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-session orchestration for the Handoff inbox coordinator.
//!
//! One [`SessionController`] actor runs per operator session. It owns the
//! message store, the thread directory, and the open-thread pointer
//! exclusively; every mutation happens on its single event loop, which is
//! what makes the merge logic lock-free. The UI drives it through a
//! [`SessionHandle`] and renders the [`SessionUpdate`] stream it emits.

pub mod controller;
pub mod update;

pub use controller::{spawn, SessionCommand, SessionController, SessionHandle, SessionOptions};
pub use update::SessionUpdate;
