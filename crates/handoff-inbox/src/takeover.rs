// SPDX-FileCopyrightText: 2026 Handoff Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Legality gates for the bot/human send lock.
//!
//! Lock transitions are always server-confirmed: the client issues a
//! request and applies only the returned state. Optimistic local flips
//! would let two operators believe they both hold the pen.

use handoff_core::{TakeoverMode, TakeoverOutcome, Thread};

/// Whether the operator may compose and send into this conversation:
/// human mode with the lock held by the operator themselves.
pub fn can_send(thread: &Thread, operator_id: &str) -> bool {
    thread.takeover.mode == TakeoverMode::Human
        && thread.takeover.lock_holder.as_deref() == Some(operator_id)
}

/// Whether the conversation is read-only for this operator because another
/// operator holds the human lock.
pub fn is_locked_by_other(thread: &Thread, operator_id: &str) -> bool {
    thread.takeover.mode == TakeoverMode::Human
        && thread
            .takeover
            .lock_holder
            .as_deref()
            .is_some_and(|holder| holder != operator_id)
}

/// The transition target for a toggle request: the opposite of the current
/// mode.
pub fn toggle_target(current: TakeoverMode) -> TakeoverMode {
    match current {
        TakeoverMode::Bot => TakeoverMode::Human,
        TakeoverMode::Human => TakeoverMode::Bot,
    }
}

/// Applies a server-confirmed transition to the thread. Nothing else may
/// mutate lock state; a failed request leaves the thread untouched.
pub fn apply_confirmed(thread: &mut Thread, outcome: &TakeoverOutcome) {
    thread.takeover = outcome.thread.takeover.clone();
    thread.takeover.mode = outcome.mode;
}
