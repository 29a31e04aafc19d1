// SPDX-FileCopyrightText: 2026 Handoff Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Sorted conversation list for one (agent, channel) scope.
//!
//! Entries are ordered descending by last-message timestamp. Both the REST
//! refresh path and the realtime event path can create an entry, and
//! neither is guaranteed to run first: a thread named by an event before
//! the initial listing lands gets a minimal placeholder rather than being
//! dropped.

use tracing::debug;

use handoff_core::{Channel, Direction, MediaKind, Message, TakeoverOutcome, Thread, ThreadKey};

use crate::takeover;

/// Directory of conversations for the active (agent, channel) scope.
#[derive(Debug)]
pub struct ThreadDirectory {
    agent_id: String,
    channel: Channel,
    threads: Vec<Thread>,
}

impl ThreadDirectory {
    pub fn new(agent_id: impl Into<String>, channel: Channel) -> Self {
        Self {
            agent_id: agent_id.into(),
            channel,
            threads: Vec::new(),
        }
    }

    pub fn agent_id(&self) -> &str {
        &self.agent_id
    }

    pub fn channel(&self) -> Channel {
        self.channel
    }

    /// Threads in display order (newest activity first).
    pub fn threads(&self) -> &[Thread] {
        &self.threads
    }

    pub fn get(&self, contact_id: &str) -> Option<&Thread> {
        self.threads.iter().find(|t| t.key.contact_id == contact_id)
    }

    fn get_mut(&mut self, contact_id: &str) -> Option<&mut Thread> {
        self.threads
            .iter_mut()
            .find(|t| t.key.contact_id == contact_id)
    }

    /// Replaces the directory with a full REST refresh, sorted descending by
    /// last-message timestamp.
    pub fn replace(&mut self, threads: Vec<Thread>) {
        self.threads = threads;
        self.sort();
    }

    /// Applies a realtime "thread updated" event: the existing entry with
    /// the same identity is removed and the update takes its place at the
    /// head. The update is by definition the newest activity, so among
    /// entries with an equal timestamp it stays first.
    pub fn upsert_from_realtime(&mut self, thread: Thread) {
        self.threads
            .retain(|t| t.key.contact_id != thread.key.contact_id);
        self.threads.insert(0, thread);
        self.sort();
    }

    /// Applies a realtime "new message" event to the named thread's preview,
    /// timestamp, and direction. An unknown contact gets a minimal entry
    /// (bot mode, no lock, zero unread) so a thread is never invisible
    /// because of event-ordering races against the initial listing.
    pub fn apply_message_event(
        &mut self,
        contact_id: &str,
        message: &Message,
        direction: Direction,
    ) {
        let preview = preview_text(message);
        if let Some(thread) = self.get_mut(contact_id) {
            thread.preview = preview;
            thread.last_message_at_ms = message.timestamp_ms;
            thread.last_direction = direction;
        } else {
            debug!(contact_id, "message event for unknown contact, creating entry");
            let key = ThreadKey {
                agent_id: self.agent_id.clone(),
                channel: self.channel,
                contact_id: contact_id.to_string(),
            };
            let mut thread = Thread::placeholder(key, message.timestamp_ms);
            thread.preview = preview;
            thread.last_direction = direction;
            self.threads.insert(0, thread);
        }
        self.promote(contact_id);
    }

    /// Increments the unread counter for a thread. Called by the session
    /// controller for inbound messages on conversations other than the open
    /// one.
    pub fn bump_unread(&mut self, contact_id: &str) {
        if let Some(thread) = self.get_mut(contact_id) {
            thread.unread_count = thread.unread_count.saturating_add(1);
        }
    }

    /// Applies a server-confirmed unread counter. The counter only ever
    /// moves down toward the confirmed value; it is never raised here, so
    /// two racing events cannot undercount. A directory refresh carries
    /// authoritative values.
    pub fn mark_read(&mut self, contact_id: &str, unread_count: u32) {
        if let Some(thread) = self.get_mut(contact_id) {
            thread.unread_count = thread.unread_count.min(unread_count);
        }
    }

    /// Applies a server-confirmed takeover transition to a thread's
    /// embedded lock state. Unknown contacts are ignored.
    pub fn apply_takeover(&mut self, contact_id: &str, outcome: &TakeoverOutcome) {
        if let Some(thread) = self.get_mut(contact_id) {
            takeover::apply_confirmed(thread, outcome);
        }
    }

    /// Overwrites a thread's server state in place without treating it as
    /// new activity (no reorder). Used when a history fetch returns the
    /// server's current view of an already-listed thread.
    pub fn sync_thread(&mut self, thread: Thread) {
        match self.get_mut(&thread.key.contact_id) {
            Some(existing) => *existing = thread,
            None => {
                self.threads.push(thread);
                self.sort();
            }
        }
    }

    /// Moves a touched entry to the head among equal timestamps, then
    /// restores descending order. The sort is stable, so the promoted entry
    /// keeps head placement against ties.
    fn promote(&mut self, contact_id: &str) {
        if let Some(pos) = self
            .threads
            .iter()
            .position(|t| t.key.contact_id == contact_id)
            && pos > 0
        {
            let thread = self.threads.remove(pos);
            self.threads.insert(0, thread);
        }
        self.sort();
    }

    fn sort(&mut self) {
        self.threads
            .sort_by(|a, b| b.last_message_at_ms.cmp(&a.last_message_at_ms));
    }
}

/// Preview text for a message: its content, or a bracketed media tag for
/// pure-media messages.
fn preview_text(message: &Message) -> String {
    if !message.content.is_empty() {
        return message.content.clone();
    }
    match message.media.as_ref().map(|m| m.kind) {
        Some(MediaKind::Image) => "[image]".to_string(),
        Some(MediaKind::Video) => "[video]".to_string(),
        Some(MediaKind::Audio) => "[audio]".to_string(),
        Some(MediaKind::Document) => "[document]".to_string(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use handoff_core::{MediaDescriptor, MessageRole, TakeoverMode};

    fn thread(contact: &str, t: i64) -> Thread {
        Thread::placeholder(
            ThreadKey {
                agent_id: "agent-1".into(),
                channel: Channel::WhatsApp,
                contact_id: contact.into(),
            },
            t,
        )
    }

    fn message(t: i64, content: &str) -> Message {
        Message {
            role: MessageRole::User,
            content: content.into(),
            timestamp_ms: t,
            source: None,
            media: None,
        }
    }

    #[test]
    fn replace_sorts_descending() {
        let mut dir = ThreadDirectory::new("agent-1", Channel::WhatsApp);
        dir.replace(vec![
            thread("a", 10),
            thread("b", 30),
            thread("c", 20),
        ]);
        let order: Vec<&str> = dir
            .threads()
            .iter()
            .map(|t| t.key.contact_id.as_str())
            .collect();
        assert_eq!(order, vec!["b", "c", "a"]);
    }

    #[test]
    fn upsert_replaces_identity_and_wins_head_on_ties() {
        let mut dir = ThreadDirectory::new("agent-1", Channel::WhatsApp);
        dir.replace(vec![thread("a", 100), thread("b", 100)]);

        dir.upsert_from_realtime(thread("b", 100));
        let order: Vec<&str> = dir
            .threads()
            .iter()
            .map(|t| t.key.contact_id.as_str())
            .collect();
        assert_eq!(order, vec!["b", "a"]);
        assert_eq!(dir.threads().len(), 2, "no duplicate identity");
    }

    #[test]
    fn upsert_with_newer_timestamp_sorts_first() {
        let mut dir = ThreadDirectory::new("agent-1", Channel::WhatsApp);
        dir.replace(vec![thread("a", 100), thread("b", 50)]);
        dir.upsert_from_realtime(thread("b", 200));
        assert_eq!(dir.threads()[0].key.contact_id, "b");
    }

    #[test]
    fn message_event_updates_known_thread() {
        let mut dir = ThreadDirectory::new("agent-1", Channel::WhatsApp);
        dir.replace(vec![thread("a", 10), thread("b", 20)]);

        dir.apply_message_event("a", &message(30, "newest"), Direction::Inbound);
        let first = &dir.threads()[0];
        assert_eq!(first.key.contact_id, "a");
        assert_eq!(first.preview, "newest");
        assert_eq!(first.last_message_at_ms, 30);
        assert_eq!(first.last_direction, Direction::Inbound);
    }

    #[test]
    fn message_event_for_unknown_contact_creates_minimal_entry() {
        let mut dir = ThreadDirectory::new("agent-1", Channel::WhatsApp);
        dir.apply_message_event("ghost", &message(5, "hello"), Direction::Inbound);

        let t = dir.get("ghost").expect("entry must exist");
        assert_eq!(t.takeover.mode, TakeoverMode::Bot);
        assert!(t.takeover.lock_holder.is_none());
        assert_eq!(t.unread_count, 0);
        assert_eq!(t.key.agent_id, "agent-1");
        assert_eq!(t.preview, "hello");
    }

    #[test]
    fn media_only_message_gets_bracketed_preview() {
        let mut dir = ThreadDirectory::new("agent-1", Channel::WhatsApp);
        let mut msg = message(5, "");
        msg.media = Some(MediaDescriptor {
            kind: MediaKind::Audio,
            mime_type: "audio/ogg".into(),
        });
        dir.apply_message_event("a", &msg, Direction::Inbound);
        assert_eq!(dir.get("a").unwrap().preview, "[audio]");
    }

    #[test]
    fn mark_read_never_raises_the_counter() {
        let mut dir = ThreadDirectory::new("agent-1", Channel::WhatsApp);
        dir.replace(vec![thread("a", 10)]);
        dir.bump_unread("a");
        dir.bump_unread("a");
        assert_eq!(dir.get("a").unwrap().unread_count, 2);

        dir.mark_read("a", 5);
        assert_eq!(dir.get("a").unwrap().unread_count, 2, "not raised");

        dir.mark_read("a", 0);
        assert_eq!(dir.get("a").unwrap().unread_count, 0);
    }

    #[test]
    fn apply_takeover_updates_embedded_lock_state() {
        use handoff_core::{TakeoverOutcome, TakeoverState};

        let mut dir = ThreadDirectory::new("agent-1", Channel::WhatsApp);
        dir.replace(vec![thread("a", 10)]);

        let mut server = thread("a", 10);
        server.takeover = TakeoverState {
            mode: TakeoverMode::Human,
            lock_holder: Some("op-1".into()),
            locked_at_ms: Some(99),
        };
        dir.apply_takeover(
            "a",
            &TakeoverOutcome {
                mode: TakeoverMode::Human,
                thread: server,
            },
        );

        let t = dir.get("a").unwrap();
        assert_eq!(t.takeover.mode, TakeoverMode::Human);
        assert_eq!(t.takeover.lock_holder.as_deref(), Some("op-1"));

        // Unknown contact: no-op, no panic.
        dir.apply_takeover(
            "ghost",
            &TakeoverOutcome {
                mode: TakeoverMode::Bot,
                thread: thread("ghost", 1),
            },
        );
    }

    #[test]
    fn sync_thread_does_not_reorder() {
        let mut dir = ThreadDirectory::new("agent-1", Channel::WhatsApp);
        dir.replace(vec![thread("a", 100), thread("b", 50)]);

        let mut updated = thread("b", 50);
        updated.unread_count = 7;
        dir.sync_thread(updated);

        assert_eq!(dir.threads()[0].key.contact_id, "a", "order unchanged");
        assert_eq!(dir.get("b").unwrap().unread_count, 7);
    }
}
