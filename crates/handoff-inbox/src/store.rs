// SPDX-FileCopyrightText: 2026 Handoff Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ordered, deduplicated message list for exactly one open conversation.
//!
//! History pages and realtime events deliver the same messages through two
//! transports with no server-assigned ids, so identity is the dedup tuple
//! (timestamp, role, content, media signature). The store keeps messages
//! sorted ascending by timestamp regardless of arrival order; equal
//! timestamps keep insertion order (stable sort).

use std::collections::HashSet;

use tracing::trace;

use handoff_core::{DedupKey, Message};

/// Message list for the currently open conversation.
#[derive(Debug, Default)]
pub struct MessageStore {
    messages: Vec<Message>,
    seen: HashSet<DedupKey>,
}

impl MessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages in display order (ascending timestamp).
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Timestamp of the oldest stored message; the `before` cursor for
    /// backward pagination.
    pub fn oldest_timestamp(&self) -> Option<i64> {
        self.messages.first().map(|m| m.timestamp_ms)
    }

    /// Discards prior content and stores the given messages, sorted
    /// ascending by timestamp and deduplicated. Used on cold open.
    pub fn replace(&mut self, messages: Vec<Message>) {
        self.messages.clear();
        self.seen.clear();
        self.insert_new(messages);
        self.messages.sort_by_key(|m| m.timestamp_ms);
    }

    /// Merges realtime appends or an optimistic local insert. Messages whose
    /// dedup tuple already exists are skipped; the rest are appended and the
    /// store is re-sorted, since events may arrive out of order.
    ///
    /// Returns the number of messages actually added.
    pub fn merge_newer(&mut self, messages: Vec<Message>) -> usize {
        let added = self.insert_new(messages);
        if added > 0 {
            self.messages.sort_by_key(|m| m.timestamp_ms);
        }
        added
    }

    /// Merges a page of strictly-older messages fetched with a `before`
    /// cursor. Dedup and ordering are identical to [`merge_newer`]; the
    /// split exists because callers guarantee the cursor, not because the
    /// store relies on it.
    ///
    /// [`merge_newer`]: MessageStore::merge_newer
    pub fn merge_older(&mut self, messages: Vec<Message>) -> usize {
        let added = self.insert_new(messages);
        if added > 0 {
            self.messages.sort_by_key(|m| m.timestamp_ms);
        }
        added
    }

    /// The sequence actually rendered: collapses *consecutive* messages with
    /// identical role and content. Some upstream sources repeat a message
    /// verbatim with no distinguishing field, so this is a lossy
    /// presentation transform; the underlying store is never mutated.
    pub fn display_view(&self) -> Vec<Message> {
        let mut view: Vec<Message> = Vec::with_capacity(self.messages.len());
        for msg in &self.messages {
            if let Some(prev) = view.last()
                && prev.role == msg.role
                && prev.content == msg.content
                && !msg.content.is_empty()
            {
                trace!(timestamp_ms = msg.timestamp_ms, "suppressed repeated message");
                continue;
            }
            view.push(msg.clone());
        }
        view
    }

    fn insert_new(&mut self, messages: Vec<Message>) -> usize {
        let mut added = 0;
        for msg in messages {
            let key = msg.dedup_key();
            if self.seen.contains(&key) {
                trace!(timestamp_ms = msg.timestamp_ms, "dropped duplicate message");
                continue;
            }
            self.seen.insert(key);
            self.messages.push(msg);
            added += 1;
        }
        added
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use handoff_core::{MediaDescriptor, MediaKind, MessageRole};
    use proptest::prelude::*;

    fn msg(t: i64, role: MessageRole, content: &str) -> Message {
        Message {
            role,
            content: content.into(),
            timestamp_ms: t,
            source: None,
            media: None,
        }
    }

    #[test]
    fn replace_sorts_ascending() {
        let mut store = MessageStore::new();
        store.replace(vec![
            msg(30, MessageRole::User, "c"),
            msg(10, MessageRole::User, "a"),
            msg(20, MessageRole::Assistant, "b"),
        ]);
        let times: Vec<i64> = store.messages().iter().map(|m| m.timestamp_ms).collect();
        assert_eq!(times, vec![10, 20, 30]);
        assert_eq!(store.oldest_timestamp(), Some(10));
    }

    #[test]
    fn merge_newer_drops_duplicates_and_appends_rest() {
        let mut store = MessageStore::new();
        store.replace(vec![msg(10, MessageRole::User, "hi")]);

        let added = store.merge_newer(vec![
            msg(10, MessageRole::User, "hi"),
            msg(12, MessageRole::User, "bye"),
        ]);
        assert_eq!(added, 1);
        let contents: Vec<&str> = store.messages().iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["hi", "bye"]);
    }

    #[test]
    fn same_timestamp_different_media_is_not_a_duplicate() {
        let mut store = MessageStore::new();
        let mut with_media = msg(10, MessageRole::User, "");
        with_media.media = Some(MediaDescriptor {
            kind: MediaKind::Image,
            mime_type: "image/png".into(),
        });
        store.replace(vec![msg(10, MessageRole::User, "")]);
        assert_eq!(store.merge_newer(vec![with_media]), 1);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn merge_older_prepends_in_order() {
        let mut store = MessageStore::new();
        store.replace(vec![
            msg(100, MessageRole::User, "later"),
            msg(110, MessageRole::Assistant, "reply"),
        ]);
        let added = store.merge_older(vec![
            msg(50, MessageRole::User, "earlier"),
            msg(60, MessageRole::Assistant, "old reply"),
        ]);
        assert_eq!(added, 2);
        let times: Vec<i64> = store.messages().iter().map(|m| m.timestamp_ms).collect();
        assert_eq!(times, vec![50, 60, 100, 110]);
        assert_eq!(store.oldest_timestamp(), Some(50));
    }

    #[test]
    fn out_of_order_realtime_arrival_is_resorted() {
        let mut store = MessageStore::new();
        store.merge_newer(vec![msg(20, MessageRole::User, "second")]);
        store.merge_newer(vec![msg(10, MessageRole::User, "first")]);
        let contents: Vec<&str> = store.messages().iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["first", "second"]);
    }

    #[test]
    fn equal_timestamps_keep_insertion_order() {
        let mut store = MessageStore::new();
        store.merge_newer(vec![msg(10, MessageRole::User, "a")]);
        store.merge_newer(vec![msg(10, MessageRole::User, "b")]);
        store.merge_newer(vec![msg(10, MessageRole::Assistant, "c")]);
        let contents: Vec<&str> = store.messages().iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["a", "b", "c"]);
    }

    #[test]
    fn display_view_collapses_consecutive_repeats_only() {
        let mut store = MessageStore::new();
        store.replace(vec![
            msg(10, MessageRole::Assistant, "ping"),
            msg(11, MessageRole::Assistant, "ping"),
            msg(12, MessageRole::User, "ping"),
            msg(13, MessageRole::Assistant, "ping"),
        ]);
        let view = store.display_view();
        // The second assistant "ping" collapses; the later ones are not
        // consecutive with it and survive.
        assert_eq!(view.len(), 3);
        assert_eq!(store.len(), 4, "store itself is untouched");
    }

    #[test]
    fn display_view_keeps_empty_content_media_messages() {
        let mut a = msg(10, MessageRole::User, "");
        a.media = Some(MediaDescriptor {
            kind: MediaKind::Image,
            mime_type: "image/png".into(),
        });
        let mut b = msg(11, MessageRole::User, "");
        b.media = Some(MediaDescriptor {
            kind: MediaKind::Image,
            mime_type: "image/jpeg".into(),
        });
        let mut store = MessageStore::new();
        store.replace(vec![a, b]);
        assert_eq!(store.display_view().len(), 2);
    }

    proptest! {
        /// For any interleaving of merge_newer/merge_older calls the store
        /// stays sorted non-decreasing with no duplicate dedup tuples.
        #[test]
        fn merge_sequences_preserve_order_and_uniqueness(
            batches in proptest::collection::vec(
                proptest::collection::vec((0i64..50, 0u8..2, 0u8..4), 0..8),
                0..6,
            ),
            newer_mask in proptest::collection::vec(any::<bool>(), 6),
        ) {
            let mut store = MessageStore::new();
            for (i, batch) in batches.into_iter().enumerate() {
                let msgs: Vec<Message> = batch
                    .into_iter()
                    .map(|(t, r, c)| msg(
                        t,
                        if r == 0 { MessageRole::User } else { MessageRole::Assistant },
                        &format!("m{c}"),
                    ))
                    .collect();
                if newer_mask[i % newer_mask.len()] {
                    store.merge_newer(msgs);
                } else {
                    store.merge_older(msgs);
                }
            }

            let times: Vec<i64> = store.messages().iter().map(|m| m.timestamp_ms).collect();
            let mut sorted = times.clone();
            sorted.sort_unstable();
            prop_assert_eq!(&times, &sorted);

            let mut keys = HashSet::new();
            for m in store.messages() {
                prop_assert!(keys.insert(m.dedup_key()), "duplicate tuple survived");
            }
        }
    }
}
