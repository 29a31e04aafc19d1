// SPDX-FileCopyrightText: 2026 Handoff Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock REST backend for deterministic testing.
//!
//! `MockBackend` implements `InboxBackend` with scriptable responses and
//! captured calls for assertion. History responses can be gated per
//! contact to exercise stale-response interleavings: a gated
//! `thread_messages` call parks until the test releases it.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, Notify};

use handoff_core::{
    Channel, HandoffError, HistoryPage, HistoryQuery, InboxBackend, ReadReceipt, SendBody,
    TakeoverMode, TakeoverOutcome, Thread,
};

/// A scriptable mock of the REST backend.
#[derive(Default)]
pub struct MockBackend {
    threads: Mutex<Vec<Thread>>,
    history: Mutex<HashMap<String, HistoryPage>>,
    history_gates: Mutex<HashMap<String, Arc<Notify>>>,
    takeover_outcomes: Mutex<VecDeque<TakeoverOutcome>>,
    read_receipt: Mutex<ReadReceipt>,
    sent: Mutex<Vec<(String, SendBody)>>,
    read_calls: Mutex<Vec<(String, u32)>>,
    fail_send: AtomicBool,
    fail_takeover: AtomicBool,
}

impl MockBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            read_receipt: Mutex::new(ReadReceipt { unread_count: 0 }),
            ..Self::default()
        })
    }

    /// Scripts the thread listing.
    pub async fn set_threads(&self, threads: Vec<Thread>) {
        *self.threads.lock().await = threads;
    }

    /// Scripts the history page returned for a contact.
    pub async fn set_history(&self, contact_id: impl Into<String>, page: HistoryPage) {
        self.history.lock().await.insert(contact_id.into(), page);
    }

    /// Gates history responses for a contact: each `thread_messages` call
    /// parks until the returned `Notify` is notified once.
    pub async fn gate_history(&self, contact_id: impl Into<String>) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.history_gates
            .lock()
            .await
            .insert(contact_id.into(), Arc::clone(&gate));
        gate
    }

    /// Scripts the next takeover outcome.
    pub async fn push_takeover_outcome(&self, outcome: TakeoverOutcome) {
        self.takeover_outcomes.lock().await.push_back(outcome);
    }

    /// Scripts the unread counter confirmed by `mark_read`.
    pub async fn set_read_receipt(&self, unread_count: u32) {
        *self.read_receipt.lock().await = ReadReceipt { unread_count };
    }

    /// Makes subsequent `send` calls fail with a backend error.
    pub fn set_fail_send(&self, fail: bool) {
        self.fail_send.store(fail, Ordering::SeqCst);
    }

    /// Makes subsequent `takeover` calls fail with a backend error.
    pub fn set_fail_takeover(&self, fail: bool) {
        self.fail_takeover.store(fail, Ordering::SeqCst);
    }

    /// Bodies passed to `send`, with their target contact.
    pub async fn sent(&self) -> Vec<(String, SendBody)> {
        self.sent.lock().await.clone()
    }

    /// `(contact_id, expected_unread)` pairs passed to `mark_read`.
    pub async fn read_calls(&self) -> Vec<(String, u32)> {
        self.read_calls.lock().await.clone()
    }
}

#[async_trait]
impl InboxBackend for MockBackend {
    async fn list_threads(
        &self,
        _agent_id: &str,
        _channel: Channel,
        limit: u32,
    ) -> Result<Vec<Thread>, HandoffError> {
        let threads = self.threads.lock().await;
        Ok(threads.iter().take(limit as usize).cloned().collect())
    }

    async fn thread_messages(
        &self,
        _agent_id: &str,
        contact_id: &str,
        query: HistoryQuery,
    ) -> Result<HistoryPage, HandoffError> {
        let gate = self.history_gates.lock().await.get(contact_id).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        let history = self.history.lock().await;
        let page = history.get(contact_id).ok_or(HandoffError::Backend {
            status: 404,
            message: format!("no history scripted for {contact_id}"),
        })?;

        // Emulate the backend's cursor: strictly older than `before`, newest
        // `limit` of those.
        let mut messages: Vec<_> = page
            .messages
            .iter()
            .filter(|m| query.before_ms.is_none_or(|b| m.timestamp_ms < b))
            .cloned()
            .collect();
        if messages.len() > query.limit as usize {
            messages = messages.split_off(messages.len() - query.limit as usize);
        }

        Ok(HistoryPage {
            thread: page.thread.clone(),
            messages,
        })
    }

    async fn mark_read(
        &self,
        _agent_id: &str,
        contact_id: &str,
        expected_unread: u32,
        _channel: Channel,
    ) -> Result<ReadReceipt, HandoffError> {
        self.read_calls
            .lock()
            .await
            .push((contact_id.to_string(), expected_unread));
        Ok(*self.read_receipt.lock().await)
    }

    async fn takeover(
        &self,
        _agent_id: &str,
        contact_id: &str,
        _mode: TakeoverMode,
        _force: bool,
        _channel: Channel,
    ) -> Result<TakeoverOutcome, HandoffError> {
        if self.fail_takeover.load(Ordering::SeqCst) {
            return Err(HandoffError::Backend {
                status: 409,
                message: format!("takeover rejected for {contact_id}"),
            });
        }
        self.takeover_outcomes
            .lock()
            .await
            .pop_front()
            .ok_or_else(|| {
                HandoffError::Internal(format!("no takeover outcome scripted for {contact_id}"))
            })
    }

    async fn send(
        &self,
        _agent_id: &str,
        contact_id: &str,
        body: SendBody,
        _channel: Channel,
    ) -> Result<(), HandoffError> {
        if self.fail_send.load(Ordering::SeqCst) {
            return Err(HandoffError::Backend {
                status: 500,
                message: "send failed".into(),
            });
        }
        self.sent.lock().await.push((contact_id.to_string(), body));
        Ok(())
    }
}
