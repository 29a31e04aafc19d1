// SPDX-FileCopyrightText: 2026 Handoff Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The session controller actor.
//!
//! All command sources converge on one mpsc channel: UI commands from the
//! [`SessionHandle`], normalized realtime events forwarded from the event
//! router, and completions of history fetches the controller itself
//! dispatched. Processing a realtime event never suspends; REST calls are
//! the only suspension points. History fetches run as spawned tasks tagged
//! with (contact, epoch) so a response for a conversation that is no longer
//! open is recognized and discarded instead of overwriting the new one.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use handoff_core::{
    Channel, HandoffError, HistoryPage, HistoryQuery, InboxBackend, Message, MessageRole,
    MessageSource, SendBody,
};
use handoff_inbox::{takeover, MessageStore, ThreadDirectory};
use handoff_media::PendingAttachment;
use handoff_realtime::{ConnectionState, InboxEvent};

use crate::update::SessionUpdate;

/// Identity and tuning for one operator session.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub agent_id: String,
    pub operator_id: String,
    pub channel: Channel,
    /// History page size for cold open and backward pagination.
    pub page_size: u32,
}

/// Commands processed by the session event loop.
#[derive(Debug)]
pub enum SessionCommand {
    /// Full REST refresh of the thread directory.
    Refresh,
    /// Open a conversation and load its first history page.
    Open { contact_id: String },
    /// Close the open conversation.
    Close,
    /// Fetch one older history page for the open conversation.
    LoadOlder,
    /// Send plain text into the open conversation.
    SendText { text: String },
    /// Select an attachment, replacing any previous selection.
    Attach(PendingAttachment),
    /// Discard the selected attachment.
    DiscardAttachment,
    /// Send the selected attachment into the open conversation.
    SendAttachment,
    /// Request the opposite takeover mode for the open conversation.
    ToggleTakeover,
    /// A normalized realtime event, forwarded from the router.
    Realtime(InboxEvent),
    /// Completion of a dispatched history fetch (internal).
    HistoryLoaded {
        contact_id: String,
        epoch: u64,
        older: bool,
        result: Result<HistoryPage, HandoffError>,
    },
    /// Stop the session loop.
    Shutdown,
}

/// Cloneable handle driving a session controller.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    tx: mpsc::Sender<SessionCommand>,
}

impl SessionHandle {
    pub async fn refresh(&self) -> Result<(), HandoffError> {
        self.send(SessionCommand::Refresh).await
    }

    pub async fn open_thread(&self, contact_id: impl Into<String>) -> Result<(), HandoffError> {
        self.send(SessionCommand::Open {
            contact_id: contact_id.into(),
        })
        .await
    }

    pub async fn close_thread(&self) -> Result<(), HandoffError> {
        self.send(SessionCommand::Close).await
    }

    pub async fn load_older(&self) -> Result<(), HandoffError> {
        self.send(SessionCommand::LoadOlder).await
    }

    pub async fn send_text(&self, text: impl Into<String>) -> Result<(), HandoffError> {
        self.send(SessionCommand::SendText { text: text.into() }).await
    }

    pub async fn attach(&self, attachment: PendingAttachment) -> Result<(), HandoffError> {
        self.send(SessionCommand::Attach(attachment)).await
    }

    pub async fn discard_attachment(&self) -> Result<(), HandoffError> {
        self.send(SessionCommand::DiscardAttachment).await
    }

    pub async fn send_attachment(&self) -> Result<(), HandoffError> {
        self.send(SessionCommand::SendAttachment).await
    }

    pub async fn toggle_takeover(&self) -> Result<(), HandoffError> {
        self.send(SessionCommand::ToggleTakeover).await
    }

    pub async fn shutdown(&self) -> Result<(), HandoffError> {
        self.send(SessionCommand::Shutdown).await
    }

    /// Creates a listener sender suitable for
    /// [`EventRouter::attach`](handoff_realtime::EventRouter::attach) and
    /// forwards everything it receives into this session's loop.
    pub fn realtime_listener(&self, buffer: usize) -> mpsc::Sender<InboxEvent> {
        let (tx, mut rx) = mpsc::channel(buffer);
        let commands = self.tx.clone();
        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                if commands.send(SessionCommand::Realtime(event)).await.is_err() {
                    break;
                }
            }
        });
        tx
    }

    async fn send(&self, command: SessionCommand) -> Result<(), HandoffError> {
        self.tx
            .send(command)
            .await
            .map_err(|_| HandoffError::Internal("session loop is gone".into()))
    }
}

/// Spawns a session controller and returns its handle and update stream.
pub fn spawn(
    options: SessionOptions,
    backend: Arc<dyn InboxBackend>,
) -> (SessionHandle, mpsc::Receiver<SessionUpdate>) {
    let (command_tx, command_rx) = mpsc::channel(64);
    let (update_tx, update_rx) = mpsc::channel(64);

    let controller = SessionController {
        directory: ThreadDirectory::new(options.agent_id.clone(), options.channel),
        store: MessageStore::new(),
        open_contact: None,
        epoch: 0,
        pending_attachment: None,
        options,
        backend,
        internal_tx: command_tx.clone(),
        update_tx,
    };
    tokio::spawn(controller.run(command_rx));

    (SessionHandle { tx: command_tx }, update_rx)
}

/// Orchestrates the store, directory, and takeover gates for one session.
pub struct SessionController {
    options: SessionOptions,
    backend: Arc<dyn InboxBackend>,
    directory: ThreadDirectory,
    store: MessageStore,
    /// Identity of the open conversation. The directory entry is the single
    /// copy of the thread's truth; this is only a pointer into it.
    open_contact: Option<String>,
    /// Bumped on every open/close; tags history fetches so stale
    /// completions are recognized.
    epoch: u64,
    pending_attachment: Option<PendingAttachment>,
    internal_tx: mpsc::Sender<SessionCommand>,
    update_tx: mpsc::Sender<SessionUpdate>,
}

impl SessionController {
    async fn run(mut self, mut commands: mpsc::Receiver<SessionCommand>) {
        info!(
            agent_id = %self.options.agent_id,
            channel = %self.options.channel,
            "session loop started"
        );
        while let Some(command) = commands.recv().await {
            match command {
                SessionCommand::Refresh => self.refresh().await,
                SessionCommand::Open { contact_id } => self.open_thread(contact_id).await,
                SessionCommand::Close => self.close_thread().await,
                SessionCommand::LoadOlder => self.load_older(),
                SessionCommand::SendText { text } => self.send_text(text).await,
                SessionCommand::Attach(attachment) => {
                    // Replacing drops the previous attachment, releasing its
                    // preview resource.
                    self.pending_attachment = Some(attachment);
                }
                SessionCommand::DiscardAttachment => self.pending_attachment = None,
                SessionCommand::SendAttachment => self.send_attachment().await,
                SessionCommand::ToggleTakeover => self.toggle_takeover().await,
                SessionCommand::Realtime(event) => self.handle_realtime(event).await,
                SessionCommand::HistoryLoaded {
                    contact_id,
                    epoch,
                    older,
                    result,
                } => self.history_loaded(contact_id, epoch, older, result).await,
                SessionCommand::Shutdown => break,
            }
        }
        info!("session loop stopped");
    }

    async fn refresh(&mut self) {
        let result = self
            .backend
            .list_threads(
                &self.options.agent_id,
                self.options.channel,
                self.options.page_size,
            )
            .await;
        match result {
            Ok(threads) => {
                self.directory.replace(threads);
                self.emit_directory().await;
            }
            Err(e) => {
                warn!(error = %e, "thread listing failed");
                self.emit(SessionUpdate::Banner(e.to_string())).await;
            }
        }
    }

    async fn open_thread(&mut self, contact_id: String) {
        self.epoch += 1;
        self.open_contact = Some(contact_id.clone());
        self.store = MessageStore::new();
        self.emit(SessionUpdate::MessagesChanged(Vec::new())).await;
        self.dispatch_history_fetch(contact_id, None, false);
    }

    async fn close_thread(&mut self) {
        self.epoch += 1;
        self.open_contact = None;
        self.store = MessageStore::new();
        self.emit(SessionUpdate::MessagesChanged(Vec::new())).await;
    }

    fn load_older(&mut self) {
        let Some(contact_id) = self.open_contact.clone() else {
            return;
        };
        let Some(before_ms) = self.store.oldest_timestamp() else {
            return;
        };
        self.dispatch_history_fetch(contact_id, Some(before_ms), true);
    }

    /// Fires a history fetch as a spawned task so realtime events keep
    /// flowing while it is in flight. The completion re-enters the loop as
    /// `HistoryLoaded`, tagged for the stale check.
    fn dispatch_history_fetch(&self, contact_id: String, before_ms: Option<i64>, older: bool) {
        let backend = Arc::clone(&self.backend);
        let internal = self.internal_tx.clone();
        let agent_id = self.options.agent_id.clone();
        let query = HistoryQuery {
            channel: self.options.channel,
            limit: self.options.page_size,
            before_ms,
        };
        let epoch = self.epoch;
        tokio::spawn(async move {
            let result = backend.thread_messages(&agent_id, &contact_id, query).await;
            let _ = internal
                .send(SessionCommand::HistoryLoaded {
                    contact_id,
                    epoch,
                    older,
                    result,
                })
                .await;
        });
    }

    async fn history_loaded(
        &mut self,
        contact_id: String,
        epoch: u64,
        older: bool,
        result: Result<HistoryPage, HandoffError>,
    ) {
        if epoch != self.epoch || self.open_contact.as_deref() != Some(contact_id.as_str()) {
            debug!(contact_id = %contact_id, "stale history response discarded");
            return;
        }

        let page = match result {
            Ok(page) => page,
            Err(e) => {
                warn!(contact_id = %contact_id, error = %e, "history fetch failed");
                self.emit(SessionUpdate::Banner(e.to_string())).await;
                return;
            }
        };

        if older {
            let added = self.store.merge_older(page.messages);
            debug!(contact_id = %contact_id, added, "older page merged");
            self.emit_messages().await;
            return;
        }

        self.store.replace(page.messages);
        self.emit_messages().await;

        let thread = page.thread;
        let unread = thread.unread_count;
        self.directory.sync_thread(thread.clone());
        self.emit(SessionUpdate::TakeoverChanged(thread)).await;
        self.emit_directory().await;

        if unread > 0 {
            self.mark_read(contact_id, unread).await;
        }
    }

    async fn mark_read(&mut self, contact_id: String, expected_unread: u32) {
        let result = self
            .backend
            .mark_read(
                &self.options.agent_id,
                &contact_id,
                expected_unread,
                self.options.channel,
            )
            .await;
        match result {
            Ok(receipt) => {
                self.directory.mark_read(&contact_id, receipt.unread_count);
                self.emit(SessionUpdate::UnreadChanged {
                    contact_id,
                    unread_count: receipt.unread_count,
                })
                .await;
            }
            Err(e) => {
                warn!(contact_id = %contact_id, error = %e, "mark-read failed");
                self.emit(SessionUpdate::Banner(e.to_string())).await;
            }
        }
    }

    /// Checks the send gate for the open conversation. Returns the contact
    /// id when sending is legal; otherwise emits the denial and returns
    /// `None`.
    async fn gate_send(&mut self) -> Option<String> {
        let Some(contact_id) = self.open_contact.clone() else {
            self.emit(SessionUpdate::SendFailed("no open conversation".into()))
                .await;
            return None;
        };
        let gate = self.directory.get(&contact_id).map(|thread| {
            (
                takeover::can_send(thread, &self.options.operator_id),
                takeover::is_locked_by_other(thread, &self.options.operator_id),
                thread.takeover.lock_holder.clone(),
            )
        });
        match gate {
            None => {
                self.emit(SessionUpdate::SendFailed(
                    "open conversation is not in the directory".into(),
                ))
                .await;
                None
            }
            Some((true, _, _)) => Some(contact_id),
            Some((false, locked_by_other, lock_holder)) => {
                let holder = if locked_by_other { lock_holder } else { None };
                let denial = HandoffError::LockDenied { holder };
                self.emit(SessionUpdate::SendFailed(denial.to_string())).await;
                None
            }
        }
    }

    async fn send_text(&mut self, text: String) {
        let Some(contact_id) = self.gate_send().await else {
            return;
        };

        // Optimistic insert before the network call; the realtime echo
        // matching the same dedup tuple is absorbed as a duplicate. On
        // failure the message is deliberately left in place and the error
        // surfaced instead.
        let optimistic = Message {
            role: MessageRole::Assistant,
            content: text.clone(),
            timestamp_ms: now_ms(),
            source: Some(MessageSource::Human),
            media: None,
        };
        self.store.merge_newer(vec![optimistic]);
        self.emit_messages().await;

        let result = self
            .backend
            .send(
                &self.options.agent_id,
                &contact_id,
                SendBody::Text { text },
                self.options.channel,
            )
            .await;
        if let Err(e) = result {
            warn!(contact_id = %contact_id, error = %e, "text send failed");
            self.emit(SessionUpdate::SendFailed(e.to_string())).await;
        }
    }

    async fn send_attachment(&mut self) {
        let Some(contact_id) = self.gate_send().await else {
            return;
        };
        let Some(attachment) = self.pending_attachment.as_ref() else {
            self.emit(SessionUpdate::SendFailed("no attachment selected".into()))
                .await;
            return;
        };

        // No optimistic message for media; the realtime echo renders it.
        let body = attachment.to_send_body();
        let result = self
            .backend
            .send(&self.options.agent_id, &contact_id, body, self.options.channel)
            .await;
        match result {
            Ok(()) => self.pending_attachment = None,
            Err(e) => {
                warn!(contact_id = %contact_id, error = %e, "attachment send failed");
                self.emit(SessionUpdate::SendFailed(e.to_string())).await;
            }
        }
    }

    async fn toggle_takeover(&mut self) {
        let Some(contact_id) = self.open_contact.clone() else {
            self.emit(SessionUpdate::TakeoverFailed("no open conversation".into()))
                .await;
            return;
        };
        let current_mode = self.directory.get(&contact_id).map(|t| t.takeover.mode);
        let Some(current_mode) = current_mode else {
            self.emit(SessionUpdate::TakeoverFailed(
                "open conversation is not in the directory".into(),
            ))
            .await;
            return;
        };

        let target = takeover::toggle_target(current_mode);
        let result = self
            .backend
            .takeover(
                &self.options.agent_id,
                &contact_id,
                target,
                false,
                self.options.channel,
            )
            .await;
        match result {
            Ok(outcome) => {
                self.directory.apply_takeover(&contact_id, &outcome);
                if let Some(thread) = self.directory.get(&contact_id) {
                    self.emit(SessionUpdate::TakeoverChanged(thread.clone())).await;
                }
                self.emit_directory().await;
            }
            Err(e) => {
                warn!(contact_id = %contact_id, error = %e, "takeover request failed");
                self.emit(SessionUpdate::TakeoverFailed(e.to_string())).await;
            }
        }
    }

    /// Applies one realtime event. These are synchronous merges: nothing
    /// here performs a network call.
    async fn handle_realtime(&mut self, event: InboxEvent) {
        match event {
            InboxEvent::Connected => {
                self.emit(SessionUpdate::Connection(ConnectionState::Connected))
                    .await;
            }
            InboxEvent::Disconnected => {
                // No state purge on disconnect; the view stays intact.
                self.emit(SessionUpdate::Connection(ConnectionState::Disconnected))
                    .await;
            }
            InboxEvent::ConnectError(message) => {
                self.emit(SessionUpdate::Connection(ConnectionState::Disconnected))
                    .await;
                self.emit(SessionUpdate::Banner(format!(
                    "realtime connection error: {message}"
                )))
                .await;
            }
            InboxEvent::Message {
                contact_id,
                message,
                direction,
            } => {
                let is_open = self.open_contact.as_deref() == Some(contact_id.as_str());
                if is_open && self.store.merge_newer(vec![message.clone()]) > 0 {
                    self.emit_messages().await;
                }
                self.directory
                    .apply_message_event(&contact_id, &message, direction);
                if !is_open && direction == handoff_core::Direction::Inbound {
                    self.directory.bump_unread(&contact_id);
                }
                self.emit_directory().await;
            }
            InboxEvent::ThreadUpdated(thread) => {
                let is_open = self.open_contact.as_deref() == Some(thread.key.contact_id.as_str());
                let contact_id = thread.key.contact_id.clone();
                self.directory.upsert_from_realtime(thread);
                self.emit_directory().await;
                if is_open
                    && let Some(open) = self.directory.get(&contact_id)
                {
                    self.emit(SessionUpdate::TakeoverChanged(open.clone())).await;
                }
            }
            InboxEvent::PairingCode(code) => {
                self.emit(SessionUpdate::PairingCode(code)).await;
            }
        }
    }

    async fn emit_directory(&mut self) {
        self.emit(SessionUpdate::DirectoryChanged(
            self.directory.threads().to_vec(),
        ))
        .await;
    }

    async fn emit_messages(&mut self) {
        self.emit(SessionUpdate::MessagesChanged(self.store.display_view()))
            .await;
    }

    async fn emit(&mut self, update: SessionUpdate) {
        if self.update_tx.send(update).await.is_err() {
            debug!("update receiver dropped");
        }
    }
}

fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
