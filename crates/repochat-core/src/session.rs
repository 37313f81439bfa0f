//! Chat session controller.
//!
//! Owns the transcript of the active project and drives one query at a time:
//! 1. Append the user message and mark the session pending
//! 2. Fetch `@file` attachments concurrently and expand them into the payload
//! 3. Submit the query; on 429 lock the session, on failure append an error
//! 4. Otherwise append an assistant placeholder and stream chunks into it
//! 5. Clear `pending`
//!
//! Every async continuation carries the epoch it was started under. A
//! project switch bumps the epoch and aborts the running stream, so results
//! that resolve late are dropped instead of landing in the new transcript.

use std::cell::RefCell;
use std::rc::Rc;

use chrono::{DateTime, Utc};
use futures::future::{join_all, AbortHandle, Abortable};
use futures::stream::StreamExt;

use repochat_types::{
    ChatError, Result,
    content::FileView,
    event::ChatEvent,
    message::ChatMessage,
    session::{Lockout, SendPhase, SessionSnapshot},
};
use crate::event_bus::EventBus;
use crate::payload::{build_outgoing_message, Attachment};
use crate::ports::{ChatApiPort, ChunkStream, QueryRequest, QueryResponse};

/// Shown when the backend rejects the query or sends no body
pub const GENERIC_FAILURE: &str = "Sorry, something went wrong with the stream.";

#[derive(Default)]
struct SessionState {
    project_id: Option<String>,
    messages: Vec<ChatMessage>,
    pending: bool,
    lockout: Option<Lockout>,
    phase: SendPhase,
    epoch: u64,
    stream_abort: Option<AbortHandle>,
}

/// Conversation controller for the active project.
///
/// Cheap to clone; clones share state, so one can be moved into each
/// spawned task.
#[derive(Clone)]
pub struct ChatSession {
    api: Rc<dyn ChatApiPort>,
    event_bus: EventBus,
    state: Rc<RefCell<SessionState>>,
    clock: fn() -> DateTime<Utc>,
}

impl ChatSession {
    pub fn new(api: Rc<dyn ChatApiPort>, event_bus: EventBus) -> Self {
        Self {
            api,
            event_bus,
            state: Rc::new(RefCell::new(SessionState::default())),
            clock: Utc::now,
        }
    }

    /// Replace the wall clock used for lockout countdowns.
    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let state = self.state.borrow();
        SessionSnapshot {
            project_id: state.project_id.clone(),
            messages: state.messages.clone(),
            pending: state.pending,
            lockout: state.lockout.clone(),
            phase: state.phase,
        }
    }

    pub fn project_id(&self) -> Option<String> {
        self.state.borrow().project_id.clone()
    }

    pub fn messages(&self) -> Vec<ChatMessage> {
        self.state.borrow().messages.clone()
    }

    pub fn is_pending(&self) -> bool {
        self.state.borrow().pending
    }

    pub fn lockout(&self) -> Option<Lockout> {
        self.state.borrow().lockout.clone()
    }

    pub fn phase(&self) -> SendPhase {
        self.state.borrow().phase
    }

    // ─── History ─────────────────────────────────────────────

    /// Make `project_id` the active project and load its history.
    ///
    /// Failures are logged and leave the transcript empty.
    pub async fn load_history(&self, project_id: Option<String>) {
        let epoch = self.switch_project(project_id.clone());
        let Some(project_id) = project_id else {
            return;
        };

        let history = match self.api.history(&project_id).await {
            Ok(history) => history,
            Err(e) => {
                log::warn!("Failed to load chat history for {}: {}", project_id, e);
                return;
            }
        };

        let messages = {
            let mut state = self.state.borrow_mut();
            if state.epoch != epoch {
                log::debug!("Discarding stale history for {}", project_id);
                return;
            }
            // Keep anything sent while the history was in flight after it.
            let sent_meanwhile = std::mem::take(&mut state.messages);
            state.messages = history;
            state.messages.extend(sent_meanwhile);
            state.messages.clone()
        };
        log::info!("Loaded {} messages for {}", messages.len(), project_id);
        self.event_bus.emit(ChatEvent::HistoryLoaded {
            project_id,
            messages,
        });
    }

    /// Leave the active project if it is `project_id` (it was deleted).
    /// Returns true when the session was reset.
    pub fn forget_project(&self, project_id: &str) -> bool {
        if self.project_id().as_deref() != Some(project_id) {
            return false;
        }
        log::info!("Active project {} was removed", project_id);
        self.switch_project(None);
        true
    }

    fn switch_project(&self, project_id: Option<String>) -> u64 {
        let epoch = {
            let mut state = self.state.borrow_mut();
            if let Some(handle) = state.stream_abort.take() {
                handle.abort();
            }
            let epoch = state.epoch.wrapping_add(1);
            *state = SessionState {
                project_id: project_id.clone(),
                epoch,
                ..SessionState::default()
            };
            epoch
        };
        self.event_bus.emit(ChatEvent::ProjectChanged { project_id });
        epoch
    }

    fn is_current(&self, epoch: u64) -> bool {
        self.state.borrow().epoch == epoch
    }

    // ─── Sending ─────────────────────────────────────────────

    /// Send `text` with the given attachments and stream the reply.
    ///
    /// Returns `false` without touching state when no project is active,
    /// the session is locked out, or a request is already in flight.
    pub async fn send(&self, text: &str, attached_files: &[String]) -> bool {
        let started = {
            let mut state = self.state.borrow_mut();
            match state.project_id.clone() {
                Some(project_id) if state.lockout.is_none() && !state.pending => {
                    let user = ChatMessage::user(text);
                    state.messages.push(user.clone());
                    state.pending = true;
                    state.phase = SendPhase::Sending;
                    Some((state.epoch, project_id, user))
                }
                _ => None,
            }
        };
        let Some((epoch, project_id, user)) = started else {
            log::debug!("Send ignored: no active project, locked out, or busy");
            return false;
        };

        self.event_bus.emit(ChatEvent::MessageAppended { message: user });
        self.event_bus.emit(ChatEvent::PendingChanged { pending: true });

        let attachments = self.fetch_attachments(&project_id, attached_files).await;
        if !self.is_current(epoch) {
            return true;
        }

        let request = QueryRequest {
            project_id,
            message: build_outgoing_message(text, &attachments),
            selected_files: attached_files.to_vec(),
        };
        self.run_query(epoch, request).await;
        self.finish(epoch);
        true
    }

    /// Fetch every attachment concurrently; failures become `None`.
    async fn fetch_attachments(&self, project_id: &str, paths: &[String]) -> Vec<Attachment> {
        let fetches = paths.iter().map(|path| async move {
            match self.api.file_content(project_id, path).await {
                Ok(content) => Attachment::new(path.as_str(), Some(content)),
                Err(e) => {
                    log::warn!("Failed to fetch attachment {}: {}", path, e);
                    Attachment::new(path.as_str(), None)
                }
            }
        });
        join_all(fetches).await
    }

    async fn run_query(&self, epoch: u64, request: QueryRequest) {
        let response = match self.api.query(request).await {
            Ok(response) => response,
            Err(e @ (ChatError::Http { .. } | ChatError::Stream(_))) => {
                log::error!("Chat request rejected: {}", e);
                self.fail(epoch, GENERIC_FAILURE);
                return;
            }
            Err(e) => {
                log::error!("Chat request failed: {}", e);
                self.fail(epoch, &e.to_string());
                return;
            }
        };

        match response {
            QueryResponse::RateLimited { error, reset_at } => {
                self.lock_out(epoch, &error, reset_at);
            }
            QueryResponse::Stream { sources, chunks } => {
                self.consume_stream(epoch, sources, chunks).await;
            }
        }
    }

    async fn consume_stream(&self, epoch: u64, sources: Vec<String>, chunks: ChunkStream) {
        let (abort_handle, registration) = AbortHandle::new_pair();
        let placeholder = {
            let mut state = self.state.borrow_mut();
            if state.epoch != epoch {
                return;
            }
            let placeholder = ChatMessage::placeholder(sources);
            state.messages.push(placeholder.clone());
            state.phase = SendPhase::Streaming;
            state.stream_abort = Some(abort_handle);
            placeholder
        };
        self.event_bus.emit(ChatEvent::MessageAppended { message: placeholder });

        let mut chunks = Abortable::new(chunks, registration);
        while let Some(chunk) = chunks.next().await {
            match chunk {
                Ok(text) => {
                    if !self.append_chunk(epoch, text) {
                        break;
                    }
                }
                Err(e) => {
                    log::error!("Stream interrupted: {}", e);
                    self.fail(epoch, &e.to_string());
                    return;
                }
            }
        }
    }

    /// Append to the last message if it is the assistant's. Returns false
    /// once the session has moved on to another project.
    fn append_chunk(&self, epoch: u64, text: String) -> bool {
        {
            let mut state = self.state.borrow_mut();
            if state.epoch != epoch {
                return false;
            }
            match state.messages.last_mut() {
                Some(last) if last.is_assistant() => last.content.push_str(&text),
                _ => return true,
            }
        }
        if !text.is_empty() {
            self.event_bus.emit(ChatEvent::StreamDelta { text });
        }
        true
    }

    fn lock_out(&self, epoch: u64, error: &str, reset_at: Option<DateTime<Utc>>) {
        let lockout = Lockout::from_rate_limit(error, reset_at, (self.clock)());
        let message = {
            let mut state = self.state.borrow_mut();
            if state.epoch != epoch {
                return;
            }
            let message = ChatMessage::error(lockout.reason.clone());
            state.messages.push(message.clone());
            state.lockout = Some(lockout.clone());
            state.phase = SendPhase::Locked;
            message
        };
        log::warn!("Rate limited: {}", lockout.reason);
        self.event_bus.emit(ChatEvent::LockedOut { lockout });
        self.event_bus.emit(ChatEvent::MessageAppended { message });
    }

    fn fail(&self, epoch: u64, description: &str) {
        let message = {
            let mut state = self.state.borrow_mut();
            if state.epoch != epoch {
                return;
            }
            let message = ChatMessage::error(description);
            state.messages.push(message.clone());
            state.phase = SendPhase::Errored;
            message
        };
        self.event_bus.emit(ChatEvent::MessageAppended { message });
    }

    fn finish(&self, epoch: u64) {
        {
            let mut state = self.state.borrow_mut();
            if state.epoch != epoch {
                return;
            }
            state.pending = false;
            state.stream_abort = None;
            if state.phase != SendPhase::Locked {
                state.phase = SendPhase::Idle;
            }
        }
        self.event_bus.emit(ChatEvent::PendingChanged { pending: false });
    }

    // ─── Files ───────────────────────────────────────────────

    /// Fetch a cited file for the code viewer.
    ///
    /// Failures are returned and also published as a `Notice`; they never
    /// enter the transcript.
    pub async fn open_file(&self, path: &str) -> Result<FileView> {
        let result = match self.project_id() {
            Some(project_id) => self.api.file_content(&project_id, path).await,
            None => Err(ChatError::NoProject),
        };
        match result {
            Ok(content) => Ok(FileView::new(path, content)),
            Err(e) => {
                log::warn!("Failed to open {}: {}", path, e);
                self.event_bus.emit(ChatEvent::Notice {
                    message: format!("Failed to load file {}: {}", path, e),
                });
                Err(e)
            }
        }
    }
}
