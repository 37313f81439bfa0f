//! Composer state for `@file` mentions.
//!
//! Typing `@` opens a dropdown of matching repository files. Queries are
//! debounced: each keystroke reschedules the lookup, and the caller polls
//! `due()` with the current time to learn when to hit the backend. Each
//! lookup gets a request id so that a slow response for an old query cannot
//! overwrite results for a newer one.

/// A lookup the caller should run against `ChatApiPort::search_files`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MentionRequest {
    pub request_id: u64,
    pub query: String,
}

#[derive(Debug, Clone)]
struct ScheduledQuery {
    query: String,
    due_at_ms: u64,
}

#[derive(Debug, Clone)]
pub struct MentionState {
    input: String,
    attachments: Vec<String>,
    open: bool,
    results: Vec<String>,
    debounce_ms: u64,
    scheduled: Option<ScheduledQuery>,
    next_request_id: u64,
}

impl MentionState {
    pub fn new(debounce_ms: u64) -> Self {
        Self {
            input: String::new(),
            attachments: Vec::new(),
            open: false,
            results: Vec::new(),
            debounce_ms,
            scheduled: None,
            next_request_id: 0,
        }
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    /// Files attached to the next message, in selection order
    pub fn attachments(&self) -> &[String] {
        &self.attachments
    }

    /// Dropdown entries, when there is something to show
    pub fn dropdown(&self) -> Option<&[String]> {
        (self.open && !self.results.is_empty()).then_some(self.results.as_slice())
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// True while a debounced query is waiting for its deadline
    pub fn has_scheduled(&self) -> bool {
        self.scheduled.is_some()
    }

    /// Feed the full composer text after an edit.
    pub fn on_input_changed(&mut self, text: impl Into<String>, now_ms: u64) {
        self.input = text.into();

        if self.input.ends_with('@') {
            // A fresh `@` starts a new lookup; older responses no longer apply
            self.invalidate();
            self.open = true;
            self.schedule(String::new(), now_ms);
            return;
        }

        if !self.input.contains('@') {
            self.close();
            return;
        }

        if self.open {
            let query = self
                .input
                .rsplit('@')
                .next()
                .unwrap_or_default()
                .to_string();
            self.schedule(query, now_ms);
        }
    }

    fn schedule(&mut self, query: String, now_ms: u64) {
        self.scheduled = Some(ScheduledQuery {
            query,
            due_at_ms: now_ms.saturating_add(self.debounce_ms),
        });
    }

    /// Take the scheduled query once its debounce window has elapsed.
    /// Empty queries are swallowed.
    pub fn due(&mut self, now_ms: u64) -> Option<MentionRequest> {
        if self.scheduled.as_ref()?.due_at_ms > now_ms {
            return None;
        }
        let scheduled = self.scheduled.take()?;
        if scheduled.query.is_empty() {
            return None;
        }
        self.next_request_id += 1;
        Some(MentionRequest {
            request_id: self.next_request_id,
            query: scheduled.query,
        })
    }

    /// Store results if they answer the most recent request.
    pub fn apply_results(&mut self, request_id: u64, files: Vec<String>) -> bool {
        if request_id != self.next_request_id || !self.open {
            log::debug!("Dropping stale mention results for request {}", request_id);
            return false;
        }
        self.results = files;
        true
    }

    /// Attach `file` and strip the trailing `@query` from the input.
    pub fn select(&mut self, file: &str) {
        if !self.attachments.iter().any(|f| f == file) {
            self.attachments.push(file.to_string());
        }
        if let Some(at) = self.input.rfind('@') {
            self.input.truncate(at);
        }
        self.close();
    }

    pub fn remove_attachment(&mut self, file: &str) {
        self.attachments.retain(|f| f != file);
    }

    /// Hand over the message and its attachments, resetting the composer.
    /// Returns `None` for blank input.
    pub fn take_submission(&mut self) -> Option<(String, Vec<String>)> {
        if self.input.trim().is_empty() {
            return None;
        }
        let text = std::mem::take(&mut self.input);
        let files = std::mem::take(&mut self.attachments);
        self.close();
        Some((text, files))
    }

    /// Clear input, attachments and any lookup in flight.
    /// Used when the active project changes.
    pub fn reset(&mut self) {
        self.input.clear();
        self.attachments.clear();
        self.close();
        self.invalidate();
    }

    fn invalidate(&mut self) {
        self.next_request_id += 1;
        self.results.clear();
    }

    fn close(&mut self) {
        self.open = false;
        self.results.clear();
        self.scheduled = None;
    }
}
