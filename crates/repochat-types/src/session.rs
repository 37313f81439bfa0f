use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::message::ChatMessage;

/// Client-side block on sending after the backend reported a rate limit.
///
/// Cleared only by switching project; reaching `reset_at` does not unlock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lockout {
    pub reason: String,
    pub reset_at: Option<DateTime<Utc>>,
}

impl Lockout {
    /// Build the lockout from a 429 payload, embedding the remaining time.
    pub fn from_rate_limit(error: &str, reset_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Self {
        let reason = match reset_at {
            Some(at) => format!(
                "{}. Try again in {}.",
                error.trim_end_matches('.'),
                format_remaining(at, now)
            ),
            None => error.to_string(),
        };
        Self { reason, reset_at }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.reset_at.is_some_and(|at| at <= now)
    }
}

/// `"{h}h {m}m"` until `reset_at`, floored, never negative.
pub fn format_remaining(reset_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let total_minutes = (reset_at - now).num_minutes().max(0);
    format!("{}h {}m", total_minutes / 60, total_minutes % 60)
}

/// Phase of the most recent `send`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SendPhase {
    #[default]
    Idle,
    /// Request submitted, waiting for response headers
    Sending,
    /// Appending chunks to the assistant placeholder
    Streaming,
    Errored,
    Locked,
}

/// Read-only copy of the session state handed to views
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionSnapshot {
    pub project_id: Option<String>,
    pub messages: Vec<ChatMessage>,
    pub pending: bool,
    pub lockout: Option<Lockout>,
    pub phase: SendPhase,
}

impl SessionSnapshot {
    /// Whether the composer should accept a submission
    pub fn can_send(&self) -> bool {
        self.project_id.is_some() && self.lockout.is_none() && !self.pending
    }
}
