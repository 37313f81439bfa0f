use serde::{Deserialize, Serialize};

use crate::message::ChatMessage;
use crate::project::{GithubRepo, Project};
use crate::session::Lockout;

/// Events emitted by the chat session controller and by the app's
/// background requests. UI subscribes to these for reactive updates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ChatEvent {
    /// The active project changed; transcript, lockout and pending were reset
    ProjectChanged { project_id: Option<String> },

    /// History arrived and replaced the transcript
    HistoryLoaded {
        project_id: String,
        messages: Vec<ChatMessage>,
    },

    /// A message was appended to the transcript
    MessageAppended { message: ChatMessage },

    /// A decoded chunk for the last assistant message
    StreamDelta { text: String },

    /// A request started or finished
    PendingChanged { pending: bool },

    /// The backend rate-limited this session
    LockedOut { lockout: Lockout },

    /// Alert-style failure that is not part of the transcript
    Notice { message: String },

    // ─── App-level requests ──────────────────────────────────

    /// The project list was refreshed
    ProjectsLoaded { projects: Vec<Project> },

    /// Results of a debounced mention lookup
    MentionResults { request_id: u64, files: Vec<String> },

    /// A cited file was fetched for the code viewer
    FileOpened { path: String, content: String },

    PullRequestCreated { url: String },

    PullRequestFailed { message: String },

    // ─── Project management ──────────────────────────────────

    /// Repositories offered by the import dialog
    GithubReposLoaded { repos: Vec<GithubRepo> },

    GithubReposFailed { message: String },

    /// A repository was imported and is being indexed
    ProjectAdded { project: Project },

    ProjectImportFailed { message: String },

    ProjectDeleted { project_id: String },

    ProjectDeleteFailed { project_id: String, message: String },

    /// The backend refused to re-index; undo the optimistic status
    ProjectSyncFailed { project_id: String, message: String },
}
