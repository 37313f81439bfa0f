//! UI-level state that drives rendering.
//! This is a read-only projection of the chat session state,
//! updated each frame by draining the EventBus. Composer, viewer and
//! dialog state are owned here because only the UI mutates them.

use repochat_core::mentions::{MentionRequest, MentionState};
use repochat_types::{
    config::ClientConfig,
    content::{detect_code_filename, FileView},
    event::ChatEvent,
    message::ChatMessage,
    project::{set_status, GithubRepo, NewProject, Project, ProjectStatus, PullRequestDraft},
    session::Lockout,
};
use chrono::{DateTime, Utc};

/// Path offered in the PR dialog when the code names no file
pub const DEFAULT_PR_PATH: &str = "src/generated-code.ts";

/// Something the user asked for that needs the backend
#[derive(Debug, Clone, PartialEq)]
pub enum UiAction {
    SelectProject(String),
    Send { text: String, files: Vec<String> },
    OpenFile(String),
    SearchMentions(MentionRequest),
    CreatePullRequest(PullRequestDraft),
    LoadGithubRepos,
    ImportProject(NewProject),
    SyncProject(String),
    DeleteProject(String),
}

/// Progress of the pull request dialog
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrStatus {
    Editing,
    Submitting,
    Created(String),
    Failed(String),
}

/// Editable draft shown by the "Create PR" dialog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrDialog {
    pub file_path: String,
    pub content: String,
    pub status: PrStatus,
}

impl PrDialog {
    /// Prefill from a code block, using its `File:` header when present.
    pub fn from_code(code: &str) -> Self {
        let (file_path, content) = detect_code_filename(code)
            .unwrap_or_else(|| (DEFAULT_PR_PATH.to_string(), code.to_string()));
        Self {
            file_path,
            content,
            status: PrStatus::Editing,
        }
    }

    pub fn can_submit(&self) -> bool {
        !self.file_path.trim().is_empty() && matches!(self.status, PrStatus::Editing | PrStatus::Failed(_))
    }
}

/// "New project" dialog: pick a GitHub repository to import
#[derive(Debug, Clone, Default)]
pub struct NewProjectDialog {
    pub repos: Vec<GithubRepo>,
    pub loading: bool,
    pub search: String,
    /// Repository id of the import in flight
    pub importing: Option<u64>,
    pub error: Option<String>,
}

impl NewProjectDialog {
    pub fn filtered_repos(&self) -> impl Iterator<Item = &GithubRepo> {
        self.repos.iter().filter(|r| r.matches(&self.search))
    }
}

/// Pending delete confirmation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteConfirm {
    pub project_id: String,
    pub deleting: bool,
}

/// State visible to UI panels
pub struct UiState {
    pub project_id: Option<String>,
    pub projects: Vec<Project>,
    /// Transcript of the active project
    pub messages: Vec<ChatMessage>,
    pub pending: bool,
    pub lockout: Option<Lockout>,
    /// Dismissable alert (file load failures and the like)
    pub notice: Option<String>,
    pub composer: MentionState,
    pub viewer: Option<FileView>,
    pub pr_dialog: Option<PrDialog>,
    pub new_project: Option<NewProjectDialog>,
    pub delete_confirm: Option<DeleteConfirm>,
    /// Status line text
    pub status_text: String,
    pub max_visible_sources: usize,
}

impl UiState {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            project_id: None,
            projects: Vec::new(),
            messages: Vec::new(),
            pending: false,
            lockout: None,
            notice: None,
            composer: MentionState::new(config.mention_debounce_ms),
            viewer: None,
            pr_dialog: None,
            new_project: None,
            delete_confirm: None,
            status_text: "Select a project".to_string(),
            max_visible_sources: config.max_visible_sources,
        }
    }

    /// Process events from the EventBus and update UI state
    pub fn process_events(&mut self, events: Vec<ChatEvent>) {
        for event in events {
            match event {
                ChatEvent::ProjectChanged { project_id } => {
                    self.status_text = match &project_id {
                        Some(_) => "Loading history...".to_string(),
                        None => "Select a project".to_string(),
                    };
                    self.project_id = project_id;
                    self.messages.clear();
                    self.pending = false;
                    self.lockout = None;
                    self.composer.reset();
                    self.viewer = None;
                    self.pr_dialog = None;
                }
                ChatEvent::HistoryLoaded { project_id, messages } => {
                    if self.project_id.as_deref() == Some(project_id.as_str()) {
                        self.messages = messages;
                        self.status_text = "Ready".to_string();
                    } else {
                        log::debug!("Ignoring history for inactive project {}", project_id);
                    }
                }
                ChatEvent::MessageAppended { message } => {
                    self.messages.push(message);
                }
                ChatEvent::StreamDelta { text } => {
                    if let Some(last) = self.messages.last_mut().filter(|m| m.is_assistant()) {
                        last.content.push_str(&text);
                    }
                }
                ChatEvent::PendingChanged { pending } => {
                    self.pending = pending;
                    if self.lockout.is_none() {
                        self.status_text = if pending { "Thinking..." } else { "Ready" }.to_string();
                    }
                }
                ChatEvent::LockedOut { lockout } => {
                    self.status_text = "Rate limited".to_string();
                    self.lockout = Some(lockout);
                }
                ChatEvent::Notice { message } => {
                    self.notice = Some(message);
                }
                ChatEvent::ProjectsLoaded { projects } => {
                    self.projects = projects;
                }
                ChatEvent::MentionResults { request_id, files } => {
                    self.composer.apply_results(request_id, files);
                }
                ChatEvent::FileOpened { path, content } => {
                    self.viewer = Some(FileView::new(path, content));
                }
                ChatEvent::PullRequestCreated { url } => {
                    if let Some(dialog) = &mut self.pr_dialog {
                        dialog.status = PrStatus::Created(url);
                    }
                }
                ChatEvent::PullRequestFailed { message } => {
                    if let Some(dialog) = &mut self.pr_dialog {
                        dialog.status = PrStatus::Failed(message);
                    }
                }
                ChatEvent::GithubReposLoaded { repos } => {
                    if let Some(dialog) = &mut self.new_project {
                        dialog.repos = repos;
                        dialog.loading = false;
                    }
                }
                ChatEvent::GithubReposFailed { message } => {
                    if let Some(dialog) = &mut self.new_project {
                        dialog.loading = false;
                        dialog.error = Some(message);
                    }
                }
                ChatEvent::ProjectAdded { project } => {
                    self.projects.retain(|p| p.id != project.id);
                    self.projects.insert(0, project);
                    self.new_project = None;
                }
                ChatEvent::ProjectImportFailed { message } => {
                    if let Some(dialog) = &mut self.new_project {
                        dialog.importing = None;
                        dialog.error = Some(message);
                    }
                }
                ChatEvent::ProjectDeleted { project_id } => {
                    self.projects.retain(|p| p.id != project_id);
                    self.delete_confirm = None;
                }
                ChatEvent::ProjectDeleteFailed { project_id, message } => {
                    log::debug!("Delete of {} failed", project_id);
                    self.delete_confirm = None;
                    self.notice = Some(message);
                }
                ChatEvent::ProjectSyncFailed { project_id, message } => {
                    set_status(&mut self.projects, &project_id, ProjectStatus::Ready);
                    self.notice = Some(message);
                }
            }
        }
    }

    pub fn active_project(&self) -> Option<&Project> {
        let id = self.project_id.as_deref()?;
        self.projects.iter().find(|p| p.id == id)
    }

    /// The composer accepts input only for an indexed project while idle.
    pub fn composer_enabled(&self) -> bool {
        self.active_project().is_some_and(Project::is_ready) && !self.pending && self.lockout.is_none()
    }

    /// Hand the composer contents over for sending.
    pub fn submit(&mut self) -> Option<UiAction> {
        if !self.composer_enabled() {
            return None;
        }
        let (text, files) = self.composer.take_submission()?;
        Some(UiAction::Send { text, files })
    }

    /// Open the PR dialog for a code block.
    pub fn start_pull_request(&mut self, code: &str) {
        self.pr_dialog = Some(PrDialog::from_code(code));
    }

    /// Turn the dialog into a request, marking it as submitting.
    pub fn submit_pull_request(&mut self) -> Option<UiAction> {
        let project_id = self.project_id.clone()?;
        let dialog = self.pr_dialog.as_mut().filter(|d| d.can_submit())?;
        dialog.status = PrStatus::Submitting;
        Some(UiAction::CreatePullRequest(PullRequestDraft {
            project_id,
            file_path: dialog.file_path.trim().to_string(),
            new_content: dialog.content.clone(),
        }))
    }

    pub fn is_busy(&self) -> bool {
        self.pending
    }

    /// True once the lockout's reset time has passed. The lockout itself
    /// stays until the project changes.
    pub fn lockout_expired(&self, now: DateTime<Utc>) -> bool {
        self.lockout.as_ref().is_some_and(|l| l.is_expired(now))
    }

    // ─── Project management ──────────────────────────────────

    /// Open the import dialog and ask for the repository list.
    pub fn open_new_project(&mut self) -> Option<UiAction> {
        if self.new_project.is_some() {
            return None;
        }
        self.new_project = Some(NewProjectDialog {
            loading: true,
            ..NewProjectDialog::default()
        });
        Some(UiAction::LoadGithubRepos)
    }

    /// Import the repository with `repo_id`; one import at a time.
    pub fn import_repo(&mut self, repo_id: u64) -> Option<UiAction> {
        let dialog = self.new_project.as_mut().filter(|d| d.importing.is_none())?;
        let repo = dialog.repos.iter().find(|r| r.id == repo_id)?;
        let request = NewProject::from(repo);
        dialog.importing = Some(repo_id);
        dialog.error = None;
        Some(UiAction::ImportProject(request))
    }

    /// Mark the project as indexing right away and request the re-index.
    /// Rolled back by `ProjectSyncFailed`.
    pub fn start_sync(&mut self, project_id: &str) -> Option<UiAction> {
        let project = self.projects.iter_mut().find(|p| p.id == project_id)?;
        if project.status.is_in_progress() {
            return None;
        }
        project.status = ProjectStatus::Indexing;
        Some(UiAction::SyncProject(project_id.to_string()))
    }

    pub fn request_delete(&mut self, project_id: &str) {
        self.delete_confirm = Some(DeleteConfirm {
            project_id: project_id.to_string(),
            deleting: false,
        });
    }

    pub fn confirm_delete(&mut self) -> Option<UiAction> {
        let confirm = self.delete_confirm.as_mut().filter(|c| !c.deleting)?;
        confirm.deleting = true;
        Some(UiAction::DeleteProject(confirm.project_id.clone()))
    }

    pub fn cancel_delete(&mut self) {
        if self.delete_confirm.as_ref().is_some_and(|c| !c.deleting) {
            self.delete_confirm = None;
        }
    }
}

impl Default for UiState {
    fn default() -> Self {
        Self::new(&ClientConfig::default())
    }
}
