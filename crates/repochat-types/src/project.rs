use serde::{Deserialize, Serialize};

/// An indexed repository the user can chat about
///
/// Field names are snake_case on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    /// `owner/repo`
    pub name: String,
    pub status: ProjectStatus,
    #[serde(default)]
    pub is_private: bool,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub created_at: String,
}

impl Project {
    pub fn owner(&self) -> &str {
        self.name.split('/').next().unwrap_or("")
    }

    pub fn repo(&self) -> &str {
        self.name.split_once('/').map(|(_, repo)| repo).unwrap_or(&self.name)
    }

    pub fn is_ready(&self) -> bool {
        self.status == ProjectStatus::Ready
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ProjectStatus {
    Pending,
    Indexing,
    Ready,
    Error,
}

impl ProjectStatus {
    pub fn label(&self) -> &str {
        match self {
            ProjectStatus::Pending => "PENDING",
            ProjectStatus::Indexing => "INDEXING",
            ProjectStatus::Ready => "READY",
            ProjectStatus::Error => "ERROR",
        }
    }

    /// Still being indexed on the backend
    pub fn is_in_progress(&self) -> bool {
        matches!(self, ProjectStatus::Pending | ProjectStatus::Indexing)
    }
}

/// True when the project list should be refreshed periodically.
pub fn needs_polling(projects: &[Project]) -> bool {
    projects.iter().any(|p| p.status.is_in_progress())
}

/// Request to open a pull request with generated code
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PullRequestDraft {
    #[serde(skip)]
    pub project_id: String,
    pub file_path: String,
    #[serde(rename = "content")]
    pub new_content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PullRequestLink {
    pub url: String,
}

/// A GitHub repository the user can import as a project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GithubRepo {
    pub id: u64,
    /// `owner/repo`
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub url: String,
    #[serde(default)]
    pub private: bool,
    #[serde(default)]
    pub stars: u32,
    #[serde(default)]
    pub updated_at: String,
}

impl GithubRepo {
    /// Case-insensitive name filter used by the import dialog.
    pub fn matches(&self, search: &str) -> bool {
        self.name.to_lowercase().contains(&search.trim().to_lowercase())
    }
}

/// Request body that imports a repository as a new project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProject {
    pub repo_id: u64,
    pub name: String,
    pub url: String,
    pub is_private: bool,
}

impl From<&GithubRepo> for NewProject {
    fn from(repo: &GithubRepo) -> Self {
        Self {
            repo_id: repo.id,
            name: repo.name.clone(),
            url: repo.url.clone(),
            is_private: repo.private,
        }
    }
}

/// Set a project's status in place. Returns false if it is not listed.
pub fn set_status(projects: &mut [Project], project_id: &str, status: ProjectStatus) -> bool {
    match projects.iter_mut().find(|p| p.id == project_id) {
        Some(project) => {
            project.status = status;
            true
        }
        None => false,
    }
}
