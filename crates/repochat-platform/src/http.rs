//! Backend chat API adapter.
//!
//! Uses browser `fetch()` via gloo-net for WASM compatibility. Every
//! request carries the session cookie when `include_credentials` is set.

use async_trait::async_trait;
use gloo_net::http::{Request, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use web_sys::RequestCredentials;

use repochat_core::ports::*;
use repochat_types::{
    ChatError, Result,
    config::ApiConfig,
    content::normalize_path,
    message::ChatMessage,
    project::{GithubRepo, NewProject, Project, PullRequestDraft, PullRequestLink},
};

use crate::body::chunk_stream;

const STATUS_TOO_MANY_REQUESTS: u16 = 429;

/// `ChatApiPort` over HTTP.
pub struct HttpChatApi {
    config: ApiConfig,
}

impl HttpChatApi {
    pub fn new(config: ApiConfig) -> Self {
        Self { config }
    }

    pub fn history_url(&self, project_id: &str) -> String {
        self.config
            .endpoint(&format!("api/chat/{}", encode(project_id)))
    }

    pub fn query_url(&self) -> String {
        self.config.endpoint("api/chat")
    }

    /// Backslashes are normalised before encoding.
    pub fn file_url(&self, project_id: &str, path: &str) -> String {
        self.config.endpoint(&format!(
            "api/projects/{}/file?path={}",
            encode(project_id),
            encode(&normalize_path(path))
        ))
    }

    pub fn projects_url(&self) -> String {
        self.config.endpoint("api/projects")
    }

    pub fn search_url(&self, project_id: &str, query: &str) -> String {
        self.config.endpoint(&format!(
            "api/projects/{}/files?query={}",
            encode(project_id),
            encode(query)
        ))
    }

    pub fn pull_request_url(&self, project_id: &str) -> String {
        self.config
            .endpoint(&format!("api/projects/{}/pull-requests", encode(project_id)))
    }

    pub fn project_url(&self, project_id: &str) -> String {
        self.config
            .endpoint(&format!("api/projects/{}", encode(project_id)))
    }

    pub fn sync_url(&self, project_id: &str) -> String {
        self.config
            .endpoint(&format!("api/projects/{}/sync", encode(project_id)))
    }

    pub fn github_repos_url(&self) -> String {
        self.config.endpoint("api/projects/github-repos")
    }

    fn with_credentials(&self, builder: RequestBuilder) -> RequestBuilder {
        if self.config.include_credentials {
            builder.credentials(RequestCredentials::Include)
        } else {
            builder
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self
            .with_credentials(Request::get(url))
            .send()
            .await
            .map_err(network)?;
        let response = ensure_ok(response).await?;
        response
            .json()
            .await
            .map_err(|e| ChatError::Serialization(e.to_string()))
    }

    async fn post<B: Serialize>(&self, url: &str, body: &B) -> Result<Response> {
        let response = self
            .with_credentials(Request::post(url))
            .json(body)
            .map_err(|e| ChatError::Serialization(e.to_string()))?
            .send()
            .await
            .map_err(network)?;
        ensure_ok(response).await
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(&self, url: &str, body: &B) -> Result<T> {
        self.post(url, body)
            .await?
            .json()
            .await
            .map_err(|e| ChatError::Serialization(e.to_string()))
    }
}

#[async_trait(?Send)]
impl ChatApiPort for HttpChatApi {
    async fn history(&self, project_id: &str) -> Result<Vec<ChatMessage>> {
        self.get_json(&self.history_url(project_id)).await
    }

    async fn query(&self, req: QueryRequest) -> Result<QueryResponse> {
        let response = self
            .with_credentials(Request::post(&self.query_url()))
            .json(&req)
            .map_err(|e| ChatError::Serialization(e.to_string()))?
            .send()
            .await
            .map_err(network)?;

        let status = response.status();
        if status == STATUS_TOO_MANY_REQUESTS {
            let body = response.text().await.unwrap_or_default();
            return Ok(parse_rate_limit(&body));
        }
        let response = ensure_ok(response).await?;

        let sources = parse_sources_header(response.headers().get(SOURCES_HEADER).as_deref());
        let body = response
            .body()
            .ok_or_else(|| ChatError::Stream("response has no body".to_string()))?;
        log::debug!("Streaming answer with {} sources", sources.len());

        Ok(QueryResponse::Stream {
            sources,
            chunks: chunk_stream(body),
        })
    }

    async fn file_content(&self, project_id: &str, path: &str) -> Result<String> {
        let file: FileBody = self.get_json(&self.file_url(project_id, path)).await?;
        Ok(file.content)
    }

    async fn list_projects(&self) -> Result<Vec<Project>> {
        let list: ProjectList = self.get_json(&self.projects_url()).await?;
        Ok(list.projects)
    }

    async fn search_files(&self, project_id: &str, query: &str) -> Result<Vec<String>> {
        let found: FileMatches = self.get_json(&self.search_url(project_id, query)).await?;
        Ok(found.files)
    }

    async fn create_pull_request(&self, draft: PullRequestDraft) -> Result<PullRequestLink> {
        self.post_json(&self.pull_request_url(&draft.project_id), &draft)
            .await
    }

    async fn list_github_repos(&self) -> Result<Vec<GithubRepo>> {
        let list: RepoList = self.get_json(&self.github_repos_url()).await?;
        Ok(list.repos)
    }

    async fn import_project(&self, project: NewProject) -> Result<Project> {
        let created: CreatedProject = self.post_json(&self.projects_url(), &project).await?;
        log::info!("Imported {} as project {}", created.project.name, created.project.id);
        Ok(created.project)
    }

    async fn delete_project(&self, project_id: &str) -> Result<()> {
        let response = self
            .with_credentials(Request::delete(&self.project_url(project_id)))
            .send()
            .await
            .map_err(network)?;
        ensure_ok(response).await?;
        Ok(())
    }

    async fn sync_project(&self, project_id: &str) -> Result<()> {
        self.post(&self.sync_url(project_id), &EmptyBody {}).await?;
        Ok(())
    }
}

// ─── API response types ──────────────────────────────────────

#[derive(Deserialize)]
struct FileBody {
    content: String,
}

#[derive(Deserialize)]
struct ProjectList {
    #[serde(default)]
    projects: Vec<Project>,
}

#[derive(Serialize)]
struct EmptyBody {}

#[derive(Deserialize)]
struct RepoList {
    #[serde(default)]
    repos: Vec<GithubRepo>,
}

#[derive(Deserialize)]
struct CreatedProject {
    project: Project,
}

#[derive(Deserialize)]
struct FileMatches {
    #[serde(default)]
    files: Vec<String>,
}

// ─── Helpers ─────────────────────────────────────────────────

async fn ensure_ok(response: Response) -> Result<Response> {
    if response.ok() {
        return Ok(response);
    }
    let status = response.status();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "unknown error".to_string());
    Err(ChatError::http(status, body))
}

fn network(e: gloo_net::Error) -> ChatError {
    ChatError::Network(e.to_string())
}

fn encode(component: &str) -> String {
    String::from(js_sys::encode_uri_component(component))
}
