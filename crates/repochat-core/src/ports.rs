//! Port traits — the hexagonal architecture boundary.
//!
//! These traits are defined here in `repochat-core` (pure Rust).
//! Implementations live in `repochat-platform` (browser adapters).
//! The core never imports platform code; it only depends on these traits.

use std::pin::Pin;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::Stream;
use serde::{Deserialize, Serialize};
use repochat_types::{
    Result,
    message::ChatMessage,
    project::{GithubRepo, NewProject, Project, PullRequestDraft, PullRequestLink},
};

// ─── Chat API Port ───────────────────────────────────────────

/// Decoded text chunks of an assistant reply, in transport order
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<String>>>>;

/// Body of the streaming query request
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest {
    pub project_id: String,
    /// User text plus the expanded attachment blocks
    pub message: String,
    pub selected_files: Vec<String>,
}

/// Outcome of a query once response headers are in
pub enum QueryResponse {
    /// Success: cited sources from the headers and the body stream
    Stream {
        sources: Vec<String>,
        chunks: ChunkStream,
    },
    /// HTTP 429
    RateLimited {
        error: String,
        reset_at: Option<DateTime<Utc>>,
    },
}

/// The backend chat service as seen by the client.
///
/// Any non-success status other than 429 is reported as `Err`.
#[async_trait(?Send)]
pub trait ChatApiPort {
    /// Conversation history of a project, oldest first
    async fn history(&self, project_id: &str) -> Result<Vec<ChatMessage>>;

    /// Submit a query and return as soon as headers are available
    async fn query(&self, req: QueryRequest) -> Result<QueryResponse>;

    /// Raw content of a repository file
    async fn file_content(&self, project_id: &str, path: &str) -> Result<String>;

    /// Projects visible to the signed-in user
    async fn list_projects(&self) -> Result<Vec<Project>>;

    /// File paths matching a mention query
    async fn search_files(&self, project_id: &str, query: &str) -> Result<Vec<String>>;

    async fn create_pull_request(&self, draft: PullRequestDraft) -> Result<PullRequestLink>;

    // ─── Project management ──────────────────────────────────

    /// GitHub repositories the user may import
    async fn list_github_repos(&self) -> Result<Vec<GithubRepo>>;

    /// Import a repository; indexing starts server-side
    async fn import_project(&self, project: NewProject) -> Result<Project>;

    async fn delete_project(&self, project_id: &str) -> Result<()>;

    /// Ask the backend to re-index a project
    async fn sync_project(&self, project_id: &str) -> Result<()>;
}

// ─── Wire helpers shared by adapters ─────────────────────────

/// Header carrying the JSON-encoded list of cited file paths
pub const SOURCES_HEADER: &str = "x-sources";

/// Parse the sources header; absent or malformed yields an empty list.
pub fn parse_sources_header(value: Option<&str>) -> Vec<String> {
    let Some(raw) = value else {
        return Vec::new();
    };
    match serde_json::from_str::<Vec<String>>(raw) {
        Ok(sources) => sources,
        Err(e) => {
            log::warn!("Ignoring malformed {} header: {}", SOURCES_HEADER, e);
            Vec::new()
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RateLimitBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    reset_at: Option<String>,
}

const DEFAULT_RATE_LIMIT_ERROR: &str = "Rate limit exceeded";

/// Build a `RateLimited` response from a 429 body.
pub fn parse_rate_limit(body: &str) -> QueryResponse {
    let parsed: Option<RateLimitBody> = serde_json::from_str(body).ok();
    let (error, reset_at) = match parsed {
        Some(b) => (b.error, b.reset_at),
        None => (None, None),
    };
    let reset_at = reset_at.and_then(|raw| match DateTime::parse_from_rfc3339(&raw) {
        Ok(at) => Some(at.with_timezone(&Utc)),
        Err(e) => {
            log::warn!("Ignoring unparsable resetAt {:?}: {}", raw, e);
            None
        }
    });
    QueryResponse::RateLimited {
        error: error.unwrap_or_else(|| DEFAULT_RATE_LIMIT_ERROR.to_string()),
        reset_at,
    }
}
