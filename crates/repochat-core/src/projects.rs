//! Project list maintenance against the backend: status polling,
//! importing GitHub repositories, re-index and delete.
//!
//! Every outcome is published on the `EventBus`. Optimistic status
//! changes are the UI's business; a failed sync is reported so it can
//! roll them back.

use std::rc::Rc;

use repochat_types::{
    event::ChatEvent,
    project::{needs_polling, NewProject, Project},
};

use crate::event_bus::EventBus;
use crate::ports::ChatApiPort;

#[derive(Clone)]
pub struct ProjectService {
    api: Rc<dyn ChatApiPort>,
    event_bus: EventBus,
}

impl ProjectService {
    pub fn new(api: Rc<dyn ChatApiPort>, event_bus: EventBus) -> Self {
        Self { api, event_bus }
    }

    /// Fetch the list once. Returns whether the caller should poll again.
    ///
    /// A failed fetch keeps polling while the last list that did arrive
    /// still had projects in progress.
    pub async fn poll(&self, last_known: &mut Option<Vec<Project>>) -> bool {
        match self.api.list_projects().await {
            Ok(projects) => {
                let keep = needs_polling(&projects);
                *last_known = Some(projects.clone());
                self.event_bus.emit(ChatEvent::ProjectsLoaded { projects });
                keep
            }
            Err(e) => {
                let keep = last_known.as_deref().is_some_and(needs_polling);
                log::warn!("Failed to fetch projects (retrying: {}): {}", keep, e);
                keep
            }
        }
    }

    pub async fn load_github_repos(&self) {
        let event = match self.api.list_github_repos().await {
            Ok(repos) => {
                log::debug!("{} GitHub repositories available", repos.len());
                ChatEvent::GithubReposLoaded { repos }
            }
            Err(e) => {
                log::error!("Failed to fetch GitHub repositories: {}", e);
                ChatEvent::GithubReposFailed {
                    message: e.to_string(),
                }
            }
        };
        self.event_bus.emit(event);
    }

    /// Import a repository. Returns the new project's id on success.
    pub async fn import(&self, project: NewProject) -> Option<String> {
        let name = project.name.clone();
        match self.api.import_project(project).await {
            Ok(project) => {
                let id = project.id.clone();
                self.event_bus.emit(ChatEvent::ProjectAdded { project });
                Some(id)
            }
            Err(e) => {
                log::error!("Failed to import {}: {}", name, e);
                self.event_bus.emit(ChatEvent::ProjectImportFailed {
                    message: format!("Failed to import {}: {}", name, e),
                });
                None
            }
        }
    }

    /// Start re-indexing. Returns true once the backend accepted it.
    pub async fn sync(&self, project_id: &str) -> bool {
        match self.api.sync_project(project_id).await {
            Ok(()) => {
                log::info!("Sync started for {}", project_id);
                true
            }
            Err(e) => {
                log::error!("Failed to sync project {}: {}", project_id, e);
                self.event_bus.emit(ChatEvent::ProjectSyncFailed {
                    project_id: project_id.to_string(),
                    message: format!("Failed to sync project: {}", e),
                });
                false
            }
        }
    }

    pub async fn delete(&self, project_id: &str) -> bool {
        match self.api.delete_project(project_id).await {
            Ok(()) => {
                log::info!("Deleted project {}", project_id);
                self.event_bus.emit(ChatEvent::ProjectDeleted {
                    project_id: project_id.to_string(),
                });
                true
            }
            Err(e) => {
                log::error!("Failed to delete project {}: {}", project_id, e);
                self.event_bus.emit(ChatEvent::ProjectDeleteFailed {
                    project_id: project_id.to_string(),
                    message: format!("Failed to delete project: {}", e),
                });
                false
            }
        }
    }
}
