//! In-memory project source

use async_trait::async_trait;
use cuprice_core::models::Project;
use cuprice_core::traits::{ProjectSource, ShareRequest};
use cuprice_core::{AppError, AppResult};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

/// Serves preloaded projects keyed by share identifier
///
/// The base URL of a request is ignored.
#[derive(Debug, Default)]
pub struct InMemoryProjectSource {
    projects: RwLock<HashMap<String, Project>>,
    delay: Option<Duration>,
}

impl InMemoryProjectSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Respond only after `delay`, to simulate a slow backend
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Add a project, builder style
    pub fn with_project(self, share_id: impl Into<String>, project: Project) -> Self {
        self.insert(share_id, project);
        self
    }

    /// Add or replace a project
    pub fn insert(&self, share_id: impl Into<String>, project: Project) {
        self.projects.write().insert(share_id.into(), project);
    }

    /// Load a project from its JSON representation
    pub fn insert_json(&self, share_id: impl Into<String>, json: &str) -> AppResult<()> {
        let project: Project = serde_json::from_str(json)?;
        self.insert(share_id, project);
        Ok(())
    }

    pub fn remove(&self, share_id: &str) -> Option<Project> {
        self.projects.write().remove(share_id)
    }

    pub fn len(&self) -> usize {
        self.projects.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.read().is_empty()
    }
}

#[async_trait]
impl ProjectSource for InMemoryProjectSource {
    async fn fetch_project(&self, request: &ShareRequest) -> Result<Project, AppError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let project = self.projects.read().get(&request.share_id).cloned();
        match project {
            Some(project) => {
                debug!(share_id = %request.share_id, "Serving in-memory project");
                Ok(project)
            }
            None => Err(AppError::ProjectNotFound(request.share_id.clone())),
        }
    }
}
