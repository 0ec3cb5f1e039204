//! HTTP project source
//!
//! One read-only request per load. Any non-success status is reported as
//! "project not found"; transport failures and undecodable bodies keep
//! their own variants so they are distinguishable in logs.

use async_trait::async_trait;
use cuprice_core::config::ClientConfig;
use cuprice_core::models::Project;
use cuprice_core::traits::{ProjectSource, ShareRequest};
use cuprice_core::{AppError, AppResult};
use reqwest::{Client, ClientBuilder, Url};
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Shared-project fetcher backed by reqwest
#[derive(Debug, Clone)]
pub struct HttpProjectSource {
    http_client: Client,
    base_url: String,
}

impl HttpProjectSource {
    /// Create a new source
    ///
    /// # Arguments
    ///
    /// * `base_url` - Origin serving the share endpoint (e.g. "https://app.cuprice.io")
    /// * `timeout_ms` - Timeout for the whole request in milliseconds
    /// * `user_agent` - User agent header value
    pub fn new(base_url: &str, timeout_ms: u64, user_agent: &str) -> AppResult<Self> {
        let http_client = ClientBuilder::new()
            .timeout(Duration::from_millis(timeout_ms))
            .user_agent(user_agent)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))?;

        // Fail early on a malformed default origin
        share_url(base_url, "probe")?;

        Ok(Self {
            http_client,
            base_url: base_url.to_string(),
        })
    }

    /// Create a source from the `client` configuration section
    pub fn from_config(config: &ClientConfig) -> AppResult<Self> {
        Self::new(&config.api_url, config.timeout_ms, &config.user_agent)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// Build `{base}/api/share/{share_id}`, encoding the share identifier
pub fn share_url(base_url: &str, share_id: &str) -> AppResult<Url> {
    let mut url = Url::parse(base_url)
        .map_err(|e| AppError::Config(format!("Invalid API base URL '{}': {}", base_url, e)))?;

    url.path_segments_mut()
        .map_err(|_| AppError::Config(format!("API base URL cannot be a base: {}", base_url)))?
        .pop_if_empty()
        .extend(["api", "share", share_id]);

    Ok(url)
}

#[async_trait]
impl ProjectSource for HttpProjectSource {
    #[instrument(skip(self), fields(share_id = %request.share_id))]
    async fn fetch_project(&self, request: &ShareRequest) -> Result<Project, AppError> {
        let base_url = request.api_url.as_deref().unwrap_or(&self.base_url);
        let url = share_url(base_url, &request.share_id)?;

        debug!("Fetching shared project from {}", url);

        let response = self.http_client.get(url).send().await.map_err(|e| {
            warn!("Shared project request failed: {}", e);
            AppError::Fetch(e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!("Shared project request returned status {}", status.as_u16());
            return Err(AppError::ProjectNotFound(request.share_id.clone()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| AppError::Fetch(e.to_string()))?;

        let project: Project = serde_json::from_slice(&body)?;

        debug!(project_id = project.id, "Shared project decoded");
        Ok(project)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_share_url() {
        assert_eq!(
            share_url("https://app.example.com", "abc123").unwrap().as_str(),
            "https://app.example.com/api/share/abc123"
        );
        assert_eq!(
            share_url("https://app.example.com/", "abc123").unwrap().as_str(),
            "https://app.example.com/api/share/abc123"
        );
        assert_eq!(
            share_url("https://app.example.com/pricing", "a b/c").unwrap().as_str(),
            "https://app.example.com/pricing/api/share/a%20b%2Fc"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(share_url("not a url", "x"), Err(AppError::Config(_))));
        assert!(matches!(share_url("mailto:a@b.c", "x"), Err(AppError::Config(_))));
        assert!(HttpProjectSource::new("::", 1000, "test").is_err());
    }

    #[test]
    fn test_from_config() {
        let source = HttpProjectSource::from_config(&ClientConfig::default()).unwrap();
        assert_eq!(source.base_url(), "http://127.0.0.1:3000");
    }
}
