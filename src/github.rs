//! GitHub repository listing used to import portfolio projects

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::config::GitHubConfig;
use crate::models::NewProject;

#[derive(Debug, Error)]
pub enum GitHubError {
    #[error("{0} is not configured")]
    NotConfigured(&'static str),
    #[error("repository '{0}' not found")]
    NotFound(String),
    #[error(transparent)]
    Upstream(#[from] anyhow::Error),
}

/// Subset of the GitHub repository payload used by the portfolio
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Repository {
    pub id: u64,
    pub name: String,
    pub full_name: String,
    pub description: Option<String>,
    pub html_url: String,
    pub homepage: Option<String>,
    pub language: Option<String>,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub fork: bool,
    #[serde(default)]
    pub stargazers_count: u64,
    pub updated_at: Option<String>,
}

impl Repository {
    /// Draft a project from this repository; language first, then topics
    pub fn to_new_project(&self, domain: &str) -> NewProject {
        let mut tech_stack: Vec<String> = self.language.iter().cloned().collect();
        for topic in &self.topics {
            if !tech_stack.iter().any(|t| t.eq_ignore_ascii_case(topic)) {
                tech_stack.push(topic.clone());
            }
        }

        NewProject {
            title: self.name.clone(),
            domain: domain.trim().to_string(),
            description: self
                .description
                .as_deref()
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(str::to_string),
            tech_stack,
            live_demo_url: self
                .homepage
                .as_deref()
                .map(str::trim)
                .filter(|h| !h.is_empty())
                .map(str::to_string),
            github_url: Some(self.html_url.clone()),
        }
    }
}

#[derive(Clone)]
pub struct GitHubClient {
    client: Client,
    api_base_url: String,
    username: Option<String>,
    access_token: Option<String>,
}

impl GitHubClient {
    pub fn from_config(config: &GitHubConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("folio/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(10))
            .build()
            .context("failed to build HTTP client for GitHub")?;

        Ok(Self {
            client,
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
            username: config.username.clone(),
            access_token: config.access_token.clone(),
        })
    }

    /// Public repositories of the configured user
    pub async fn public_repos(&self) -> Result<Vec<Repository>, GitHubError> {
        let username = self
            .username
            .as_deref()
            .ok_or(GitHubError::NotConfigured("GITHUB_USERNAME"))?;
        let url = format!("{}/users/{}/repos?per_page=100", self.api_base_url, username);

        Ok(self.fetch(self.client.get(url)).await?)
    }

    /// Every repository visible to the configured access token
    pub async fn private_repos(&self) -> Result<Vec<Repository>, GitHubError> {
        let url = format!("{}/user/repos?per_page=100", self.api_base_url);
        let request = self.authorized(self.client.get(url))?;

        Ok(self.fetch(request).await?)
    }

    /// Look up one repository by `name` (owned by the configured user) or `owner/name`
    pub async fn repository(&self, name: &str) -> Result<Repository, GitHubError> {
        let full_name = if name.contains('/') {
            name.to_string()
        } else {
            let owner = self
                .username
                .as_deref()
                .ok_or(GitHubError::NotConfigured("GITHUB_USERNAME"))?;
            format!("{owner}/{name}")
        };

        let url = format!("{}/repos/{}", self.api_base_url, full_name);
        let mut request = self.client.get(url);
        if self.access_token.is_some() {
            request = self.authorized(request)?;
        }

        let response = request
            .header("Accept", "application/vnd.github+json")
            .send()
            .await
            .context("failed to request GitHub repository")?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(GitHubError::NotFound(full_name));
        }

        let repository = response
            .error_for_status()
            .context("GitHub returned an error status")?
            .json()
            .await
            .context("failed to parse GitHub repository")?;

        Ok(repository)
    }

    fn authorized(&self, request: RequestBuilder) -> Result<RequestBuilder, GitHubError> {
        let token = self
            .access_token
            .as_deref()
            .ok_or(GitHubError::NotConfigured("GITHUB_ACCESS_TOKEN"))?;
        Ok(request.bearer_auth(token))
    }

    async fn fetch(&self, request: RequestBuilder) -> Result<Vec<Repository>> {
        let repos: Vec<Repository> = request
            .header("Accept", "application/vnd.github+json")
            .send()
            .await
            .context("failed to request GitHub repositories")?
            .error_for_status()
            .context("GitHub returned an error status")?
            .json()
            .await
            .context("failed to parse GitHub repositories")?;

        debug!(count = repos.len(), "fetched GitHub repositories");
        Ok(repos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPO_JSON: &str = r#"{
        "id": 42,
        "name": "folio",
        "full_name": "someone/folio",
        "description": "  Personal portfolio  ",
        "html_url": "https://github.com/someone/folio",
        "homepage": "",
        "language": "Rust",
        "topics": ["axum", "rust", "sqlite"],
        "fork": false,
        "stargazers_count": 3,
        "updated_at": "2026-01-02T03:04:05Z",
        "private": false
    }"#;

    #[test]
    fn repository_deserializes_github_payload() {
        let repo: Repository = serde_json::from_str(REPO_JSON).unwrap();
        assert_eq!(repo.full_name, "someone/folio");
        assert_eq!(repo.topics.len(), 3);
    }

    #[test]
    fn repository_converts_to_project_draft() {
        let repo: Repository = serde_json::from_str(REPO_JSON).unwrap();
        let project = repo.to_new_project(" Web ");

        assert_eq!(project.title, "folio");
        assert_eq!(project.domain, "Web");
        assert_eq!(project.description.as_deref(), Some("Personal portfolio"));
        assert_eq!(project.tech_stack, vec!["Rust", "axum", "sqlite"]);
        assert_eq!(project.live_demo_url, None);
        assert_eq!(
            project.github_url.as_deref(),
            Some("https://github.com/someone/folio")
        );
    }

    #[tokio::test]
    async fn missing_username_is_reported() {
        let client = GitHubClient::from_config(&GitHubConfig {
            api_base_url: GitHubConfig::DEFAULT_API_URL.to_string(),
            username: None,
            access_token: None,
        })
        .unwrap();

        let result = client.public_repos().await;
        assert!(matches!(result, Err(GitHubError::NotConfigured("GITHUB_USERNAME"))));
    }
}
