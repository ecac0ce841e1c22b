use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use url::Url;

use super::{ConfigRepository, RepositoryError};
use crate::config::RepositoryConfig;
use crate::models::{CommitId, ConfigFile};
use crate::render;

const TOKEN_HEADER: &str = "private-token";

/// Commits account configuration through the GitLab REST API (v4).
pub struct GitLabClient {
    http: reqwest::Client,
    project_url: Url,
    branch: String,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "lowercase")]
enum ActionKind {
    Create,
    Delete,
}

#[derive(Serialize)]
struct CommitAction<'a> {
    action: ActionKind,
    file_path: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<&'a str>,
}

#[derive(Serialize)]
struct CommitPayload<'a> {
    branch: &'a str,
    commit_message: &'a str,
    actions: Vec<CommitAction<'a>>,
}

#[derive(Deserialize)]
struct CommitResponse {
    id: String,
}

impl GitLabClient {
    /// Build the client and confirm the project is reachable with the token,
    /// so bad credentials surface at startup instead of on the first commit.
    pub async fn connect(config: &RepositoryConfig) -> Result<Self, RepositoryError> {
        let client = Self::new(config)?;

        let response = client
            .http
            .get(client.project_url.clone())
            .send()
            .await
            .map_err(|e| RepositoryError::Initialization(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(RepositoryError::Initialization(format!("{} {}", status, body.trim())));
        }

        tracing::info!(
            project = %config.project_id,
            branch = %config.branch,
            "connected to GitLab project"
        );
        Ok(client)
    }

    /// Build the client without contacting GitLab.
    pub fn new(config: &RepositoryConfig) -> Result<Self, RepositoryError> {
        if config.url.trim().is_empty() {
            return Err(RepositoryError::MissingConfig("GITLAB_URL"));
        }
        if config.token.trim().is_empty() {
            return Err(RepositoryError::MissingConfig("GITLAB_TOKEN"));
        }
        if config.project_id.trim().is_empty() {
            return Err(RepositoryError::MissingConfig("GITLAB_PROJECT_ID"));
        }

        let project_url = project_url(&config.url, &config.project_id)?;

        let mut token = HeaderValue::from_str(&config.token)
            .map_err(|_| RepositoryError::Initialization("token contains invalid characters".to_string()))?;
        token.set_sensitive(true);
        let mut headers = HeaderMap::new();
        headers.insert(TOKEN_HEADER, token);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.http_timeout())
            .build()
            .map_err(|e| RepositoryError::Initialization(e.to_string()))?;

        let branch = if config.branch.trim().is_empty() {
            "main".to_string()
        } else {
            config.branch.clone()
        };

        Ok(Self {
            http,
            project_url,
            branch,
        })
    }

    pub fn branch(&self) -> &str {
        &self.branch
    }

    async fn create_commit(&self, message: &str, actions: Vec<CommitAction<'_>>) -> Result<CommitId, String> {
        let mut url = self.project_url.clone();
        url.path_segments_mut()
            .map_err(|_| "project URL cannot be a base".to_string())?
            .extend(["repository", "commits"]);

        let payload = CommitPayload {
            branch: &self.branch,
            commit_message: message,
            actions,
        };

        let response = self
            .http
            .post(url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(format!("{} {}", status, body.trim()));
        }

        let commit: CommitResponse = response.json().await.map_err(|e| e.to_string())?;
        Ok(CommitId::new(commit.id))
    }
}

#[async_trait]
impl ConfigRepository for GitLabClient {
    async fn commit_config_files(&self, files: &[ConfigFile], message: &str) -> Result<CommitId, RepositoryError> {
        if files.is_empty() {
            return Err(RepositoryError::EmptyBatch);
        }

        let actions = files
            .iter()
            .map(|file| CommitAction {
                action: ActionKind::Create,
                file_path: &file.file_path,
                content: Some(file.content.as_str()),
            })
            .collect();

        let commit = self.create_commit(message, actions).await.map_err(RepositoryError::Commit)?;
        tracing::debug!(files = files.len(), commit_sha = %commit, "created commit");
        Ok(commit)
    }

    async fn delete_account_config(&self, account_name: &str, message: &str) -> Result<CommitId, RepositoryError> {
        let paths = render::account_file_paths(account_name)?;
        let actions = paths
            .iter()
            .map(|path| CommitAction {
                action: ActionKind::Delete,
                file_path: path,
                content: None,
            })
            .collect();

        let commit = self.create_commit(message, actions).await.map_err(RepositoryError::Delete)?;
        tracing::debug!(account_name, commit_sha = %commit, "created delete commit");
        Ok(commit)
    }
}

/// `<base>/api/v4/projects/<id>` with the id encoded as one segment, so
/// namespaced ids like `group/project` become `group%2Fproject`.
fn project_url(base: &str, project_id: &str) -> Result<Url, RepositoryError> {
    let mut url = Url::parse(base).map_err(|e| RepositoryError::InvalidUrl(format!("{}: {}", base, e)))?;
    url.path_segments_mut()
        .map_err(|_| RepositoryError::InvalidUrl(base.to_string()))?
        .pop_if_empty()
        .extend(["api", "v4", "projects", project_id.trim()]);
    Ok(url)
}
