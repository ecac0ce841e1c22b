pub mod gitlab;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{CommitId, ConfigFile};
use crate::render::RenderError;

pub use gitlab::GitLabClient;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("GitLab configuration missing: {0}")]
    MissingConfig(&'static str),

    #[error("Invalid GitLab URL: {0}")]
    InvalidUrl(String),

    #[error("Failed to initialize GitLab client: {0}")]
    Initialization(String),

    #[error("Commit batch is empty")]
    EmptyBatch,

    #[error("Failed to commit files to GitLab: {0}")]
    Commit(String),

    #[error("Failed to delete account configuration: {0}")]
    Delete(String),

    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Version-controlled store the provisioning pipeline watches.
///
/// Each call is one atomic commit on the configured branch: the platform
/// applies the whole batch or nothing. Implementations never retry.
#[async_trait]
pub trait ConfigRepository: Send + Sync {
    /// Create every file in `files` in a single commit.
    async fn commit_config_files(&self, files: &[ConfigFile], message: &str) -> Result<CommitId, RepositoryError>;

    /// Delete `request.json` and `customizations.json` for the account in a single commit.
    async fn delete_account_config(&self, account_name: &str, message: &str) -> Result<CommitId, RepositoryError>;
}
