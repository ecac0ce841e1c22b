use std::sync::Arc;
use thiserror::Error;

use crate::auth::{AuthError, AuthorizationGate, TokenValidator};
use crate::config::AppConfig;
use crate::repository::{ConfigRepository, GitLabClient, RepositoryError};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Failed to build token validator: {0}")]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Shared by every handler. Holds no per-request state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub gate: AuthorizationGate,
    pub repository: Arc<dyn ConfigRepository>,
}

impl AppState {
    pub fn new(config: AppConfig, gate: AuthorizationGate, repository: Arc<dyn ConfigRepository>) -> Self {
        Self {
            config: Arc::new(config),
            gate,
            repository,
        }
    }

    /// Build the token validator and connect to the GitLab project.
    pub async fn initialize(config: AppConfig) -> Result<Self, StartupError> {
        let validator = TokenValidator::new(&config.identity)?;
        tracing::info!(issuer = %validator.issuer(), "token validator ready");

        let repository = GitLabClient::connect(&config.repository).await?;

        Ok(Self::new(config, AuthorizationGate::new(validator), Arc::new(repository)))
    }
}
