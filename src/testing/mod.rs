//! In-memory fixtures for handler unit tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::auth::{AuthorizationGate, Claims, TokenValidator};
use crate::config::AppConfig;
use crate::models::{CommitId, ConfigFile};
use crate::repository::{ConfigRepository, RepositoryError};
use crate::state::AppState;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedCall {
    Commit { files: Vec<ConfigFile>, message: String },
    Delete { account_name: String, message: String },
}

/// Repository double that records every call and hands back sequential shas.
#[derive(Default)]
pub struct RecordingRepository {
    calls: Mutex<Vec<RecordedCall>>,
    fail_with: Option<String>,
}

impl RecordingRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call fails as if GitLab rejected the commit.
    pub fn failing(message: &str) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail_with: Some(message.to_string()),
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: RecordedCall) -> Result<CommitId, RepositoryError> {
        let mut calls = self.calls.lock().unwrap();
        calls.push(call);
        match &self.fail_with {
            Some(message) => Err(RepositoryError::Commit(message.clone())),
            None => Ok(CommitId::new(format!("sha{}", calls.len()))),
        }
    }
}

#[async_trait]
impl ConfigRepository for RecordingRepository {
    async fn commit_config_files(&self, files: &[ConfigFile], message: &str) -> Result<CommitId, RepositoryError> {
        self.record(RecordedCall::Commit {
            files: files.to_vec(),
            message: message.to_string(),
        })
    }

    async fn delete_account_config(&self, account_name: &str, message: &str) -> Result<CommitId, RepositoryError> {
        self.record(RecordedCall::Delete {
            account_name: account_name.to_string(),
            message: message.to_string(),
        })
    }
}

pub fn test_config() -> AppConfig {
    let vars = HashMap::from([
        ("COGNITO_USER_POOL_ID", "eu-west-1_TestPool"),
        ("COGNITO_APP_CLIENT_ID", "test-client"),
        ("GITLAB_URL", "https://gitlab.example.com"),
        ("GITLAB_TOKEN", "glpat-test"),
        ("GITLAB_PROJECT_ID", "platform/aft-requests"),
    ]);
    AppConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string())).unwrap()
}

pub fn test_state(repository: Arc<RecordingRepository>) -> AppState {
    let config = test_config();
    let validator = TokenValidator::new(&config.identity).unwrap();
    AppState::new(config, AuthorizationGate::new(validator), repository)
}

pub fn admin_claims() -> Claims {
    Claims {
        sub: "admin-1".to_string(),
        email: Some("admin@example.com".to_string()),
        exp: 4_000_000_000,
        groups: vec!["Administrators".to_string()],
        extra: HashMap::new(),
    }
}
