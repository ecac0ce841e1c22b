use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required configuration: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {var}: {value}")]
    Invalid { var: &'static str, value: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub identity: IdentityConfig,
    pub repository: RepositoryConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
}

/// Identity provider (Cognito user pool) the bearer tokens are issued by.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
    pub region: String,
    pub user_pool_id: String,
    pub app_client_id: String,
    pub issuer_override: Option<String>,
    pub http_timeout_secs: u64,
}

impl IdentityConfig {
    pub fn issuer(&self) -> String {
        match &self.issuer_override {
            Some(issuer) => issuer.trim_end_matches('/').to_string(),
            None => format!(
                "https://cognito-idp.{}.amazonaws.com/{}",
                self.region, self.user_pool_id
            ),
        }
    }

    pub fn jwks_url(&self) -> String {
        format!("{}/.well-known/jwks.json", self.issuer())
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

/// GitLab project the account configuration files are committed to.
#[derive(Clone, Serialize, Deserialize)]
pub struct RepositoryConfig {
    pub url: String,
    #[serde(skip_serializing)]
    pub token: String,
    pub project_id: String,
    pub branch: String,
    pub http_timeout_secs: u64,
}

impl RepositoryConfig {
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

impl fmt::Debug for RepositoryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RepositoryConfig")
            .field("url", &self.url)
            .field("token", &"<redacted>")
            .field("project_id", &self.project_id)
            .field("branch", &self.branch)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .finish()
    }
}

/// Ambient defaults selected by `APP_ENV`, before individual overrides.
struct Preset {
    environment: Environment,
    port: u16,
    enable_cors: bool,
    cors_origins: Vec<String>,
    identity_timeout_secs: u64,
    repository_timeout_secs: u64,
}

impl Preset {
    fn development() -> Self {
        Self {
            environment: Environment::Development,
            port: 3000,
            enable_cors: true,
            cors_origins: vec!["http://localhost:3000".to_string()],
            identity_timeout_secs: 10,
            repository_timeout_secs: 30,
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            port: 3000,
            enable_cors: true,
            cors_origins: vec!["https://api-stage.example.com".to_string()],
            identity_timeout_secs: 5,
            repository_timeout_secs: 20,
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            port: 3000,
            enable_cors: false,
            cors_origins: Vec::new(),
            identity_timeout_secs: 5,
            repository_timeout_secs: 15,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Blank values count as unset
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let preset = match get("APP_ENV").as_deref() {
            Some("production") | Some("prod") => Preset::production(),
            Some("staging") | Some("stage") => Preset::staging(),
            _ => Preset::development(),
        };

        let port = match get("AFT_API_PORT").or_else(|| get("PORT")) {
            Some(v) => parse_var("PORT", &v)?,
            None => preset.port,
        };
        let enable_cors = match get("SERVER_ENABLE_CORS") {
            Some(v) => parse_var("SERVER_ENABLE_CORS", &v)?,
            None => preset.enable_cors,
        };
        let cors_origins = match get("SERVER_CORS_ORIGINS") {
            Some(v) => v.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect(),
            None => preset.cors_origins,
        };

        let identity = IdentityConfig {
            region: get("AWS_REGION").unwrap_or_else(|| "eu-west-1".to_string()),
            user_pool_id: get("COGNITO_USER_POOL_ID").ok_or(ConfigError::Missing("COGNITO_USER_POOL_ID"))?,
            app_client_id: get("COGNITO_APP_CLIENT_ID").ok_or(ConfigError::Missing("COGNITO_APP_CLIENT_ID"))?,
            issuer_override: get("COGNITO_ISSUER"),
            http_timeout_secs: match get("IDENTITY_HTTP_TIMEOUT_SECS") {
                Some(v) => parse_var("IDENTITY_HTTP_TIMEOUT_SECS", &v)?,
                None => preset.identity_timeout_secs,
            },
        };

        let repository = RepositoryConfig {
            url: get("GITLAB_URL").ok_or(ConfigError::Missing("GITLAB_URL"))?,
            token: get("GITLAB_TOKEN").ok_or(ConfigError::Missing("GITLAB_TOKEN"))?,
            project_id: get("GITLAB_PROJECT_ID").ok_or(ConfigError::Missing("GITLAB_PROJECT_ID"))?,
            branch: get("GITLAB_BRANCH").unwrap_or_else(|| "main".to_string()),
            http_timeout_secs: match get("GITLAB_HTTP_TIMEOUT_SECS") {
                Some(v) => parse_var("GITLAB_HTTP_TIMEOUT_SECS", &v)?,
                None => preset.repository_timeout_secs,
            },
        };

        Ok(Self {
            environment: preset.environment,
            server: ServerConfig { port, enable_cors, cors_origins },
            identity,
            repository,
        })
    }
}

fn parse_var<T: std::str::FromStr>(var: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        var,
        value: value.to_string(),
    })
}
