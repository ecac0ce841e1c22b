use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use url::Url;

pub const API_ENV_VAR: &str = "AFT_API_ENV";
pub const API_TOKEN_VAR: &str = "AFT_API_TOKEN";

/// Deployed API stages the CLI knows how to reach.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiEnvironment {
    Dev,
    Stage,
    Prod,
}

impl ApiEnvironment {
    pub fn base_url(&self) -> &'static str {
        match self {
            ApiEnvironment::Dev => "https://api-dev.example.com",
            ApiEnvironment::Stage => "https://api-stage.example.com",
            ApiEnvironment::Prod => "https://api-prod.example.com",
        }
    }

    /// Unknown names fall back to dev.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "stage" | "staging" => ApiEnvironment::Stage,
            "prod" | "production" => ApiEnvironment::Prod,
            _ => ApiEnvironment::Dev,
        }
    }
}

/// Where the client should send requests.
///
/// Precedence: `--url`, then `--env`, then `AFT_API_ENV`, then dev.
pub fn resolve_base_url(
    url_override: Option<&str>,
    environment: Option<ApiEnvironment>,
    env_var: Option<&str>,
) -> anyhow::Result<Url> {
    let raw = match (url_override, environment, env_var) {
        (Some(url), _, _) => url.to_string(),
        (None, Some(env), _) => env.base_url().to_string(),
        (None, None, Some(name)) => ApiEnvironment::from_name(name).base_url().to_string(),
        (None, None, None) => ApiEnvironment::Dev.base_url().to_string(),
    };
    Url::parse(&raw).map_err(|e| anyhow::anyhow!("invalid API URL '{}': {}", raw, e))
}
