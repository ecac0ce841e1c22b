use reqwest::{Method, StatusCode};
use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("{message} (HTTP {status})")]
    Api { status: StatusCode, message: String },

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid request URL: {0}")]
    Url(String),
}

/// Thin HTTP client for the account endpoints.
pub struct AccountClient {
    http: reqwest::Client,
    base_url: Url,
    token: Option<String>,
}

impl AccountClient {
    pub fn new(base_url: Url, token: Option<String>) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self { http, base_url, token })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub async fn create_account(&self, account: &Value) -> Result<Value, ClientError> {
        self.send(Method::POST, &["accounts"], Some(account)).await
    }

    pub async fn update_account(&self, account_name: &str, account: &Value) -> Result<Value, ClientError> {
        self.send(Method::PUT, &["accounts", account_name], Some(account)).await
    }

    pub async fn delete_account(&self, account_name: &str) -> Result<Value, ClientError> {
        let body = json!({ "account_name": account_name });
        self.send(Method::DELETE, &["accounts", account_name], Some(&body)).await
    }

    pub async fn upgrade_account(&self, account_name: &str, target_tier: &str) -> Result<Value, ClientError> {
        let body = json!({ "targetTier": target_tier });
        self.send(Method::POST, &["accounts", account_name, "upgrade"], Some(&body)).await
    }

    pub async fn downgrade_account(&self, account_name: &str, target_tier: &str) -> Result<Value, ClientError> {
        let body = json!({ "targetTier": target_tier });
        self.send(Method::POST, &["accounts", account_name, "downgrade"], Some(&body)).await
    }

    pub async fn add_option(
        &self,
        account_name: &str,
        option_name: &str,
        option_config: Option<&Value>,
    ) -> Result<Value, ClientError> {
        let mut body = json!({ "optionName": option_name });
        if let Some(config) = option_config {
            body["optionConfig"] = config.clone();
        }
        self.send(Method::POST, &["accounts", account_name, "options"], Some(&body)).await
    }

    pub async fn remove_option(&self, account_name: &str, option_name: &str) -> Result<Value, ClientError> {
        self.send(Method::DELETE, &["accounts", account_name, "options", option_name], None)
            .await
    }

    /// Join `segments` onto the base URL, encoding each one.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::Url(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send(&self, method: Method, segments: &[&str], body: Option<&Value>) -> Result<Value, ClientError> {
        let url = self.endpoint(segments)?;
        tracing::debug!(%method, %url, "sending request");

        let mut request = self.http.request(method, url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;
        let value: Value = serde_json::from_str(&text).unwrap_or(Value::String(text));

        if !status.is_success() {
            let message = value
                .get("error")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| value.to_string());
            return Err(ClientError::Api { status, message });
        }

        Ok(value)
    }
}
