// handlers/accounts - account lifecycle endpoints
//
// Every handler runs behind the authorization gate and follows the same shape:
// decode -> validate -> render -> one commit -> 202 with the commit sha.
// Nothing is committed unless every earlier step succeeded.

pub mod lifecycle; // create, update, delete
pub mod options; // add/remove option
pub mod tier; // upgrade, downgrade

pub use lifecycle::{create, delete, delete_by_path, update};
pub use options::{add_option, remove_option};
pub use tier::{downgrade, upgrade};

use serde::Serialize;
use serde_json::Value;

use crate::auth::Claims;
use crate::error::ApiError;
use crate::models::{CommitId, ModelError};

/// Success body shared by every account operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountAccepted {
    pub message: &'static str,
    pub account_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_tier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub option_name: Option<String>,
    pub commit_sha: CommitId,
}

impl AccountAccepted {
    pub fn new(message: &'static str, account_name: impl Into<String>, commit_sha: CommitId) -> Self {
        Self {
            message,
            account_name: account_name.into(),
            target_tier: None,
            option_name: None,
            commit_sha,
        }
    }

    pub fn with_target_tier(mut self, target_tier: impl Into<String>) -> Self {
        self.target_tier = Some(target_tier.into());
        self
    }

    pub fn with_option_name(mut self, option_name: impl Into<String>) -> Self {
        self.option_name = Some(option_name.into());
        self
    }
}

/// Decode a JSON body into a generic value; an empty body reads as `{}`.
pub(crate) fn parse_body(body: &[u8]) -> Result<Value, ModelError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(Default::default()));
    }
    Ok(serde_json::from_slice(body)?)
}

/// A non-empty string field from the body, or 400 `<key> is required`.
pub(crate) fn required_field<'a>(body: &'a Value, key: &str) -> Result<&'a str, ApiError> {
    body.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::required(key))
}

pub(crate) fn required_path<'a>(value: &'a str, name: &str) -> Result<&'a str, ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::required(name));
    }
    Ok(value)
}

pub(crate) fn log_submitted(operation: &'static str, account_name: &str, commit: &CommitId, claims: &Claims) {
    tracing::info!(
        operation,
        account_name,
        commit_sha = %commit,
        requested_by = claims.email.as_deref().unwrap_or(&claims.sub),
        "account request committed"
    );
}
