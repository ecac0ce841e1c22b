use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

pub const ACCOUNT_NAME_MAX_LEN: usize = 50;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Invalid request body: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("{field} must be between {min} and {max} characters")]
    Length {
        field: &'static str,
        min: usize,
        max: usize,
    },
}

/// Desired state of an AWS account, decoded fresh from each request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRequest {
    pub account_name: String,
    pub email: String,
    pub organizational_unit: String,
    #[serde(default)]
    pub account_tags: BTreeMap<String, String>,
    #[serde(default)]
    pub custom_fields: BTreeMap<String, String>,
    #[serde(default)]
    pub sso_user_email: Option<String>,
    #[serde(default)]
    pub sso_user_first_name: Option<String>,
    #[serde(default)]
    pub sso_user_last_name: Option<String>,
}

impl AccountRequest {
    /// Decode a request body. An empty body is treated as `{}`.
    pub fn from_body(body: &[u8]) -> Result<Self, ModelError> {
        let request: AccountRequest = if body.iter().all(u8::is_ascii_whitespace) {
            serde_json::from_slice(b"{}")?
        } else {
            serde_json::from_slice(body)?
        };
        request.check_constraints()?;
        Ok(request)
    }

    pub fn from_value(value: Value) -> Result<Self, ModelError> {
        let request: AccountRequest = serde_json::from_value(value)?;
        request.check_constraints()?;
        Ok(request)
    }

    fn check_constraints(&self) -> Result<(), ModelError> {
        let len = self.account_name.chars().count();
        if len == 0 || len > ACCOUNT_NAME_MAX_LEN {
            return Err(ModelError::Length {
                field: "account_name",
                min: 1,
                max: ACCOUNT_NAME_MAX_LEN,
            });
        }
        Ok(())
    }

    /// The SSO user email, when one was actually supplied. An empty string
    /// counts as no SSO user.
    pub fn sso_user_email(&self) -> Option<&str> {
        self.sso_user_email.as_deref().filter(|email| !email.is_empty())
    }
}

/// One file to write into the account request repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigFile {
    pub file_path: String,
    pub content: String,
}

impl ConfigFile {
    pub fn new(file_path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            file_path: file_path.into(),
            content: content.into(),
        }
    }
}

/// Identifier of the commit a batch landed in. Opaque to everything but the response body.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommitId(String);

impl CommitId {
    pub fn new(sha: impl Into<String>) -> Self {
        Self(sha.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CommitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
