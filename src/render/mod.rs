//! Renders validated requests into the files the provisioning pipeline reads.
//!
//! Every account owns one directory in the repository:
//!
//! ```text
//! aft-account-request/<account_name>/
//! ├── request.json
//! ├── customizations.json
//! ├── operations/{upgrade,downgrade}.json
//! └── options/<option_name>.json
//! ```
//!
//! Rendering is pure: no clock, no network, no disk. Keys come out in a fixed
//! order (struct field order, sorted maps) and are pretty-printed with two
//! space indentation so successive commits diff cleanly. The `timestamp`
//! fields are written empty and left for the pipeline to stamp.

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

use crate::models::{AccountRequest, ConfigFile};

pub const ACCOUNT_REQUEST_ROOT: &str = "aft-account-request";
pub const REQUEST_FILE: &str = "request.json";
pub const CUSTOMIZATIONS_FILE: &str = "customizations.json";

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Invalid {kind} '{value}': must be a single path segment")]
    InvalidPathSegment { kind: &'static str, value: String },

    #[error("Failed to serialize {path}: {source}")]
    Serialization {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Tier change direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TierOperation {
    Upgrade,
    Downgrade,
}

impl TierOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            TierOperation::Upgrade => "upgrade",
            TierOperation::Downgrade => "downgrade",
        }
    }
}

#[derive(Serialize)]
struct RequestDocument<'a> {
    name: &'a str,
    email: &'a str,
    organizational_unit: &'a str,
    account_tags: &'a BTreeMap<String, String>,
    custom_fields: &'a BTreeMap<String, String>,
}

#[derive(Serialize)]
struct CustomizationsDocument<'a> {
    custom_fields: &'a BTreeMap<String, String>,
    sso_user: Option<SsoUserDocument<'a>>,
}

#[derive(Serialize)]
struct SsoUserDocument<'a> {
    email: &'a str,
    first_name: Option<&'a str>,
    last_name: Option<&'a str>,
}

#[derive(Serialize)]
struct TierDocument<'a> {
    operation: TierOperation,
    target_tier: &'a str,
    timestamp: &'a str,
}

#[derive(Serialize)]
struct OptionDocument<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    config: Option<&'a Value>,
    enabled: bool,
    timestamp: &'a str,
}

/// Directory holding every file for one account.
pub fn account_base_path(account_name: &str) -> Result<String, RenderError> {
    check_segment("account name", account_name)?;
    Ok(format!("{}/{}", ACCOUNT_REQUEST_ROOT, account_name))
}

/// Files owned by the account itself, removed together on delete.
pub fn account_file_paths(account_name: &str) -> Result<Vec<String>, RenderError> {
    let base = account_base_path(account_name)?;
    Ok(vec![
        format!("{}/{}", base, REQUEST_FILE),
        format!("{}/{}", base, CUSTOMIZATIONS_FILE),
    ])
}

/// `request.json` and `customizations.json` for create and update.
pub fn generate_account_config(request: &AccountRequest, _update: bool) -> Result<Vec<ConfigFile>, RenderError> {
    let base = account_base_path(&request.account_name)?;

    let request_doc = RequestDocument {
        name: &request.account_name,
        email: &request.email,
        organizational_unit: &request.organizational_unit,
        account_tags: &request.account_tags,
        custom_fields: &request.custom_fields,
    };

    let customizations_doc = CustomizationsDocument {
        custom_fields: &request.custom_fields,
        sso_user: request.sso_user_email().map(|email| SsoUserDocument {
            email,
            first_name: request.sso_user_first_name.as_deref(),
            last_name: request.sso_user_last_name.as_deref(),
        }),
    };

    Ok(vec![
        render(format!("{}/{}", base, REQUEST_FILE), &request_doc)?,
        render(format!("{}/{}", base, CUSTOMIZATIONS_FILE), &customizations_doc)?,
    ])
}

pub fn generate_upgrade_config(account_name: &str, target_tier: &str) -> Result<Vec<ConfigFile>, RenderError> {
    generate_tier_config(account_name, TierOperation::Upgrade, target_tier)
}

pub fn generate_downgrade_config(account_name: &str, target_tier: &str) -> Result<Vec<ConfigFile>, RenderError> {
    generate_tier_config(account_name, TierOperation::Downgrade, target_tier)
}

fn generate_tier_config(
    account_name: &str,
    operation: TierOperation,
    target_tier: &str,
) -> Result<Vec<ConfigFile>, RenderError> {
    let base = account_base_path(account_name)?;
    let doc = TierDocument {
        operation,
        target_tier,
        timestamp: "",
    };
    Ok(vec![render(
        format!("{}/operations/{}.json", base, operation.as_str()),
        &doc,
    )?])
}

pub fn generate_add_option_config(
    account_name: &str,
    option_name: &str,
    option_config: &Value,
) -> Result<Vec<ConfigFile>, RenderError> {
    let doc = OptionDocument {
        name: option_name,
        config: Some(option_config),
        enabled: true,
        timestamp: "",
    };
    Ok(vec![render(option_path(account_name, option_name)?, &doc)?])
}

/// Removal disables the option in place; the file itself is kept. The option
/// does not need to exist beforehand.
pub fn generate_remove_option_config(account_name: &str, option_name: &str) -> Result<Vec<ConfigFile>, RenderError> {
    let doc = OptionDocument {
        name: option_name,
        config: None,
        enabled: false,
        timestamp: "",
    };
    Ok(vec![render(option_path(account_name, option_name)?, &doc)?])
}

fn option_path(account_name: &str, option_name: &str) -> Result<String, RenderError> {
    let base = account_base_path(account_name)?;
    check_segment("option name", option_name)?;
    Ok(format!("{}/options/{}.json", base, option_name))
}

fn check_segment(kind: &'static str, value: &str) -> Result<(), RenderError> {
    let invalid = value.is_empty()
        || value == "."
        || value == ".."
        || value.contains('/')
        || value.contains('\\');
    if invalid {
        return Err(RenderError::InvalidPathSegment {
            kind,
            value: value.to_string(),
        });
    }
    Ok(())
}

fn render<T: Serialize>(path: String, doc: &T) -> Result<ConfigFile, RenderError> {
    match serde_json::to_string_pretty(doc) {
        Ok(content) => Ok(ConfigFile::new(path, content)),
        Err(source) => Err(RenderError::Serialization { path, source }),
    }
}
