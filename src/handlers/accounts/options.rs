use axum::{
    body::Bytes,
    extract::{Extension, Path, State},
};
use serde_json::json;

use crate::auth::Claims;
use crate::middleware::{ApiResponse, ApiResult};
use crate::render;
use crate::state::AppState;

use super::{log_submitted, parse_body, required_field, required_path, AccountAccepted};

/// POST /accounts/:account_name/options - Enable an option, `optionConfig` defaults to `{}`
pub async fn add_option(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(account_name): Path<String>,
    body: Bytes,
) -> ApiResult<AccountAccepted> {
    let account_name = required_path(&account_name, "accountName")?;
    let value = parse_body(&body)?;
    let option_name = required_field(&value, "optionName")?;
    let option_config = value.get("optionConfig").cloned().unwrap_or_else(|| json!({}));

    let files = render::generate_add_option_config(account_name, option_name, &option_config)?;
    let message = format!("Add option {} to account {}", option_name, account_name);
    let commit = state.repository.commit_config_files(&files, &message).await?;

    log_submitted("add_option", account_name, &commit, &claims);
    Ok(ApiResponse::accepted(
        AccountAccepted::new("Add option request submitted", account_name, commit).with_option_name(option_name),
    ))
}

/// DELETE /accounts/:account_name/options/:option_name - Disable an option
pub async fn remove_option(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path((account_name, option_name)): Path<(String, String)>,
) -> ApiResult<AccountAccepted> {
    let account_name = required_path(&account_name, "accountName")?;
    let option_name = required_path(&option_name, "optionName")?;

    let files = render::generate_remove_option_config(account_name, option_name)?;
    let message = format!("Remove option {} from account {}", option_name, account_name);
    let commit = state.repository.commit_config_files(&files, &message).await?;

    log_submitted("remove_option", account_name, &commit, &claims);
    Ok(ApiResponse::accepted(
        AccountAccepted::new("Remove option request submitted", account_name, commit).with_option_name(option_name),
    ))
}
