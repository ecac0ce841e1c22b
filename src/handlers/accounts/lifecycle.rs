use axum::{
    body::Bytes,
    extract::{Extension, Path, State},
};
use serde_json::Value;

use crate::auth::Claims;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::models::AccountRequest;
use crate::render;
use crate::state::AppState;
use crate::validation::validate_account_request;

use super::{log_submitted, parse_body, required_field, required_path, AccountAccepted};

/// POST /accounts - Submit a new account request
pub async fn create(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    body: Bytes,
) -> ApiResult<AccountAccepted> {
    let request = AccountRequest::from_body(&body)?;
    validate_account_request(&request, false)?;

    let files = render::generate_account_config(&request, false)?;
    let message = format!("Create account: {}", request.account_name);
    let commit = state.repository.commit_config_files(&files, &message).await?;

    log_submitted("create", &request.account_name, &commit, &claims);
    Ok(ApiResponse::accepted(AccountAccepted::new(
        "Account creation request submitted",
        request.account_name,
        commit,
    )))
}

/// PUT /accounts/:account_name - Replace the desired state of an account
///
/// The body may omit `account_name`; when present it must match the path.
pub async fn update(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(account_name): Path<String>,
    body: Bytes,
) -> ApiResult<AccountAccepted> {
    let account_name = required_path(&account_name, "accountName")?;

    let mut value = parse_body(&body)?;
    if let Value::Object(fields) = &mut value {
        match fields.get("account_name") {
            None => {
                fields.insert("account_name".to_string(), Value::String(account_name.to_string()));
            }
            Some(name) if name.as_str() != Some(account_name) => {
                return Err(ApiError::bad_request("account_name in body does not match path"));
            }
            Some(_) => {}
        }
    }

    let request = AccountRequest::from_value(value)?;
    validate_account_request(&request, true)?;

    let files = render::generate_account_config(&request, true)?;
    let message = format!("Update account: {}", request.account_name);
    let commit = state.repository.commit_config_files(&files, &message).await?;

    log_submitted("update", &request.account_name, &commit, &claims);
    Ok(ApiResponse::accepted(AccountAccepted::new(
        "Account update request submitted",
        request.account_name,
        commit,
    )))
}

/// DELETE /accounts - Remove an account's configuration, name taken from the body
pub async fn delete(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    body: Bytes,
) -> ApiResult<AccountAccepted> {
    let value = parse_body(&body)?;
    let account_name = required_field(&value, "account_name")?;
    delete_account(&state, &claims, account_name).await
}

/// DELETE /accounts/:account_name
pub async fn delete_by_path(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(account_name): Path<String>,
) -> ApiResult<AccountAccepted> {
    let account_name = required_path(&account_name, "accountName")?;
    delete_account(&state, &claims, account_name).await
}

async fn delete_account(state: &AppState, claims: &Claims, account_name: &str) -> ApiResult<AccountAccepted> {
    let message = format!("Delete account: {}", account_name);
    let commit = state.repository.delete_account_config(account_name, &message).await?;

    log_submitted("delete", account_name, &commit, claims);
    Ok(ApiResponse::accepted(AccountAccepted::new(
        "Account deletion request submitted",
        account_name,
        commit,
    )))
}
