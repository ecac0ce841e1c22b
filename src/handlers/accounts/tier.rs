use axum::{
    body::Bytes,
    extract::{Extension, Path, State},
};

use crate::auth::Claims;
use crate::middleware::{ApiResponse, ApiResult};
use crate::render::{self, TierOperation};
use crate::state::AppState;

use super::{log_submitted, parse_body, required_field, required_path, AccountAccepted};

/// POST /accounts/:account_name/upgrade - Request a move to a higher tier
pub async fn upgrade(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(account_name): Path<String>,
    body: Bytes,
) -> ApiResult<AccountAccepted> {
    change_tier(&state, &claims, TierOperation::Upgrade, &account_name, &body).await
}

/// POST /accounts/:account_name/downgrade - Request a move to a lower tier
pub async fn downgrade(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(account_name): Path<String>,
    body: Bytes,
) -> ApiResult<AccountAccepted> {
    change_tier(&state, &claims, TierOperation::Downgrade, &account_name, &body).await
}

async fn change_tier(
    state: &AppState,
    claims: &Claims,
    operation: TierOperation,
    account_name: &str,
    body: &[u8],
) -> ApiResult<AccountAccepted> {
    let account_name = required_path(account_name, "accountName")?;
    let value = parse_body(body)?;
    let target_tier = required_field(&value, "targetTier")?;

    let (files, message, submitted) = match operation {
        TierOperation::Upgrade => (
            render::generate_upgrade_config(account_name, target_tier)?,
            format!("Upgrade account {} to {}", account_name, target_tier),
            "Account upgrade request submitted",
        ),
        TierOperation::Downgrade => (
            render::generate_downgrade_config(account_name, target_tier)?,
            format!("Downgrade account {} to {}", account_name, target_tier),
            "Account downgrade request submitted",
        ),
    };

    let commit = state.repository.commit_config_files(&files, &message).await?;

    log_submitted(operation.as_str(), account_name, &commit, claims);
    Ok(ApiResponse::accepted(
        AccountAccepted::new(submitted, account_name, commit).with_target_tier(target_tier),
    ))
}
