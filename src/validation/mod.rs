use thiserror::Error;

use crate::models::AccountRequest;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Account name must be alphanumeric")]
    AccountNameNotAlphanumeric,

    #[error("Invalid email format")]
    InvalidEmail,

    #[error("Organizational unit is required")]
    MissingOrganizationalUnit,

    #[error("SSO user first and last name are required when SSO email is provided")]
    IncompleteSsoUser,
}

/// Check an account request before anything is rendered or committed.
///
/// Rules run in a fixed order and the first failure wins. Create and update
/// share one rule set.
pub fn validate_account_request(request: &AccountRequest, _update: bool) -> Result<(), ValidationError> {
    if request.account_name.is_empty() || !request.account_name.chars().all(char::is_alphanumeric) {
        return Err(ValidationError::AccountNameNotAlphanumeric);
    }

    if !request.email.contains('@') {
        return Err(ValidationError::InvalidEmail);
    }

    if request.organizational_unit.is_empty() {
        return Err(ValidationError::MissingOrganizationalUnit);
    }

    if request.sso_user_email().is_some() && (is_blank(&request.sso_user_first_name) || is_blank(&request.sso_user_last_name)) {
        return Err(ValidationError::IncompleteSsoUser);
    }

    Ok(())
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, str::is_empty)
}
