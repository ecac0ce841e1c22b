use axum::http::Method;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use super::token::{extract_bearer_token, AuthError, Claims, TokenValidator};

pub const ADMINISTRATORS_GROUP: &str = "Administrators";
pub const READERS_GROUP: &str = "Readers";

const POLICY_VERSION: &str = "2012-10-17";
const INVOKE_ACTION: &str = "execute-api:Invoke";
const ANONYMOUS_PRINCIPAL: &str = "user";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    Read,
    Write,
}

impl Permission {
    /// GET reads; every other method writes.
    pub fn for_method(method: &Method) -> Self {
        if *method == Method::GET {
            Permission::Read
        } else {
            Permission::Write
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::Read => "read",
            Permission::Write => "write",
        }
    }
}

/// Administrators may do anything; Readers may only read.
pub fn check_permissions(claims: &Claims, required: Permission) -> bool {
    match required {
        Permission::Read => claims.in_group(ADMINISTRATORS_GROUP) || claims.in_group(READERS_GROUP),
        Permission::Write => claims.in_group(ADMINISTRATORS_GROUP),
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AccessError {
    #[error(transparent)]
    Authentication(#[from] AuthError),

    #[error("User does not have required permissions")]
    Forbidden { required: Permission },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    Allow,
    Deny,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyStatement {
    #[serde(rename = "Action")]
    pub action: String,
    #[serde(rename = "Effect")]
    pub effect: Effect,
    #[serde(rename = "Resource")]
    pub resource: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyDocument {
    #[serde(rename = "Version")]
    pub version: String,
    #[serde(rename = "Statement")]
    pub statement: Vec<PolicyStatement>,
}

/// Decision handed back to the API gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizerResponse {
    pub principal_id: String,
    pub policy_document: PolicyDocument,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<BTreeMap<String, String>>,
}

impl AuthorizerResponse {
    pub fn allow(claims: &Claims, resource: &str) -> Self {
        let context = BTreeMap::from([
            ("email".to_string(), claims.email.clone().unwrap_or_default()),
            ("groups".to_string(), claims.groups.join(",")),
        ]);
        Self::new(&claims.sub, Effect::Allow, resource, Some(context))
    }

    pub fn deny(resource: &str) -> Self {
        Self::new(ANONYMOUS_PRINCIPAL, Effect::Deny, resource, None)
    }

    fn new(principal_id: &str, effect: Effect, resource: &str, context: Option<BTreeMap<String, String>>) -> Self {
        Self {
            principal_id: principal_id.to_string(),
            policy_document: PolicyDocument {
                version: POLICY_VERSION.to_string(),
                statement: vec![PolicyStatement {
                    action: INVOKE_ACTION.to_string(),
                    effect,
                    resource: resource.to_string(),
                }],
            },
            context,
        }
    }

    pub fn effect(&self) -> Effect {
        self.policy_document
            .statement
            .first()
            .map(|s| s.effect)
            .unwrap_or(Effect::Deny)
    }
}

/// Map already verified claims and a method onto an Allow/Deny policy.
pub fn policy_for(claims: &Claims, method: &Method, resource: &str) -> AuthorizerResponse {
    if check_permissions(claims, Permission::for_method(method)) {
        AuthorizerResponse::allow(claims, resource)
    } else {
        AuthorizerResponse::deny(resource)
    }
}

/// Token validation plus the method-to-permission check, run ahead of handlers.
#[derive(Clone)]
pub struct AuthorizationGate {
    validator: TokenValidator,
}

impl AuthorizationGate {
    pub fn new(validator: TokenValidator) -> Self {
        Self { validator }
    }

    /// Authenticate the caller and check the permission `method` needs.
    pub async fn check(&self, authorization: Option<&str>, method: &Method) -> Result<Claims, AccessError> {
        let claims = self.authenticate(authorization).await?;

        let required = Permission::for_method(method);
        if !check_permissions(&claims, required) {
            log_denied(&claims, required);
            return Err(AccessError::Forbidden { required });
        }

        Ok(claims)
    }

    /// Gateway-facing form of [`check`](Self::check). Never fails: every
    /// error becomes a Deny for the same resource.
    pub async fn authorize(&self, authorization: Option<&str>, method: &Method, resource: &str) -> AuthorizerResponse {
        let claims = match self.authenticate(authorization).await {
            Ok(claims) => claims,
            Err(e) => {
                tracing::error!(error = %e, status_code = e.status_code(), "authorization error");
                return AuthorizerResponse::deny(resource);
            }
        };

        let response = policy_for(&claims, method, resource);
        if response.effect() == Effect::Deny {
            log_denied(&claims, Permission::for_method(method));
        }
        response
    }

    async fn authenticate(&self, authorization: Option<&str>) -> Result<Claims, AuthError> {
        let token = extract_bearer_token(authorization)?;
        self.validator.validate_token(token).await
    }
}

fn log_denied(claims: &Claims, required: Permission) {
    tracing::warn!(
        user = claims.email.as_deref().unwrap_or(&claims.sub),
        required_permission = required.as_str(),
        "permission denied"
    );
}
