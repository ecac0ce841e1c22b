use chrono::Utc;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

use crate::config::IdentityConfig;

/// Claim key Cognito uses for group membership.
pub const GROUPS_CLAIM: &str = "cognito:groups";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Authorization header is missing")]
    MissingHeader,

    #[error("Authorization header must be 'Bearer token'")]
    MalformedHeader,

    #[error("Failed to fetch JWT keys: {0}")]
    KeyFetch(String),

    #[error("Invalid JWT token header: {0}")]
    InvalidHeader(String),

    #[error("Unable to find matching JWT key")]
    UnknownKey,

    #[error("Invalid claims: {0}")]
    InvalidClaims(String),

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Token is expired")]
    Expired,
}

impl AuthError {
    pub fn status_code(&self) -> u16 {
        match self {
            AuthError::KeyFetch(_) => 500,
            _ => 401,
        }
    }
}

/// Verified token payload.
///
/// Named fields cover what authorization needs; anything else the issuer
/// put in the token is kept in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(default)]
    pub email: Option<String>,
    pub exp: i64,
    #[serde(rename = "cognito:groups", default)]
    pub groups: Vec<String>,
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

impl Claims {
    pub fn in_group(&self, group: &str) -> bool {
        self.groups.iter().any(|g| g == group)
    }
}

/// Pull the token out of an `Authorization: Bearer <token>` header value.
pub fn extract_bearer_token(header: Option<&str>) -> Result<&str, AuthError> {
    let header = header.ok_or(AuthError::MissingHeader)?;
    if header.trim().is_empty() {
        return Err(AuthError::MissingHeader);
    }

    let parts: Vec<&str> = header.split_whitespace().collect();
    match parts.as_slice() {
        [scheme, token] if scheme.eq_ignore_ascii_case("bearer") => Ok(*token),
        _ => Err(AuthError::MalformedHeader),
    }
}

/// Verifies RS256 tokens against the issuer's published key set.
///
/// The key set is fetched on every call; key rotation needs no local state.
#[derive(Clone)]
pub struct TokenValidator {
    http: reqwest::Client,
    jwks_url: String,
    issuer: String,
    audience: String,
}

impl TokenValidator {
    pub fn new(config: &IdentityConfig) -> Result<Self, AuthError> {
        let http = reqwest::Client::builder()
            .timeout(config.http_timeout())
            .build()
            .map_err(|e| AuthError::KeyFetch(e.to_string()))?;

        Ok(Self {
            http,
            jwks_url: config.jwks_url(),
            issuer: config.issuer(),
            audience: config.app_client_id.clone(),
        })
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    pub async fn validate_token(&self, token: &str) -> Result<Claims, AuthError> {
        let jwks = self.fetch_keys().await?;
        self.validate_with_keys(token, &jwks)
    }

    async fn fetch_keys(&self) -> Result<JwkSet, AuthError> {
        let response = self
            .http
            .get(&self.jwks_url)
            .send()
            .await
            .map_err(|e| AuthError::KeyFetch(e.to_string()))?
            .error_for_status()
            .map_err(|e| AuthError::KeyFetch(e.to_string()))?;

        response
            .json::<JwkSet>()
            .await
            .map_err(|e| AuthError::KeyFetch(e.to_string()))
    }

    /// Verify `token` against an already fetched key set.
    pub fn validate_with_keys(&self, token: &str, jwks: &JwkSet) -> Result<Claims, AuthError> {
        if token.is_empty() {
            return Err(AuthError::MissingHeader);
        }

        let header = decode_header(token).map_err(|e| AuthError::InvalidHeader(e.to_string()))?;
        let kid = header.kid.ok_or(AuthError::UnknownKey)?;
        let jwk = jwks.find(&kid).ok_or(AuthError::UnknownKey)?;
        let key = DecodingKey::from_jwk(jwk).map_err(|e| AuthError::InvalidToken(e.to_string()))?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[&self.audience]);
        validation.set_issuer(&[&self.issuer]);

        let data = decode::<Claims>(token, &key, &validation).map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => AuthError::Expired,
            ErrorKind::InvalidAudience | ErrorKind::InvalidIssuer | ErrorKind::MissingRequiredClaim(_) => {
                AuthError::InvalidClaims(e.to_string())
            }
            _ => AuthError::InvalidToken(e.to_string()),
        })?;

        // The library allows clock skew leeway; expiry here is strict.
        if Utc::now().timestamp() > data.claims.exp {
            return Err(AuthError::Expired);
        }

        Ok(data.claims)
    }
}
