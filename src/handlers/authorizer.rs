use axum::{extract::State, http::Method, Json};
use serde::Deserialize;
use std::collections::HashMap;

use crate::auth::AuthorizerResponse;
use crate::state::AppState;

/// Request authorizer event as delivered by the API gateway.
///
/// Every field may be absent or `null`; a sparse event still gets a policy.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizerEvent {
    #[serde(default)]
    pub method_arn: Option<String>,
    #[serde(default)]
    pub headers: Option<HashMap<String, String>>,
    #[serde(default)]
    pub request_context: Option<RequestContext>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RequestContext {
    #[serde(default)]
    pub http: Option<HttpContext>,
}

#[derive(Debug, Default, Deserialize)]
pub struct HttpContext {
    #[serde(default)]
    pub method: Option<String>,
}

impl AuthorizerEvent {
    /// Gateways may lowercase header names.
    pub fn authorization(&self) -> Option<&str> {
        self.headers
            .as_ref()?
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case("authorization"))
            .map(|(_, value)| value.as_str())
    }

    /// A missing or unparseable method is treated like any non-GET method.
    pub fn method(&self) -> Method {
        self.request_context
            .as_ref()
            .and_then(|context| context.http.as_ref())
            .and_then(|http| http.method.as_deref())
            .and_then(|method| Method::from_bytes(method.as_bytes()).ok())
            .unwrap_or(Method::POST)
    }

    pub fn method_arn(&self) -> &str {
        self.method_arn.as_deref().unwrap_or_default()
    }
}

/// POST /authorizer - Evaluate a gateway authorizer event
///
/// Always answers 200; failures are expressed as a Deny policy.
pub async fn authorize(State(state): State<AppState>, Json(event): Json<AuthorizerEvent>) -> Json<AuthorizerResponse> {
    let response = state
        .gate
        .authorize(event.authorization(), &event.method(), event.method_arn())
        .await;
    Json(response)
}
