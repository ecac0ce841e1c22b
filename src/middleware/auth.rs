use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

use crate::error::ApiError;
use crate::state::AppState;

/// Runs the authorization gate ahead of every account route.
///
/// On success the verified [`Claims`](crate::auth::Claims) are inserted into
/// the request extensions; otherwise the request is answered with 401 or 403
/// and never reaches the handler.
pub async fn require_access(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let authorization = request
        .headers()
        .get(AUTHORIZATION)
        .map(|value| {
            value
                .to_str()
                .map(str::to_owned)
                .map_err(|_| ApiError::unauthorized("Invalid Authorization header format"))
        })
        .transpose()?;
    let method = request.method().clone();

    let claims = state.gate.check(authorization.as_deref(), &method).await?;

    tracing::debug!(
        subject = %claims.sub,
        method = %method,
        path = %request.uri().path(),
        "request authorized"
    );

    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}
