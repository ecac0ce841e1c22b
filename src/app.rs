use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::config::ServerConfig;
use crate::handlers::{accounts, authorizer, service};
use crate::middleware::require_access;
use crate::state::AppState;

/// Assemble the full router: public service routes, the gateway authorizer,
/// and the gated account routes.
pub fn app(state: AppState) -> Router {
    let cors = cors_layer(&state.config.server);

    Router::new()
        // Public
        .route("/", get(service::root))
        .route("/health", get(service::health))
        // Gateway authorizer (evaluates the token itself)
        .route("/authorizer", post(authorizer::authorize))
        // Gated
        .merge(account_routes(state.clone()))
        // Global middleware
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(cors))
        .with_state(state)
}

fn account_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/accounts", post(accounts::create).delete(accounts::delete))
        .route(
            "/accounts/:account_name",
            put(accounts::update).delete(accounts::delete_by_path),
        )
        .route("/accounts/:account_name/upgrade", post(accounts::upgrade))
        .route("/accounts/:account_name/downgrade", post(accounts::downgrade))
        .route("/accounts/:account_name/options", post(accounts::add_option))
        .route(
            "/accounts/:account_name/options/:option_name",
            delete(accounts::remove_option),
        )
        .route_layer(middleware::from_fn_with_state(state, require_access))
}

/// CORS from configuration. Disabled means no cross-origin headers at all;
/// an origin list containing `*` allows any origin.
fn cors_layer(config: &ServerConfig) -> CorsLayer {
    if !config.enable_cors {
        return CorsLayer::new();
    }

    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    if config.cors_origins.iter().any(|o| o == "*") {
        return base.allow_origin(AllowOrigin::any());
    }

    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    base.allow_origin(AllowOrigin::list(origins))
}
