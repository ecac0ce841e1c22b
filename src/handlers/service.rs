use axum::response::Json;
use serde_json::{json, Value};

/// GET / - Service information
pub async fn root() -> Json<Value> {
    Json(json!({
        "name": "AFT Account API",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Commits AWS account lifecycle requests to the AFT account request repository",
        "endpoints": {
            "accounts": "POST /accounts, DELETE /accounts[/:account_name] (write)",
            "account": "PUT /accounts/:account_name (write)",
            "tier": "POST /accounts/:account_name/upgrade|downgrade (write)",
            "options": "POST /accounts/:account_name/options, DELETE /accounts/:account_name/options/:option_name (write)",
            "authorizer": "POST /authorizer (gateway authorizer)",
            "health": "GET /health (public)"
        }
    }))
}

/// GET /health - Liveness
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now(),
    }))
}
