#![allow(dead_code)]

use std::collections::HashMap;

use anyhow::{Context, Result};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::{json, Value};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use aft_account_api::{app, AppConfig, AppState};

pub const CLIENT_ID: &str = "test-client";
pub const PROJECT_ID: &str = "42";
pub const GITLAB_TOKEN: &str = "glpat-test";
pub const SIGNING_KID: &str = "test-signing-key";
pub const COMMIT_SHA: &str = "6104942438c14ec7bd21c6cd5bd995272b3faff6";

const JWKS: &str = include_str!("../fixtures/jwks.json");
const SIGNING_KEY: &[u8] = include_bytes!("../fixtures/signing.pem");
const ROGUE_KEY: &[u8] = include_bytes!("../fixtures/rogue.pem");

pub const PROJECT_PATH: &str = "/api/v4/projects/42";
pub const COMMITS_PATH: &str = "/api/v4/projects/42/repository/commits";

/// The real router on a free port, with the identity provider and GitLab
/// replaced by mock servers.
pub struct TestApp {
    pub base_url: String,
    pub issuer: String,
    pub identity: MockServer,
    pub gitlab: MockServer,
    pub client: reqwest::Client,
}

impl TestApp {
    pub async fn spawn() -> Result<Self> {
        let identity = MockServer::start().await;
        mount_jwks(&identity).await;

        let gitlab = MockServer::start().await;
        mount_project(&gitlab).await;
        mount_commits(&gitlab, ResponseTemplate::new(201).set_body_json(json!({ "id": COMMIT_SHA }))).await;

        Self::spawn_with(identity, gitlab).await
    }

    /// Start against already configured mocks.
    pub async fn spawn_with(identity: MockServer, gitlab: MockServer) -> Result<Self> {
        let config = test_config(&identity.uri(), &gitlab.uri())?;
        let issuer = config.identity.issuer();
        let state = AppState::initialize(config).await.context("failed to initialize state")?;

        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .context("failed to bind test listener")?;
        let router = app(state);
        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        Ok(Self {
            base_url: format!("http://127.0.0.1:{}", port),
            issuer,
            identity,
            gitlab,
            client: reqwest::Client::new(),
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// A valid token for this app's issuer and audience.
    pub fn token(&self, groups: &[&str]) -> String {
        sign_claims(&self.claims(groups))
    }

    pub fn claims(&self, groups: &[&str]) -> Value {
        let now = chrono::Utc::now().timestamp();
        json!({
            "sub": "user-1",
            "email": "ops@example.com",
            "aud": CLIENT_ID,
            "iss": self.issuer,
            "iat": now,
            "exp": now + 3600,
            "token_use": "id",
            "cognito:groups": groups,
        })
    }

    /// Commit payloads GitLab received, in order.
    pub async fn commit_payloads(&self) -> Vec<Value> {
        received_commits(&self.gitlab).await
    }
}

pub fn test_config(identity_uri: &str, gitlab_uri: &str) -> Result<AppConfig> {
    let vars: HashMap<&str, String> = HashMap::from([
        ("COGNITO_USER_POOL_ID", "eu-west-1_TestPool".to_string()),
        ("COGNITO_APP_CLIENT_ID", CLIENT_ID.to_string()),
        ("COGNITO_ISSUER", identity_uri.to_string()),
        ("GITLAB_URL", gitlab_uri.to_string()),
        ("GITLAB_TOKEN", GITLAB_TOKEN.to_string()),
        ("GITLAB_PROJECT_ID", PROJECT_ID.to_string()),
        ("IDENTITY_HTTP_TIMEOUT_SECS", "5".to_string()),
        ("GITLAB_HTTP_TIMEOUT_SECS", "5".to_string()),
    ]);
    AppConfig::from_lookup(|key| vars.get(key).cloned()).context("invalid test configuration")
}

pub async fn mount_jwks(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/.well-known/jwks.json"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(JWKS, "application/json"))
        .mount(server)
        .await;
}

pub async fn mount_project(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path(PROJECT_PATH))
        .and(header("private-token", GITLAB_TOKEN))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": 42, "path": "aft-requests" })))
        .mount(server)
        .await;
}

pub async fn mount_commits(server: &MockServer, response: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path(COMMITS_PATH))
        .and(header("private-token", GITLAB_TOKEN))
        .respond_with(response)
        .mount(server)
        .await;
}

pub async fn received_commits(server: &MockServer) -> Vec<Value> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.url.path() == COMMITS_PATH)
        .map(|r| serde_json::from_slice(&r.body).expect("commit payload is JSON"))
        .collect()
}

pub fn sign(claims: &Value, pem: &[u8], kid: &str) -> String {
    let mut header = Header::new(Algorithm::RS256);
    header.kid = Some(kid.to_string());
    let key = EncodingKey::from_rsa_pem(pem).expect("fixture key is valid PEM");
    encode(&header, claims, &key).expect("token signs")
}

/// Sign with the key the JWKS publishes under `SIGNING_KID`.
pub fn sign_claims(claims: &Value) -> String {
    sign(claims, SIGNING_KEY, SIGNING_KID)
}

/// Same claims, signed with a key the JWKS does not publish under `kid`.
pub fn sign_with_rogue_key(claims: &Value, kid: &str) -> String {
    sign(claims, ROGUE_KEY, kid)
}

pub fn account_body(name: &str) -> Value {
    json!({
        "account_name": name,
        "email": format!("{}@example.com", name),
        "organizational_unit": "Sandbox",
        "account_tags": {"Environment": "Development"},
        "custom_fields": {"CostCenter": "12345"}
    })
}
