mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

use common::{account_body, TestApp, COMMIT_SHA};

const ADMIN: &[&str] = &["Administrators"];

/// Files in a commit payload, keyed by path, with content decoded.
fn committed_files(payload: &Value) -> Vec<(String, String, Value)> {
    payload["actions"]
        .as_array()
        .map(|actions| {
            actions
                .iter()
                .map(|a| {
                    let content = a["content"]
                        .as_str()
                        .map(|c| serde_json::from_str(c).expect("content is JSON"))
                        .unwrap_or(Value::Null);
                    (
                        a["action"].as_str().unwrap_or_default().to_string(),
                        a["file_path"].as_str().unwrap_or_default().to_string(),
                        content,
                    )
                })
                .collect()
        })
        .unwrap_or_default()
}

#[tokio::test]
async fn create_account_commits_request_and_customizations() -> Result<()> {
    let app = TestApp::spawn().await?;

    let res = app
        .client
        .post(app.url("/accounts"))
        .bearer_auth(app.token(ADMIN))
        .json(&json!({
            "account_name": "testaccount",
            "email": "test@example.com",
            "organizational_unit": "Sandbox"
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::ACCEPTED);
    let body: Value = res.json().await?;
    assert_eq!(
        body,
        json!({
            "message": "Account creation request submitted",
            "account_name": "testaccount",
            "commit_sha": COMMIT_SHA
        })
    );

    let payloads = app.commit_payloads().await;
    assert_eq!(payloads.len(), 1);
    assert_eq!(payloads[0]["branch"], "main");
    assert_eq!(payloads[0]["commit_message"], "Create account: testaccount");

    let files = committed_files(&payloads[0]);
    assert_eq!(files.len(), 2);
    assert_eq!(files[0].0, "create");
    assert_eq!(files[0].1, "aft-account-request/testaccount/request.json");
    assert_eq!(files[0].2["name"], "testaccount");
    assert_eq!(files[1].1, "aft-account-request/testaccount/customizations.json");
    assert_eq!(files[1].2["sso_user"], Value::Null);
    Ok(())
}

#[tokio::test]
async fn non_alphanumeric_name_fails_without_commit() -> Result<()> {
    let app = TestApp::spawn().await?;

    let res = app
        .client
        .post(app.url("/accounts"))
        .bearer_auth(app.token(ADMIN))
        .json(&account_body("test-account"))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = res.json().await?;
    assert!(body["error"].as_str().unwrap_or_default().contains("alphanumeric"));
    assert!(app.commit_payloads().await.is_empty());
    Ok(())
}

#[tokio::test]
async fn sso_user_is_echoed_into_customizations() -> Result<()> {
    let app = TestApp::spawn().await?;
    let mut account = account_body("ssoaccount");
    account["sso_user_email"] = json!("jane@example.com");
    account["sso_user_first_name"] = json!("Jane");
    account["sso_user_last_name"] = json!("Doe");

    let res = app
        .client
        .put(app.url("/accounts/ssoaccount"))
        .bearer_auth(app.token(ADMIN))
        .json(&account)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::ACCEPTED);

    let payloads = app.commit_payloads().await;
    assert_eq!(payloads[0]["commit_message"], "Update account: ssoaccount");
    let files = committed_files(&payloads[0]);
    assert_eq!(
        files[1].2["sso_user"],
        json!({"email": "jane@example.com", "first_name": "Jane", "last_name": "Doe"})
    );
    Ok(())
}

#[tokio::test]
async fn add_option_then_remove_option_flips_enabled() -> Result<()> {
    let app = TestApp::spawn().await?;

    let res = app
        .client
        .post(app.url("/accounts/acme/options"))
        .bearer_auth(app.token(ADMIN))
        .json(&json!({"optionName": "logging", "optionConfig": {"level": "debug"}}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::ACCEPTED);
    let body: Value = res.json().await?;
    assert_eq!(body["option_name"], "logging");
    assert_eq!(body["message"], "Add option request submitted");

    let res = app
        .client
        .delete(app.url("/accounts/acme/options/logging"))
        .bearer_auth(app.token(ADMIN))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::ACCEPTED);

    let payloads = app.commit_payloads().await;
    assert_eq!(payloads.len(), 2);

    let added = committed_files(&payloads[0]);
    assert_eq!(added.len(), 1);
    assert_eq!(added[0].1, "aft-account-request/acme/options/logging.json");
    assert_eq!(added[0].2["enabled"], true);
    assert_eq!(added[0].2["config"]["level"], "debug");

    let removed = committed_files(&payloads[1]);
    assert_eq!(removed[0].1, added[0].1);
    assert_eq!(removed[0].2["enabled"], false);
    assert_eq!(payloads[1]["commit_message"], "Remove option logging from account acme");
    Ok(())
}

#[tokio::test]
async fn upgrade_and_downgrade_write_operation_files() -> Result<()> {
    let app = TestApp::spawn().await?;

    for (operation, tier) in [("upgrade", "premium"), ("downgrade", "basic")] {
        let res = app
            .client
            .post(app.url(&format!("/accounts/acme/{}", operation)))
            .bearer_auth(app.token(ADMIN))
            .json(&json!({"targetTier": tier}))
            .send()
            .await?;
        assert_eq!(res.status(), StatusCode::ACCEPTED);
        let body: Value = res.json().await?;
        assert_eq!(body["target_tier"], tier);
    }

    let payloads = app.commit_payloads().await;
    assert_eq!(payloads[0]["commit_message"], "Upgrade account acme to premium");
    assert_eq!(payloads[1]["commit_message"], "Downgrade account acme to basic");
    let downgrade = committed_files(&payloads[1]);
    assert_eq!(downgrade[0].1, "aft-account-request/acme/operations/downgrade.json");
    assert_eq!(downgrade[0].2["operation"], "downgrade");
    Ok(())
}

#[tokio::test]
async fn missing_fields_are_bad_requests() -> Result<()> {
    let app = TestApp::spawn().await?;
    let token = app.token(ADMIN);

    let cases = [
        (reqwest::Method::POST, "/accounts/acme/upgrade", json!({}), "targetTier is required"),
        (reqwest::Method::POST, "/accounts/acme/options", json!({"optionConfig": {}}), "optionName is required"),
        (reqwest::Method::DELETE, "/accounts", json!({}), "account_name is required"),
    ];

    for (method, path, body, expected) in cases {
        let res = app
            .client
            .request(method, app.url(path))
            .bearer_auth(&token)
            .json(&body)
            .send()
            .await?;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "{}", path);
        let body: Value = res.json().await?;
        assert_eq!(body["error"], expected);
    }

    assert!(app.commit_payloads().await.is_empty());
    Ok(())
}

#[tokio::test]
async fn delete_account_removes_both_files() -> Result<()> {
    let app = TestApp::spawn().await?;

    let res = app
        .client
        .delete(app.url("/accounts"))
        .bearer_auth(app.token(ADMIN))
        .json(&json!({"account_name": "acme"}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::ACCEPTED);
    let body: Value = res.json().await?;
    assert_eq!(body["message"], "Account deletion request submitted");

    let payloads = app.commit_payloads().await;
    assert_eq!(payloads[0]["commit_message"], "Delete account: acme");
    assert_eq!(
        payloads[0]["actions"],
        json!([
            {"action": "delete", "file_path": "aft-account-request/acme/request.json"},
            {"action": "delete", "file_path": "aft-account-request/acme/customizations.json"}
        ])
    );
    Ok(())
}

#[tokio::test]
async fn readers_cannot_write() -> Result<()> {
    let app = TestApp::spawn().await?;

    let res = app
        .client
        .post(app.url("/accounts"))
        .bearer_auth(app.token(&["Readers"]))
        .json(&account_body("readonly"))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body: Value = res.json().await?;
    assert_eq!(body["error"], "User does not have required permissions");
    assert!(app.commit_payloads().await.is_empty());
    Ok(())
}

#[tokio::test]
async fn gitlab_failure_surfaces_as_server_error() -> Result<()> {
    let identity = wiremock::MockServer::start().await;
    common::mount_jwks(&identity).await;
    let gitlab = wiremock::MockServer::start().await;
    common::mount_project(&gitlab).await;
    common::mount_commits(
        &gitlab,
        wiremock::ResponseTemplate::new(400).set_body_json(json!({"message": "A file with this name already exists"})),
    )
    .await;

    let app = TestApp::spawn_with(identity, gitlab).await?;
    let res = app
        .client
        .post(app.url("/accounts"))
        .bearer_auth(app.token(ADMIN))
        .json(&account_body("existing"))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = res.json().await?;
    let error = body["error"].as_str().unwrap_or_default();
    assert!(error.starts_with("Failed to commit files to GitLab"));
    assert!(error.contains("already exists"));
    Ok(())
}

#[tokio::test]
async fn service_routes_are_public() -> Result<()> {
    let app = TestApp::spawn().await?;

    let res = app.client.get(app.url("/health")).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["status"], "ok");

    let res = app.client.get(app.url("/")).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    Ok(())
}
