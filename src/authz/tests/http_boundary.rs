//! HTTP boundary tests
//!
//! Runs the router against an in-memory store and checks status mapping,
//! challenge headers and the token endpoints.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use merchant_authz::http::{create_router, AppState, ErrorResponse, OperationResponse};
use merchant_authz::{
    AuthorizationGate, CredentialStore, InMemoryCredentialStore, NewCredential, OperationTable,
    Principal,
};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

struct TestApp {
    router: Router,
    store: Arc<InMemoryCredentialStore>,
}

async fn app(enabled: bool) -> TestApp {
    let store = Arc::new(InMemoryCredentialStore::new());
    store.insert_principal(Principal::new(1, "alice@example.com")).await;
    store.insert_principal(Principal::new(2, "root@example.com").superuser()).await;

    let gate = AuthorizationGate::new(store.clone(), enabled, None);
    let state = AppState::new(gate, OperationTable::merchant_api(), store.clone());
    TestApp {
        router: create_router(state),
        store,
    }
}

async fn token(store: &InMemoryCredentialStore, owner: i64, permissions: &[&str]) -> String {
    let mut request = NewCredential::for_owner(owner);
    for permission in permissions {
        request = request.with_permission(*permission);
    }
    store.create_credential(request).await.unwrap().id
}

async fn send(router: &Router, method: &str, uri: &str, bearer: Option<&str>, body: Option<Value>) -> (StatusCode, Option<String>, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(bearer) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", bearer));
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let challenge = response
        .headers()
        .get(header::WWW_AUTHENTICATE)
        .map(|v| v.to_str().unwrap().to_string());
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, challenge, json)
}

#[tokio::test]
async fn test_missing_credential_is_401_with_challenge() {
    let app = app(true).await;

    let (status, challenge, body) = send(&app.router, "GET", "/wallets", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(challenge.as_deref(), Some("Bearer scope=\"wallet_management\""));

    let body: ErrorResponse = serde_json::from_value(body).unwrap();
    assert_eq!(body.error, "invalid_credentials");
}

#[tokio::test]
async fn test_selective_scope_over_http() {
    let app = app(true).await;
    let bearer = token(&app.store, 1, &["invoice_management:42"]).await;

    let (status, _, body) = send(&app.router, "GET", "/invoices/42", Some(bearer.as_str()), None).await;
    assert_eq!(status, StatusCode::OK);
    let body: OperationResponse = serde_json::from_value(body).unwrap();
    assert_eq!(body.operation, "invoices.get_one");
    assert_eq!(body.resource_id.as_deref(), Some("42"));
    assert_eq!(body.principal_id, Some(1));

    let (status, challenge, body) = send(&app.router, "GET", "/invoices/43", Some(bearer.as_str()), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(challenge.as_deref(), Some("Bearer scope=\"invoice_management\""));
    assert_eq!(body["error"], "insufficient_scope");

    // Collection access needs the blanket scope
    let (status, _, _) = send(&app.router, "GET", "/invoices", Some(bearer.as_str()), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_superuser_gate_over_http() {
    let app = app(true).await;
    let alice_full = token(&app.store, 1, &["full_control"]).await;
    let root_full = token(&app.store, 2, &["full_control"]).await;

    let (status, _, body) = send(&app.router, "DELETE", "/users/5", Some(alice_full.as_str()), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "superuser_required");

    let (status, _, _) = send(&app.router, "DELETE", "/users/5", Some(root_full.as_str()), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_open_and_unknown_operations() {
    let app = app(true).await;

    // Registration is open
    let (status, _, body) = send(&app.router, "POST", "/users", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["principal_id"], Value::Null);

    let (status, _, _) = send(&app.router, "GET", "/payouts", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_me_requires_any_valid_credential() {
    let app = app(true).await;
    let bearer = token(&app.store, 1, &[]).await;

    let (status, _, body) = send(&app.router, "GET", "/users/me", Some(bearer.as_str()), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "alice@example.com");
    assert!(body.get("hashed_password").is_none());

    let (status, challenge, _) = send(&app.router, "GET", "/users/me", Some("unknown"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(challenge.as_deref(), Some("Bearer"));
}

#[tokio::test]
async fn test_stats_requires_full_control() {
    let app = app(true).await;
    let full = token(&app.store, 1, &["full_control"]).await;
    let server = token(&app.store, 2, &["server_management"]).await;

    let (status, _, body) = send(&app.router, "GET", "/users/stats", Some(full.as_str()), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["operation"], "users.stats");

    let (status, challenge, _) = send(&app.router, "GET", "/users/stats", Some(server.as_str()), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(challenge.as_deref(), Some("Bearer scope=\"full_control\""));
}

#[tokio::test]
async fn test_services_optional_authentication() {
    let app = app(true).await;
    let root = token(&app.store, 2, &["server_management"]).await;
    let alice = token(&app.store, 1, &["server_management"]).await;

    let (status, _, body) = send(&app.router, "GET", "/tor/services", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["full"], false);

    let (_, _, body) = send(&app.router, "GET", "/tor/services", Some(alice.as_str()), None).await;
    assert_eq!(body["full"], false);

    let (_, _, body) = send(&app.router, "GET", "/tor/services", Some(root.as_str()), None).await;
    assert_eq!(body["full"], true);
}

#[tokio::test]
async fn test_token_issue_and_revoke() {
    let app = app(true).await;
    let admin = token(&app.store, 1, &["token_management"]).await;

    let (status, _, body) = send(
        &app.router,
        "POST",
        "/tokens",
        Some(admin.as_str()),
        Some(serde_json::json!({ "app_id": "pos", "permissions": ["store_management:7"] })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["user_id"], 1);
    let issued = body["id"].as_str().unwrap().to_string();
    assert_eq!(issued.len(), 43);

    let (status, _, _) = send(&app.router, "GET", "/stores/7", Some(issued.as_str()), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _, body) = send(
        &app.router,
        "POST",
        "/tokens",
        Some(admin.as_str()),
        Some(serde_json::json!({ "permissions": ["root"] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");

    let uri = format!("/tokens/{}", issued);
    let (status, _, body) = send(&app.router, "DELETE", &uri, Some(admin.as_str()), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["revoked"], true);

    let (status, _, _) = send(&app.router, "GET", "/stores/7", Some(issued.as_str()), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(app.store.lookup_credential_with_principal(&issued).await.unwrap().is_none());
}

#[tokio::test]
async fn test_disabled_enforcement_passes_everything() {
    let app = app(false).await;

    let (status, _, body) = send(&app.router, "DELETE", "/users/1", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["principal_id"], Value::Null);

    let (status, _, body) = send(&app.router, "GET", "/users/me", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::Null);
}

#[tokio::test]
async fn test_token_collection_crud_is_routed() {
    let app = app(true).await;
    let admin = token(&app.store, 1, &["token_management"]).await;

    let (status, challenge, _) = send(&app.router, "GET", "/tokens", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(challenge.as_deref(), Some("Bearer scope=\"token_management\""));

    let (status, _, body) = send(&app.router, "GET", "/tokens", Some(admin.as_str()), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["operation"], "tokens.get_all");

    for (method, operation) in [("GET", "tokens.get_one"), ("PATCH", "tokens.patch"), ("PUT", "tokens.put")] {
        let (status, _, body) = send(&app.router, method, "/tokens/abc", Some(admin.as_str()), None).await;
        assert_eq!(status, StatusCode::OK, "{} /tokens/abc", method);
        assert_eq!(body["operation"], operation);
        assert_eq!(body["resource_id"], "abc");
    }
}

#[tokio::test]
async fn test_users_me_only_shadows_get() {
    let app = app(true).await;
    let root = token(&app.store, 2, &["server_management"]).await;

    // Other methods on `/users/me` are ordinary user operations on id "me"
    let (status, _, body) = send(&app.router, "PATCH", "/users/me", Some(root.as_str()), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["operation"], "users.patch");
}

#[tokio::test]
async fn test_count_is_a_collection_operation() {
    let app = app(true).await;
    let selective_count = token(&app.store, 1, &["invoice_management:count"]).await;
    let selective_42 = token(&app.store, 1, &["invoice_management:42"]).await;
    let blanket = token(&app.store, 1, &["invoice_management"]).await;

    for bearer in [&selective_count, &selective_42] {
        let (status, _, body) = send(&app.router, "GET", "/invoices/count", Some(bearer.as_str()), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "insufficient_scope");
    }

    let (status, _, body) = send(&app.router, "GET", "/invoices/count", Some(blanket.as_str()), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["operation"], "invoices.get_count");
    assert_eq!(body["resource_id"], Value::Null);
}

#[tokio::test]
async fn test_revoking_unknown_token_is_404() {
    let app = app(true).await;
    let admin = token(&app.store, 1, &["token_management"]).await;

    let (status, _, body) = send(&app.router, "DELETE", "/tokens/does-not-exist", Some(admin.as_str()), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
}

#[tokio::test]
async fn test_malformed_token_request_is_400() {
    let app = app(true).await;
    let admin = token(&app.store, 1, &["token_management"]).await;

    let request = Request::builder()
        .method("POST")
        .uri("/tokens")
        .header(header::AUTHORIZATION, format!("Bearer {}", admin))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Without a credential the gate answers first
    let (status, _, _) = send(&app.router, "POST", "/tokens", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_disabled_enforcement_cannot_issue_tokens() {
    let app = app(false).await;

    let (status, _, body) = send(
        &app.router,
        "POST",
        "/tokens",
        None,
        Some(serde_json::json!({ "permissions": ["store_management"] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");
    assert_eq!(app.store.credential_count().await, 0);
}
