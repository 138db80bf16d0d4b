//! HTTP boundary
//!
//! Extracts the bearer credential and `model_id` path segment, runs the gate
//! for the declared operation, and maps the error taxonomy to statuses:
//!
//! - `Authentication` → 401 with `WWW-Authenticate`
//! - `Authorization` → 403 with `WWW-Authenticate`
//! - `InvalidInput` → 400
//! - everything else → 500

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, HeaderMap, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{error, info, Level};

use crate::credential::issue_credential;
use crate::error::{AuthzError, Result};
use crate::gate::{AuthorizationGate, GateOutcome};
use crate::operations::{operation_id, AuthMode, OperationTable};
use crate::store::CredentialStore;
use crate::types::{NewCredential, PrincipalId};

/// Error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl IntoResponse for AuthzError {
    fn into_response(self) -> Response {
        let (status, error) = match &self {
            AuthzError::Authentication { .. } => (StatusCode::UNAUTHORIZED, "invalid_credentials"),
            AuthzError::Authorization { reason, .. } => (StatusCode::FORBIDDEN, reason.as_str()),
            AuthzError::InvalidInput(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            AuthzError::Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, "storage_error"),
            AuthzError::CredentialCollision => {
                (StatusCode::INTERNAL_SERVER_ERROR, "credential_collision")
            }
            AuthzError::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        };

        if status.is_server_error() {
            error!("Request failed: {}", self);
        }

        let challenge = self
            .challenge()
            .and_then(|value| HeaderValue::from_str(value).ok());

        let body = Json(ErrorResponse {
            error: error.to_string(),
            message: self.to_string(),
        });

        let mut response = (status, body).into_response();
        if let Some(value) = challenge {
            response.headers_mut().insert(header::WWW_AUTHENTICATE, value);
        }
        response
    }
}

/// Bearer credential from the `Authorization` header
///
/// The scheme is matched case-insensitively; anything else yields `None`.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return None;
    }
    Some(token)
}

/// Resource id from the `model_id` path segment, `None` when empty
pub fn resource_id(model_id: &str) -> Option<&str> {
    Some(model_id).filter(|id| !id.is_empty())
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub gate: AuthorizationGate,
    pub operations: Arc<OperationTable>,
    pub store: Arc<dyn CredentialStore>,
}

impl AppState {
    pub fn new(gate: AuthorizationGate, operations: OperationTable, store: Arc<dyn CredentialStore>) -> Self {
        Self {
            gate,
            operations: Arc::new(operations),
            store,
        }
    }

    /// Run the gate for a declared operation
    ///
    /// Returns `Ok(None)` for operations missing from the table.
    pub async fn authorize_operation(
        &self,
        headers: &HeaderMap,
        operation: &str,
        resource_id: Option<&str>,
        return_credential: bool,
    ) -> Result<Option<GateOutcome>> {
        let Some(spec) = self.operations.get(operation) else {
            return Ok(None);
        };

        let presented = bearer_token(headers);
        let outcome = match spec.auth {
            AuthMode::Open => GateOutcome::Anonymous,
            AuthMode::Optional => {
                self.gate
                    .authorize_optional(presented, &spec.scopes, resource_id, return_credential)
                    .await?
            }
            AuthMode::Required => {
                self.gate
                    .authorize(presented, &spec.scopes, resource_id, return_credential)
                    .await?
            }
        };
        Ok(Some(outcome))
    }
}

/// Result of a gated resource operation
#[derive(Debug, Serialize, Deserialize)]
pub struct OperationResponse {
    pub operation: String,
    pub resource_id: Option<String>,
    pub principal_id: Option<PrincipalId>,
}

/// Token creation body
#[derive(Debug, Default, Deserialize)]
pub struct CreateTokenRequest {
    #[serde(default)]
    pub app_id: String,
    #[serde(default)]
    pub redirect_url: String,
    #[serde(default)]
    pub permissions: HashSet<String>,
}

/// Token creation response; the only time the id is returned
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateTokenResponse {
    pub id: String,
    pub user_id: Option<PrincipalId>,
    pub permissions: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RevokeTokenResponse {
    pub revoked: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ServicesResponse {
    /// Whether superuser-only entries are included
    pub full: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

fn crud_method(method: &Method, model_id: Option<&str>) -> Option<&'static str> {
    match (method.as_str(), model_id) {
        ("GET", None) => Some("get_all"),
        ("POST", None) => Some("post"),
        ("GET", Some("count")) => Some("get_count"),
        ("GET", Some(_)) => Some("get_one"),
        ("PATCH", Some(_)) => Some("patch"),
        ("PUT", Some(_)) => Some("put"),
        ("DELETE", Some(_)) => Some("delete"),
        _ => None,
    }
}

/// Gate a table-driven operation, `None` when it is not declared
async fn gate_operation(
    state: &AppState,
    headers: &HeaderMap,
    operation: &str,
    resource_id: Option<&str>,
) -> Result<Option<GateOutcome>> {
    state
        .authorize_operation(headers, operation, resource_id, false)
        .await
}

async fn gated_operation(
    state: &AppState,
    headers: &HeaderMap,
    resource: &str,
    method: &Method,
    model_id: Option<&str>,
) -> Result<Response> {
    let Some(crud) = crud_method(method, model_id) else {
        return Ok(StatusCode::METHOD_NOT_ALLOWED.into_response());
    };
    let operation = operation_id(resource, crud);
    // `/:resource/count` addresses the collection, not an instance
    let resource_id = match crud {
        "get_count" => None,
        _ => model_id.and_then(resource_id),
    };

    let Some(outcome) = gate_operation(state, headers, &operation, resource_id).await? else {
        return Ok(StatusCode::NOT_FOUND.into_response());
    };

    info!("Operation {} permitted (resource={:?})", operation, resource_id);
    Ok(Json(OperationResponse {
        operation,
        resource_id: resource_id.map(str::to_string),
        principal_id: outcome.principal().map(|p| p.id),
    })
    .into_response())
}

/// `GET|POST /:resource`
async fn collection(
    State(state): State<AppState>,
    method: Method,
    headers: HeaderMap,
    Path(resource): Path<String>,
    body: Bytes,
) -> Result<Response> {
    if resource == "tokens" && method == Method::POST {
        return create_token(&state, &headers, &body).await;
    }
    gated_operation(&state, &headers, &resource, &method, None).await
}

/// `GET|PATCH|PUT|DELETE /:resource/:model_id`
///
/// A handful of fixed paths under a collection are operations of their own
/// and are dispatched before the CRUD mapping.
async fn item(
    State(state): State<AppState>,
    method: Method,
    headers: HeaderMap,
    Path((resource, model_id)): Path<(String, String)>,
) -> Result<Response> {
    match (resource.as_str(), model_id.as_str()) {
        ("users", "me") if method == Method::GET => me(&state, &headers).await,
        ("users", "stats") if method == Method::GET => stats(&state, &headers).await,
        ("tor", "services") if method == Method::GET => services(&state, &headers).await,
        ("tokens", id) if method == Method::DELETE => {
            revoke_token(&state, &headers, id).await
        }
        _ => gated_operation(&state, &headers, &resource, &method, Some(&model_id)).await,
    }
}

/// `GET /users/me`
async fn me(state: &AppState, headers: &HeaderMap) -> Result<Response> {
    let outcome = gate_operation(state, headers, "users.me", None)
        .await?
        .unwrap_or(GateOutcome::Anonymous);
    Ok(Json(outcome.principal().cloned()).into_response())
}

/// `GET /users/stats`
async fn stats(state: &AppState, headers: &HeaderMap) -> Result<Response> {
    let outcome = gate_operation(state, headers, "users.stats", None)
        .await?
        .unwrap_or(GateOutcome::Anonymous);
    Ok(Json(OperationResponse {
        operation: "users.stats".to_string(),
        resource_id: None,
        principal_id: outcome.principal().map(|p| p.id),
    })
    .into_response())
}

/// `POST /tokens`
///
/// The body is read only after the gate has passed, so a missing credential is
/// reported as 401 whatever was sent.
async fn create_token(state: &AppState, headers: &HeaderMap, body: &[u8]) -> Result<Response> {
    let outcome = gate_operation(state, headers, "tokens.post", None)
        .await?
        .unwrap_or(GateOutcome::Anonymous);

    let owner = outcome
        .principal()
        .ok_or_else(|| AuthzError::InvalidInput("Credential owner required".to_string()))?;

    let body: CreateTokenRequest = if body.is_empty() {
        CreateTokenRequest::default()
    } else {
        serde_json::from_slice(body)
            .map_err(|e| AuthzError::InvalidInput(format!("Invalid token request: {}", e)))?
    };

    let request = NewCredential {
        owner_id: owner.id,
        app_id: body.app_id,
        redirect_url: body.redirect_url,
        permissions: body.permissions,
    };
    let credential = issue_credential(state.store.as_ref(), request).await?;

    let mut permissions: Vec<String> = credential.permissions.into_iter().collect();
    permissions.sort();
    Ok((
        StatusCode::CREATED,
        Json(CreateTokenResponse {
            id: credential.id,
            user_id: credential.user_id,
            permissions,
        }),
    )
        .into_response())
}

/// `DELETE /tokens/:model_id`
async fn revoke_token(state: &AppState, headers: &HeaderMap, model_id: &str) -> Result<Response> {
    gate_operation(state, headers, "tokens.delete", resource_id(model_id)).await?;

    if !state.store.revoke_credential(model_id).await? {
        let body = Json(ErrorResponse {
            error: "not_found".to_string(),
            message: "Token not found".to_string(),
        });
        return Ok((StatusCode::NOT_FOUND, body).into_response());
    }
    Ok(Json(RevokeTokenResponse { revoked: true }).into_response())
}

/// `GET /tor/services`
async fn services(state: &AppState, headers: &HeaderMap) -> Result<Response> {
    let outcome = gate_operation(state, headers, "tor.services", None)
        .await?
        .unwrap_or(GateOutcome::Anonymous);
    Ok(Json(ServicesResponse {
        full: outcome.principal().is_some(),
    })
    .into_response())
}

/// `GET /health`
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: crate::VERSION.to_string(),
    })
}

/// Create the HTTP router with all endpoints
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let trace = TraceLayer::new_for_http()
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    Router::new()
        .route("/health", get(health))
        .route("/:resource", get(collection).post(collection))
        .route(
            "/:resource/:model_id",
            get(item).patch(item).put(item).delete(item),
        )
        .layer(ServiceBuilder::new().layer(trace).layer(cors))
        .with_state(state)
}
