//! REST API handlers.
//!
//! Each handler turns a request into an intent, runs it through the
//! lifecycle manager and returns a JSON `ApiResponse`.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use tracing::{error, info};

use waf_core::{DeletionIntent, DeploymentIntent, extra_bundle_name, main_bundle_name};
use waf_manager::ManagerError;
use waf_store::StoreError;

use crate::ApiState;

/// Response wrapper for consistent API format.
#[derive(serde::Serialize)]
struct ApiResponse<T: serde::Serialize> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T: serde::Serialize> ApiResponse<T> {
    fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data: Some(data),
            error: None,
        })
    }
}

fn error_response(msg: &str, status: StatusCode) -> impl IntoResponse {
    (
        status,
        Json(ApiResponse::<()> {
            success: false,
            data: None,
            error: Some(msg.to_string()),
        }),
    )
}

/// Status code for a failed deploy/delete.
pub fn status_for(err: &ManagerError) -> StatusCode {
    match err.store_error() {
        StoreError::AlreadyExists { .. } => StatusCode::CONFLICT,
        StoreError::NotFound { .. } => StatusCode::NOT_FOUND,
        StoreError::Invalid(_) => StatusCode::UNPROCESSABLE_ENTITY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn manager_error_response(err: ManagerError) -> axum::response::Response {
    let status = status_for(&err);
    if status.is_server_error() {
        error!(step = %err.step(), error = %err, "request failed");
    }
    error_response(&err.to_string(), status).into_response()
}

/// What a successful deploy/delete reports back.
#[derive(Debug, serde::Serialize, serde::Deserialize, PartialEq)]
pub struct DeploymentSummary {
    pub name: String,
    pub namespace: String,
    /// Object names in creation order.
    pub resources: Vec<String>,
}

impl DeploymentSummary {
    fn new(name: &str, namespace: &str) -> Self {
        Self {
            name: name.to_string(),
            namespace: namespace.to_string(),
            resources: vec![extra_bundle_name(name), main_bundle_name(name), name.to_string()],
        }
    }
}

// ── Deploy ─────────────────────────────────────────────────────

/// POST /deploy, POST /api/v1/deployments
pub async fn deploy(
    State(state): State<ApiState>,
    Json(intent): Json<DeploymentIntent>,
) -> impl IntoResponse {
    if intent.name.is_empty() {
        return error_response("name is required", StatusCode::BAD_REQUEST).into_response();
    }
    match state.manager.deploy(&intent).await {
        Ok(()) => {
            info!(namespace = %intent.namespace, name = %intent.name, "created nginx resource");
            let summary = DeploymentSummary::new(&intent.name, &intent.namespace);
            (StatusCode::CREATED, ApiResponse::ok(summary)).into_response()
        }
        Err(e) => manager_error_response(e),
    }
}

// ── Delete ─────────────────────────────────────────────────────

/// DELETE /delete
pub async fn delete(
    State(state): State<ApiState>,
    Json(intent): Json<DeletionIntent>,
) -> impl IntoResponse {
    run_delete(&state, intent).await
}

/// DELETE /api/v1/deployments/{namespace}/{name}
pub async fn delete_by_path(
    State(state): State<ApiState>,
    Path((namespace, name)): Path<(String, String)>,
) -> impl IntoResponse {
    run_delete(&state, DeletionIntent::new(name, namespace)).await
}

async fn run_delete(state: &ApiState, intent: DeletionIntent) -> axum::response::Response {
    if intent.name.is_empty() {
        return error_response("name is required", StatusCode::BAD_REQUEST).into_response();
    }
    match state.manager.delete(&intent).await {
        Ok(()) => {
            info!(namespace = %intent.namespace, name = %intent.name, "deleted nginx resource");
            ApiResponse::ok(DeploymentSummary::new(&intent.name, &intent.namespace)).into_response()
        }
        Err(e) => manager_error_response(e),
    }
}

// ── Health ─────────────────────────────────────────────────────

/// GET /healthz
pub async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}
