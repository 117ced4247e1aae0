//! waf-api — REST API for the WAF manager.
//!
//! Decodes requests into intents, hands them to the
//! [`LifecycleManager`](waf_manager::LifecycleManager) and maps the outcome
//! onto a status code. Decode errors are answered by axum's extractors
//! before the manager is involved.
//!
//! # API Routes
//!
//! | Method | Path | Description |
//! |---|---|---|
//! | POST | `/deploy` | Deploy a protected proxy (JSON intent body) |
//! | DELETE | `/delete` | Delete a protected proxy (JSON `{name, namespace}` body) |
//! | POST | `/api/v1/deployments` | Same as `POST /deploy` |
//! | DELETE | `/api/v1/deployments/{namespace}/{name}` | Delete by path |
//! | GET | `/healthz` | Liveness |

pub mod handlers;

use axum::Router;
use axum::routing::{delete, get, post};
use waf_manager::LifecycleManager;

/// Shared state for API handlers.
#[derive(Clone)]
pub struct ApiState {
    pub manager: LifecycleManager,
}

/// Build the complete API router.
pub fn build_router(manager: LifecycleManager) -> Router {
    let state = ApiState { manager };

    let api_routes = Router::new()
        .route("/deployments", post(handlers::deploy))
        .route("/deployments/{namespace}/{name}", delete(handlers::delete_by_path))
        .with_state(state.clone());

    Router::new()
        .route("/deploy", post(handlers::deploy))
        .route("/delete", delete(handlers::delete))
        .route("/healthz", get(handlers::healthz))
        .with_state(state)
        .nest("/api/v1", api_routes)
}
