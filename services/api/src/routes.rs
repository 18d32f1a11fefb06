use crate::infra::{AppState, InMemoryProgramCatalog, PortalApplications, PortalCapacity};
use admissions::applications::application_router;
use admissions::auth::{auth_middleware, AuthConfig};
use admissions::capacity::capacity_router;
use admissions::catalog::catalog_router;
use admissions::notifications::{notification_router, NotificationHub};
use axum::http::{header, StatusCode};
use axum::middleware::from_fn_with_state;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Extension, Json, Router};
use serde_json::json;
use std::sync::Arc;

/// Shared services behind the portal API.
#[derive(Clone)]
pub(crate) struct PortalServices {
    pub(crate) catalog: Arc<InMemoryProgramCatalog>,
    pub(crate) capacity: Arc<PortalCapacity>,
    pub(crate) applications: Arc<PortalApplications>,
    pub(crate) notifications: Arc<NotificationHub>,
}

/// Probes stay public; everything under `/api/v1` passes the bearer-token check.
pub(crate) fn portal_router(services: PortalServices, auth: AuthConfig) -> Router {
    let protected = Router::new()
        .merge(catalog_router(services.catalog))
        .merge(capacity_router(services.capacity))
        .merge(application_router(services.applications))
        .merge(notification_router(services.notifications))
        .layer(from_fn_with_state(auth, auth_middleware));

    Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .merge(protected)
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
