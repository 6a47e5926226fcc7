use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use credit_coach::coach::{coach_router, CoachRepository, CoachService, IdentityResolver};
use serde_json::json;
use std::sync::Arc;

pub(crate) fn with_coach_routes<R, I>(service: Arc<CoachService<R, I>>) -> axum::Router
where
    R: CoachRepository + 'static,
    I: IdentityResolver + 'static,
{
    coach_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route("/api", axum::routing::get(api_index))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn api_index() -> Json<serde_json::Value> {
    Json(json!({
        "name": "credit-coach",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "chi": "/api/chi",
            "risk_alerts": "/api/risk-alerts",
            "loans": "/api/loans",
            "credit_scores": "/api/credit-scores",
            "profiles": "/api/profiles",
            "users": "/api/users",
        }
    }))
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
