use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, patch, post},
    Router,
};
use serde_json::json;
use tracing::error;

use super::domain::{
    ComparisonQuery, CreditScoreSubmission, LoanStatusUpdate, LoanSubmission, OnboardingRequest,
    PlaygroundRequest, ProfileUpdate, SimulateRequest, UserId,
};
use super::identity::IdentityResolver;
use super::repository::{CoachRepository, RepositoryError};
use super::service::{CoachService, CoachServiceError};
use crate::scoring::ChiInputs;

type SharedService<R, I> = State<Arc<CoachService<R, I>>>;

/// Router builder exposing the coach endpoints under `/api`.
pub fn coach_router<R, I>(service: Arc<CoachService<R, I>>) -> Router
where
    R: CoachRepository + 'static,
    I: IdentityResolver + 'static,
{
    Router::new()
        .route("/api/chi/current", get(current_chi_handler::<R, I>))
        .route("/api/chi/calculate", post(calculate_chi_handler::<R, I>))
        .route("/api/risk-alerts", get(risk_alerts_handler::<R, I>))
        .route(
            "/api/risk-alerts/generate",
            post(risk_alerts_handler::<R, I>),
        )
        .route(
            "/api/risk-alerts/:alert_id",
            get(risk_alert_handler::<R, I>),
        )
        .route(
            "/api/loans/playground/calculate",
            post(playground_handler::<R, I>),
        )
        .route("/api/loans/comparison", get(comparison_handler::<R, I>))
        .route(
            "/api/loans/simulator/actions",
            get(simulation_actions_handler::<R, I>),
        )
        .route(
            "/api/loans/simulator/simulate",
            post(simulate_handler::<R, I>),
        )
        .route(
            "/api/loans",
            get(loans_handler::<R, I>).post(create_loan_handler::<R, I>),
        )
        .route("/api/loans/:loan_id", patch(update_loan_handler::<R, I>))
        .route("/api/credit-scores", post(add_score_handler::<R, I>))
        .route(
            "/api/credit-scores/history",
            get(score_history_handler::<R, I>),
        )
        .route(
            "/api/credit-scores/current",
            get(current_score_handler::<R, I>),
        )
        .route(
            "/api/profiles/me",
            get(profile_handler::<R, I>).put(update_profile_handler::<R, I>),
        )
        .route(
            "/api/profiles/onboarding",
            post(onboarding_handler::<R, I>),
        )
        .route("/api/users/me", delete(delete_account_handler::<R, I>))
        .with_state(service)
}

fn subject<R, I>(service: &CoachService<R, I>, headers: &HeaderMap) -> UserId
where
    R: CoachRepository + 'static,
    I: IdentityResolver + 'static,
{
    let authorization = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok());
    service.subject(authorization)
}

fn respond<T>(status: StatusCode, result: Result<T, CoachServiceError>) -> Response
where
    T: serde::Serialize,
{
    match result {
        Ok(body) => (status, axum::Json(body)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) fn error_response(err: CoachServiceError) -> Response {
    let status = match &err {
        CoachServiceError::Validation(_) => StatusCode::BAD_REQUEST,
        CoachServiceError::Simulation(_)
        | CoachServiceError::NotFound(_)
        | CoachServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        CoachServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        CoachServiceError::Repository(RepositoryError::Unavailable(_)) => {
            error!(error = %err, "record store unavailable");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    let payload = json!({ "detail": err.to_string() });
    (status, axum::Json(payload)).into_response()
}

pub(crate) async fn current_chi_handler<R, I>(
    State(service): SharedService<R, I>,
    headers: HeaderMap,
) -> Response
where
    R: CoachRepository + 'static,
    I: IdentityResolver + 'static,
{
    let user = subject(&service, &headers);
    (StatusCode::OK, axum::Json(service.current_chi(&user))).into_response()
}

pub(crate) async fn calculate_chi_handler<R, I>(
    State(service): SharedService<R, I>,
    axum::Json(inputs): axum::Json<ChiInputs>,
) -> Response
where
    R: CoachRepository + 'static,
    I: IdentityResolver + 'static,
{
    respond(StatusCode::OK, service.calculate_chi(inputs))
}

pub(crate) async fn risk_alerts_handler<R, I>(
    State(service): SharedService<R, I>,
    headers: HeaderMap,
) -> Response
where
    R: CoachRepository + 'static,
    I: IdentityResolver + 'static,
{
    let user = subject(&service, &headers);
    respond(StatusCode::OK, service.risk_alerts(&user))
}

pub(crate) async fn risk_alert_handler<R, I>(
    State(service): SharedService<R, I>,
    headers: HeaderMap,
    Path(alert_id): Path<String>,
) -> Response
where
    R: CoachRepository + 'static,
    I: IdentityResolver + 'static,
{
    let user = subject(&service, &headers);
    respond(StatusCode::OK, service.risk_alert(&user, &alert_id))
}

pub(crate) async fn playground_handler<R, I>(
    State(service): SharedService<R, I>,
    headers: HeaderMap,
    axum::Json(request): axum::Json<PlaygroundRequest>,
) -> Response
where
    R: CoachRepository + 'static,
    I: IdentityResolver + 'static,
{
    let user = subject(&service, &headers);
    respond(StatusCode::OK, service.playground(&user, request))
}

pub(crate) async fn comparison_handler<R, I>(
    State(service): SharedService<R, I>,
    headers: HeaderMap,
    Query(query): Query<ComparisonQuery>,
) -> Response
where
    R: CoachRepository + 'static,
    I: IdentityResolver + 'static,
{
    let user = subject(&service, &headers);
    (StatusCode::OK, axum::Json(service.compare(&user, query))).into_response()
}

pub(crate) async fn simulation_actions_handler<R, I>(
    State(service): SharedService<R, I>,
) -> Response
where
    R: CoachRepository + 'static,
    I: IdentityResolver + 'static,
{
    (StatusCode::OK, axum::Json(service.simulation_actions())).into_response()
}

pub(crate) async fn simulate_handler<R, I>(
    State(service): SharedService<R, I>,
    headers: HeaderMap,
    axum::Json(request): axum::Json<SimulateRequest>,
) -> Response
where
    R: CoachRepository + 'static,
    I: IdentityResolver + 'static,
{
    let user = subject(&service, &headers);
    respond(StatusCode::OK, service.simulate(&user, request))
}

pub(crate) async fn loans_handler<R, I>(
    State(service): SharedService<R, I>,
    headers: HeaderMap,
) -> Response
where
    R: CoachRepository + 'static,
    I: IdentityResolver + 'static,
{
    let user = subject(&service, &headers);
    respond(StatusCode::OK, service.loans(&user))
}

pub(crate) async fn create_loan_handler<R, I>(
    State(service): SharedService<R, I>,
    headers: HeaderMap,
    axum::Json(submission): axum::Json<LoanSubmission>,
) -> Response
where
    R: CoachRepository + 'static,
    I: IdentityResolver + 'static,
{
    let user = subject(&service, &headers);
    respond(StatusCode::CREATED, service.create_loan(&user, submission))
}

pub(crate) async fn update_loan_handler<R, I>(
    State(service): SharedService<R, I>,
    headers: HeaderMap,
    Path(loan_id): Path<String>,
    axum::Json(update): axum::Json<LoanStatusUpdate>,
) -> Response
where
    R: CoachRepository + 'static,
    I: IdentityResolver + 'static,
{
    let user = subject(&service, &headers);
    respond(
        StatusCode::OK,
        service.update_loan_status(&user, &loan_id, update.status),
    )
}

pub(crate) async fn score_history_handler<R, I>(
    State(service): SharedService<R, I>,
    headers: HeaderMap,
) -> Response
where
    R: CoachRepository + 'static,
    I: IdentityResolver + 'static,
{
    let user = subject(&service, &headers);
    respond(StatusCode::OK, service.score_history(&user))
}

pub(crate) async fn current_score_handler<R, I>(
    State(service): SharedService<R, I>,
    headers: HeaderMap,
) -> Response
where
    R: CoachRepository + 'static,
    I: IdentityResolver + 'static,
{
    let user = subject(&service, &headers);
    respond(StatusCode::OK, service.current_score(&user))
}

pub(crate) async fn add_score_handler<R, I>(
    State(service): SharedService<R, I>,
    headers: HeaderMap,
    axum::Json(submission): axum::Json<CreditScoreSubmission>,
) -> Response
where
    R: CoachRepository + 'static,
    I: IdentityResolver + 'static,
{
    let user = subject(&service, &headers);
    respond(StatusCode::CREATED, service.add_score(&user, submission))
}

pub(crate) async fn profile_handler<R, I>(
    State(service): SharedService<R, I>,
    headers: HeaderMap,
) -> Response
where
    R: CoachRepository + 'static,
    I: IdentityResolver + 'static,
{
    let user = subject(&service, &headers);
    respond(StatusCode::OK, service.profile(&user))
}

pub(crate) async fn update_profile_handler<R, I>(
    State(service): SharedService<R, I>,
    headers: HeaderMap,
    axum::Json(update): axum::Json<ProfileUpdate>,
) -> Response
where
    R: CoachRepository + 'static,
    I: IdentityResolver + 'static,
{
    let user = subject(&service, &headers);
    respond(StatusCode::OK, service.update_profile(&user, update))
}

pub(crate) async fn onboarding_handler<R, I>(
    State(service): SharedService<R, I>,
    headers: HeaderMap,
    axum::Json(request): axum::Json<OnboardingRequest>,
) -> Response
where
    R: CoachRepository + 'static,
    I: IdentityResolver + 'static,
{
    let user = subject(&service, &headers);
    respond(StatusCode::OK, service.onboard(&user, request))
}

pub(crate) async fn delete_account_handler<R, I>(
    State(service): SharedService<R, I>,
    headers: HeaderMap,
) -> Response
where
    R: CoachRepository + 'static,
    I: IdentityResolver + 'static,
{
    let user = subject(&service, &headers);
    respond(
        StatusCode::OK,
        service
            .delete_account(&user)
            .map(|()| json!({ "message": "Account deleted successfully" })),
    )
}
