use crate::cli::ServeArgs;
use crate::infra::{seed_default_user, AppState, InMemoryCoachRepository, InMemoryIdentity};
use crate::routes::with_coach_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use credit_coach::coach::{CoachService, UserId};
use credit_coach::config::AppConfig;
use credit_coach::error::AppError;
use credit_coach::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{info, warn};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let default_subject = UserId(config.identity.default_user_id.clone());
    let repository = Arc::new(InMemoryCoachRepository::default());
    if let Err(err) = seed_default_user(repository.as_ref(), &default_subject) {
        warn!(error = %err, "unable to seed default user");
    }
    let identity = Arc::new(InMemoryIdentity::from_config(&config.identity));
    let coach_service = Arc::new(CoachService::new(repository, identity, default_subject));

    let app = with_coach_routes(coach_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "credit coach api ready");

    axum::serve(listener, app).await?;
    Ok(())
}
