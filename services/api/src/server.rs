use crate::cli::ServeArgs;
use crate::infra::{
    AppState, InMemoryApplicationRepository, InMemoryCapacityLimitStore, InMemoryProgramCatalog,
};
use crate::routes::{portal_router, PortalServices};
use admissions::applications::ApplicationService;
use admissions::auth::AuthConfig;
use admissions::capacity::{CapacityLimitPolicy, CapacityService};
use admissions::catalog::{load_programs_from_path, ProgramCatalog};
use admissions::config::AppConfig;
use admissions::error::AppError;
use admissions::notifications::NotificationHub;
use admissions::telemetry;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::path::Path;
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
    if let Some(catalog) = args.catalog.take() {
        config.catalog.seed_path = Some(catalog);
    }

    telemetry::init(&config.telemetry)?;

    let auth = AuthConfig::from_secret(config.auth.secret.as_deref());
    if !auth.is_enabled() {
        warn!("APP_AUTH_SECRET is not set; every request is treated as super_admin");
    }

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let catalog = Arc::new(InMemoryProgramCatalog::default());
    if let Some(path) = config.catalog.seed_path.as_deref() {
        seed_catalog(catalog.as_ref(), path)?;
    }

    let repository = Arc::new(InMemoryApplicationRepository::default());
    let capacity = Arc::new(CapacityService::new(
        catalog.clone(),
        repository.clone(),
        Arc::new(InMemoryCapacityLimitStore::default()),
        CapacityLimitPolicy::standard(),
    ));
    let notifications = Arc::new(NotificationHub::default());
    let applications = Arc::new(ApplicationService::new(
        capacity.clone(),
        repository,
        notifications.clone(),
    ));

    let services = PortalServices {
        catalog,
        capacity,
        applications,
        notifications,
    };
    let app = portal_router(services, auth)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "admissions portal ready");

    axum::serve(listener, app).await?;
    Ok(())
}

fn seed_catalog(catalog: &InMemoryProgramCatalog, path: &Path) -> Result<(), AppError> {
    let programs = load_programs_from_path(path)?;
    let count = programs.len();
    for program in programs {
        catalog.insert(program)?;
    }
    info!(path = %path.display(), programs = count, "program catalog seeded");
    Ok(())
}
