use admissions::applications::ApplicationService;
use admissions::capacity::CapacityService;
use admissions::notifications::NotificationHub;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

pub(crate) use admissions::memory::{
    InMemoryApplicationRepository, InMemoryCapacityLimitStore, InMemoryProgramCatalog,
};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) type PortalCapacity = CapacityService<
    InMemoryProgramCatalog,
    InMemoryApplicationRepository,
    InMemoryCapacityLimitStore,
>;

pub(crate) type PortalApplications = ApplicationService<
    InMemoryProgramCatalog,
    InMemoryApplicationRepository,
    InMemoryCapacityLimitStore,
    NotificationHub,
>;
