//! In-memory fakes and fixtures shared by unit tests.

use std::sync::{Arc, Mutex, MutexGuard, OnceLock};

use axum::response::Response;
use chrono::Utc;
use serde_json::Value;

use crate::applications::{
    Application, ApplicationId, ApplicationRepository, ApplicationService, ApplicationStatus,
    RepositoryError,
};
use crate::capacity::{CapacityLimitPolicy, CapacityService};
use crate::catalog::{Program, ProgramCatalog, ProgramId};
pub(crate) use crate::memory::{
    InMemoryApplicationRepository, InMemoryCapacityLimitStore, InMemoryProgramCatalog,
};
use crate::notifications::{Notification, NotificationError, NotificationPublisher};

/// Serializes tests that read or write process environment variables.
pub(crate) fn env_lock() -> MutexGuard<'static, ()> {
    static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
    GUARD
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

pub(crate) fn program(id: u64, department: &str, certification_type: &str) -> Program {
    Program {
        id: ProgramId(id),
        name: format!("{department} {certification_type}"),
        department: department.to_string(),
        certification_type: certification_type.to_string(),
    }
}

/// Nursing (diploma + degree) and Engineering (certificate + unknown type).
pub(crate) fn sample_programs() -> Vec<Program> {
    vec![
        program(1, "Nursing", "Diploma"),
        program(2, "Nursing", "Degree"),
        program(3, "Engineering", "Certificate"),
        program(4, "Engineering", "Apprenticeship"),
    ]
}

pub(crate) fn application(id: &str, program_id: u64, status: ApplicationStatus) -> Application {
    let mut record = Application::pending(
        ApplicationId(id.to_string()),
        ProgramId(program_id),
        format!("applicant-{id}"),
        Utc::now(),
    );
    record.status = status;
    record
}

/// Seeds `count` applications with `status` against `program_id`.
pub(crate) fn seed(
    repository: &InMemoryApplicationRepository,
    program_id: u64,
    count: usize,
    status: ApplicationStatus,
) {
    for index in 0..count {
        let id = format!("seed-{program_id}-{}-{index}", status.label());
        repository
            .insert(application(&id, program_id, status))
            .expect("seed insert");
    }
}

pub(crate) fn catalog_with(programs: Vec<Program>) -> InMemoryProgramCatalog {
    let catalog = InMemoryProgramCatalog::default();
    for program in programs {
        catalog.insert(program).expect("unique program ids");
    }
    catalog
}

/// Repository whose every call fails, for the internal-error path.
pub(crate) struct UnavailableApplications;

impl ApplicationRepository for UnavailableApplications {
    fn insert(&self, _record: Application) -> Result<Application, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn insert_within_limit(
        &self,
        _record: Application,
        _limit: u32,
    ) -> Result<Application, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update_if_status(
        &self,
        _record: Application,
        _expected: ApplicationStatus,
    ) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &ApplicationId) -> Result<Option<Application>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn by_applicant(&self, _applicant_id: &str) -> Result<Vec<Application>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn count_by_program(
        &self,
        _program_id: ProgramId,
        _statuses: &[ApplicationStatus],
    ) -> Result<u32, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

#[derive(Default, Clone)]
pub(crate) struct MemoryNotifications {
    events: Arc<Mutex<Vec<Notification>>>,
}

impl MemoryNotifications {
    pub(crate) fn events(&self) -> Vec<Notification> {
        self.events.lock().expect("notification mutex poisoned").clone()
    }
}

impl NotificationPublisher for MemoryNotifications {
    fn publish(&self, notification: Notification) -> Result<(), NotificationError> {
        self.events
            .lock()
            .expect("notification mutex poisoned")
            .push(notification);
        Ok(())
    }
}

pub(crate) struct FailingNotifications;

impl NotificationPublisher for FailingNotifications {
    fn publish(&self, _notification: Notification) -> Result<(), NotificationError> {
        Err(NotificationError::Transport("smtp relay down".to_string()))
    }
}

pub(crate) type TestCapacity =
    CapacityService<InMemoryProgramCatalog, InMemoryApplicationRepository, InMemoryCapacityLimitStore>;

pub(crate) struct Fixture {
    pub(crate) catalog: Arc<InMemoryProgramCatalog>,
    pub(crate) applications: Arc<InMemoryApplicationRepository>,
    pub(crate) limits: Arc<InMemoryCapacityLimitStore>,
    pub(crate) capacity: Arc<TestCapacity>,
}

impl Fixture {
    pub(crate) fn new(programs: Vec<Program>) -> Self {
        let catalog = Arc::new(catalog_with(programs));
        let applications = Arc::new(InMemoryApplicationRepository::default());
        let limits = Arc::new(InMemoryCapacityLimitStore::default());
        let capacity = Arc::new(CapacityService::new(
            catalog.clone(),
            applications.clone(),
            limits.clone(),
            CapacityLimitPolicy::standard(),
        ));
        Self {
            catalog,
            applications,
            limits,
            capacity,
        }
    }

    pub(crate) fn application_service<N>(
        &self,
        notifications: Arc<N>,
    ) -> ApplicationService<
        InMemoryProgramCatalog,
        InMemoryApplicationRepository,
        InMemoryCapacityLimitStore,
        N,
    >
    where
        N: NotificationPublisher + 'static,
    {
        ApplicationService::new(
            self.capacity.clone(),
            self.applications.clone(),
            notifications,
        )
    }
}

pub(crate) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
