//! Mutex-backed adapters for the catalog, application, and limit stores.
//! The service binary runs on these, and the unit and integration tests
//! share them so both exercise the same conflict and limit checks.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::applications::{
    Application, ApplicationId, ApplicationRepository, ApplicationStatus, RepositoryError,
};
use crate::capacity::{CapacityLimitStore, LimitStoreError};
use crate::catalog::{CatalogError, Program, ProgramCatalog, ProgramId};

fn lock<'a, T>(mutex: &'a Mutex<T>, what: &str) -> Result<MutexGuard<'a, T>, String> {
    mutex.lock().map_err(|_| format!("{what} mutex poisoned"))
}

#[derive(Default, Clone)]
pub struct InMemoryProgramCatalog {
    programs: Arc<Mutex<BTreeMap<ProgramId, Program>>>,
}

impl ProgramCatalog for InMemoryProgramCatalog {
    fn insert(&self, program: Program) -> Result<Program, CatalogError> {
        let mut guard = lock(&self.programs, "catalog").map_err(CatalogError::Unavailable)?;
        if guard.contains_key(&program.id) {
            return Err(CatalogError::Conflict);
        }
        guard.insert(program.id, program.clone());
        Ok(program)
    }

    fn fetch(&self, id: ProgramId) -> Result<Option<Program>, CatalogError> {
        let guard = lock(&self.programs, "catalog").map_err(CatalogError::Unavailable)?;
        Ok(guard.get(&id).cloned())
    }

    fn all(&self) -> Result<Vec<Program>, CatalogError> {
        let guard = lock(&self.programs, "catalog").map_err(CatalogError::Unavailable)?;
        Ok(guard.values().cloned().collect())
    }
}

#[derive(Default, Clone)]
pub struct InMemoryApplicationRepository {
    records: Arc<Mutex<HashMap<ApplicationId, Application>>>,
}

impl ApplicationRepository for InMemoryApplicationRepository {
    fn insert(&self, record: Application) -> Result<Application, RepositoryError> {
        let mut guard = lock(&self.records, "repository").map_err(RepositoryError::Unavailable)?;
        if guard.contains_key(&record.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn insert_within_limit(
        &self,
        record: Application,
        limit: u32,
    ) -> Result<Application, RepositoryError> {
        let mut guard = lock(&self.records, "repository").map_err(RepositoryError::Unavailable)?;
        if guard.contains_key(&record.id) {
            return Err(RepositoryError::Conflict);
        }

        let mut holding: u32 = 0;
        for existing in guard.values() {
            if existing.program_id != record.program_id || !existing.status.holds_seat() {
                continue;
            }
            if existing.applicant_id == record.applicant_id {
                return Err(RepositoryError::Conflict);
            }
            holding += 1;
        }
        if holding >= limit {
            return Err(RepositoryError::LimitReached);
        }

        guard.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn update_if_status(
        &self,
        record: Application,
        expected: ApplicationStatus,
    ) -> Result<(), RepositoryError> {
        let mut guard = lock(&self.records, "repository").map_err(RepositoryError::Unavailable)?;
        let stored = guard.get_mut(&record.id).ok_or(RepositoryError::NotFound)?;
        if stored.status != expected {
            return Err(RepositoryError::Conflict);
        }
        *stored = record;
        Ok(())
    }

    fn fetch(&self, id: &ApplicationId) -> Result<Option<Application>, RepositoryError> {
        let guard = lock(&self.records, "repository").map_err(RepositoryError::Unavailable)?;
        Ok(guard.get(id).cloned())
    }

    fn by_applicant(&self, applicant_id: &str) -> Result<Vec<Application>, RepositoryError> {
        let guard = lock(&self.records, "repository").map_err(RepositoryError::Unavailable)?;
        let mut records: Vec<Application> = guard
            .values()
            .filter(|record| record.applicant_id == applicant_id)
            .cloned()
            .collect();
        records.sort_by(|a, b| a.submitted_at.cmp(&b.submitted_at).then(a.id.cmp(&b.id)));
        Ok(records)
    }

    fn count_by_program(
        &self,
        program_id: ProgramId,
        statuses: &[ApplicationStatus],
    ) -> Result<u32, RepositoryError> {
        let guard = lock(&self.records, "repository").map_err(RepositoryError::Unavailable)?;
        let count = guard
            .values()
            .filter(|record| record.program_id == program_id && statuses.contains(&record.status))
            .count();
        u32::try_from(count)
            .map_err(|_| RepositoryError::Unavailable("application count overflow".to_string()))
    }
}

/// Per-program limit overrides written by department capacity updates.
#[derive(Default, Clone)]
pub struct InMemoryCapacityLimitStore {
    limits: Arc<Mutex<HashMap<ProgramId, u32>>>,
}

impl CapacityLimitStore for InMemoryCapacityLimitStore {
    fn limit_for(&self, program_id: ProgramId) -> Result<Option<u32>, LimitStoreError> {
        let guard = lock(&self.limits, "limit store").map_err(LimitStoreError::Unavailable)?;
        Ok(guard.get(&program_id).copied())
    }

    fn set_limits(&self, limits: &[(ProgramId, u32)]) -> Result<(), LimitStoreError> {
        let mut guard = lock(&self.limits, "limit store").map_err(LimitStoreError::Unavailable)?;
        guard.extend(limits.iter().copied());
        Ok(())
    }
}
