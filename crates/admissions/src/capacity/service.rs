use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, info};

use super::domain::{DepartmentCapacity, ProgramCapacity};
use super::policy::{apportion, CapacityLimitPolicy};
use super::store::{CapacityLimitStore, LimitStoreError};
use crate::applications::{
    Application, ApplicationRepository, RepositoryError, SEAT_HOLDING_STATUSES,
};
use crate::catalog::{CatalogError, Program, ProgramCatalog, ProgramId};

/// Composes the catalog, application counts, and limits into capacity figures.
/// Every call reads fresh data. `limit_writes` keeps a limit update from
/// landing between a reservation's limit lookup and its insert.
pub struct CapacityService<C, R, L> {
    catalog: Arc<C>,
    applications: Arc<R>,
    limits: Arc<L>,
    policy: CapacityLimitPolicy,
    limit_writes: RwLock<()>,
}

impl<C, R, L> CapacityService<C, R, L>
where
    C: ProgramCatalog + 'static,
    R: ApplicationRepository + 'static,
    L: CapacityLimitStore + 'static,
{
    pub fn new(
        catalog: Arc<C>,
        applications: Arc<R>,
        limits: Arc<L>,
        policy: CapacityLimitPolicy,
    ) -> Self {
        Self {
            catalog,
            applications,
            limits,
            policy,
            limit_writes: RwLock::new(()),
        }
    }

    pub fn policy(&self) -> &CapacityLimitPolicy {
        &self.policy
    }

    /// One summary per distinct department, sorted by name. Any failing
    /// sub-query fails the whole call.
    pub fn department_capacities(&self) -> Result<Vec<DepartmentCapacity>, CapacityError> {
        let departments = self.catalog.departments()?;
        let mut summaries = Vec::with_capacity(departments.len());
        for department in departments {
            let programs = self.catalog.by_department(&department)?;
            summaries.push(self.summarize(department, &programs)?);
        }
        Ok(summaries)
    }

    pub fn department_capacity(
        &self,
        department: &str,
    ) -> Result<DepartmentCapacity, CapacityError> {
        let programs = self.department_programs(department)?;
        self.summarize(canonical_name(&programs, department), &programs)
    }

    pub fn program_capacities(
        &self,
        department: &str,
    ) -> Result<Vec<ProgramCapacity>, CapacityError> {
        let programs = self.department_programs(department)?;
        programs
            .iter()
            .map(|program| self.program_capacity(program))
            .collect()
    }

    /// Splits `total_capacity` across the department's programs in proportion
    /// to their policy limits and persists the resulting per-program limits.
    pub fn update_department_capacity(
        &self,
        department: &str,
        total_capacity: i64,
    ) -> Result<DepartmentCapacity, CapacityError> {
        let total = u32::try_from(total_capacity).map_err(|_| {
            CapacityError::Validation(format!(
                "total capacity must be between 0 and {}, got {total_capacity}",
                u32::MAX
            ))
        })?;

        let programs = self.department_programs(department)?;
        let weights: Vec<(ProgramId, u32)> = programs
            .iter()
            .map(|program| (program.id, self.policy.limit_for(&program.certification_type)))
            .collect();
        let limits = apportion(total, &weights);
        {
            let _writing = self.write_limits()?;
            self.limits.set_limits(&limits)?;
        }

        let name = canonical_name(&programs, department);
        info!(
            department = %name,
            total_capacity = total,
            programs = limits.len(),
            "department capacity updated"
        );
        self.summarize(name, &programs)
    }

    pub fn check_program_availability(
        &self,
        program_id: ProgramId,
    ) -> Result<bool, CapacityError> {
        let program = self.program(program_id)?;
        Ok(self.program_capacity(&program)?.has_remaining_slots())
    }

    /// Atomically claims a seat by inserting `record` only while its program
    /// is below capacity. Concurrent claims for the last seat cannot both
    /// succeed.
    pub fn reserve_slot(&self, record: Application) -> Result<Application, CapacityError> {
        let program = self.program(record.program_id)?;
        let _reading = self.read_limits()?;
        let capacity = self.capacity_of(&program)?;

        match self.applications.insert_within_limit(record, capacity) {
            Ok(stored) => {
                debug!(
                    program_id = %program.id,
                    application_id = %stored.id.0,
                    capacity,
                    "seat reserved"
                );
                Ok(stored)
            }
            Err(RepositoryError::LimitReached) => Err(CapacityError::CapacityExceeded {
                program_id: program.id,
            }),
            Err(RepositoryError::Conflict) => Err(CapacityError::DuplicateReservation {
                program_id: program.id,
            }),
            Err(other) => Err(other.into()),
        }
    }

    fn read_limits(&self) -> Result<RwLockReadGuard<'_, ()>, CapacityError> {
        self.limit_writes.read().map_err(|_| limit_lock_poisoned())
    }

    fn write_limits(&self) -> Result<RwLockWriteGuard<'_, ()>, CapacityError> {
        self.limit_writes.write().map_err(|_| limit_lock_poisoned())
    }

    fn program(&self, program_id: ProgramId) -> Result<Program, CapacityError> {
        self.catalog
            .fetch(program_id)?
            .ok_or(CapacityError::ProgramNotFound(program_id))
    }

    fn department_programs(&self, department: &str) -> Result<Vec<Program>, CapacityError> {
        let programs = self.catalog.by_department(department)?;
        if programs.is_empty() {
            return Err(CapacityError::DepartmentNotFound(department.to_string()));
        }
        Ok(programs)
    }

    fn capacity_of(&self, program: &Program) -> Result<u32, CapacityError> {
        Ok(match self.limits.limit_for(program.id)? {
            Some(limit) => limit,
            None => self.policy.limit_for(&program.certification_type),
        })
    }

    fn program_capacity(&self, program: &Program) -> Result<ProgramCapacity, CapacityError> {
        let capacity = self.capacity_of(program)?;
        let current = self
            .applications
            .count_by_program(program.id, &SEAT_HOLDING_STATUSES)?;
        Ok(ProgramCapacity::new(program, capacity, current))
    }

    fn summarize(
        &self,
        department: String,
        programs: &[Program],
    ) -> Result<DepartmentCapacity, CapacityError> {
        let programs = programs
            .iter()
            .map(|program| self.program_capacity(program))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(DepartmentCapacity::from_programs(department, programs))
    }
}

fn limit_lock_poisoned() -> CapacityError {
    LimitStoreError::Unavailable("capacity limit lock poisoned".to_string()).into()
}

fn canonical_name(programs: &[Program], requested: &str) -> String {
    programs
        .first()
        .map(|program| program.department.trim().to_string())
        .unwrap_or_else(|| requested.trim().to_string())
}

/// Error raised by the capacity aggregator.
#[derive(Debug, thiserror::Error)]
pub enum CapacityError {
    #[error("department '{0}' has no programs")]
    DepartmentNotFound(String),
    #[error("program {0} not found")]
    ProgramNotFound(ProgramId),
    #[error("invalid capacity: {0}")]
    Validation(String),
    #[error("program {program_id} has no remaining slots")]
    CapacityExceeded { program_id: ProgramId },
    #[error("applicant already holds a seat in program {program_id}")]
    DuplicateReservation { program_id: ProgramId },
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    LimitStore(#[from] LimitStoreError),
}

impl CapacityError {
    /// Data-layer failures, reported to clients only as a generic message.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            CapacityError::Catalog(_) | CapacityError::Repository(_) | CapacityError::LimitStore(_)
        )
    }
}
