use crate::catalog::ProgramId;

use super::domain::{Application, ApplicationId, ApplicationStatus};

/// Storage abstraction for application rows.
pub trait ApplicationRepository: Send + Sync {
    /// Unconditional insert, used for imports and seeding.
    fn insert(&self, record: Application) -> Result<Application, RepositoryError>;

    /// Inserts `record` only if its program currently has fewer than `limit`
    /// seat-holding applications and the applicant does not already hold a
    /// seat in that program. The count and the insert must be atomic with
    /// respect to other calls.
    fn insert_within_limit(
        &self,
        record: Application,
        limit: u32,
    ) -> Result<Application, RepositoryError>;

    /// Replaces the stored row only while its status is still `expected`,
    /// checked and written atomically. `Conflict` when another writer moved
    /// the row first.
    fn update_if_status(
        &self,
        record: Application,
        expected: ApplicationStatus,
    ) -> Result<(), RepositoryError>;

    fn fetch(&self, id: &ApplicationId) -> Result<Option<Application>, RepositoryError>;
    fn by_applicant(&self, applicant_id: &str) -> Result<Vec<Application>, RepositoryError>;

    /// Number of applications for `program_id` whose status is in `statuses`.
    fn count_by_program(
        &self,
        program_id: ProgramId,
        statuses: &[ApplicationStatus],
    ) -> Result<u32, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("program has no remaining seats")]
    LimitReached,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
