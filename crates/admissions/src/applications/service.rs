use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use super::domain::{Application, ApplicationId, ApplicationStatus, ReviewDecision};
use super::repository::{ApplicationRepository, RepositoryError};
use crate::auth::Caller;
use crate::capacity::{CapacityError, CapacityLimitStore, CapacityService};
use crate::catalog::{ProgramCatalog, ProgramId};
use crate::notifications::{Notification, NotificationKind, NotificationPublisher};

/// Service composing seat reservation, review decisions, and notifications.
pub struct ApplicationService<C, R, L, N> {
    capacity: Arc<CapacityService<C, R, L>>,
    repository: Arc<R>,
    notifications: Arc<N>,
}

static APPLICATION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_application_id() -> ApplicationId {
    let id = APPLICATION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ApplicationId(format!("app-{id:06}"))
}

impl<C, R, L, N> ApplicationService<C, R, L, N>
where
    C: ProgramCatalog + 'static,
    R: ApplicationRepository + 'static,
    L: CapacityLimitStore + 'static,
    N: NotificationPublisher + 'static,
{
    pub fn new(
        capacity: Arc<CapacityService<C, R, L>>,
        repository: Arc<R>,
        notifications: Arc<N>,
    ) -> Self {
        Self {
            capacity,
            repository,
            notifications,
        }
    }

    /// Submit a new application, claiming a seat in the program.
    pub fn submit(
        &self,
        applicant_id: &str,
        program_id: ProgramId,
    ) -> Result<Application, ApplicationServiceError> {
        let record =
            Application::pending(next_application_id(), program_id, applicant_id, Utc::now());
        let stored = self.capacity.reserve_slot(record)?;

        info!(
            application_id = %stored.id.0,
            program_id = %stored.program_id,
            applicant_id = %stored.applicant_id,
            "application submitted"
        );
        self.notify(
            &stored,
            NotificationKind::ApplicationSubmitted,
            format!("Your application {} has been received", stored.id.0),
        );
        Ok(stored)
    }

    /// Record a reviewer's decision on a pending application.
    pub fn review(
        &self,
        application_id: &ApplicationId,
        reviewer: &Caller,
        decision: ReviewDecision,
    ) -> Result<Application, ApplicationServiceError> {
        let mut record = self.get(application_id)?;
        let next = decision.target_status();
        if record.status != ApplicationStatus::Pending {
            return Err(ApplicationServiceError::InvalidTransition {
                from: record.status,
                to: next,
            });
        }

        record.status = next;
        record.reviewed_by = Some(reviewer.user_id.clone());
        record.reviewed_at = Some(Utc::now());
        match self
            .repository
            .update_if_status(record.clone(), ApplicationStatus::Pending)
        {
            Ok(()) => {}
            Err(RepositoryError::Conflict) => {
                let current = self.get(application_id)?;
                warn!(
                    application_id = %record.id.0,
                    status = current.status.label(),
                    "application changed before the review was recorded"
                );
                return Err(ApplicationServiceError::InvalidTransition {
                    from: current.status,
                    to: next,
                });
            }
            Err(err) => return Err(err.into()),
        }

        info!(
            application_id = %record.id.0,
            reviewer = %reviewer.user_id,
            status = record.status.label(),
            "application reviewed"
        );
        let (kind, message) = match decision {
            ReviewDecision::Approve => (
                NotificationKind::ApplicationApproved,
                format!("Congratulations, application {} was approved", record.id.0),
            ),
            ReviewDecision::Reject => (
                NotificationKind::ApplicationRejected,
                format!("Application {} was not successful", record.id.0),
            ),
        };
        self.notify(&record, kind, message);
        Ok(record)
    }

    /// Applicant-initiated withdrawal. Frees the seat the application held.
    /// If the status changes underneath, the row is re-read and the
    /// withdrawal retried while the new status still allows it.
    pub fn withdraw(
        &self,
        application_id: &ApplicationId,
        applicant_id: &str,
    ) -> Result<Application, ApplicationServiceError> {
        let mut record = self.get(application_id)?;
        if record.applicant_id != applicant_id {
            return Err(ApplicationServiceError::NotOwner);
        }

        loop {
            let from = record.status;
            if !from.can_transition_to(ApplicationStatus::Withdrawn) {
                return Err(ApplicationServiceError::InvalidTransition {
                    from,
                    to: ApplicationStatus::Withdrawn,
                });
            }
            record.status = ApplicationStatus::Withdrawn;
            match self.repository.update_if_status(record.clone(), from) {
                Ok(()) => break,
                Err(RepositoryError::Conflict) => record = self.get(application_id)?,
                Err(err) => return Err(err.into()),
            }
        }

        info!(application_id = %record.id.0, "application withdrawn");
        self.notify(
            &record,
            NotificationKind::ApplicationWithdrawn,
            format!("Application {} was withdrawn", record.id.0),
        );
        Ok(record)
    }

    /// Fetch an application for API responses.
    pub fn get(
        &self,
        application_id: &ApplicationId,
    ) -> Result<Application, ApplicationServiceError> {
        self.repository
            .fetch(application_id)?
            .ok_or(ApplicationServiceError::NotFound)
    }

    pub fn for_applicant(
        &self,
        applicant_id: &str,
    ) -> Result<Vec<Application>, ApplicationServiceError> {
        Ok(self.repository.by_applicant(applicant_id)?)
    }

    /// Notification failures never fail the request that triggered them.
    fn notify(&self, record: &Application, kind: NotificationKind, message: String) {
        let notification = Notification {
            user_id: record.applicant_id.clone(),
            kind,
            message,
            application_id: Some(record.id.clone()),
            created_at: Utc::now(),
        };
        if let Err(err) = self.notifications.publish(notification) {
            warn!(
                error = %err,
                application_id = %record.id.0,
                kind = kind.label(),
                "notification not delivered"
            );
        }
    }
}

/// Error raised by the application service.
#[derive(Debug, thiserror::Error)]
pub enum ApplicationServiceError {
    #[error("application not found")]
    NotFound,
    #[error("application belongs to another applicant")]
    NotOwner,
    #[error("cannot move application from {} to {}", .from.label(), .to.label())]
    InvalidTransition {
        from: ApplicationStatus,
        to: ApplicationStatus,
    },
    #[error(transparent)]
    Capacity(#[from] CapacityError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
