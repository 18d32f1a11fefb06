use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::Response,
    routing::{get, post},
    Extension, Json, Router,
};
use tracing::{error, warn};

use super::domain::{ApplicationId, ApplicationSubmission, ReviewRequest};
use super::repository::{ApplicationRepository, RepositoryError};
use super::service::{ApplicationService, ApplicationServiceError};
use crate::auth::{Caller, Role};
use crate::capacity::{CapacityError, CapacityLimitStore};
use crate::catalog::ProgramCatalog;
use crate::notifications::NotificationPublisher;
use crate::response::{failure, forbidden, malformed, success};

type SharedService<C, R, L, N> = Arc<ApplicationService<C, R, L, N>>;

/// Router builder exposing intake, review, and withdrawal endpoints.
pub fn application_router<C, R, L, N>(service: SharedService<C, R, L, N>) -> Router
where
    C: ProgramCatalog + 'static,
    R: ApplicationRepository + 'static,
    L: CapacityLimitStore + 'static,
    N: NotificationPublisher + 'static,
{
    Router::new()
        .route(
            "/api/v1/applications",
            post(submit_handler::<C, R, L, N>).get(list_own_handler::<C, R, L, N>),
        )
        .route(
            "/api/v1/applications/:application_id",
            get(status_handler::<C, R, L, N>),
        )
        .route(
            "/api/v1/applications/:application_id/review",
            post(review_handler::<C, R, L, N>),
        )
        .route(
            "/api/v1/applications/:application_id/withdraw",
            post(withdraw_handler::<C, R, L, N>),
        )
        .with_state(service)
}

pub(crate) async fn submit_handler<C, R, L, N>(
    State(service): State<SharedService<C, R, L, N>>,
    Extension(caller): Extension<Caller>,
    payload: Result<Json<ApplicationSubmission>, JsonRejection>,
) -> Response
where
    C: ProgramCatalog + 'static,
    R: ApplicationRepository + 'static,
    L: CapacityLimitStore + 'static,
    N: NotificationPublisher + 'static,
{
    if caller.role != Role::Applicant {
        return forbidden();
    }
    let submission = match payload {
        Ok(Json(submission)) => submission,
        Err(rejection) => return malformed(rejection, "Invalid application request"),
    };

    match service.submit(&caller.user_id, submission.program_id) {
        Ok(record) => success(StatusCode::CREATED, record, "Application submitted"),
        Err(err) => application_failure(err),
    }
}

pub(crate) async fn list_own_handler<C, R, L, N>(
    State(service): State<SharedService<C, R, L, N>>,
    Extension(caller): Extension<Caller>,
) -> Response
where
    C: ProgramCatalog + 'static,
    R: ApplicationRepository + 'static,
    L: CapacityLimitStore + 'static,
    N: NotificationPublisher + 'static,
{
    match service.for_applicant(&caller.user_id) {
        Ok(records) => success(StatusCode::OK, records, "Applications retrieved"),
        Err(err) => application_failure(err),
    }
}

pub(crate) async fn status_handler<C, R, L, N>(
    State(service): State<SharedService<C, R, L, N>>,
    Extension(caller): Extension<Caller>,
    Path(application_id): Path<String>,
) -> Response
where
    C: ProgramCatalog + 'static,
    R: ApplicationRepository + 'static,
    L: CapacityLimitStore + 'static,
    N: NotificationPublisher + 'static,
{
    match service.get(&ApplicationId(application_id)) {
        Ok(record) if caller.role.is_staff() || record.applicant_id == caller.user_id => {
            success(StatusCode::OK, record, "Application retrieved")
        }
        Ok(_) => forbidden(),
        Err(err) => application_failure(err),
    }
}

pub(crate) async fn review_handler<C, R, L, N>(
    State(service): State<SharedService<C, R, L, N>>,
    Extension(caller): Extension<Caller>,
    Path(application_id): Path<String>,
    payload: Result<Json<ReviewRequest>, JsonRejection>,
) -> Response
where
    C: ProgramCatalog + 'static,
    R: ApplicationRepository + 'static,
    L: CapacityLimitStore + 'static,
    N: NotificationPublisher + 'static,
{
    if !caller.role.is_staff() {
        return forbidden();
    }
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return malformed(rejection, "Invalid review request"),
    };

    match service.review(&ApplicationId(application_id), &caller, request.decision) {
        Ok(record) => success(StatusCode::OK, record, "Application reviewed"),
        Err(err) => application_failure(err),
    }
}

pub(crate) async fn withdraw_handler<C, R, L, N>(
    State(service): State<SharedService<C, R, L, N>>,
    Extension(caller): Extension<Caller>,
    Path(application_id): Path<String>,
) -> Response
where
    C: ProgramCatalog + 'static,
    R: ApplicationRepository + 'static,
    L: CapacityLimitStore + 'static,
    N: NotificationPublisher + 'static,
{
    match service.withdraw(&ApplicationId(application_id), &caller.user_id) {
        Ok(record) => success(StatusCode::OK, record, "Application withdrawn"),
        Err(err) => application_failure(err),
    }
}

fn application_failure(err: ApplicationServiceError) -> Response {
    match err {
        ApplicationServiceError::NotFound
        | ApplicationServiceError::Repository(RepositoryError::NotFound) => {
            failure(StatusCode::NOT_FOUND, "Application not found")
        }
        ApplicationServiceError::NotOwner => forbidden(),
        ApplicationServiceError::InvalidTransition { .. } => {
            warn!(error = %err, "application transition rejected");
            failure(
                StatusCode::CONFLICT,
                "Application cannot change to the requested status",
            )
        }
        ApplicationServiceError::Capacity(CapacityError::ProgramNotFound(_)) => {
            failure(StatusCode::NOT_FOUND, "Program not found")
        }
        ApplicationServiceError::Capacity(CapacityError::CapacityExceeded { .. }) => {
            failure(StatusCode::CONFLICT, "Program is at capacity")
        }
        ApplicationServiceError::Capacity(CapacityError::DuplicateReservation { .. }) => failure(
            StatusCode::CONFLICT,
            "Application already exists for this program",
        ),
        other => {
            error!(error = %other, "application request failed");
            failure(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to process application",
            )
        }
    }
}
