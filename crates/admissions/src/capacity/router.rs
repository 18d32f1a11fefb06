use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    response::Response,
    routing::{get, put},
    Extension, Json, Router,
};
use serde::Deserialize;
use tracing::{error, warn};

use super::domain::ProgramAvailability;
use super::service::{CapacityError, CapacityService};
use super::store::CapacityLimitStore;
use crate::applications::ApplicationRepository;
use crate::auth::Caller;
use crate::catalog::{ProgramCatalog, ProgramId};
use crate::response::{failure, forbidden, malformed, success};

/// Request body for `PUT /api/v1/capacity/departments/:department_id`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCapacityRequest {
    pub total_capacity: serde_json::Number,
}

/// Router builder exposing capacity figures to capacity managers.
pub fn capacity_router<C, R, L>(service: Arc<CapacityService<C, R, L>>) -> Router
where
    C: ProgramCatalog + 'static,
    R: ApplicationRepository + 'static,
    L: CapacityLimitStore + 'static,
{
    Router::new()
        .route(
            "/api/v1/capacity/departments",
            get(list_departments_handler::<C, R, L>),
        )
        .route(
            "/api/v1/capacity/departments/:department_id",
            put(update_department_handler::<C, R, L>),
        )
        .route(
            "/api/v1/capacity/departments/:department_id/programs",
            get(department_programs_handler::<C, R, L>),
        )
        .route(
            "/api/v1/capacity/programs/:program_id/availability",
            get(program_availability_handler::<C, R, L>),
        )
        .with_state(service)
}

pub(crate) async fn list_departments_handler<C, R, L>(
    State(service): State<Arc<CapacityService<C, R, L>>>,
    Extension(caller): Extension<Caller>,
) -> Response
where
    C: ProgramCatalog + 'static,
    R: ApplicationRepository + 'static,
    L: CapacityLimitStore + 'static,
{
    if !caller.role.manages_capacity() {
        return forbidden();
    }

    match service.department_capacities() {
        Ok(departments) => success(
            StatusCode::OK,
            departments,
            "Department capacities retrieved",
        ),
        Err(err) => capacity_failure(err, "Failed to fetch department capacities"),
    }
}

pub(crate) async fn update_department_handler<C, R, L>(
    State(service): State<Arc<CapacityService<C, R, L>>>,
    Extension(caller): Extension<Caller>,
    Path(department_id): Path<String>,
    payload: Result<Json<UpdateCapacityRequest>, JsonRejection>,
) -> Response
where
    C: ProgramCatalog + 'static,
    R: ApplicationRepository + 'static,
    L: CapacityLimitStore + 'static,
{
    if !caller.role.manages_capacity() {
        return forbidden();
    }

    let total = match payload {
        Ok(Json(request)) => request.total_capacity.as_i64(),
        Err(rejection) => {
            warn!(error = %rejection, department = %department_id, "malformed capacity update");
            None
        }
    };
    let Some(total) = total else {
        return failure(StatusCode::BAD_REQUEST, "Invalid capacity value");
    };

    match service.update_department_capacity(&department_id, total) {
        Ok(department) => success(
            StatusCode::OK,
            department,
            "Department capacity updated",
        ),
        Err(err) => capacity_failure(err, "Failed to update department capacity"),
    }
}

pub(crate) async fn department_programs_handler<C, R, L>(
    State(service): State<Arc<CapacityService<C, R, L>>>,
    Extension(caller): Extension<Caller>,
    Path(department_id): Path<String>,
) -> Response
where
    C: ProgramCatalog + 'static,
    R: ApplicationRepository + 'static,
    L: CapacityLimitStore + 'static,
{
    if !caller.role.manages_capacity() {
        return forbidden();
    }

    match service.program_capacities(&department_id) {
        Ok(programs) => success(StatusCode::OK, programs, "Program capacities retrieved"),
        Err(err) => capacity_failure(err, "Failed to fetch program capacities"),
    }
}

pub(crate) async fn program_availability_handler<C, R, L>(
    State(service): State<Arc<CapacityService<C, R, L>>>,
    Extension(caller): Extension<Caller>,
    program_id: Result<Path<u64>, PathRejection>,
) -> Response
where
    C: ProgramCatalog + 'static,
    R: ApplicationRepository + 'static,
    L: CapacityLimitStore + 'static,
{
    if !caller.role.manages_capacity() {
        return forbidden();
    }

    let program_id = match program_id {
        Ok(Path(id)) => ProgramId(id),
        Err(rejection) => return malformed(rejection, "Invalid program id"),
    };
    match service.check_program_availability(program_id) {
        Ok(available) => success(
            StatusCode::OK,
            ProgramAvailability {
                program_id,
                available,
            },
            "Program availability retrieved",
        ),
        Err(err) => capacity_failure(err, "Failed to check program availability"),
    }
}

/// Maps a service error to a fixed client message. Detail stays in the logs.
fn capacity_failure(err: CapacityError, fallback: &'static str) -> Response {
    if err.is_internal() {
        error!(error = %err, "capacity request failed");
        return failure(StatusCode::INTERNAL_SERVER_ERROR, fallback);
    }

    warn!(error = %err, "capacity request rejected");
    match err {
        CapacityError::DepartmentNotFound(_) => {
            failure(StatusCode::NOT_FOUND, "Department not found")
        }
        CapacityError::ProgramNotFound(_) => failure(StatusCode::NOT_FOUND, "Program not found"),
        CapacityError::Validation(_) => failure(StatusCode::BAD_REQUEST, "Invalid capacity value"),
        CapacityError::CapacityExceeded { .. } => {
            failure(StatusCode::CONFLICT, "Program is at capacity")
        }
        CapacityError::DuplicateReservation { .. } => failure(
            StatusCode::CONFLICT,
            "Application already exists for this program",
        ),
        CapacityError::Catalog(_) | CapacityError::Repository(_) | CapacityError::LimitStore(_) => {
            failure(StatusCode::INTERNAL_SERVER_ERROR, fallback)
        }
    }
}
