use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::Response,
    routing::get,
    Extension, Json, Router,
};
use tracing::{error, info};

use super::domain::Program;
use super::repository::{CatalogError, ProgramCatalog};
use crate::auth::Caller;
use crate::response::{failure, forbidden, malformed, success};

/// Catalog endpoints. Listing is open to any authenticated caller; creating
/// programs is limited to capacity managers.
pub fn catalog_router<C>(catalog: Arc<C>) -> Router
where
    C: ProgramCatalog + 'static,
{
    Router::new()
        .route(
            "/api/v1/programs",
            get(list_programs_handler::<C>).post(create_program_handler::<C>),
        )
        .with_state(catalog)
}

pub(crate) async fn list_programs_handler<C>(State(catalog): State<Arc<C>>) -> Response
where
    C: ProgramCatalog + 'static,
{
    match catalog.all() {
        Ok(programs) => success(StatusCode::OK, programs, "Programs retrieved"),
        Err(err) => {
            error!(error = %err, "failed to list programs");
            failure(StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch programs")
        }
    }
}

pub(crate) async fn create_program_handler<C>(
    State(catalog): State<Arc<C>>,
    Extension(caller): Extension<Caller>,
    payload: Result<Json<Program>, JsonRejection>,
) -> Response
where
    C: ProgramCatalog + 'static,
{
    if !caller.role.manages_capacity() {
        return forbidden();
    }
    let program = match payload {
        Ok(Json(program)) => program,
        Err(rejection) => return malformed(rejection, "Invalid program request"),
    };

    let program = Program {
        name: program.name.trim().to_string(),
        department: program.department.trim().to_string(),
        certification_type: program.certification_type.trim().to_string(),
        ..program
    };
    if program.name.is_empty() || program.department.is_empty() {
        return failure(
            StatusCode::BAD_REQUEST,
            "Program name and department are required",
        );
    }

    match catalog.insert(program) {
        Ok(program) => {
            info!(
                program_id = %program.id,
                department = %program.department,
                created_by = %caller.user_id,
                "program created"
            );
            success(StatusCode::CREATED, program, "Program created")
        }
        Err(CatalogError::Conflict) => failure(StatusCode::CONFLICT, "Program already exists"),
        Err(err) => {
            error!(error = %err, "failed to create program");
            failure(StatusCode::INTERNAL_SERVER_ERROR, "Failed to create program")
        }
    }
}
