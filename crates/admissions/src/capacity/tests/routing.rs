use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, Request, StatusCode};
use axum::middleware::from_fn_with_state;
use axum::{Extension, Router};
use serde_json::json;
use tower::ServiceExt;

use crate::applications::ApplicationStatus;
use crate::auth::{auth_middleware, AuthConfig, Caller, Role};
use crate::capacity::router::{list_departments_handler, program_availability_handler};
use crate::capacity::{capacity_router, CapacityLimitPolicy, CapacityService};
use crate::test_support::*;

const SECRET: &str = "portal-secret";

fn secured(router: Router) -> Router {
    router.layer(from_fn_with_state(
        AuthConfig::with_secret(SECRET),
        auth_middleware,
    ))
}

fn bearer(role: &str) -> String {
    format!("Bearer {role}:user-1:{SECRET}")
}

fn get(uri: &str, role: &str) -> Request<Body> {
    Request::get(uri)
        .header(header::AUTHORIZATION, bearer(role))
        .body(Body::empty())
        .expect("request")
}

fn put_json(uri: &str, role: &str, body: &str) -> Request<Body> {
    Request::put(uri)
        .header(header::AUTHORIZATION, bearer(role))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

fn nursing_router() -> (Fixture, Router) {
    let fixture = Fixture::new(sample_programs());
    seed(&fixture.applications, 1, 10, ApplicationStatus::Pending);
    seed(&fixture.applications, 2, 5, ApplicationStatus::Approved);
    let router = secured(capacity_router(fixture.capacity.clone()));
    (fixture, router)
}

#[tokio::test]
async fn missing_token_is_unauthorized() {
    let (_, router) = nursing_router();

    let response = router
        .oneshot(
            Request::get("/api/v1/capacity/departments")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("router dispatch");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let payload = read_json_body(response).await;
    assert_eq!(payload["success"], json!(false));
    assert_eq!(payload["message"], json!("Unauthorized"));
}

#[tokio::test]
async fn officers_and_applicants_are_forbidden() {
    let (_, router) = nursing_router();

    for role in ["admission_officer", "applicant"] {
        let response = router
            .clone()
            .oneshot(get("/api/v1/capacity/departments", role))
            .await
            .expect("router dispatch");

        assert_eq!(response.status(), StatusCode::FORBIDDEN, "role {role}");
        let payload = read_json_body(response).await;
        assert_eq!(payload["message"], json!("Insufficient permissions"));
    }
}

#[tokio::test]
async fn list_departments_returns_envelope() {
    let (_, router) = nursing_router();

    let response = router
        .oneshot(get("/api/v1/capacity/departments", "hoa"))
        .await
        .expect("router dispatch");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["success"], json!(true));
    assert_eq!(payload["message"], json!("Department capacities retrieved"));

    let departments = payload["data"].as_array().expect("department list");
    let nursing = departments
        .iter()
        .find(|department| department["department"] == json!("Nursing"))
        .expect("nursing present");
    assert_eq!(nursing["totalCapacity"], json!(125));
    assert_eq!(nursing["currentApplications"], json!(15));
    assert_eq!(nursing["remainingSlots"], json!(110));
    assert_eq!(nursing["programs"][0]["programId"], json!(1));
}

#[tokio::test]
async fn department_programs_route_resolves_and_misses() {
    let (_, router) = nursing_router();

    let found = router
        .clone()
        .oneshot(get(
            "/api/v1/capacity/departments/Nursing/programs",
            "super_admin",
        ))
        .await
        .expect("router dispatch");
    assert_eq!(found.status(), StatusCode::OK);
    let payload = read_json_body(found).await;
    assert_eq!(payload["message"], json!("Program capacities retrieved"));
    assert_eq!(payload["data"].as_array().map(Vec::len), Some(2));

    let missing = router
        .oneshot(get(
            "/api/v1/capacity/departments/Astrology/programs",
            "super_admin",
        ))
        .await
        .expect("router dispatch");
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    let payload = read_json_body(missing).await;
    assert_eq!(payload["message"], json!("Department not found"));
    assert_eq!(payload["data"], json!(null));
}

#[tokio::test]
async fn update_department_persists_new_total() {
    let (fixture, router) = nursing_router();

    let response = router
        .oneshot(put_json(
            "/api/v1/capacity/departments/Nursing",
            "hoa",
            r#"{"totalCapacity": 200}"#,
        ))
        .await
        .expect("router dispatch");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["message"], json!("Department capacity updated"));
    assert_eq!(payload["data"]["totalCapacity"], json!(200));
    assert_eq!(payload["data"]["remainingSlots"], json!(185));

    let reread = fixture
        .capacity
        .department_capacity("Nursing")
        .expect("nursing present");
    assert_eq!(reread.total_capacity, 200);
}

#[tokio::test]
async fn update_department_rejects_bad_values() {
    let (_, router) = nursing_router();

    for body in [
        r#"{"totalCapacity": -5}"#,
        r#"{"totalCapacity": 12.5}"#,
        r#"{"totalCapacity": "lots"}"#,
        r#"{}"#,
        "not json",
    ] {
        let response = router
            .clone()
            .oneshot(put_json("/api/v1/capacity/departments/Nursing", "hoa", body))
            .await
            .expect("router dispatch");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body {body}");
        let payload = read_json_body(response).await;
        assert_eq!(payload["message"], json!("Invalid capacity value"));
    }
}

#[tokio::test]
async fn update_unknown_department_is_not_found() {
    let (_, router) = nursing_router();

    let response = router
        .oneshot(put_json(
            "/api/v1/capacity/departments/Astrology",
            "hoa",
            r#"{"totalCapacity": 10}"#,
        ))
        .await
        .expect("router dispatch");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn availability_handler_reports_open_program() {
    let fixture = Fixture::new(sample_programs());

    let response = program_availability_handler(
        State(fixture.capacity.clone()),
        Extension(Caller::new("hoa-1", Role::HeadOfAdmissions)),
        Ok(Path(3)),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(
        payload["data"],
        json!({ "programId": 3, "available": true })
    );
}

#[tokio::test]
async fn availability_handler_misses_unknown_program() {
    let fixture = Fixture::new(sample_programs());

    let response = program_availability_handler(
        State(fixture.capacity.clone()),
        Extension(Caller::new("hoa-1", Role::HeadOfAdmissions)),
        Ok(Path(77)),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let payload = read_json_body(response).await;
    assert_eq!(payload["message"], json!("Program not found"));
}

#[tokio::test]
async fn data_layer_failure_maps_to_generic_internal_error() {
    let service = Arc::new(CapacityService::new(
        Arc::new(catalog_with(sample_programs())),
        Arc::new(UnavailableApplications),
        Arc::new(InMemoryCapacityLimitStore::default()),
        CapacityLimitPolicy::standard(),
    ));

    let response = list_departments_handler(
        State(service),
        Extension(Caller::new("admin", Role::SuperAdmin)),
    )
    .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let payload = read_json_body(response).await;
    assert_eq!(
        payload["message"],
        json!("Failed to fetch department capacities")
    );
    assert_eq!(payload["success"], json!(false));
}

#[tokio::test]
async fn non_numeric_program_id_gets_enveloped_bad_request() {
    let (_, router) = nursing_router();

    let response = router
        .oneshot(get("/api/v1/capacity/programs/abc/availability", "hoa"))
        .await
        .expect("router dispatch");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let payload = read_json_body(response).await;
    assert_eq!(payload["success"], json!(false));
    assert_eq!(payload["message"], json!("Invalid program id"));
}
