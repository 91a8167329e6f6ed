//! HTTP request handlers for the workforce API.
//!
//! This module contains the handler functions for all API endpoints. Each
//! handler resolves the caller, decodes its input, calls one engine
//! operation and maps the outcome to a JSON response.

use axum::{
    Json, Router,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, patch, post},
};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::leave::LeaveRequestInput;
use crate::models::Shift;

use super::extract::CurrentActor;
use super::request::{
    BalanceQuery, BreakActionRequest, CheckInRequest, CreateLeaveRequest, LeaveRequestQuery,
    ManualBreakRequest, PolicyQuery, ShiftActionRequest, ShiftQuery, UpdatePoliciesRequest,
};
use super::response::{ApiError, ApiErrorResponse, BalanceView, DeletedCount, ShiftView};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health_handler))
        .route("/api/attendance", get(list_shifts_handler))
        .route("/api/attendance/checkin", post(check_in_handler))
        .route("/api/attendance/checkout", post(check_out_handler))
        .route("/api/attendance/breaks/start", post(start_break_handler))
        .route("/api/attendance/breaks/end", post(end_break_handler))
        .route("/api/attendance/breaks/manual", post(manual_break_handler))
        .route("/api/attendance/:id", delete(delete_shift_handler))
        .route(
            "/api/attendance/employee/:employee_id",
            delete(delete_employee_shifts_handler),
        )
        .route(
            "/api/leave/requests",
            get(list_leave_requests_handler).post(create_leave_request_handler),
        )
        .route(
            "/api/leave/requests/:id",
            patch(update_leave_request_handler).delete(delete_leave_request_handler),
        )
        .route("/api/leave/requests/:id/approve", patch(approve_handler))
        .route("/api/leave/requests/:id/reject", patch(reject_handler))
        .route("/api/leave/requests/:id/pending", patch(mark_pending_handler))
        .route("/api/leave/balances", get(list_balances_handler))
        .route(
            "/api/leave/policies",
            get(list_policies_handler).put(update_policies_handler),
        )
        .with_state(state)
}

/// Unwraps a JSON body, turning extractor rejections into 400 responses.
fn json_body<T>(
    payload: Result<Json<T>, JsonRejection>,
    correlation_id: Uuid,
) -> Result<T, ApiErrorResponse> {
    let rejection = match payload {
        Ok(Json(body)) => return Ok(body),
        Err(rejection) => rejection,
    };

    let error = match rejection {
        JsonRejection::JsonDataError(err) => {
            let body_text = err.body_text();
            warn!(
                correlation_id = %correlation_id,
                error = %body_text,
                "JSON data error"
            );
            ApiError::new("VALIDATION_ERROR", body_text)
        }
        JsonRejection::JsonSyntaxError(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "JSON syntax error"
            );
            ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
        }
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
        }
        _ => ApiError::malformed_json("Failed to parse request body"),
    };
    Err(ApiErrorResponse::bad_request(error))
}

/// Logs the outcome of one operation and renders it.
fn respond<T: Serialize>(
    correlation_id: Uuid,
    operation: &'static str,
    status: StatusCode,
    result: EngineResult<T>,
) -> Response {
    match result {
        Ok(body) => {
            info!(correlation_id = %correlation_id, operation, "Request completed");
            (status, Json(body)).into_response()
        }
        Err(err) => failure(correlation_id, operation, err),
    }
}

fn failure(correlation_id: Uuid, operation: &'static str, err: EngineError) -> Response {
    warn!(
        correlation_id = %correlation_id,
        operation,
        error = %err,
        "Request failed"
    );
    ApiErrorResponse::from(err).into_response()
}

fn shift_views(shifts: Vec<Shift>) -> Vec<ShiftView> {
    shifts.into_iter().map(ShiftView::from).collect()
}

#[derive(Serialize)]
struct Health {
    status: &'static str,
}

async fn health_handler() -> Json<Health> {
    Json(Health { status: "ok" })
}

async fn list_shifts_handler(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Query(query): Query<ShiftQuery>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let result = state
        .attendance()
        .list_shifts(&actor, query.employee_id)
        .map(shift_views);
    respond(correlation_id, "list_shifts", StatusCode::OK, result)
}

async fn check_in_handler(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    payload: Result<Json<CheckInRequest>, JsonRejection>,
) -> Result<Response, ApiErrorResponse> {
    let correlation_id = Uuid::new_v4();
    let request = json_body(payload, correlation_id)?;
    let attendance = state.attendance();

    let result = request
        .check_in_at(&actor, attendance.now())
        .and_then(|at| attendance.check_in(&actor, request.employee_id, at))
        .map(ShiftView::from);
    Ok(respond(correlation_id, "check_in", StatusCode::CREATED, result))
}

async fn check_out_handler(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    payload: Result<Json<ShiftActionRequest>, JsonRejection>,
) -> Result<Response, ApiErrorResponse> {
    let correlation_id = Uuid::new_v4();
    let request = json_body(payload, correlation_id)?;
    let attendance = state.attendance();

    let result = request
        .check_out_at(&actor, attendance.now())
        .and_then(|at| attendance.check_out(&actor, request.target(), at))
        .map(ShiftView::from);
    Ok(respond(correlation_id, "check_out", StatusCode::OK, result))
}

async fn start_break_handler(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    payload: Result<Json<BreakActionRequest>, JsonRejection>,
) -> Result<Response, ApiErrorResponse> {
    let correlation_id = Uuid::new_v4();
    let request = json_body(payload, correlation_id)?;
    let result = state.attendance().start_break(&actor, request.target());
    Ok(respond(correlation_id, "start_break", StatusCode::CREATED, result))
}

async fn end_break_handler(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    payload: Result<Json<BreakActionRequest>, JsonRejection>,
) -> Result<Response, ApiErrorResponse> {
    let correlation_id = Uuid::new_v4();
    let request = json_body(payload, correlation_id)?;
    let result = state.attendance().end_break(&actor, request.target());
    Ok(respond(correlation_id, "end_break", StatusCode::OK, result))
}

async fn manual_break_handler(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    payload: Result<Json<ManualBreakRequest>, JsonRejection>,
) -> Result<Response, ApiErrorResponse> {
    let correlation_id = Uuid::new_v4();
    let request = json_body(payload, correlation_id)?;
    let attendance = state.attendance();

    let result = request
        .interval(attendance.now())
        .and_then(|(start, end)| attendance.add_manual_break(&actor, request.shift_id, start, end));
    Ok(respond(correlation_id, "add_manual_break", StatusCode::CREATED, result))
}

async fn delete_shift_handler(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<Uuid>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    match state.attendance().delete_shift(&actor, id) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => failure(correlation_id, "delete_shift", err),
    }
}

async fn delete_employee_shifts_handler(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(employee_id): Path<Uuid>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let result = state
        .attendance()
        .delete_employee_shifts(&actor, employee_id)
        .map(|deleted| DeletedCount { deleted });
    respond(correlation_id, "delete_employee_shifts", StatusCode::OK, result)
}

async fn list_leave_requests_handler(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Query(query): Query<LeaveRequestQuery>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let result = state.leave().list_requests(&actor, query.into());
    respond(correlation_id, "list_leave_requests", StatusCode::OK, result)
}

async fn create_leave_request_handler(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    payload: Result<Json<CreateLeaveRequest>, JsonRejection>,
) -> Result<Response, ApiErrorResponse> {
    let correlation_id = Uuid::new_v4();
    let request = json_body(payload, correlation_id)?;
    let result = state
        .leave()
        .create_request(&actor, request.employee_id, request.leave);
    Ok(respond(correlation_id, "create_leave_request", StatusCode::CREATED, result))
}

async fn update_leave_request_handler(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<Uuid>,
    payload: Result<Json<LeaveRequestInput>, JsonRejection>,
) -> Result<Response, ApiErrorResponse> {
    let correlation_id = Uuid::new_v4();
    let input = json_body(payload, correlation_id)?;
    let result = state.leave().update_request(&actor, id, input);
    Ok(respond(correlation_id, "update_leave_request", StatusCode::OK, result))
}

async fn delete_leave_request_handler(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<Uuid>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    match state.leave().delete_request(&actor, id) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => failure(correlation_id, "delete_leave_request", err),
    }
}

async fn approve_handler(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<Uuid>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let result = state.leave().approve(&actor, id);
    respond(correlation_id, "approve_leave", StatusCode::OK, result)
}

async fn reject_handler(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<Uuid>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let result = state.leave().reject(&actor, id);
    respond(correlation_id, "reject_leave", StatusCode::OK, result)
}

async fn mark_pending_handler(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<Uuid>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let result = state.leave().mark_pending(&actor, id);
    respond(correlation_id, "mark_leave_pending", StatusCode::OK, result)
}

async fn list_balances_handler(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Query(query): Query<BalanceQuery>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let result = state
        .leave()
        .list_balances(&actor, query.year, query.employee_id)
        .map(|balances| {
            balances
                .into_iter()
                .map(BalanceView::from)
                .collect::<Vec<_>>()
        });
    respond(correlation_id, "list_balances", StatusCode::OK, result)
}

async fn list_policies_handler(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Query(query): Query<PolicyQuery>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let result = state.leave().list_policies(&actor, query.year);
    respond(correlation_id, "list_policies", StatusCode::OK, result)
}

async fn update_policies_handler(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    payload: Result<Json<UpdatePoliciesRequest>, JsonRejection>,
) -> Result<Response, ApiErrorResponse> {
    let correlation_id = Uuid::new_v4();
    let request = json_body(payload, correlation_id)?;
    let result = state
        .leave()
        .update_policies(&actor, request.year, &request.policies);
    Ok(respond(correlation_id, "update_policies", StatusCode::OK, result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::extract::{EMPLOYEE_ID_HEADER, ROLE_HEADER, USER_ID_HEADER};
    use crate::clock::ManualClock;
    use crate::config::WorkforceConfig;
    use crate::models::Employee;
    use axum::body::Body;
    use axum::http::Request;
    use chrono::{TimeZone, Utc};
    use std::sync::Arc;
    use tower::ServiceExt;

    struct TestApp {
        router: Router,
        employee_id: Uuid,
    }

    fn create_test_app() -> TestApp {
        let employee_id = Uuid::new_v4();
        let config = WorkforceConfig {
            employees: vec![Employee {
                id: employee_id,
                first_name: "Ada".to_string(),
                last_name: "Lovelace".to_string(),
                hired_at: None,
            }],
            ..Default::default()
        };
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2026, 1, 15, 8, 0, 0).unwrap(),
        ));
        let state = AppState::with_clock(&config, clock).unwrap();
        TestApp {
            router: create_router(state),
            employee_id,
        }
    }

    fn employee_request(app: &TestApp, method: &str, uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("Content-Type", "application/json")
            .header(ROLE_HEADER, "employee")
            .header(USER_ID_HEADER, Uuid::new_v4().to_string())
            .header(EMPLOYEE_ID_HEADER, app.employee_id.to_string())
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let app = create_test_app();
        let response = app
            .router
            .oneshot(Request::builder().uri("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_check_in_returns_201() {
        let app = create_test_app();
        let request = employee_request(&app, "POST", "/api/attendance/checkin", "{}");

        let response = app.router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let shift: ShiftView = serde_json::from_slice(&body).unwrap();
        assert!(shift.shift.is_open());
        assert_eq!(shift.worked_hours, None);
    }

    #[tokio::test]
    async fn test_missing_identity_returns_403() {
        let app = create_test_app();
        let response = app
            .router
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/attendance/checkin")
                    .header("Content-Type", "application/json")
                    .body(Body::from("{}"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_malformed_json_returns_400() {
        let app = create_test_app();
        let request = employee_request(&app, "POST", "/api/leave/requests", "{invalid json");

        let response = app.router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let error: ApiError = serde_json::from_slice(&body).unwrap();
        assert_eq!(error.code, "MALFORMED_JSON");
    }

    #[tokio::test]
    async fn test_unknown_leave_type_returns_400() {
        let app = create_test_app();
        let request = employee_request(
            &app,
            "POST",
            "/api/leave/requests",
            r#"{"type": "vacation", "start_date": "2026-03-09", "end_date": "2026-03-09"}"#,
        );

        let response = app.router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let error: ApiError = serde_json::from_slice(&body).unwrap();
        assert_eq!(error.code, "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_checkout_without_shift_returns_404() {
        let app = create_test_app();
        let request = employee_request(&app, "POST", "/api/attendance/checkout", "{}");

        let response = app.router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_self_service_cannot_read_policies() {
        let app = create_test_app();
        let request = employee_request(&app, "GET", "/api/leave/policies", "");

        let response = app.router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_self_service_ignores_malformed_times() {
        let app = create_test_app();
        let request = employee_request(
            &app,
            "POST",
            "/api/attendance/checkin",
            r#"{"check_in_at": "whenever"}"#,
        );
        let response = app.router.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let request = employee_request(
            &app,
            "POST",
            "/api/attendance/checkout",
            r#"{"check_out_at": "whenever"}"#,
        );
        let response = app.router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_break_start_rejects_check_out_time() {
        let app = create_test_app();
        let request = employee_request(&app, "POST", "/api/attendance/checkin", "{}");
        let response = app.router.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let request = employee_request(
            &app,
            "POST",
            "/api/attendance/breaks/start",
            r#"{"check_out_at": "2026-01-15T09:00:00Z"}"#,
        );
        let response = app.router.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let error: ApiError = serde_json::from_slice(&body).unwrap();
        assert_eq!(error.code, "VALIDATION_ERROR");

        let request = employee_request(&app, "POST", "/api/attendance/breaks/start", "{}");
        let response = app.router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }
}
