//! HTTP request handlers for the time & attendance API.
//!
//! Every handler runs one engine operation on the blocking pool and
//! answers with the operation's result as JSON.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use crate::engine::Engine;
use crate::error::{EngineError, EngineResult};
use crate::lifecycle::SheetAction;
use crate::models::{DailyTimeCard, TimeRecord, YearMonth};
use crate::repository::InMemoryRepository;

use super::request::{
    ActorRequest, ApprovalRequest, AssignmentRequest, ConflictDateQuery, ContractAction,
    PrefillRequest, TimeCardRequest, TransitionCheckRequest,
};
use super::response::{ApiError, ApiErrorResponse};
use super::state::AppState;

type SharedEngine = Arc<Engine<InMemoryRepository>>;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/timecards", post(save_time_card))
        .route("/timecards/punches", post(record_punches))
        .route("/timecards/prefill", post(prefill_time_card))
        .route("/timecards/:id", delete(delete_time_card))
        .route("/timecards/:id/recompute", post(recompute_time_card))
        .route(
            "/staff-contracts/:id/months/:year/:month",
            get(find_month),
        )
        .route("/months/:id/timecards", get(list_time_cards))
        .route("/months/:id/recompute", post(recompute_month))
        .route("/months/:id/:action", post(transition_month))
        .route("/approvals", post(submit_approval))
        .route("/approvals/:id/:action", post(transition_approval))
        .route("/assignments", post(create_assignment))
        .route("/assignments/validate", post(validate_assignment))
        .route("/assignments/:id", delete(detach_assignment))
        .route(
            "/assignments/:id/employment-conditions/issue",
            post(issue_employment_conditions),
        )
        .route(
            "/assignments/:id/employment-conditions/confirm",
            post(confirm_employment_conditions),
        )
        .route("/assignments/:id/print-history", get(print_history))
        .route("/staff-contracts/:id", delete(delete_staff_contract))
        .route("/staff-contracts/:id/:action", post(transition_staff_contract))
        .route("/client-contracts/:id", delete(delete_client_contract))
        .route(
            "/client-contracts/:id/transition-check",
            post(check_client_transition),
        )
        .route("/staff/:id/conflict-date", get(conflict_date))
        .with_state(state)
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        Json(body),
    )
        .into_response()
}

/// Maps a body rejection onto the API's error shape.
fn rejection_response(correlation_id: Uuid, rejection: JsonRejection) -> Response {
    let error = match rejection {
        JsonRejection::JsonDataError(err) => {
            let body_text = err.body_text();
            warn!(
                correlation_id = %correlation_id,
                error = %body_text,
                "JSON data error"
            );
            if body_text.contains("missing field") {
                ApiError::validation_error(body_text)
            } else {
                ApiError::malformed_json(body_text)
            }
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
    json_response(StatusCode::BAD_REQUEST, error)
}

/// Runs an engine operation off the async runtime and renders its result.
async fn run<T, F>(state: AppState, correlation_id: Uuid, operation: &'static str, f: F) -> Response
where
    T: Serialize + Send + 'static,
    F: FnOnce(&Engine<InMemoryRepository>) -> EngineResult<T> + Send + 'static,
{
    let engine: SharedEngine = state.engine();
    let started = Instant::now();
    let joined = tokio::task::spawn_blocking(move || f(&engine)).await;
    let duration_us = started.elapsed().as_micros() as u64;

    match joined {
        Ok(Ok(value)) => {
            info!(
                correlation_id = %correlation_id,
                operation,
                duration_us,
                "Request completed"
            );
            json_response(StatusCode::OK, value)
        }
        Ok(Err(err)) => {
            warn!(
                correlation_id = %correlation_id,
                operation,
                error = %err,
                "Request failed"
            );
            let api_error: ApiErrorResponse = err.into();
            json_response(api_error.status, api_error.error)
        }
        Err(join_error) => {
            warn!(
                correlation_id = %correlation_id,
                operation,
                error = %join_error,
                "Engine task aborted"
            );
            json_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::new("INTERNAL_ERROR", "The operation did not complete"),
            )
        }
    }
}

/// Opens a request: logs it and unwraps the JSON body.
fn begin<T>(
    operation: &'static str,
    payload: Result<Json<T>, JsonRejection>,
) -> Result<(Uuid, T), Response> {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, operation, "Processing request");
    match payload {
        Ok(Json(body)) => Ok((correlation_id, body)),
        Err(rejection) => Err(rejection_response(correlation_id, rejection)),
    }
}

fn begin_without_body(operation: &'static str) -> Uuid {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, operation, "Processing request");
    correlation_id
}

/// Handler for `POST /timecards`.
async fn save_time_card(
    State(state): State<AppState>,
    payload: Result<Json<TimeCardRequest>, JsonRejection>,
) -> Response {
    let (correlation_id, request) = match begin("save_daily", payload) {
        Ok(opened) => opened,
        Err(response) => return response,
    };
    let card: DailyTimeCard = request.into();
    run(state, correlation_id, "save_daily", move |engine| {
        engine.save_daily(card)
    })
    .await
}

/// Handler for `POST /timecards/punches`.
async fn record_punches(
    State(state): State<AppState>,
    payload: Result<Json<TimeRecord>, JsonRejection>,
) -> Response {
    let (correlation_id, record) = match begin("record_punches", payload) {
        Ok(opened) => opened,
        Err(response) => return response,
    };
    run(state, correlation_id, "record_punches", move |engine| {
        engine.record_punches(record)
    })
    .await
}

/// Handler for `POST /timecards/prefill`.
async fn prefill_time_card(
    State(state): State<AppState>,
    payload: Result<Json<PrefillRequest>, JsonRejection>,
) -> Response {
    let (correlation_id, request) = match begin("prefill_from_slot", payload) {
        Ok(opened) => opened,
        Err(response) => return response,
    };
    run(state, correlation_id, "prefill_from_slot", move |engine| {
        engine.prefill_from_slot(request.contract_id, request.work_date, &request.slot)
    })
    .await
}

async fn delete_time_card(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    let correlation_id = begin_without_body("delete_daily");
    run(state, correlation_id, "delete_daily", move |engine| {
        engine.delete_daily(id)
    })
    .await
}

async fn recompute_time_card(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    let correlation_id = begin_without_body("recompute_daily");
    run(state, correlation_id, "recompute_daily", move |engine| {
        engine.recompute_daily(id)
    })
    .await
}

/// Handler for `GET /staff-contracts/:id/months/:year/:month`.
async fn find_month(
    State(state): State<AppState>,
    Path((contract_id, year, month)): Path<(Uuid, i32, u32)>,
) -> Response {
    let correlation_id = begin_without_body("find_month");
    run(state, correlation_id, "find_month", move |engine| {
        let year_month = YearMonth::new(year, month)?;
        engine
            .find_month(contract_id, year_month)?
            .ok_or_else(|| EngineError::not_found("monthly time-sheet", year_month))
    })
    .await
}

async fn list_time_cards(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    let correlation_id = begin_without_body("list_daily");
    run(state, correlation_id, "list_daily", move |engine| {
        engine.list_daily(id)
    })
    .await
}

async fn recompute_month(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    let correlation_id = begin_without_body("recompute_month");
    run(state, correlation_id, "recompute_month", move |engine| {
        engine.recompute_month(id)
    })
    .await
}

/// Handler for `POST /months/:id/:action`.
async fn transition_month(
    State(state): State<AppState>,
    Path((id, action)): Path<(Uuid, SheetAction)>,
    payload: Result<Json<ActorRequest>, JsonRejection>,
) -> Response {
    let (correlation_id, request) = match begin("transition_month", payload) {
        Ok(opened) => opened,
        Err(response) => return response,
    };
    if action == SheetAction::Reject && request.reason.is_none() {
        return json_response(
            StatusCode::BAD_REQUEST,
            ApiError::validation_error("a rejection needs a reason"),
        );
    }
    run(state, correlation_id, "transition_month", move |engine| {
        let actor = request.actor.as_str();
        match action {
            SheetAction::Submit => engine.submit_month(id, actor),
            SheetAction::Approve => engine.approve_month(id, actor),
            SheetAction::Reject => {
                engine.reject_month(id, actor, request.reason.as_deref().unwrap_or_default())
            }
            SheetAction::Reopen => engine.reopen_month(id, actor),
        }
    })
    .await
}

/// Handler for `POST /approvals`.
async fn submit_approval(
    State(state): State<AppState>,
    payload: Result<Json<ApprovalRequest>, JsonRejection>,
) -> Response {
    let (correlation_id, request) = match begin("submit_approval", payload) {
        Ok(opened) => opened,
        Err(response) => return response,
    };
    run(state, correlation_id, "submit_approval", move |engine| {
        engine.submit_approval(
            request.staff_id,
            request.period_start,
            request.period_end,
            request.closing_date,
        )
    })
    .await
}

async fn transition_approval(
    State(state): State<AppState>,
    Path((id, action)): Path<(Uuid, SheetAction)>,
) -> Response {
    let correlation_id = begin_without_body("transition_approval");
    run(state, correlation_id, "transition_approval", move |engine| {
        engine.transition_approval(id, action)
    })
    .await
}

/// Handler for `POST /assignments/validate`.
async fn validate_assignment(
    State(state): State<AppState>,
    payload: Result<Json<AssignmentRequest>, JsonRejection>,
) -> Response {
    let (correlation_id, request) = match begin("validate_assignment", payload) {
        Ok(opened) => opened,
        Err(response) => return response,
    };
    run(state, correlation_id, "validate_assignment", move |engine| {
        engine.validate_assignment(request.client_contract_id, request.staff_contract_id)
    })
    .await
}

/// Handler for `POST /assignments`.
async fn create_assignment(
    State(state): State<AppState>,
    payload: Result<Json<AssignmentRequest>, JsonRejection>,
) -> Response {
    let (correlation_id, request) = match begin("create_assignment", payload) {
        Ok(opened) => opened,
        Err(response) => return response,
    };
    run(state, correlation_id, "create_assignment", move |engine| {
        engine.create_assignment(request.client_contract_id, request.staff_contract_id)
    })
    .await
}

async fn detach_assignment(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    let correlation_id = begin_without_body("detach_assignment");
    run(state, correlation_id, "detach_assignment", move |engine| {
        engine.detach_assignment(id).map(|()| json!({ "detached": id }))
    })
    .await
}

async fn issue_employment_conditions(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    payload: Result<Json<ActorRequest>, JsonRejection>,
) -> Response {
    let (correlation_id, request) = match begin("issue_employment_conditions", payload) {
        Ok(opened) => opened,
        Err(response) => return response,
    };
    run(state, correlation_id, "issue_employment_conditions", move |engine| {
        engine.issue_employment_conditions(id, &request.actor)
    })
    .await
}

async fn confirm_employment_conditions(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    payload: Result<Json<ActorRequest>, JsonRejection>,
) -> Response {
    let (correlation_id, request) = match begin("confirm_employment_conditions", payload) {
        Ok(opened) => opened,
        Err(response) => return response,
    };
    run(state, correlation_id, "confirm_employment_conditions", move |engine| {
        engine.confirm_employment_conditions(id, &request.actor)
    })
    .await
}

async fn print_history(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    let correlation_id = begin_without_body("print_history");
    run(state, correlation_id, "print_history", move |engine| {
        engine.print_history(id)
    })
    .await
}

/// Handler for `POST /staff-contracts/:id/:action`.
async fn transition_staff_contract(
    State(state): State<AppState>,
    Path((id, action)): Path<(Uuid, ContractAction)>,
    payload: Result<Json<ActorRequest>, JsonRejection>,
) -> Response {
    let (correlation_id, request) = match begin("transition_staff_contract", payload) {
        Ok(opened) => opened,
        Err(response) => return response,
    };
    run(state, correlation_id, "transition_staff_contract", move |engine| {
        let actor = request.actor.as_str();
        match action {
            ContractAction::RequestApproval => engine.request_staff_approval(id, actor),
            ContractAction::Approve => engine.approve_staff_contract(id, actor),
            ContractAction::Issue => engine.issue_staff_contract(id, actor),
            ContractAction::Unissue => engine.unissue_staff_contract(id, actor),
            ContractAction::RevokeApproval => engine.revoke_approval(id, actor),
            ContractAction::Confirm => engine.confirm_staff_contract(id, actor),
        }
    })
    .await
}

async fn delete_staff_contract(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    let correlation_id = begin_without_body("delete_staff_contract");
    run(state, correlation_id, "delete_staff_contract", move |engine| {
        engine
            .delete_staff_contract(id)
            .map(|()| json!({ "deleted": id }))
    })
    .await
}

async fn delete_client_contract(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    let correlation_id = begin_without_body("delete_client_contract");
    run(state, correlation_id, "delete_client_contract", move |engine| {
        engine
            .delete_client_contract(id)
            .map(|()| json!({ "deleted": id }))
    })
    .await
}

/// Handler for `POST /client-contracts/:id/transition-check`.
async fn check_client_transition(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    payload: Result<Json<TransitionCheckRequest>, JsonRejection>,
) -> Response {
    let (correlation_id, request) = match begin("validate_client_transition", payload) {
        Ok(opened) => opened,
        Err(response) => return response,
    };
    run(state, correlation_id, "validate_client_transition", move |engine| {
        engine.validate_client_transition(id, request.target)
    })
    .await
}

/// Handler for `GET /staff/:id/conflict-date?client_name=...`.
async fn conflict_date(
    State(state): State<AppState>,
    Path(staff_id): Path<Uuid>,
    Query(query): Query<ConflictDateQuery>,
) -> Response {
    let correlation_id = begin_without_body("conflict_date");
    run(state, correlation_id, "conflict_date", move |engine| {
        engine.conflict_date(staff_id, &query.client_name)
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use chrono::NaiveDate;
    use tower::ServiceExt;

    use crate::engine::{DailyOutcome, EngineSettings};
    use crate::models::{StaffContract, WorkType};
    use crate::policy::{OvertimePattern, PolicyVariant};

    struct TestApp {
        state: AppState,
        contract_id: Uuid,
    }

    fn create_test_app() -> TestApp {
        let repo = InMemoryRepository::new();
        let mut pattern = OvertimePattern::new("Premium", PolicyVariant::Premium);
        pattern.shared.daily_overtime_enabled = true;
        repo.insert_policy(pattern.clone()).unwrap();

        let mut contract = StaffContract::draft(
            "kt",
            Uuid::new_v4(),
            "April",
            NaiveDate::from_ymd_opt(2023, 4, 1).unwrap(),
            Some(NaiveDate::from_ymd_opt(2023, 9, 30).unwrap()),
        );
        contract.overtime_pattern_id = Some(pattern.id);
        let contract_id = contract.id;
        repo.insert_staff_contract(contract).unwrap();

        let settings = EngineSettings::new("kt", 9).unwrap();
        TestApp {
            state: AppState::new(Engine::new(repo, settings)),
            contract_id,
        }
    }

    fn post_json(uri: &str, body: String) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("Content-Type", "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    async fn body_bytes(response: Response) -> axum::body::Bytes {
        axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_save_time_card_returns_outcome() {
        let app = create_test_app();
        let router = create_router(app.state);
        let body = json!({
            "contract_id": app.contract_id,
            "work_date": "2023-04-03",
            "work_type": "work",
            "start": { "time": "09:00:00" },
            "end": { "time": "19:00:00" },
            "break_minutes": 60
        });

        let response = router
            .oneshot(post_json("/timecards", body.to_string()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let outcome: DailyOutcome = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(outcome.card.work_minutes, 540);
        assert_eq!(outcome.card.overtime_minutes, 60);
        assert_eq!(outcome.month.totals.total_work_days, 1);
        assert_eq!(outcome.card.work_type, WorkType::Work);
    }

    #[tokio::test]
    async fn test_malformed_json_returns_400() {
        let app = create_test_app();
        let router = create_router(app.state);

        let response = router
            .oneshot(post_json("/timecards", "{invalid json".to_string()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let error: ApiError = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(error.code, "MALFORMED_JSON");
    }

    #[tokio::test]
    async fn test_missing_field_returns_validation_error() {
        let app = create_test_app();
        let router = create_router(app.state);
        let body = json!({ "contract_id": app.contract_id, "work_type": "work" });

        let response = router
            .oneshot(post_json("/timecards", body.to_string()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let error: ApiError = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(error.code, "VALIDATION_ERROR");
        assert!(error.message.contains("work_date"));
    }

    #[tokio::test]
    async fn test_work_card_without_times_returns_invalid_time_card() {
        let app = create_test_app();
        let router = create_router(app.state);
        let body = json!({
            "contract_id": app.contract_id,
            "work_date": "2023-04-03",
            "work_type": "work"
        });

        let response = router
            .oneshot(post_json("/timecards", body.to_string()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let error: ApiError = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(error.code, "INVALID_TIME_CARD");
    }

    #[tokio::test]
    async fn test_unknown_contract_returns_404() {
        let app = create_test_app();
        let router = create_router(app.state);
        let uri = format!("/staff-contracts/{}/approve", Uuid::new_v4());

        let response = router
            .oneshot(post_json(&uri, json!({ "actor": "manager" }).to_string()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_issue_draft_contract_returns_conflict() {
        let app = create_test_app();
        let router = create_router(app.state);
        let uri = format!("/staff-contracts/{}/issue", app.contract_id);

        let response = router
            .oneshot(post_json(&uri, json!({ "actor": "manager" }).to_string()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let error: ApiError = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(error.code, "STATE_TRANSITION_FORBIDDEN");
    }

    #[tokio::test]
    async fn test_reject_without_reason_returns_400() {
        let app = create_test_app();
        let router = create_router(app.state);
        let uri = format!("/months/{}/reject", Uuid::new_v4());

        let response = router
            .oneshot(post_json(&uri, json!({ "actor": "manager" }).to_string()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_find_missing_month_returns_404() {
        let app = create_test_app();
        let router = create_router(app.state);
        let uri = format!("/staff-contracts/{}/months/2023/4", app.contract_id);

        let response = router
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
