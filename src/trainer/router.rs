use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::domain::{ScenarioId, SessionId, TraineeDecision};
use super::repository::{SessionRepository, SessionStoreError};
use super::service::{TrainerError, TrainerService};
use super::session::TrainingSession;
use super::views::{ScenarioDetailView, ScenarioSummaryView, SessionView};

/// Router builder exposing the session actions and read accessors. The
/// rendering layer on the other side of these endpoints owns all
/// presentation; nothing here renders or speaks.
pub fn trainer_router<R>(service: Arc<TrainerService<R>>) -> Router
where
    R: SessionRepository + 'static,
{
    Router::new()
        .route("/api/v1/scenarios", get(list_scenarios_handler::<R>))
        .route(
            "/api/v1/scenarios/:scenario_id",
            get(scenario_detail_handler::<R>),
        )
        .route("/api/v1/protocols", get(protocol_universe_handler::<R>))
        .route("/api/v1/sessions", post(create_session_handler::<R>))
        .route(
            "/api/v1/sessions/:session_id",
            get(session_view_handler::<R>).delete(end_session_handler::<R>),
        )
        .route(
            "/api/v1/sessions/:session_id/scenario",
            post(select_scenario_handler::<R>),
        )
        .route(
            "/api/v1/sessions/:session_id/questions",
            post(submit_question_handler::<R>),
        )
        .route(
            "/api/v1/sessions/:session_id/protocols",
            post(toggle_protocol_handler::<R>),
        )
        .route(
            "/api/v1/sessions/:session_id/protocols/validate",
            post(validate_protocols_handler::<R>),
        )
        .route(
            "/api/v1/sessions/:session_id/hints",
            post(reveal_hints_handler::<R>),
        )
        .route(
            "/api/v1/sessions/:session_id/decision",
            post(record_decision_handler::<R>),
        )
        .route(
            "/api/v1/sessions/:session_id/report",
            get(report_handler::<R>),
        )
        .with_state(service)
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct CreateSessionRequest {
    #[serde(default)]
    scenario_id: Option<ScenarioId>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SelectScenarioRequest {
    scenario_id: ScenarioId,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SubmitQuestionRequest {
    utterance: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ToggleProtocolRequest {
    protocol: String,
    selected: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RecordDecisionRequest {
    label: String,
    #[serde(default)]
    rationale: String,
}

/// Action result paired with the refreshed session view, so renderers can
/// repaint from one response.
#[derive(Debug, Serialize)]
pub(crate) struct ActionResponse<T: Serialize> {
    result: T,
    session: SessionView,
}

pub(crate) async fn create_session_handler<R>(
    State(service): State<Arc<TrainerService<R>>>,
    axum::Json(request): axum::Json<CreateSessionRequest>,
) -> Response
where
    R: SessionRepository + 'static,
{
    match service.start_session(request.scenario_id, Utc::now()) {
        Ok(session) => {
            let view = session_view(&service, &session);
            (StatusCode::CREATED, axum::Json(view)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn session_view_handler<R>(
    State(service): State<Arc<TrainerService<R>>>,
    Path(session_id): Path<String>,
) -> Response
where
    R: SessionRepository + 'static,
{
    match service.session(&SessionId(session_id)) {
        Ok(session) => {
            let view = session_view(&service, &session);
            (StatusCode::OK, axum::Json(view)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn end_session_handler<R>(
    State(service): State<Arc<TrainerService<R>>>,
    Path(session_id): Path<String>,
) -> Response
where
    R: SessionRepository + 'static,
{
    match service.end_session(&SessionId(session_id)) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn select_scenario_handler<R>(
    State(service): State<Arc<TrainerService<R>>>,
    Path(session_id): Path<String>,
    axum::Json(request): axum::Json<SelectScenarioRequest>,
) -> Response
where
    R: SessionRepository + 'static,
{
    match service.select_scenario(&SessionId(session_id), request.scenario_id, Utc::now()) {
        Ok(session) => {
            let view = session_view(&service, &session);
            (StatusCode::OK, axum::Json(view)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn submit_question_handler<R>(
    State(service): State<Arc<TrainerService<R>>>,
    Path(session_id): Path<String>,
    axum::Json(request): axum::Json<SubmitQuestionRequest>,
) -> Response
where
    R: SessionRepository + 'static,
{
    match service.submit_question(&SessionId(session_id), &request.utterance, Utc::now()) {
        Ok((outcome, session)) => {
            let response = ActionResponse {
                result: outcome,
                session: session_view(&service, &session),
            };
            (StatusCode::OK, axum::Json(response)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn toggle_protocol_handler<R>(
    State(service): State<Arc<TrainerService<R>>>,
    Path(session_id): Path<String>,
    axum::Json(request): axum::Json<ToggleProtocolRequest>,
) -> Response
where
    R: SessionRepository + 'static,
{
    match service.toggle_protocol(&SessionId(session_id), &request.protocol, request.selected) {
        Ok(session) => {
            let view = session_view(&service, &session);
            (StatusCode::OK, axum::Json(view)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn validate_protocols_handler<R>(
    State(service): State<Arc<TrainerService<R>>>,
    Path(session_id): Path<String>,
) -> Response
where
    R: SessionRepository + 'static,
{
    match service.validate_protocols(&SessionId(session_id)) {
        Ok((review, session)) => {
            let response = ActionResponse {
                result: review,
                session: session_view(&service, &session),
            };
            (StatusCode::OK, axum::Json(response)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn reveal_hints_handler<R>(
    State(service): State<Arc<TrainerService<R>>>,
    Path(session_id): Path<String>,
) -> Response
where
    R: SessionRepository + 'static,
{
    match service.reveal_hints(&SessionId(session_id)) {
        Ok((outcome, session)) => {
            let response = ActionResponse {
                result: outcome,
                session: session_view(&service, &session),
            };
            (StatusCode::OK, axum::Json(response)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn record_decision_handler<R>(
    State(service): State<Arc<TrainerService<R>>>,
    Path(session_id): Path<String>,
    axum::Json(request): axum::Json<RecordDecisionRequest>,
) -> Response
where
    R: SessionRepository + 'static,
{
    let decision = TraineeDecision {
        label: request.label,
        rationale: request.rationale,
    };

    match service.record_decision(&SessionId(session_id), decision) {
        Ok(session) => {
            let view = session_view(&service, &session);
            (StatusCode::OK, axum::Json(view)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn report_handler<R>(
    State(service): State<Arc<TrainerService<R>>>,
    Path(session_id): Path<String>,
) -> Response
where
    R: SessionRepository + 'static,
{
    match service.debrief(&SessionId(session_id), Utc::now()) {
        Ok(report) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            report,
        )
            .into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn list_scenarios_handler<R>(
    State(service): State<Arc<TrainerService<R>>>,
) -> Response
where
    R: SessionRepository + 'static,
{
    let scenarios: Vec<ScenarioSummaryView> = service
        .catalog()
        .scenarios()
        .map(ScenarioSummaryView::from_record)
        .collect();
    (StatusCode::OK, axum::Json(scenarios)).into_response()
}

pub(crate) async fn scenario_detail_handler<R>(
    State(service): State<Arc<TrainerService<R>>>,
    Path(scenario_id): Path<u32>,
) -> Response
where
    R: SessionRepository + 'static,
{
    match service.catalog().get(ScenarioId(scenario_id)) {
        Some(record) => {
            let view = ScenarioDetailView::from_record(record);
            (StatusCode::OK, axum::Json(view)).into_response()
        }
        None => error_response(TrainerError::UnknownScenario(ScenarioId(scenario_id))),
    }
}

pub(crate) async fn protocol_universe_handler<R>(
    State(service): State<Arc<TrainerService<R>>>,
) -> Response
where
    R: SessionRepository + 'static,
{
    let protocols: Vec<String> = service.catalog().all_protocols().into_iter().collect();
    (StatusCode::OK, axum::Json(protocols)).into_response()
}

fn session_view<R>(service: &TrainerService<R>, session: &TrainingSession) -> SessionView
where
    R: SessionRepository + 'static,
{
    let record = session
        .active_scenario()
        .and_then(|id| service.catalog().get(id));
    SessionView::from_session(session, record)
}

fn error_response(error: TrainerError) -> Response {
    let status = match &error {
        TrainerError::UnknownScenario(_) | TrainerError::UnknownSession(_) => {
            StatusCode::NOT_FOUND
        }
        TrainerError::NoActiveScenario => StatusCode::CONFLICT,
        TrainerError::Store(SessionStoreError::Conflict) => StatusCode::CONFLICT,
        TrainerError::Store(SessionStoreError::NotFound) => StatusCode::NOT_FOUND,
        TrainerError::Store(SessionStoreError::Unavailable(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    let body = axum::Json(json!({ "error": error.to_string() }));
    (status, body).into_response()
}
