//! REST endpoints for the wizard, chat, and export.
//!
//! Sessions live in process memory for their lifetime; nothing persists
//! across a restart. Each session is owned exclusively by its id.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use uuid::Uuid;

use crate::error::{Error, WizardError};
use crate::profile::{CustomerProfile, Persona, PersonaAnswers};
use crate::recommend::Requester;
use crate::wizard::{ChatEntry, ChatReply, IntakeAnswers, Session, SessionStep};

/// Shared state for the web routes.
#[derive(Clone)]
pub struct WebState {
    sessions: Arc<RwLock<HashMap<Uuid, Session>>>,
    requester: Arc<Requester>,
}

impl WebState {
    pub fn new(requester: Arc<Requester>) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            requester,
        }
    }
}

/// Error surface for the REST handlers.
enum ApiError {
    NotFound,
    Validation(WizardError),
    Upstream(String),
}

impl From<WizardError> for ApiError {
    fn from(e: WizardError) -> Self {
        Self::Validation(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::NotFound => (StatusCode::NOT_FOUND, "Session not found".to_string()),
            Self::Validation(e) => (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()),
            Self::Upstream(message) => (StatusCode::BAD_GATEWAY, message),
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

/// Full session snapshot returned by most endpoints.
#[derive(Serialize)]
struct SessionView {
    id: Uuid,
    step: SessionStep,
    profile: CustomerProfile,
    recommendation: Option<String>,
    transcript: Vec<ChatEntry>,
}

impl SessionView {
    fn of(id: Uuid, session: &Session) -> Self {
        Self {
            id,
            step: session.step(),
            profile: session.profile().clone(),
            recommendation: session.recommendation().map(str::to_string),
            transcript: session.transcript().to_vec(),
        }
    }
}

#[derive(Deserialize)]
struct PersonaChoice {
    persona: Persona,
}

#[derive(Deserialize)]
struct ChatInput {
    message: String,
}

#[derive(Serialize)]
struct ChatView {
    kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
}

impl From<ChatReply> for ChatView {
    fn from(reply: ChatReply) -> Self {
        match reply {
            ChatReply::Refreshed => Self {
                kind: "refreshed",
                content: None,
            },
            ChatReply::ProfileUpdated => Self {
                kind: "profile_updated",
                content: None,
            },
            ChatReply::Answer(text) => Self {
                kind: "answer",
                content: Some(text),
            },
            ChatReply::Failed(message) => Self {
                kind: "failed",
                content: Some(message),
            },
        }
    }
}

/// POST /api/sessions
async fn create_session(State(state): State<WebState>) -> impl IntoResponse {
    let id = Uuid::new_v4();
    state.sessions.write().await.insert(id, Session::new());
    tracing::info!(%id, "Session created");
    (StatusCode::CREATED, Json(serde_json::json!({ "id": id })))
}

/// GET /api/sessions/{id}
async fn get_session(
    State(state): State<WebState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, ApiError> {
    let sessions = state.sessions.read().await;
    let session = sessions.get(&id).ok_or(ApiError::NotFound)?;
    Ok(Json(SessionView::of(id, session)))
}

/// POST /api/sessions/{id}/begin
async fn begin(
    State(state): State<WebState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, ApiError> {
    let mut sessions = state.sessions.write().await;
    let session = sessions.get_mut(&id).ok_or(ApiError::NotFound)?;
    session.begin()?;
    Ok(Json(SessionView::of(id, session)))
}

/// POST /api/sessions/{id}/intake
async fn submit_intake(
    State(state): State<WebState>,
    Path(id): Path<Uuid>,
    Json(answers): Json<IntakeAnswers>,
) -> Result<Json<SessionView>, ApiError> {
    let mut sessions = state.sessions.write().await;
    let session = sessions.get_mut(&id).ok_or(ApiError::NotFound)?;
    session.submit_intake(&answers)?;
    Ok(Json(SessionView::of(id, session)))
}

/// POST /api/sessions/{id}/persona
async fn select_persona(
    State(state): State<WebState>,
    Path(id): Path<Uuid>,
    Json(choice): Json<PersonaChoice>,
) -> Result<Json<SessionView>, ApiError> {
    let mut sessions = state.sessions.write().await;
    let session = sessions.get_mut(&id).ok_or(ApiError::NotFound)?;
    session.select_persona(choice.persona)?;
    Ok(Json(SessionView::of(id, session)))
}

/// POST /api/sessions/{id}/followup
async fn submit_followup(
    State(state): State<WebState>,
    Path(id): Path<Uuid>,
    Json(answers): Json<PersonaAnswers>,
) -> Result<Json<SessionView>, ApiError> {
    let mut sessions = state.sessions.write().await;
    let session = sessions.get_mut(&id).ok_or(ApiError::NotFound)?;
    session.submit_followup(answers)?;
    Ok(Json(SessionView::of(id, session)))
}

/// POST /api/sessions/{id}/generate
///
/// Runs the recommendation request. On upstream failure the session has
/// already been rolled back one step; the 502 body carries the message.
async fn generate(
    State(state): State<WebState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, ApiError> {
    let mut sessions = state.sessions.write().await;
    let session = sessions.get_mut(&id).ok_or(ApiError::NotFound)?;
    match session.generate(&state.requester).await {
        Ok(()) => Ok(Json(SessionView::of(id, session))),
        Err(Error::Wizard(e)) => Err(ApiError::Validation(e)),
        Err(e) => Err(ApiError::Upstream(e.to_string())),
    }
}

/// POST /api/sessions/{id}/chat
async fn chat(
    State(state): State<WebState>,
    Path(id): Path<Uuid>,
    Json(input): Json<ChatInput>,
) -> Result<Json<ChatView>, ApiError> {
    let mut sessions = state.sessions.write().await;
    let session = sessions.get_mut(&id).ok_or(ApiError::NotFound)?;
    let reply = session.chat(&state.requester, &input.message).await?;
    Ok(Json(reply.into()))
}

/// POST /api/sessions/{id}/reset
async fn reset(
    State(state): State<WebState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, ApiError> {
    let mut sessions = state.sessions.write().await;
    let session = sessions.get_mut(&id).ok_or(ApiError::NotFound)?;
    session.reset();
    Ok(Json(SessionView::of(id, session)))
}

/// GET /api/sessions/{id}/export
///
/// Plain-text report: the raw profile dump and the raw recommendation text.
async fn export(
    State(state): State<WebState>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let sessions = state.sessions.read().await;
    let session = sessions.get(&id).ok_or(ApiError::NotFound)?;
    let body = format!(
        "Customer Profile:\n{}\n\nRecommendations:\n{}\n",
        session.profile().report(),
        session.recommendation().unwrap_or("(not generated)"),
    );
    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"customer_recommendations.txt\"",
            ),
        ],
        body,
    )
        .into_response())
}

/// Build the web router.
pub fn routes(state: WebState) -> Router {
    Router::new()
        .route("/api/sessions", post(create_session))
        .route("/api/sessions/{id}", get(get_session))
        .route("/api/sessions/{id}/begin", post(begin))
        .route("/api/sessions/{id}/intake", post(submit_intake))
        .route("/api/sessions/{id}/persona", post(select_persona))
        .route("/api/sessions/{id}/followup", post(submit_followup))
        .route("/api/sessions/{id}/generate", post(generate))
        .route("/api/sessions/{id}/chat", post(chat))
        .route("/api/sessions/{id}/reset", post(reset))
        .route("/api/sessions/{id}/export", get(export))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
