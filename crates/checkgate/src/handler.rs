//! HTTP routes: map requests onto session lifecycle operations.
//!
//! Two route families are mounted side by side:
//!
//! ```text
//! event-scoped                                         single-session
//! POST /events/{eventId}/startSession                  POST /startSession
//! POST /events/{eventId}/sessions/{id}/generateCode    POST /sessions/{id}/generateCode
//! GET  /events/{eventId}/sessions/{id}/code            GET  /code?sessionId={id}
//! POST /events/{eventId}/sessions/{id}/stop            POST /sessions/{id}/stop
//! ```
//!
//! The handlers only parse input and shape output. Whether a route works
//! without an event id is decided by the configured key strategy, not here.

use std::time::Duration;

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;

use checkgate_protocol::{
    CodeQuery, CodeResponse, ErrorBody, EventId, HealthResponse, MessageResponse, ProtocolError,
    SessionId, StartSessionRequest, StartSessionResponse,
};
use checkgate_session::{SessionError, SessionLifecycleManager, StartOptions};
use checkgate_store::KeyValueStore;

/// Builds the router with every route, CORS and request tracing.
///
/// Requests and responses are logged at `info`, so the default filter
/// shows one line per request and one per response.
pub(crate) fn router<S: KeyValueStore>(manager: SessionLifecycleManager<S>) -> Router {
    Router::new()
        .route("/health", get(health::<S>))
        // Event-scoped
        .route("/events/{event_id}/startSession", post(start_event_session::<S>))
        .route(
            "/events/{event_id}/sessions/{session_id}/generateCode",
            post(rotate_event_code::<S>),
        )
        .route(
            "/events/{event_id}/sessions/{session_id}/code",
            get(get_event_code::<S>),
        )
        .route(
            "/events/{event_id}/sessions/{session_id}/stop",
            post(stop_event_session::<S>),
        )
        // Single-session
        .route("/startSession", post(start_session::<S>))
        .route("/sessions/{session_id}/generateCode", post(rotate_code::<S>))
        .route("/code", get(get_code::<S>))
        .route("/sessions/{session_id}/stop", post(stop_session::<S>))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(CorsLayer::permissive())
        .with_state(manager)
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// A [`SessionError`] on its way to becoming an HTTP response.
#[derive(Debug)]
pub(crate) struct ApiError(SessionError);

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        Self(err)
    }
}

impl From<ProtocolError> for ApiError {
    fn from(err: ProtocolError) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(ErrorBody::new(self.0.public_message()))).into_response()
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

// ---------------------------------------------------------------------------
// Event-scoped routes
// ---------------------------------------------------------------------------

async fn start_event_session<S: KeyValueStore>(
    State(manager): State<SessionLifecycleManager<S>>,
    Path(event_id): Path<String>,
    body: Bytes,
) -> ApiResult<StartSessionResponse> {
    let event_id = EventId::parse(&event_id)?;
    start(&manager, Some(event_id), &body).await
}

async fn rotate_event_code<S: KeyValueStore>(
    State(manager): State<SessionLifecycleManager<S>>,
    Path((event_id, session_id)): Path<(String, String)>,
) -> ApiResult<CodeResponse> {
    let (event_id, session_id) = scoped_ids(&event_id, &session_id)?;
    let code = manager.rotate_code(&session_id, Some(&event_id)).await?;
    Ok(Json(CodeResponse { code }))
}

async fn get_event_code<S: KeyValueStore>(
    State(manager): State<SessionLifecycleManager<S>>,
    Path((event_id, session_id)): Path<(String, String)>,
) -> ApiResult<CodeResponse> {
    let (event_id, session_id) = scoped_ids(&event_id, &session_id)?;
    let code = manager.get_code(&session_id, Some(&event_id)).await?;
    Ok(Json(CodeResponse { code }))
}

async fn stop_event_session<S: KeyValueStore>(
    State(manager): State<SessionLifecycleManager<S>>,
    Path((event_id, session_id)): Path<(String, String)>,
) -> ApiResult<MessageResponse> {
    let (event_id, session_id) = scoped_ids(&event_id, &session_id)?;
    manager.stop_session(&session_id, Some(&event_id)).await?;
    Ok(Json(MessageResponse::stopped()))
}

// ---------------------------------------------------------------------------
// Single-session routes
// ---------------------------------------------------------------------------

async fn start_session<S: KeyValueStore>(
    State(manager): State<SessionLifecycleManager<S>>,
    body: Bytes,
) -> ApiResult<StartSessionResponse> {
    start(&manager, None, &body).await
}

async fn rotate_code<S: KeyValueStore>(
    State(manager): State<SessionLifecycleManager<S>>,
    Path(session_id): Path<String>,
) -> ApiResult<CodeResponse> {
    let session_id = SessionId::parse(&session_id)?;
    let code = manager.rotate_code(&session_id, None).await?;
    Ok(Json(CodeResponse { code }))
}

async fn get_code<S: KeyValueStore>(
    State(manager): State<SessionLifecycleManager<S>>,
    Query(query): Query<CodeQuery>,
) -> ApiResult<CodeResponse> {
    let session_id = query.session_id()?;
    let code = manager.get_code(&session_id, None).await?;
    Ok(Json(CodeResponse { code }))
}

async fn stop_session<S: KeyValueStore>(
    State(manager): State<SessionLifecycleManager<S>>,
    Path(session_id): Path<String>,
) -> ApiResult<MessageResponse> {
    let session_id = SessionId::parse(&session_id)?;
    manager.stop_session(&session_id, None).await?;
    Ok(Json(MessageResponse::stopped()))
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

async fn health<S: KeyValueStore>(
    State(manager): State<SessionLifecycleManager<S>>,
) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        active_sessions: manager.active_sessions(),
    })
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn start<S: KeyValueStore>(
    manager: &SessionLifecycleManager<S>,
    event_id: Option<EventId>,
    body: &[u8],
) -> ApiResult<StartSessionResponse> {
    let request = parse_start_request(body)?;
    let options = StartOptions {
        rotation_period: request.duration.map(Duration::from_secs),
    };

    let started = manager.start_session(event_id, options).await?;

    Ok(Json(StartSessionResponse {
        session_id: started.session_id,
        code: started.code,
        duration: started.rotation_period.map(|p| p.as_secs()),
    }))
}

/// The start body is optional: an empty body means "no options".
fn parse_start_request(body: &[u8]) -> Result<StartSessionRequest, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(StartSessionRequest::default());
    }
    serde_json::from_slice(body).map_err(|e| {
        tracing::debug!(error = %e, "rejecting malformed start body");
        ApiError(SessionError::InvalidRequest("invalid request body".into()))
    })
}

fn scoped_ids(event_id: &str, session_id: &str) -> Result<(EventId, SessionId), ApiError> {
    Ok((EventId::parse(event_id)?, SessionId::parse(session_id)?))
}
