//! Chat surface: the page at `/` and the JSON endpoint at `/api/ask`.
//!
//! Callers are identified by a signed session cookie. A missing, unsigned or
//! tampered cookie silently starts a fresh session.

use std::any::Any;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use neuralbites_agent::AgentRuntime;
use neuralbites_core::domain::session::{SessionId, SessionSigner};
use neuralbites_core::errors::{ApplicationError, InterfaceError};
use serde::{Deserialize, Serialize};
use tera::{Context, Tera};
use tower_http::catch_panic::CatchPanicLayer;
use tracing::{error, info, warn};
use uuid::Uuid;

const CHAT_TEMPLATE: &str = "chat.html";

#[derive(Clone)]
pub struct ChatState {
    runtime: Arc<AgentRuntime>,
    signer: Arc<SessionSigner>,
    cookie_name: Arc<str>,
    templates: Arc<Tera>,
}

impl ChatState {
    pub fn new(
        runtime: Arc<AgentRuntime>,
        signer: Arc<SessionSigner>,
        cookie_name: &str,
    ) -> Result<Self, tera::Error> {
        Ok(Self {
            runtime,
            signer,
            cookie_name: Arc::from(cookie_name),
            templates: Arc::new(templates()?),
        })
    }
}

pub fn templates() -> Result<Tera, tera::Error> {
    let mut tera = Tera::default();
    tera.add_raw_template(CHAT_TEMPLATE, include_str!("../../../templates/chat.html"))?;
    Ok(tera)
}

#[derive(Debug, Deserialize)]
struct AskRequest {
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Serialize)]
struct ErrorReply {
    reply: &'static str,
    correlation_id: String,
}

pub fn router(state: ChatState) -> Router {
    Router::new().route("/", get(index)).route("/api/ask", post(ask)).with_state(state)
}

/// Turns a handler panic into the same 500 body as any other internal failure.
pub fn with_panic_guard(router: Router) -> Router {
    router.layer(CatchPanicLayer::custom(panic_response))
}

async fn index(State(state): State<ChatState>) -> Response {
    let mut context = Context::new();
    context.insert("default_location", &state.runtime.default_location().display_name);
    context.insert("nlu_enabled", &state.runtime.nlu_enabled());

    match state.templates.render(CHAT_TEMPLATE, &context) {
        Ok(page) => Html(page).into_response(),
        Err(error) => {
            error!(
                event_name = "server.chat.render_failed",
                error = %error,
                "chat page failed to render"
            );
            (StatusCode::INTERNAL_SERVER_ERROR, Html("<h1>Chat page unavailable</h1>".to_string()))
                .into_response()
        }
    }
}

async fn ask(State(state): State<ChatState>, headers: HeaderMap, body: Bytes) -> Response {
    let correlation_id = Uuid::new_v4().to_string();
    let (session_id, issued) =
        match session_from_headers(&headers, &state.cookie_name, &state.signer) {
            Some(session_id) => (session_id, false),
            None => (SessionId::generate(), true),
        };

    let mut response = match parse_message(&body) {
        Some(message) => answer(&state, &session_id, &message, &correlation_id).await,
        None => {
            warn!(
                event_name = "server.ask.rejected",
                correlation_id = %correlation_id,
                session_id = %session_id,
                body_bytes = body.len(),
                "request body is malformed or has no message"
            );
            error_response(
                StatusCode::BAD_REQUEST,
                InterfaceError::bad_request("missing or malformed message", &correlation_id),
            )
        }
    };

    if issued {
        attach_session_cookie(&mut response, &state.cookie_name, &state.signer.sign(&session_id));
    }
    response
}

async fn answer(
    state: &ChatState,
    session_id: &SessionId,
    message: &str,
    correlation_id: &str,
) -> Response {
    info!(
        event_name = "server.ask.received",
        correlation_id,
        session_id = %session_id,
        message_chars = message.chars().count(),
        "chat message received"
    );

    match state.runtime.handle_message(session_id, message).await {
        Ok(reply) => (StatusCode::OK, Json(reply)).into_response(),
        Err(agent_error) => {
            error!(
                event_name = "server.ask.failed",
                correlation_id,
                session_id = %session_id,
                error = %agent_error,
                "chat turn failed"
            );
            let interface = ApplicationError::from(agent_error).into_interface(correlation_id);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, interface)
        }
    }
}

fn parse_message(body: &[u8]) -> Option<String> {
    let request: AskRequest = serde_json::from_slice(body).ok()?;
    request.message.map(|message| message.trim().to_string()).filter(|message| !message.is_empty())
}

fn session_from_headers(
    headers: &HeaderMap,
    cookie_name: &str,
    signer: &SessionSigner,
) -> Option<SessionId> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|raw| raw.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .filter(|(name, _)| *name == cookie_name)
        .find_map(|(_, token)| signer.verify(token.trim()))
}

fn attach_session_cookie(response: &mut Response, cookie_name: &str, token: &str) {
    let cookie = format!("{cookie_name}={token}; Path=/; HttpOnly; SameSite=Lax");
    match HeaderValue::from_str(&cookie) {
        Ok(value) => {
            response.headers_mut().append(SET_COOKIE, value);
        }
        Err(error) => {
            warn!(
                event_name = "server.session.cookie_rejected",
                error = %error,
                "session cookie could not be encoded"
            );
        }
    }
}

fn error_response(status: StatusCode, error: InterfaceError) -> Response {
    let body =
        ErrorReply { reply: error.user_message(), correlation_id: error.correlation_id().to_string() };
    (status, Json(body)).into_response()
}

fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("non-string panic payload");
    let correlation_id = Uuid::new_v4().to_string();

    error!(
        event_name = "server.request.panicked",
        correlation_id = %correlation_id,
        detail,
        "request handler panicked"
    );

    error_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        ApplicationError::Internal(detail.to_string()).into_interface(correlation_id),
    )
}
