use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::Utc;
use neuralbites_db::SessionRepository;
use serde::Serialize;
use tracing::warn;

#[derive(Clone)]
pub struct HealthState {
    sessions: Arc<dyn SessionRepository>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthCheck {
    pub status: &'static str,
    pub detail: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: HealthCheck,
    pub session_store: HealthCheck,
    pub checked_at: String,
}

pub fn router(sessions: Arc<dyn SessionRepository>) -> Router {
    Router::new().route("/health", get(health)).with_state(HealthState { sessions })
}

pub async fn health(State(state): State<HealthState>) -> (StatusCode, Json<HealthResponse>) {
    let session_store = session_store_check(state.sessions.as_ref()).await;
    let ready = session_store.status == "ready";

    let payload = HealthResponse {
        status: if ready { "ready" } else { "degraded" },
        service: HealthCheck {
            status: "ready",
            detail: "neuralbites-server runtime initialized".to_string(),
        },
        session_store,
        checked_at: Utc::now().to_rfc3339(),
    };

    let status_code = if ready { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (status_code, Json(payload))
}

async fn session_store_check(sessions: &dyn SessionRepository) -> HealthCheck {
    match sessions.ping().await {
        Ok(()) => HealthCheck { status: "ready", detail: "session store answered".to_string() },
        Err(error) => {
            warn!(
                event_name = "server.health.session_store_degraded",
                correlation_id = "health",
                error = %error,
                "session store ping failed"
            );
            HealthCheck { status: "degraded", detail: format!("session store ping failed: {error}") }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{extract::State, http::StatusCode, Json};
    use neuralbites_db::{
        connect_with_settings, InMemorySessionRepository, SessionRepository, SqlSessionRepository,
    };

    use crate::health::{health, HealthState};

    #[tokio::test]
    async fn health_is_ready_with_memory_sessions() {
        let sessions: Arc<dyn SessionRepository> = Arc::new(InMemorySessionRepository::default());

        let (status, Json(payload)) = health(State(HealthState { sessions })).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload.status, "ready");
        assert_eq!(payload.session_store.status, "ready");
        assert_eq!(payload.service.status, "ready");
    }

    #[tokio::test]
    async fn health_is_unavailable_when_session_database_is_closed() {
        let pool = connect_with_settings("sqlite::memory:", 1, 5).await.expect("pool should connect");
        pool.close().await;
        let sessions: Arc<dyn SessionRepository> = Arc::new(SqlSessionRepository::new(pool));

        let (status, Json(payload)) = health(State(HealthState { sessions })).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(payload.status, "degraded");
        assert_eq!(payload.session_store.status, "degraded");
        assert_eq!(payload.service.status, "ready");
    }
}
