use std::sync::Arc;

use neuralbites_agent::{AgentRuntime, UpstreamError};
use neuralbites_core::config::{AppConfig, ConfigError, SessionBackend};
use neuralbites_core::domain::session::{SessionKeyError, SessionSigner};
use neuralbites_db::{
    connect_with_settings, migrations, InMemorySessionRepository, SessionRepository,
    SqlSessionRepository,
};
use secrecy::ExposeSecret;
use thiserror::Error;
use tracing::{info, warn};

pub struct Application {
    pub config: AppConfig,
    pub runtime: Arc<AgentRuntime>,
    pub sessions: Arc<dyn SessionRepository>,
    pub signer: Arc<SessionSigner>,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("database connection failed: {0}")]
    DatabaseConnect(#[source] sqlx::Error),
    #[error("database migration failed: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),
    #[error("session secret rejected: {0}")]
    SessionKey(#[from] SessionKeyError),
    #[error("upstream client setup failed: {0}")]
    Upstream(#[from] UpstreamError),
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        session_backend = config.session.backend.as_str(),
        nlu_enabled = config.nlu.enabled,
        "starting application bootstrap"
    );

    let sessions = session_repository(&config).await?;
    let signer = Arc::new(session_signer(&config)?);

    let runtime = AgentRuntime::from_config(&config, sessions.clone())?;

    info!(
        event_name = "system.bootstrap.ready",
        correlation_id = "bootstrap",
        default_location = %config.search.default_location.display_name,
        "agent runtime assembled"
    );

    Ok(Application { config, runtime: Arc::new(runtime), sessions, signer })
}

async fn session_repository(
    config: &AppConfig,
) -> Result<Arc<dyn SessionRepository>, BootstrapError> {
    match config.session.backend {
        SessionBackend::Memory => Ok(Arc::new(InMemorySessionRepository::default())),
        SessionBackend::Sqlite => {
            let pool = connect_with_settings(
                &config.session.database_url,
                config.session.max_connections,
                config.session.timeout_secs,
            )
            .await
            .map_err(BootstrapError::DatabaseConnect)?;
            info!(
                event_name = "system.bootstrap.database_connected",
                correlation_id = "bootstrap",
                "session database connection established"
            );

            migrations::run_pending(&pool).await.map_err(BootstrapError::Migration)?;
            info!(
                event_name = "system.bootstrap.migrations_applied",
                correlation_id = "bootstrap",
                "session database migrations applied"
            );

            Ok(Arc::new(SqlSessionRepository::new(pool)))
        }
    }
}

fn session_signer(config: &AppConfig) -> Result<SessionSigner, SessionKeyError> {
    match &config.session.secret {
        Some(secret) => SessionSigner::new(secret.expose_secret().as_bytes()),
        None => {
            warn!(
                event_name = "system.bootstrap.ephemeral_session_key",
                correlation_id = "bootstrap",
                "session.secret is not set; using a random key, sessions will not survive a restart"
            );
            Ok(SessionSigner::random())
        }
    }
}
