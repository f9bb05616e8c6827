use async_trait::async_trait;
use thiserror::Error;

use neuralbites_core::domain::location::Location;
use neuralbites_core::domain::session::SessionId;

pub mod memory;
pub mod session;

pub use memory::InMemorySessionRepository;
pub use session::SqlSessionRepository;

/// Key of the single slot the chat flow keeps per session.
pub const LAST_LOCATION_KEY: &str = "last_location";

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
}

/// Session-scoped key/value memory.
///
/// Values are opaque strings (JSON for typed slots). There is no expiry and no
/// delete: a slot is only ever overwritten.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn get(&self, session_id: &SessionId, key: &str)
        -> Result<Option<String>, RepositoryError>;

    async fn set(&self, session_id: &SessionId, key: &str, value: String)
        -> Result<(), RepositoryError>;

    /// Backend liveness check used by health and doctor.
    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }

    async fn last_location(
        &self,
        session_id: &SessionId,
    ) -> Result<Option<Location>, RepositoryError> {
        match self.get(session_id, LAST_LOCATION_KEY).await? {
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|error| RepositoryError::Decode(format!("{LAST_LOCATION_KEY}: {error}"))),
            None => Ok(None),
        }
    }

    async fn remember_location(
        &self,
        session_id: &SessionId,
        location: &Location,
    ) -> Result<(), RepositoryError> {
        let value = serde_json::to_string(location)
            .map_err(|error| RepositoryError::Decode(format!("{LAST_LOCATION_KEY}: {error}")))?;
        self.set(session_id, LAST_LOCATION_KEY, value).await
    }
}
