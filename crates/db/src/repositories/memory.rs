use std::collections::HashMap;

use tokio::sync::RwLock;

use neuralbites_core::domain::session::SessionId;

use super::{RepositoryError, SessionRepository};

/// Process-local session memory; contents are lost on restart.
#[derive(Default)]
pub struct InMemorySessionRepository {
    slots: RwLock<HashMap<(String, String), String>>,
}

#[cfg(test)]
impl InMemorySessionRepository {
    async fn session_count(&self) -> usize {
        let slots = self.slots.read().await;
        let mut sessions = slots.keys().map(|(session_id, _)| session_id).collect::<Vec<_>>();
        sessions.sort();
        sessions.dedup();
        sessions.len()
    }
}

#[async_trait::async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn get(
        &self,
        session_id: &SessionId,
        key: &str,
    ) -> Result<Option<String>, RepositoryError> {
        let slots = self.slots.read().await;
        Ok(slots.get(&(session_id.0.clone(), key.to_string())).cloned())
    }

    async fn set(
        &self,
        session_id: &SessionId,
        key: &str,
        value: String,
    ) -> Result<(), RepositoryError> {
        let mut slots = self.slots.write().await;
        slots.insert((session_id.0.clone(), key.to_string()), value);
        Ok(())
    }
}
