use chrono::Utc;
use tracing::debug;

use neuralbites_core::domain::session::SessionId;

use super::{RepositoryError, SessionRepository};
use crate::DbPool;

/// SQLite-backed session memory, so remembered locations survive restarts.
pub struct SqlSessionRepository {
    pool: DbPool,
}

impl SqlSessionRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl SessionRepository for SqlSessionRepository {
    async fn get(
        &self,
        session_id: &SessionId,
        key: &str,
    ) -> Result<Option<String>, RepositoryError> {
        let value = sqlx::query_scalar::<_, String>(
            "SELECT value_json FROM session_memory WHERE session_id = ? AND key = ?",
        )
        .bind(session_id.as_str())
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;
        Ok(value)
    }

    async fn set(
        &self,
        session_id: &SessionId,
        key: &str,
        value: String,
    ) -> Result<(), RepositoryError> {
        let now = Utc::now().to_rfc3339();
        sqlx::query(
            "INSERT INTO session_memory (session_id, key, value_json, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?)
             ON CONFLICT (session_id, key)
             DO UPDATE SET value_json = excluded.value_json, updated_at = excluded.updated_at",
        )
        .bind(session_id.as_str())
        .bind(key)
        .bind(&value)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        debug!(session_id = %session_id, key, "session memory slot written");
        Ok(())
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        crate::connection::ping(&self.pool).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use neuralbites_core::domain::location::Location;
    use neuralbites_core::domain::session::SessionId;

    use crate::repositories::{SessionRepository, SqlSessionRepository};
    use crate::{connect_with_settings, migrations, DbPool};

    async fn setup() -> DbPool {
        let pool = connect_with_settings("sqlite::memory:", 1, 5).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");
        pool
    }

    #[tokio::test]
    async fn sql_location_round_trip_and_overwrite() {
        let pool = setup().await;
        let repo = SqlSessionRepository::new(pool.clone());
        let session_id = SessionId::generate();

        assert_eq!(repo.last_location(&session_id).await.expect("read empty"), None);

        repo.remember_location(&session_id, &Location::new(48.85, 2.35, "Paris"))
            .await
            .expect("save paris");
        repo.remember_location(&session_id, &Location::new(41.9, 12.5, "Rome"))
            .await
            .expect("save rome");

        assert_eq!(
            repo.last_location(&session_id).await.expect("read"),
            Some(Location::new(41.9, 12.5, "Rome"))
        );

        let (rows,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM session_memory")
            .fetch_one(&pool)
            .await
            .expect("count rows");
        assert_eq!(rows, 1, "upsert should keep a single row per session slot");

        pool.close().await;
    }

    #[tokio::test]
    async fn ping_fails_once_pool_is_closed() {
        let pool = setup().await;
        let repo = SqlSessionRepository::new(pool.clone());

        repo.ping().await.expect("ping open pool");
        pool.close().await;

        assert!(repo.ping().await.is_err());
    }
}
