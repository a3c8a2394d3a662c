use common::helper::error_chain_fmt;
use pgvector::Vector;
use sqlx::PgExecutor;
use uuid::Uuid;

/// User repository implemented using Postgres
///
/// Only the aggregated taste embedding lives here; identity is handled by
/// the outer gateway.
#[derive(Clone, Default)]
pub struct UserPostgresRepository {}

impl UserPostgresRepository {
    pub fn new() -> Self {
        Self {}
    }

    /// Creates the user row if it does not exist yet (no embedding).
    /// Users are materialized lazily on their first swipe.
    #[tracing::instrument(name = "Ensuring user exists in database", skip(self, db_executor))]
    pub async fn ensure_exists(
        &self,
        db_executor: impl PgExecutor<'_>,
        user_id: &Uuid,
    ) -> Result<(), UserPostgresRepositoryError> {
        sqlx::query("INSERT INTO app_user (id) VALUES ($1) ON CONFLICT (id) DO NOTHING")
            .bind(user_id)
            .execute(db_executor)
            .await?;

        Ok(())
    }

    /// The stored taste embedding, if the user has one
    #[tracing::instrument(name = "Fetching user embedding", skip(self, db_executor))]
    pub async fn find_embedding(
        &self,
        db_executor: impl PgExecutor<'_>,
        user_id: &Uuid,
    ) -> Result<Option<Vec<f32>>, UserPostgresRepositoryError> {
        let embedding = sqlx::query_scalar::<_, Option<Vector>>(
            "SELECT embedding FROM app_user WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(db_executor)
        .await?;

        Ok(embedding.flatten().map(|v| v.to_vec()))
    }

    /// Last write wins; concurrent swipes need no further conflict handling
    #[tracing::instrument(name = "Storing user embedding", skip(self, db_executor, embedding))]
    pub async fn upsert_embedding(
        &self,
        db_executor: impl PgExecutor<'_>,
        user_id: &Uuid,
        embedding: Vec<f32>,
    ) -> Result<(), UserPostgresRepositoryError> {
        sqlx::query(
            r#"
    INSERT INTO app_user (id, embedding) VALUES ($1, $2)
    ON CONFLICT (id) DO UPDATE SET embedding = EXCLUDED.embedding
            "#,
        )
        .bind(user_id)
        .bind(Vector::from(embedding))
        .execute(db_executor)
        .await?;

        Ok(())
    }
}

#[derive(thiserror::Error)]
pub enum UserPostgresRepositoryError {
    #[error(transparent)]
    DBError(#[from] sqlx::Error),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl std::fmt::Debug for UserPostgresRepositoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}
