use chrono::{DateTime, Utc};
use common::helper::error_chain_fmt;
use sqlx::PgExecutor;
use uuid::Uuid;

use crate::domain::entities::interaction::{Interaction, InteractionKind};

/// Swipe-log repository implemented using Postgres
///
/// The log is the sole source of "already seen" state; the recommendation
/// scorer only ever reads from it.
#[derive(Clone, Default)]
pub struct InteractionPostgresRepository {}

impl InteractionPostgresRepository {
    pub fn new() -> Self {
        Self {}
    }

    /// Records a swipe. At most one interaction exists per (user, property):
    /// a duplicate append is an idempotent no-op, not an error.
    ///
    /// Returns whether a new row was actually written.
    #[tracing::instrument(name = "Recording interaction in database", skip(self, db_executor))]
    pub async fn append(
        &self,
        db_executor: impl PgExecutor<'_>,
        user_id: &Uuid,
        property_id: &Uuid,
        kind: InteractionKind,
    ) -> Result<bool, InteractionPostgresRepositoryError> {
        let result = sqlx::query(
            r#"
    INSERT INTO interaction (user_id, property_id, kind, created_at)
    VALUES ($1, $2, $3, $4)
    ON CONFLICT (user_id, property_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(property_id)
        .bind(kind)
        .bind(Utc::now())
        .execute(db_executor)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// All interactions of a user restricted to the given kinds,
    /// most recent first
    #[tracing::instrument(name = "Fetching user interactions", skip(self, db_executor))]
    pub async fn find_by_user(
        &self,
        db_executor: impl PgExecutor<'_>,
        user_id: &Uuid,
        kinds: &[InteractionKind],
    ) -> Result<Vec<Interaction>, InteractionPostgresRepositoryError> {
        let kind_names: Vec<String> = kinds.iter().map(|k| k.as_str().to_string()).collect();

        let records = sqlx::query_as::<_, InteractionRecord>(
            r#"
    SELECT user_id, property_id, kind, created_at FROM interaction
    WHERE user_id = $1 AND kind::text = ANY($2)
    ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .bind(kind_names)
        .fetch_all(db_executor)
        .await?;

        Ok(records.into_iter().map(Interaction::from).collect())
    }

    /// Ids of the properties a user liked or superliked, used as graph
    /// traversal sources and as the input of the taste-embedding refresh
    #[tracing::instrument(name = "Fetching liked property ids", skip(self, db_executor))]
    pub async fn find_liked_property_ids(
        &self,
        db_executor: impl PgExecutor<'_>,
        user_id: &Uuid,
    ) -> Result<Vec<Uuid>, InteractionPostgresRepositoryError> {
        let ids = sqlx::query_scalar::<_, Uuid>(
            r#"
    SELECT property_id FROM interaction
    WHERE user_id = $1 AND kind IN ('like', 'superlike')
    ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(db_executor)
        .await?;

        Ok(ids)
    }
}

#[derive(sqlx::FromRow)]
struct InteractionRecord {
    user_id: Uuid,
    property_id: Uuid,
    kind: InteractionKind,
    created_at: DateTime<Utc>,
}

impl From<InteractionRecord> for Interaction {
    fn from(record: InteractionRecord) -> Self {
        Interaction {
            user_id: record.user_id,
            property_id: record.property_id,
            kind: record.kind,
            created_at: record.created_at,
        }
    }
}

#[derive(thiserror::Error)]
pub enum InteractionPostgresRepositoryError {
    #[error(transparent)]
    DBError(#[from] sqlx::Error),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl std::fmt::Debug for InteractionPostgresRepositoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}
