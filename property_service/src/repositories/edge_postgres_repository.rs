use common::helper::error_chain_fmt;
use sqlx::PgExecutor;
use uuid::Uuid;

/// A directed similarity edge as stored: "target is similar to source"
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SimilarityEdge {
    pub target_property_id: Uuid,
    pub similarity: f64,
}

/// Repository over the precomputed similarity graph
#[derive(Clone, Default)]
pub struct EdgePostgresRepository {}

impl EdgePostgresRepository {
    pub fn new() -> Self {
        Self {}
    }

    /// Whether any similarity edge exists at all. The strategy ladder uses
    /// this as the availability check for graph-traversal scoring.
    #[tracing::instrument(name = "Checking for similarity edges", skip(self, db_executor))]
    pub async fn has_edges(
        &self,
        db_executor: impl PgExecutor<'_>,
    ) -> Result<bool, EdgePostgresRepositoryError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM property_edge)",
        )
        .fetch_one(db_executor)
        .await?;

        Ok(exists)
    }

    /// Outgoing edges of the given source properties
    #[tracing::instrument(name = "Fetching outgoing similarity edges", skip(self, db_executor))]
    pub async fn edges_from(
        &self,
        db_executor: impl PgExecutor<'_>,
        source_property_ids: &[Uuid],
    ) -> Result<Vec<SimilarityEdge>, EdgePostgresRepositoryError> {
        let edges = sqlx::query_as::<_, SimilarityEdge>(
            r#"
    SELECT target_property_id, similarity FROM property_edge
    WHERE source_property_id = ANY($1)
            "#,
        )
        .bind(source_property_ids)
        .fetch_all(db_executor)
        .await?;

        Ok(edges)
    }
}

#[derive(thiserror::Error)]
pub enum EdgePostgresRepositoryError {
    #[error(transparent)]
    DBError(#[from] sqlx::Error),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl std::fmt::Debug for EdgePostgresRepositoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}
