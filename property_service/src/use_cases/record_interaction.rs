use std::sync::Arc;

use anyhow::Context;
use common::helper::error_chain_fmt;
use sqlx::PgPool;
use tracing::{error, info};
use uuid::Uuid;

use crate::{
    domain::entities::interaction::InteractionKind,
    repositories::{
        interaction_postgres_repository::{
            InteractionPostgresRepository, InteractionPostgresRepositoryError,
        },
        property_postgres_repository::{
            PropertyPostgresRepository, PropertyPostgresRepositoryError,
        },
        user_postgres_repository::{UserPostgresRepository, UserPostgresRepositoryError},
    },
    use_cases::refresh_user_embedding::RefreshUserEmbeddingUseCase,
};

/// Outcome of a swipe append
#[derive(Debug, Clone, Copy)]
pub struct InteractionOutcome {
    /// `false` when the (user, property) pair was already in the log and
    /// the append was an idempotent no-op
    pub recorded: bool,
}

/// Records a swipe and, for likes and superlikes, kicks off the taste
/// embedding refresh as a detached task.
///
/// The refresh is a side effect of the swipe: its failure is logged but
/// never blocks or fails the swipe acknowledgment.
pub struct RecordInteractionUseCase {
    property_repository: PropertyPostgresRepository,
    interaction_repository: InteractionPostgresRepository,
    user_repository: UserPostgresRepository,
    refresh_use_case: Arc<RefreshUserEmbeddingUseCase>,
}

impl RecordInteractionUseCase {
    pub fn new(
        property_repository: PropertyPostgresRepository,
        interaction_repository: InteractionPostgresRepository,
        user_repository: UserPostgresRepository,
        refresh_use_case: Arc<RefreshUserEmbeddingUseCase>,
    ) -> Self {
        Self {
            property_repository,
            interaction_repository,
            user_repository,
            refresh_use_case,
        }
    }

    #[tracing::instrument(name = "Recording swipe", skip(self, pool))]
    pub async fn execute(
        &self,
        pool: &PgPool,
        user_id: Uuid,
        property_id: Uuid,
        kind: InteractionKind,
    ) -> Result<InteractionOutcome, RecordInteractionError> {
        let property = self
            .property_repository
            .find_by_id(pool, &property_id)
            .await?;
        if property.is_none() {
            return Err(RecordInteractionError::UnknownProperty(property_id));
        }

        let mut transaction = pool
            .begin()
            .await
            .context("Failed to acquire a Postgres connection from the pool")?;

        self.user_repository
            .ensure_exists(&mut transaction, &user_id)
            .await?;
        let recorded = self
            .interaction_repository
            .append(&mut transaction, &user_id, &property_id, kind)
            .await?;

        transaction
            .commit()
            .await
            .context("Failed to commit SQL transaction storing the swipe")?;

        if recorded {
            info!(%user_id, %property_id, kind = %kind, "Recorded swipe");
        } else {
            info!(%user_id, %property_id, "Swipe already recorded, no-op");
        }

        // Only positive swipes move the taste profile, and only newly
        // recorded ones: a duplicate like must not re-weight the average.
        if recorded && kind.is_positive() {
            let refresh_use_case = self.refresh_use_case.clone();
            let pool = pool.clone();
            tokio::spawn(async move {
                if let Err(error) = refresh_use_case.execute(&pool, &user_id).await {
                    error!(?error, %user_id, "Taste embedding refresh failed");
                }
            });
        }

        Ok(InteractionOutcome { recorded })
    }
}

#[derive(thiserror::Error)]
pub enum RecordInteractionError {
    #[error("Unknown property: {0}")]
    UnknownProperty(Uuid),
    #[error(transparent)]
    PropertyRepositoryError(#[from] PropertyPostgresRepositoryError),
    #[error(transparent)]
    InteractionRepositoryError(#[from] InteractionPostgresRepositoryError),
    #[error(transparent)]
    UserRepositoryError(#[from] UserPostgresRepositoryError),
    #[error(transparent)]
    InternalError(#[from] anyhow::Error),
}

impl std::fmt::Debug for RecordInteractionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}
