use common::helper::error_chain_fmt;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::{
    domain::services::scoring::{blend_embeddings, mean_embedding},
    repositories::{
        interaction_postgres_repository::{
            InteractionPostgresRepository, InteractionPostgresRepositoryError,
        },
        property_postgres_repository::{
            PropertyPostgresRepository, PropertyPostgresRepositoryError,
        },
        user_postgres_repository::{UserPostgresRepository, UserPostgresRepositoryError},
    },
};

/// Recomputes a user's taste embedding after a positive swipe.
///
/// The fresh signal is the mean embedding of everything the user has liked
/// or superliked; it is blended into the stored profile with 70/30 weighting
/// (prior/fresh) so recent taste shifts the profile without erasing history.
/// The very first update has no prior and stores the plain mean.
///
/// Having nothing to work with (no likes yet, or none of the liked listings
/// carries an embedding) is not an error: the profile simply stays as it is.
pub struct RefreshUserEmbeddingUseCase {
    interaction_repository: InteractionPostgresRepository,
    property_repository: PropertyPostgresRepository,
    user_repository: UserPostgresRepository,
}

impl RefreshUserEmbeddingUseCase {
    pub fn new(
        interaction_repository: InteractionPostgresRepository,
        property_repository: PropertyPostgresRepository,
        user_repository: UserPostgresRepository,
    ) -> Self {
        Self {
            interaction_repository,
            property_repository,
            user_repository,
        }
    }

    #[tracing::instrument(name = "Refreshing user taste embedding", skip(self, pool))]
    pub async fn execute(
        &self,
        pool: &PgPool,
        user_id: &Uuid,
    ) -> Result<(), RefreshUserEmbeddingError> {
        let liked_ids = self
            .interaction_repository
            .find_liked_property_ids(pool, user_id)
            .await?;
        if liked_ids.is_empty() {
            info!("User has no liked properties yet, keeping profile unchanged");
            return Ok(());
        }

        let liked_properties = self
            .property_repository
            .find_by_ids(pool, &liked_ids)
            .await?;
        let embeddings: Vec<Vec<f32>> = liked_properties
            .into_iter()
            .filter_map(|property| property.embedding)
            .collect();

        let fresh = match mean_embedding(&embeddings) {
            Some(fresh) => fresh,
            None => {
                info!("No embeddings available on liked properties, keeping profile unchanged");
                return Ok(());
            }
        };

        let prior = self.user_repository.find_embedding(pool, user_id).await?;
        let blended = blend_embeddings(prior.as_deref(), &fresh);

        self.user_repository
            .upsert_embedding(pool, user_id, blended)
            .await?;

        info!(
            liked_count = liked_ids.len(),
            embedding_count = embeddings.len(),
            "Updated user taste embedding"
        );
        Ok(())
    }
}

#[derive(thiserror::Error)]
pub enum RefreshUserEmbeddingError {
    #[error(transparent)]
    InteractionRepositoryError(#[from] InteractionPostgresRepositoryError),
    #[error(transparent)]
    PropertyRepositoryError(#[from] PropertyPostgresRepositoryError),
    #[error(transparent)]
    UserRepositoryError(#[from] UserPostgresRepositoryError),
}

impl std::fmt::Debug for RefreshUserEmbeddingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}
