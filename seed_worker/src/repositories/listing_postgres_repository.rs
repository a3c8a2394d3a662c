use chrono::Utc;
use common::helper::error_chain_fmt;
use pgvector::Vector;
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use crate::domain::entities::listing::Listing;

/// Write side of the seed pipeline: listings with their embeddings, and the
/// precomputed similarity edges
#[derive(Clone, Default)]
pub struct ListingPostgresRepository {}

impl ListingPostgresRepository {
    pub fn new() -> Self {
        Self {}
    }

    #[tracing::instrument(name = "Saving seeded listing in database", skip(self, db_executor, listing, embedding))]
    pub async fn insert_listing(
        &self,
        db_executor: impl PgExecutor<'_>,
        listing: &Listing,
        embedding: Vec<f32>,
    ) -> Result<(), ListingPostgresRepositoryError> {
        sqlx::query(
            r#"
    INSERT INTO property (id, address, city, state, zip_code, price, bedrooms, bathrooms,
                          square_feet, lot_size, property_type, year_built, cap_rate,
                          description, images, latitude, longitude, embedding, created_at)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11::property_type, $12, $13,
            $14, $15, $16, $17, $18, $19)
            "#,
        )
        .bind(listing.id)
        .bind(&listing.address)
        .bind(&listing.city)
        .bind(&listing.state)
        .bind(&listing.zip_code)
        .bind(listing.price)
        .bind(listing.bedrooms)
        .bind(listing.bathrooms)
        .bind(listing.square_feet)
        .bind(listing.lot_size)
        .bind(listing.property_type)
        .bind(listing.year_built)
        .bind(listing.cap_rate)
        .bind(&listing.description)
        .bind(&listing.images)
        .bind(listing.latitude)
        .bind(listing.longitude)
        .bind(Vector::from(embedding))
        .bind(Utc::now())
        .execute(db_executor)
        .await?;

        Ok(())
    }

    /// Every stored listing embedding, for pairwise edge computation
    #[tracing::instrument(name = "Fetching all listing embeddings", skip(self, db_executor))]
    pub async fn fetch_embeddings(
        &self,
        db_executor: impl PgExecutor<'_>,
    ) -> Result<Vec<(Uuid, Vec<f32>)>, ListingPostgresRepositoryError> {
        let rows = sqlx::query_as::<_, (Uuid, Option<Vector>)>(
            "SELECT id, embedding FROM property WHERE embedding IS NOT NULL",
        )
        .fetch_all(db_executor)
        .await?;

        Ok(rows
            .into_iter()
            .filter_map(|(id, embedding)| Some((id, embedding?.to_vec())))
            .collect())
    }

    /// Persists a batch of similarity edges; re-seeding over an existing
    /// graph is a no-op thanks to the conflict clause
    #[tracing::instrument(name = "Saving similarity edges", skip(self, pool, edges), fields(edge_count = edges.len()))]
    pub async fn insert_edges(
        &self,
        pool: &PgPool,
        edges: &[(Uuid, Uuid, f64)],
    ) -> Result<(), ListingPostgresRepositoryError> {
        for (source, target, similarity) in edges {
            sqlx::query(
                r#"
    INSERT INTO property_edge (source_property_id, target_property_id, similarity)
    VALUES ($1, $2, $3)
    ON CONFLICT (source_property_id, target_property_id) DO NOTHING
                "#,
            )
            .bind(source)
            .bind(target)
            .bind(similarity)
            .execute(pool)
            .await?;
        }

        Ok(())
    }
}

#[derive(thiserror::Error)]
pub enum ListingPostgresRepositoryError {
    #[error(transparent)]
    DBError(#[from] sqlx::Error),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl std::fmt::Debug for ListingPostgresRepositoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}
