use rand::thread_rng;
use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::info;

use crate::{
    configuration::{DatabaseSettings, SeedSettings, Settings},
    domain::services::{
        bert_embeddings::{BertEmbeddingsService, BertEmbeddingsServiceError},
        edges::build_edges,
        listing_generator::generate_listings,
        market::markets,
    },
    repositories::listing_postgres_repository::{
        ListingPostgresRepository, ListingPostgresRepositoryError,
    },
};

/// The batch seeding application: generates demo listings per market,
/// embeds and persists them, then precomputes the similarity graph.
pub struct Application {
    pool: PgPool,
    embeddings_service: BertEmbeddingsService,
    listing_repository: ListingPostgresRepository,
    seed_settings: SeedSettings,
}

impl Application {
    #[tracing::instrument(name = "Building worker application", skip(settings))]
    pub async fn build(settings: Settings) -> Result<Self, ApplicationError> {
        let pool = get_connection_pool(&settings.database);

        // The model download/load happens lazily on the runner thread
        let embeddings_service = BertEmbeddingsService::new();

        Ok(Self {
            pool,
            embeddings_service,
            listing_repository: ListingPostgresRepository::new(),
            seed_settings: settings.seed,
        })
    }

    /// Runs the whole batch, then returns
    pub async fn run_until_stopped(self) -> Result<(), ApplicationError> {
        let per_city = self.seed_settings.listings_per_city;
        let mut total = 0usize;

        for market in markets() {
            info!(city = market.city, "Seeding market");

            let listings = {
                let mut rng = thread_rng();
                generate_listings(market, per_city, &mut rng)
            };

            let texts: Vec<String> = listings.iter().map(|l| l.embedding_text()).collect();
            let embeddings = self.embeddings_service.generate_embeddings(texts).await?;

            for (listing, embedding) in listings.iter().zip(embeddings) {
                self.listing_repository
                    .insert_listing(&self.pool, listing, embedding)
                    .await?;
            }

            total += listings.len();
            info!(
                city = market.city,
                seeded = listings.len(),
                "Market seeded"
            );
        }

        let edge_count = self.build_similarity_graph().await?;

        info!(
            total_listings = total,
            total_edges = edge_count,
            "Seeding completed"
        );
        Ok(())
    }

    /// Pairwise cosine over every stored embedding; an edge is persisted for
    /// each pair above the configured threshold
    #[tracing::instrument(name = "Building similarity graph", skip(self))]
    async fn build_similarity_graph(&self) -> Result<usize, ApplicationError> {
        let embeddings = self.listing_repository.fetch_embeddings(&self.pool).await?;
        info!(listing_count = embeddings.len(), "Fetched embeddings");

        let edges = build_edges(&embeddings, self.seed_settings.edge_similarity_threshold);
        self.listing_repository
            .insert_edges(&self.pool, &edges)
            .await?;

        Ok(edges.len())
    }
}

pub fn get_connection_pool(settings: &DatabaseSettings) -> PgPool {
    PgPoolOptions::new()
        .acquire_timeout(std::time::Duration::from_secs(2))
        .connect_lazy_with(settings.with_db())
}

#[derive(thiserror::Error, Debug)]
pub enum ApplicationError {
    #[error(transparent)]
    IOError(#[from] std::io::Error),
    #[error(transparent)]
    EmbeddingsServiceError(#[from] BertEmbeddingsServiceError),
    #[error(transparent)]
    ListingRepositoryError(#[from] ListingPostgresRepositoryError),
}
