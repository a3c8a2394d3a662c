use std::net::TcpListener;
use std::sync::Arc;

use actix_web::{
    dev::Server,
    web::{self, Data},
    App, HttpServer,
};
use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::info;
use tracing_actix_web::TracingLogger;

use crate::{
    configuration::{DatabaseSettings, Settings},
    repositories::{
        edge_postgres_repository::EdgePostgresRepository,
        interaction_postgres_repository::InteractionPostgresRepository,
        property_postgres_repository::PropertyPostgresRepository,
        user_postgres_repository::UserPostgresRepository,
    },
    routes::{
        create_property, get_property, get_recommendations, health_check, list_matches,
        list_properties, record_interaction,
    },
    use_cases::{
        get_recommendations::GetRecommendationsUseCase,
        record_interaction::RecordInteractionUseCase,
        refresh_user_embedding::RefreshUserEmbeddingUseCase,
    },
};

/// Holds the newly built server, and some useful properties
pub struct Application {
    server: Server,
    port: u16,
}

#[derive(thiserror::Error, Debug)]
pub enum ApplicationBuildError {
    #[error(transparent)]
    IOError(#[from] std::io::Error),
}

impl Application {
    /// # Parameters
    /// - nb_workers: number of actix-web workers
    ///   if `None`, the number of available physical CPUs is used as the worker count.
    #[tracing::instrument(name = "Building application")]
    pub async fn build(
        settings: Settings,
        nb_workers: Option<usize>,
    ) -> Result<Self, ApplicationBuildError> {
        let connection_pool = get_connection_pool(&settings.database);

        let address = format!(
            "{}:{}",
            settings.application.host, settings.application.port
        );
        let listener = TcpListener::bind(address)?;
        let port = listener.local_addr().unwrap().port();

        let server = run(listener, settings, nb_workers, connection_pool)?;

        Ok(Self { server, port })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// This function only returns when the application is stopped
    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> {
        info!("Running server ...");
        self.server.await
    }
}

/// listener: the consumer binds their own port
///
/// TracingLogger middleware: helps collecting telemetry data.
/// It generates a unique identifier for each incoming request: `request_id`.
///
/// # Parameters
/// - nb_workers: number of actix-web workers
///   if `None`, the number of available physical CPUs is used as the worker count.
pub fn run(
    listener: TcpListener,
    settings: Settings,
    nb_workers: Option<usize>,
    db_pool: PgPool,
) -> Result<Server, std::io::Error> {
    // Wraps the connection to a db in smart pointers
    let db_pool = Data::new(db_pool);

    // Repositories are stateless; wrapping them in `actix_web::Data` (`Arc`)
    // lets handlers and use cases share the same instances across threads.
    let property_repository = PropertyPostgresRepository::new();
    let interaction_repository = InteractionPostgresRepository::new();
    let edge_repository = EdgePostgresRepository::new();
    let user_repository = UserPostgresRepository::new();

    let refresh_use_case = Arc::new(RefreshUserEmbeddingUseCase::new(
        interaction_repository.clone(),
        property_repository.clone(),
        user_repository.clone(),
    ));
    let record_interaction_use_case = Data::new(RecordInteractionUseCase::new(
        property_repository.clone(),
        interaction_repository.clone(),
        user_repository.clone(),
        refresh_use_case,
    ));
    let recommendations_use_case = Data::new(GetRecommendationsUseCase::new(
        property_repository.clone(),
        interaction_repository.clone(),
        edge_repository,
        user_repository,
        settings.recommendation.clone(),
    ));

    let property_repository = Data::new(property_repository);
    let interaction_repository = Data::new(interaction_repository);
    let recommendation_settings = Data::new(settings.recommendation);

    // `move` to capture variables from the surrounding environment
    let server = HttpServer::new(move || {
        info!("Starting actix-web worker");

        App::new()
            .wrap(TracingLogger::default())
            .route("/health_check", web::get().to(health_check))
            .route("/properties", web::post().to(create_property))
            .route("/properties", web::get().to(list_properties))
            .route("/properties/{id}", web::get().to(get_property))
            .route("/interactions", web::post().to(record_interaction))
            .route("/users/{user_id}/matches", web::get().to(list_matches))
            .route("/recommendations", web::get().to(get_recommendations))
            .app_data(db_pool.clone())
            .app_data(property_repository.clone())
            .app_data(interaction_repository.clone())
            .app_data(record_interaction_use_case.clone())
            .app_data(recommendations_use_case.clone())
            .app_data(recommendation_settings.clone())
    })
    .listen(listener)?;

    // If no workers were set, use the actix-web settings (number of workers = number of physical CPUs)
    if let Some(nb_workers) = nb_workers {
        return Ok(server.workers(nb_workers).run());
    }

    // No await
    Ok(server.run())
}

pub fn get_connection_pool(settings: &DatabaseSettings) -> PgPool {
    PgPoolOptions::new()
        .acquire_timeout(std::time::Duration::from_secs(2))
        .connect_lazy_with(settings.with_db())
}
