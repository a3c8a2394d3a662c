use std::time::Duration;

use chrono::Utc;
use common::telemetry::{get_tracing_subscriber, init_tracing_subscriber};
use once_cell::sync::Lazy;
use pgvector::Vector;
use property_service::{
    configuration::{get_configuration, DatabaseSettings},
    startup::{get_connection_pool, Application},
};
use serde_json::json;
use sqlx::{Connection, Executor, PgConnection, PgPool};
use tokio::time::sleep;
use tracing::info;
use uuid::Uuid;

// Ensures that the `tracing` stack is only initialized once using `once_cell`
static TRACING: Lazy<()> = Lazy::new(|| {
    let default_filter_level = "info".to_string();
    let subscriber_name = "test".to_string();

    // We cannot assign the output of `get_tracing_subscriber` to a variable based on the value of `TEST_LOG`
    // because the sink is part of the type returned by `get_tracing_subscriber`, therefore they are not the
    // same type. We could work around it, but this is the most straight-forward way of moving forward.
    if std::env::var("TEST_LOG").is_ok() {
        let subscriber =
            get_tracing_subscriber(subscriber_name, default_filter_level, std::io::stdout);
        init_tracing_subscriber(subscriber);
    } else {
        let subscriber =
            get_tracing_subscriber(subscriber_name, default_filter_level, std::io::sink);
        init_tracing_subscriber(subscriber);
    };
});

pub struct TestApp {
    pub address: String,
    pub port: u16,
    /// Database connection used to assert checks thanks to db queries
    pub db_pool: PgPool,
    pub api_client: reqwest::Client,
}

/// A test API client / test suite
impl TestApp {
    /// Creates a listing through the API and returns its id
    pub async fn seed_property(&self, body: &serde_json::Value) -> Uuid {
        let response = self
            .api_client
            .post(&format!("{}/properties", &self.address))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(
            201,
            response.status().as_u16(),
            "Seeding a property should succeed"
        );

        let created: serde_json::Value = response.json().await.expect("Failed to parse response");
        created["id"]
            .as_str()
            .and_then(|raw| Uuid::parse_str(raw).ok())
            .expect("Created property response carries no id")
    }

    pub async fn record_interaction(
        &self,
        user_id: &Uuid,
        property_id: &Uuid,
        kind: &str,
    ) -> reqwest::Response {
        self.api_client
            .post(&format!("{}/interactions", &self.address))
            .json(&json!({
                "user_id": user_id,
                "property_id": property_id,
                "kind": kind,
            }))
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Raw query-string access to the recommendations endpoint
    pub async fn get_recommendations(&self, query: &str) -> reqwest::Response {
        self.api_client
            .get(&format!("{}/recommendations?{}", &self.address, query))
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Recommendations for a user with no extra parameters, parsed as JSON
    pub async fn get_recommendation_list(&self, query: &str) -> Vec<serde_json::Value> {
        let response = self.get_recommendations(query).await;
        assert_eq!(200, response.status().as_u16());
        response.json().await.expect("Failed to parse response")
    }

    /// Inserts a similarity edge directly, as the offline seed worker would
    pub async fn seed_edge(&self, source: &Uuid, target: &Uuid, similarity: f64) {
        sqlx::query(
            "INSERT INTO property_edge (source_property_id, target_property_id, similarity) \
             VALUES ($1, $2, $3)",
        )
        .bind(source)
        .bind(target)
        .bind(similarity)
        .execute(&self.db_pool)
        .await
        .expect("Failed to seed edge");
    }

    /// Stores a taste embedding directly, bypassing the refresh pipeline
    pub async fn seed_user_embedding(&self, user_id: &Uuid, embedding: Vec<f32>) {
        sqlx::query(
            "INSERT INTO app_user (id, embedding) VALUES ($1, $2) \
             ON CONFLICT (id) DO UPDATE SET embedding = EXCLUDED.embedding",
        )
        .bind(user_id)
        .bind(Vector::from(embedding))
        .execute(&self.db_pool)
        .await
        .expect("Failed to seed user embedding");
    }

    pub async fn fetch_user_embedding(&self, user_id: &Uuid) -> Option<Vec<f32>> {
        let embedding = sqlx::query_scalar::<_, Option<Vector>>(
            "SELECT embedding FROM app_user WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.db_pool)
        .await
        .expect("Failed to fetch user embedding");

        embedding.flatten().map(|v| v.to_vec())
    }

    /// Waits for the detached embedding-refresh task to produce an embedding
    /// satisfying `predicate`.
    ///
    /// # Panics
    /// Panics after ~5 seconds without a matching embedding.
    pub async fn wait_for_user_embedding(
        &self,
        user_id: &Uuid,
        predicate: impl Fn(&[f32]) -> bool,
    ) -> Vec<f32> {
        for _ in 0..50 {
            if let Some(embedding) = self.fetch_user_embedding(user_id).await {
                if predicate(&embedding) {
                    return embedding;
                }
            }
            sleep(Duration::from_millis(100)).await;
        }

        panic!("Timed out waiting for the user embedding refresh");
    }
}

/// A valid listing body the tests tweak per scenario
pub fn sample_property_body() -> serde_json::Value {
    json!({
        "address": "123 W Randolph St",
        "city": "Chicago",
        "state": "IL",
        "zip_code": "60601",
        "price": 350_000.0,
        "bedrooms": 3,
        "bathrooms": 2.0,
        "square_feet": 1500,
        "property_type": "single_family",
        "year_built": 1995,
        "description": "Bright three bedroom close to the Loop",
    })
}

/// Launches the server as a background task
/// When a tokio runtime is shut down all tasks spawned on it are dropped.
/// tokio::test spins up a new runtime at the beginning of each test case and they shut down at the end of each test case.
/// Therefore no need to implement any clean up logic to avoid leaking resources between test runs
pub async fn spawn_app() -> TestApp {
    // The first time `initialize` is invoked the code in `TRACING` is executed.
    // All other invocations will instead skip execution.
    Lazy::force(&TRACING);

    // Randomizes configuration to ensure test isolation
    let configuration = {
        let mut c = get_configuration().expect("Failed to read configuration.");
        // Uses a different database for each test case
        c.database.database_name = format!(
            "test_{}_{}",
            Utc::now().format("%Y-%m-%d_%H-%M-%S"),
            Uuid::new_v4()
        );
        // Uses a random OS port: port 0 is special-cased at the OS level:
        // trying to bind port 0 will trigger an OS scan for an available port which will then be bound to the application.
        c.application.port = 0;
        c
    };

    // Creates and migrates the database
    set_up_database(&configuration.database).await;

    // Only one actix-web worker is needed for integration tests
    let application = Application::build(configuration.clone(), Some(1))
        .await
        .expect("Failed to build application.");
    let application_port = application.port();

    // Launches the application as a background task
    let _ = tokio::spawn(application.run_until_stopped());

    TestApp {
        address: format!("http://127.0.0.1:{}", application_port),
        port: application_port,
        db_pool: get_connection_pool(&configuration.database),
        api_client: reqwest::Client::new(),
    }
}

/// Creates and migrates a database for integration test
async fn set_up_database(config: &DatabaseSettings) -> PgPool {
    // Creates database
    let mut connection = PgConnection::connect_with(&config.without_db())
        .await
        .expect("Failed to connect to Postgres");

    connection
        .execute(format!(r#"CREATE DATABASE "{}";"#, config.database_name).as_str())
        .await
        .expect("Failed to create database.");

    info!("Created database: {}", config.database_name);

    let connection_pool = PgPool::connect_with(config.with_db())
        .await
        .expect("Failed to connect to Postgres.");

    // Migrates database
    sqlx::migrate!("../migrations")
        .run(&connection_pool)
        .await
        .expect("Failed to migrate the database");

    info!("Migration done for database: {}", config.database_name);

    connection_pool
}
