use chrono::{DateTime, Utc};
use common::helper::error_chain_fmt;
use pgvector::Vector;
use sqlx::{PgExecutor, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::domain::entities::{
    filter::PropertyFilter,
    property::{Property, PropertyType},
};

const PROPERTY_COLUMNS: &str = "id, address, city, state, zip_code, price, bedrooms, bathrooms, \
     square_feet, lot_size, property_type, year_built, cap_rate, description, images, \
     latitude, longitude, embedding, created_at";

/// Listing repository implemented using Postgres
///
/// Embeddings are persisted as pgvector columns; the rest of the service
/// only ever sees plain `Vec<f32>` arrays.
#[derive(Clone, Default)]
pub struct PropertyPostgresRepository {}

impl PropertyPostgresRepository {
    pub fn new() -> Self {
        Self {}
    }

    #[tracing::instrument(name = "Saving new property in database", skip(self, db_executor, property))]
    pub async fn insert(
        &self,
        db_executor: impl PgExecutor<'_>,
        property: &Property,
    ) -> Result<(), PropertyPostgresRepositoryError> {
        sqlx::query(
            r#"
    INSERT INTO property (id, address, city, state, zip_code, price, bedrooms, bathrooms,
                          square_feet, lot_size, property_type, year_built, cap_rate,
                          description, images, latitude, longitude, embedding, created_at)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19)
            "#,
        )
        .bind(property.id)
        .bind(&property.address)
        .bind(&property.city)
        .bind(&property.state)
        .bind(&property.zip_code)
        .bind(property.price)
        .bind(property.bedrooms)
        .bind(property.bathrooms)
        .bind(property.square_feet)
        .bind(property.lot_size)
        .bind(property.property_type)
        .bind(property.year_built)
        .bind(property.cap_rate)
        .bind(&property.description)
        .bind(&property.images)
        .bind(property.latitude)
        .bind(property.longitude)
        .bind(property.embedding.clone().map(Vector::from))
        .bind(property.created_at)
        .execute(db_executor)
        .await?;

        Ok(())
    }

    #[tracing::instrument(name = "Fetching property by id", skip(self, db_executor))]
    pub async fn find_by_id(
        &self,
        db_executor: impl PgExecutor<'_>,
        id: &Uuid,
    ) -> Result<Option<Property>, PropertyPostgresRepositoryError> {
        let record = sqlx::query_as::<_, PropertyRecord>(&format!(
            "SELECT {} FROM property WHERE id = $1",
            PROPERTY_COLUMNS
        ))
        .bind(id)
        .fetch_optional(db_executor)
        .await?;

        Ok(record.map(Property::from))
    }

    /// Fetches a batch of properties by id; the caller owns the ordering
    #[tracing::instrument(name = "Fetching properties by ids", skip(self, db_executor))]
    pub async fn find_by_ids(
        &self,
        db_executor: impl PgExecutor<'_>,
        ids: &[Uuid],
    ) -> Result<Vec<Property>, PropertyPostgresRepositoryError> {
        let records = sqlx::query_as::<_, PropertyRecord>(&format!(
            "SELECT {} FROM property WHERE id = ANY($1)",
            PROPERTY_COLUMNS
        ))
        .bind(ids)
        .fetch_all(db_executor)
        .await?;

        Ok(records.into_iter().map(Property::from).collect())
    }

    /// Plain catalog listing: filters only, most recent first
    #[tracing::instrument(name = "Listing properties by filter", skip(self, db_executor))]
    pub async fn list(
        &self,
        db_executor: impl PgExecutor<'_>,
        filter: &PropertyFilter,
        limit: usize,
    ) -> Result<Vec<Property>, PropertyPostgresRepositoryError> {
        let mut builder = QueryBuilder::<Postgres>::new(format!(
            "SELECT {} FROM property WHERE 1 = 1",
            PROPERTY_COLUMNS
        ));
        push_filter(&mut builder, filter);
        builder.push(" ORDER BY created_at DESC LIMIT ");
        builder.push_bind(limit as i64);

        let records = builder
            .build_query_as::<PropertyRecord>()
            .fetch_all(db_executor)
            .await?;

        Ok(records.into_iter().map(Property::from).collect())
    }

    /// Fetches the candidate pool for the recommendation scorer: every
    /// listing passing the supplied filters, minus the ones the user already
    /// liked or skipped. Superliked listings stay eligible (they are
    /// matches, not exhausted cards).
    ///
    /// Ordered by ingestion recency so the fallback strategy can use the
    /// fetch order directly.
    #[tracing::instrument(name = "Fetching candidate properties", skip(self, db_executor))]
    pub async fn find_candidates(
        &self,
        db_executor: impl PgExecutor<'_>,
        user_id: &Uuid,
        filter: &PropertyFilter,
    ) -> Result<Vec<Property>, PropertyPostgresRepositoryError> {
        let mut builder = QueryBuilder::<Postgres>::new(format!(
            "SELECT {} FROM property WHERE 1 = 1",
            PROPERTY_COLUMNS
        ));
        push_filter(&mut builder, filter);

        builder.push(" AND id NOT IN (SELECT property_id FROM interaction WHERE user_id = ");
        builder.push_bind(*user_id);
        builder.push(" AND kind IN ('like', 'skip'))");

        builder.push(" ORDER BY created_at DESC");

        let records = builder
            .build_query_as::<PropertyRecord>()
            .fetch_all(db_executor)
            .await?;

        Ok(records.into_iter().map(Property::from).collect())
    }
}

/// Appends the WHERE predicates for every supplied filter bound.
///
/// Cap-rate bounds are OR'd with `IS NULL`: a listing with no cap-rate data
/// is included rather than excluded on a missing value.
fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &PropertyFilter) {
    if let Some(min_price) = filter.min_price {
        builder.push(" AND price >= ");
        builder.push_bind(min_price);
    }
    if let Some(max_price) = filter.max_price {
        builder.push(" AND price <= ");
        builder.push_bind(max_price);
    }
    if let Some(min_bedrooms) = filter.min_bedrooms {
        builder.push(" AND bedrooms >= ");
        builder.push_bind(min_bedrooms);
    }
    if let Some(max_bedrooms) = filter.max_bedrooms {
        builder.push(" AND bedrooms <= ");
        builder.push_bind(max_bedrooms);
    }
    if let Some(min_bathrooms) = filter.min_bathrooms {
        builder.push(" AND bathrooms >= ");
        builder.push_bind(min_bathrooms);
    }
    if let Some(max_bathrooms) = filter.max_bathrooms {
        builder.push(" AND bathrooms <= ");
        builder.push_bind(max_bathrooms);
    }
    if let Some(min_square_feet) = filter.min_square_feet {
        builder.push(" AND square_feet >= ");
        builder.push_bind(min_square_feet);
    }
    if let Some(max_square_feet) = filter.max_square_feet {
        builder.push(" AND square_feet <= ");
        builder.push_bind(max_square_feet);
    }
    if let Some(min_lot_size) = filter.min_lot_size {
        builder.push(" AND lot_size >= ");
        builder.push_bind(min_lot_size);
    }
    if let Some(max_lot_size) = filter.max_lot_size {
        builder.push(" AND lot_size <= ");
        builder.push_bind(max_lot_size);
    }
    if let Some(min_year_built) = filter.min_year_built {
        builder.push(" AND year_built >= ");
        builder.push_bind(min_year_built);
    }
    if let Some(max_year_built) = filter.max_year_built {
        builder.push(" AND year_built <= ");
        builder.push_bind(max_year_built);
    }
    if let Some(min_cap_rate) = filter.min_cap_rate {
        builder.push(" AND (cap_rate >= ");
        builder.push_bind(min_cap_rate);
        builder.push(" OR cap_rate IS NULL)");
    }
    if let Some(max_cap_rate) = filter.max_cap_rate {
        builder.push(" AND (cap_rate <= ");
        builder.push_bind(max_cap_rate);
        builder.push(" OR cap_rate IS NULL)");
    }
    if !filter.property_types.is_empty() {
        let names: Vec<String> = filter
            .property_types
            .iter()
            .map(|t| t.as_str().to_string())
            .collect();
        builder.push(" AND property_type::text = ANY(");
        builder.push_bind(names);
        builder.push(")");
    }
    if !filter.states.is_empty() {
        builder.push(" AND state = ANY(");
        builder.push_bind(filter.states.clone());
        builder.push(")");
    }
}

#[derive(sqlx::FromRow)]
struct PropertyRecord {
    id: Uuid,
    address: String,
    city: String,
    state: String,
    zip_code: String,
    price: f64,
    bedrooms: Option<i32>,
    bathrooms: Option<f64>,
    square_feet: Option<i32>,
    lot_size: Option<f64>,
    property_type: PropertyType,
    year_built: Option<i32>,
    cap_rate: Option<f64>,
    description: String,
    images: Option<Vec<String>>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    embedding: Option<Vector>,
    created_at: DateTime<Utc>,
}

impl From<PropertyRecord> for Property {
    fn from(record: PropertyRecord) -> Self {
        Property {
            id: record.id,
            address: record.address,
            city: record.city,
            state: record.state,
            zip_code: record.zip_code,
            price: record.price,
            bedrooms: record.bedrooms,
            bathrooms: record.bathrooms,
            square_feet: record.square_feet,
            lot_size: record.lot_size,
            property_type: record.property_type,
            year_built: record.year_built,
            cap_rate: record.cap_rate,
            description: record.description,
            images: record.images,
            latitude: record.latitude,
            longitude: record.longitude,
            embedding: record.embedding.map(|v| v.to_vec()),
            created_at: record.created_at,
        }
    }
}

#[derive(thiserror::Error)]
pub enum PropertyPostgresRepositoryError {
    #[error(transparent)]
    DBError(#[from] sqlx::Error),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl std::fmt::Debug for PropertyPostgresRepositoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}
