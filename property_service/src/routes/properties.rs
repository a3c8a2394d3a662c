use std::str::FromStr;

use actix_web::http::header::ContentType;
use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, ResponseError};
use anyhow::Context;
use chrono::Utc;
use common::helper::error_chain_fmt;
use serde_json::json;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::domain::entities::geo::GeoPoint;
use crate::domain::entities::{
    filter::PropertyFilter,
    property::{Property, PropertyType},
};
use crate::repositories::property_postgres_repository::{
    PropertyPostgresRepository, PropertyPostgresRepositoryError,
};
use crate::routes::filter_params::{FilterParamsError, PropertyFilterParams};

const DEFAULT_CATALOG_PAGE: usize = 50;
const MAX_CATALOG_PAGE: usize = 200;

#[derive(Debug, serde::Deserialize)]
pub struct CreatePropertyBodyData {
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub price: f64,
    pub bedrooms: Option<i32>,
    pub bathrooms: Option<f64>,
    pub square_feet: Option<i32>,
    pub lot_size: Option<f64>,
    pub property_type: String,
    pub year_built: Option<i32>,
    pub cap_rate: Option<f64>,
    #[serde(default)]
    pub description: String,
    pub images: Option<Vec<String>>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Plain numeric array; the embedding worker usually backfills this
    pub embedding: Option<Vec<f32>>,
}

#[tracing::instrument(name = "Create property handler", skip(pool, property_repository, body))]
pub async fn create_property(
    pool: web::Data<PgPool>,
    property_repository: web::Data<PropertyPostgresRepository>,
    body: web::Json<CreatePropertyBodyData>,
) -> Result<HttpResponse, CreatePropertyError> {
    let body = body.into_inner();

    let property_type = PropertyType::from_str(&body.property_type)
        .map_err(CreatePropertyError::InvalidPropertyType)?;

    if !body.price.is_finite() || body.price < 0.0 {
        return Err(CreatePropertyError::InvalidPrice(body.price));
    }

    // Coordinates come as a pair or not at all
    match (body.latitude, body.longitude) {
        (Some(latitude), Some(longitude)) => {
            GeoPoint::new(latitude, longitude)
                .map_err(|e| CreatePropertyError::InvalidCoordinates(format!("{}", e)))?;
        }
        (None, None) => {}
        _ => {
            return Err(CreatePropertyError::InvalidCoordinates(
                "latitude and longitude must be supplied together".to_string(),
            ));
        }
    }

    let property = Property {
        id: Uuid::new_v4(),
        address: body.address,
        city: body.city,
        state: body.state.to_uppercase(),
        zip_code: body.zip_code,
        price: body.price,
        bedrooms: body.bedrooms,
        bathrooms: body.bathrooms,
        square_feet: body.square_feet,
        lot_size: body.lot_size,
        property_type,
        year_built: body.year_built,
        cap_rate: body.cap_rate,
        description: body.description,
        images: body.images,
        latitude: body.latitude,
        longitude: body.longitude,
        embedding: body.embedding,
        created_at: Utc::now(),
    };

    let mut transaction = pool
        .begin()
        .await
        .context("Failed to acquire a Postgres connection from the pool")?;

    property_repository
        .insert(&mut transaction, &property)
        .await?;

    transaction
        .commit()
        .await
        .context("Failed to commit SQL transaction storing the new property")?;

    info!(property_id = %property.id, "Created property listing");
    Ok(HttpResponse::Created().json(property))
}

#[derive(thiserror::Error)]
pub enum CreatePropertyError {
    #[error("Invalid property type: {0}")]
    InvalidPropertyType(String),
    #[error("Invalid price: {0}")]
    InvalidPrice(f64),
    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),
    #[error(transparent)]
    RepositoryError(#[from] PropertyPostgresRepositoryError),
    #[error(transparent)]
    InternalError(#[from] anyhow::Error),
}

impl std::fmt::Debug for CreatePropertyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ResponseError for CreatePropertyError {
    fn status_code(&self) -> StatusCode {
        match self {
            CreatePropertyError::InvalidPropertyType(_)
            | CreatePropertyError::InvalidPrice(_)
            | CreatePropertyError::InvalidCoordinates(_) => StatusCode::BAD_REQUEST,
            CreatePropertyError::RepositoryError(_) | CreatePropertyError::InternalError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse<actix_web::body::BoxBody> {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .json(json!({ "error": self.to_string() }))
    }
}

#[derive(Debug, serde::Deserialize)]
pub struct ListPropertiesParams {
    pub limit: Option<usize>,
}

#[tracing::instrument(name = "List properties handler", skip(pool, property_repository))]
pub async fn list_properties(
    pool: web::Data<PgPool>,
    property_repository: web::Data<PropertyPostgresRepository>,
    params: web::Query<ListPropertiesParams>,
    filter_params: web::Query<PropertyFilterParams>,
) -> Result<HttpResponse, ListPropertiesError> {
    let filter = PropertyFilter::try_from(filter_params.into_inner())?;
    let limit = params
        .limit
        .unwrap_or(DEFAULT_CATALOG_PAGE)
        .clamp(1, MAX_CATALOG_PAGE);

    let properties = property_repository
        .list(pool.get_ref(), &filter, limit)
        .await?;

    Ok(HttpResponse::Ok().json(properties))
}

#[derive(thiserror::Error)]
pub enum ListPropertiesError {
    #[error(transparent)]
    InvalidFilter(#[from] FilterParamsError),
    #[error(transparent)]
    RepositoryError(#[from] PropertyPostgresRepositoryError),
}

impl std::fmt::Debug for ListPropertiesError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ResponseError for ListPropertiesError {
    fn status_code(&self) -> StatusCode {
        match self {
            ListPropertiesError::InvalidFilter(_) => StatusCode::BAD_REQUEST,
            ListPropertiesError::RepositoryError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse<actix_web::body::BoxBody> {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .json(json!({ "error": self.to_string() }))
    }
}

#[tracing::instrument(name = "Get property handler", skip(pool, property_repository))]
pub async fn get_property(
    pool: web::Data<PgPool>,
    property_repository: web::Data<PropertyPostgresRepository>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, GetPropertyError> {
    let property_id = path.into_inner();

    let property = property_repository
        .find_by_id(pool.get_ref(), &property_id)
        .await?
        .ok_or(GetPropertyError::NotFound(property_id))?;

    Ok(HttpResponse::Ok().json(property))
}

#[derive(thiserror::Error)]
pub enum GetPropertyError {
    #[error("No property with id {0}")]
    NotFound(Uuid),
    #[error(transparent)]
    RepositoryError(#[from] PropertyPostgresRepositoryError),
}

impl std::fmt::Debug for GetPropertyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ResponseError for GetPropertyError {
    fn status_code(&self) -> StatusCode {
        match self {
            GetPropertyError::NotFound(_) => StatusCode::NOT_FOUND,
            GetPropertyError::RepositoryError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse<actix_web::body::BoxBody> {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .json(json!({ "error": self.to_string() }))
    }
}
