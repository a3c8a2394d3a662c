use actix_web::http::header::ContentType;
use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, ResponseError};
use common::helper::error_chain_fmt;
use serde_json::json;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::configuration::RecommendationSettings;
use crate::domain::entities::{filter::PropertyFilter, geo::GeoPoint};
use crate::routes::filter_params::{FilterParamsError, PropertyFilterParams};
use crate::use_cases::get_recommendations::{GetRecommendationsUseCase, RecommendationRequest};

#[derive(Debug, serde::Deserialize)]
pub struct RecommendationParams {
    pub user_id: Uuid,
    pub limit: Option<usize>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub radius_km: Option<f64>,
}

/// The recommendation endpoint.
///
/// Input validation failures are the only errors a caller can see here;
/// everything downstream of a valid request degrades into a ranked
/// (possibly empty) list.
#[tracing::instrument(
    name = "Get recommendations handler",
    skip(pool, use_case, settings, params, filter_params),
    fields(user_id = %params.user_id)
)]
pub async fn get_recommendations(
    pool: web::Data<PgPool>,
    use_case: web::Data<GetRecommendationsUseCase>,
    settings: web::Data<RecommendationSettings>,
    params: web::Query<RecommendationParams>,
    filter_params: web::Query<PropertyFilterParams>,
) -> Result<HttpResponse, GetRecommendationsHttpError> {
    let params = params.into_inner();

    let filter = PropertyFilter::try_from(filter_params.into_inner())?;

    let location = match (params.lat, params.lng) {
        (Some(lat), Some(lng)) => Some(
            GeoPoint::new(lat, lng)
                .map_err(|e| GetRecommendationsHttpError::InvalidLocation(format!("{}", e)))?,
        ),
        (None, None) => None,
        _ => {
            return Err(GetRecommendationsHttpError::InvalidLocation(
                "lat and lng must be supplied together".to_string(),
            ));
        }
    };

    let radius_km = params.radius_km.unwrap_or(settings.default_radius_km);
    if !radius_km.is_finite() || radius_km <= 0.0 {
        return Err(GetRecommendationsHttpError::InvalidRadius(radius_km));
    }

    let request = RecommendationRequest {
        user_id: params.user_id,
        limit: settings.effective_limit(params.limit),
        location,
        radius_km,
        filter,
    };

    let recommendations = use_case.execute(pool.get_ref(), &request).await;
    info!(count = recommendations.len(), "Scored recommendations");

    Ok(HttpResponse::Ok().json(recommendations))
}

#[derive(thiserror::Error)]
pub enum GetRecommendationsHttpError {
    #[error(transparent)]
    InvalidFilter(#[from] FilterParamsError),
    #[error("Invalid location: {0}")]
    InvalidLocation(String),
    #[error("Invalid search radius: {0}")]
    InvalidRadius(f64),
}

impl std::fmt::Debug for GetRecommendationsHttpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ResponseError for GetRecommendationsHttpError {
    fn status_code(&self) -> StatusCode {
        match self {
            GetRecommendationsHttpError::InvalidFilter(_)
            | GetRecommendationsHttpError::InvalidLocation(_)
            | GetRecommendationsHttpError::InvalidRadius(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn error_response(&self) -> HttpResponse<actix_web::body::BoxBody> {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .json(json!({ "error": self.to_string() }))
    }
}
