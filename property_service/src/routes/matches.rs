use actix_web::http::header::ContentType;
use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, ResponseError};
use chrono::{DateTime, Utc};
use common::helper::error_chain_fmt;
use serde::Serialize;
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entities::{interaction::InteractionKind, property::Property};
use crate::repositories::{
    interaction_postgres_repository::{
        InteractionPostgresRepository, InteractionPostgresRepositoryError,
    },
    property_postgres_repository::{PropertyPostgresRepository, PropertyPostgresRepositoryError},
};

#[derive(Debug, Serialize)]
pub struct MatchDto {
    pub property: Property,
    pub matched_at: DateTime<Utc>,
}

/// A user's matches are their superliked listings, most recent swipe first
#[tracing::instrument(name = "List matches handler", skip(pool, interaction_repository, property_repository))]
pub async fn list_matches(
    pool: web::Data<PgPool>,
    interaction_repository: web::Data<InteractionPostgresRepository>,
    property_repository: web::Data<PropertyPostgresRepository>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ListMatchesError> {
    let user_id = path.into_inner();

    let superlikes = interaction_repository
        .find_by_user(pool.get_ref(), &user_id, &[InteractionKind::Superlike])
        .await?;

    let property_ids: Vec<Uuid> = superlikes.iter().map(|i| i.property_id).collect();
    let properties = property_repository
        .find_by_ids(pool.get_ref(), &property_ids)
        .await?;

    // Keeps the swipe-recency order of the interaction log
    let matches: Vec<MatchDto> = superlikes
        .into_iter()
        .filter_map(|interaction| {
            let property = properties
                .iter()
                .find(|p| p.id == interaction.property_id)?
                .clone();
            Some(MatchDto {
                property,
                matched_at: interaction.created_at,
            })
        })
        .collect();

    Ok(HttpResponse::Ok().json(matches))
}

#[derive(thiserror::Error)]
pub enum ListMatchesError {
    #[error(transparent)]
    InteractionRepositoryError(#[from] InteractionPostgresRepositoryError),
    #[error(transparent)]
    PropertyRepositoryError(#[from] PropertyPostgresRepositoryError),
}

impl std::fmt::Debug for ListMatchesError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ResponseError for ListMatchesError {
    fn status_code(&self) -> StatusCode {
        match self {
            ListMatchesError::InteractionRepositoryError(_)
            | ListMatchesError::PropertyRepositoryError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse<actix_web::body::BoxBody> {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .json(json!({ "error": self.to_string() }))
    }
}
