use actix_web::http::header::ContentType;
use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, ResponseError};
use common::helper::error_chain_fmt;
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entities::interaction::InteractionKind;
use crate::use_cases::record_interaction::{RecordInteractionError, RecordInteractionUseCase};

#[derive(Debug, serde::Deserialize, serde::Serialize)]
pub struct RecordInteractionBodyData {
    pub user_id: Uuid,
    pub property_id: Uuid,
    pub kind: InteractionKind,
}

/// Records a swipe. Recording the same (user, property) twice leaves the
/// log exactly as after the first call and still acknowledges with 200.
#[tracing::instrument(name = "Record interaction handler", skip(pool, use_case))]
pub async fn record_interaction(
    pool: web::Data<PgPool>,
    use_case: web::Data<RecordInteractionUseCase>,
    body: web::Json<RecordInteractionBodyData>,
) -> Result<HttpResponse, RecordInteractionHttpError> {
    let outcome = use_case
        .execute(pool.get_ref(), body.user_id, body.property_id, body.kind)
        .await?;

    Ok(HttpResponse::Ok().json(json!({ "recorded": outcome.recorded })))
}

#[derive(thiserror::Error)]
pub enum RecordInteractionHttpError {
    #[error(transparent)]
    UseCaseError(#[from] RecordInteractionError),
}

impl std::fmt::Debug for RecordInteractionHttpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ResponseError for RecordInteractionHttpError {
    fn status_code(&self) -> StatusCode {
        match self {
            RecordInteractionHttpError::UseCaseError(RecordInteractionError::UnknownProperty(
                _,
            )) => StatusCode::NOT_FOUND,
            RecordInteractionHttpError::UseCaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse<actix_web::body::BoxBody> {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .json(json!({ "error": self.to_string() }))
    }
}
