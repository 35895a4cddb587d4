// src/handlers/feedback.rs

use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use sqlx::PgPool;
use validator::Validate;

use crate::{
    error::AppError,
    handlers::role::passenger_id_for_user,
    models::feedback::{AppFeedback, AppFeedbackRequest, RideFeedback, RideFeedbackRequest},
    utils::jwt::Claims,
};

/// General app feedback from the authenticated user.
pub async fn create_app_feedback(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<AppFeedbackRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let feedback = sqlx::query_as::<_, AppFeedback>(
        r#"
        INSERT INTO app_feedback (user_id, rating, comments)
        VALUES ($1, $2, $3)
        RETURNING id, user_id, rating, comments, created_at
        "#,
    )
    .bind(claims.user_id()?)
    .bind(payload.rating)
    .bind(&payload.comments)
    .fetch_one(&pool)
    .await?;

    Ok((StatusCode::CREATED, Json(feedback)))
}

/// Per-ride rating; the authenticated user must be enrolled as a passenger.
pub async fn create_ride_feedback(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<RideFeedbackRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let passenger_id = passenger_id_for_user(&pool, claims.user_id()?).await?;

    let feedback = sqlx::query_as::<_, RideFeedback>(
        r#"
        INSERT INTO ride_feedback (passenger_id, request_id, rating, comments)
        VALUES ($1, $2, $3, $4)
        RETURNING id, passenger_id, request_id, rating, comments, created_at
        "#,
    )
    .bind(passenger_id)
    .bind(payload.request_id)
    .bind(payload.rating)
    .bind(&payload.comments)
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        if e.to_string().contains("violates foreign key constraint") {
            AppError::NotFound("Ride not found".to_string())
        } else {
            AppError::from(e)
        }
    })?;

    Ok((StatusCode::CREATED, Json(feedback)))
}
