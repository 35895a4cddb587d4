// src/handlers/complaint.rs

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use sqlx::PgPool;

use crate::{
    error::AppError,
    models::complaint::{Complaint, CreateComplaintRequest},
};

const COMPLAINT_COLUMNS: &str =
    "id, driver_id, passenger_id, description, status, created_at";

/// File a complaint against exactly one driver or passenger.
pub async fn create_complaint(
    State(pool): State<PgPool>,
    Json(payload): Json<CreateComplaintRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate_target()?;

    let complaint = sqlx::query_as::<_, Complaint>(&format!(
        r#"
        INSERT INTO complaints (driver_id, passenger_id, description)
        VALUES ($1, $2, $3)
        RETURNING {COMPLAINT_COLUMNS}
        "#
    ))
    .bind(payload.driver_id)
    .bind(payload.passenger_id)
    .bind(payload.description.trim())
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        if e.to_string().contains("violates foreign key constraint") {
            AppError::NotFound("Complaint target not found".to_string())
        } else {
            tracing::error!("Failed to file complaint: {:?}", e);
            AppError::from(e)
        }
    })?;

    Ok((StatusCode::CREATED, Json(complaint)))
}

/// All complaints, newest first.
pub async fn list_complaints(
    State(pool): State<PgPool>,
) -> Result<impl IntoResponse, AppError> {
    let complaints = sqlx::query_as::<_, Complaint>(&format!(
        "SELECT {COMPLAINT_COLUMNS} FROM complaints ORDER BY created_at DESC"
    ))
    .fetch_all(&pool)
    .await?;

    Ok(Json(complaints))
}
