// src/handlers/notification.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::PgPool;
use validator::Validate;

use crate::{
    error::AppError,
    models::notification::{CreateNotificationRequest, Notification},
};

const NOTIFICATION_COLUMNS: &str = "id, user_id, kind, message, is_read, created_at";

/// Append a notification row. Delivery to the device (Expo push) is the
/// client dispatcher's job; this is only the inbox record.
pub async fn create_notification(
    State(pool): State<PgPool>,
    Json(payload): Json<CreateNotificationRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let notification = sqlx::query_as::<_, Notification>(&format!(
        r#"
        INSERT INTO notifications (user_id, kind, message)
        VALUES ($1, $2, $3)
        RETURNING {NOTIFICATION_COLUMNS}
        "#
    ))
    .bind(payload.user_id)
    .bind(&payload.kind)
    .bind(&payload.message)
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        if e.to_string().contains("violates foreign key constraint") {
            AppError::NotFound("User not found".to_string())
        } else {
            AppError::from(e)
        }
    })?;

    Ok((StatusCode::CREATED, Json(notification)))
}

/// A user's notifications, newest first.
pub async fn list_user_notifications(
    State(pool): State<PgPool>,
    Path(user_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let notifications = sqlx::query_as::<_, Notification>(&format!(
        "SELECT {NOTIFICATION_COLUMNS} FROM notifications WHERE user_id = $1 \
         ORDER BY created_at DESC"
    ))
    .bind(user_id)
    .fetch_all(&pool)
    .await?;

    Ok(Json(notifications))
}

/// Flip is_read. The only mutation notifications ever see.
pub async fn mark_read(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let notification = sqlx::query_as::<_, Notification>(&format!(
        r#"
        UPDATE notifications SET is_read = TRUE WHERE id = $1
        RETURNING {NOTIFICATION_COLUMNS}
        "#
    ))
    .bind(id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("Notification not found".to_string()))?;

    Ok(Json(notification))
}
