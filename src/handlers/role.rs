// src/handlers/role.rs
//
// Role enrolment. Each enrolment is one transaction over an idempotent
// ON CONFLICT insert, so a double-tap from two devices cannot produce
// duplicate role rows or a half-updated last_role.

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::PgPool;
use validator::Validate;

use crate::{
    error::AppError,
    models::role::{Driver, DriverStatusRequest, Passenger, PushTokenRequest},
    utils::jwt::Claims,
};

pub(crate) async fn driver_id_for_user(pool: &PgPool, user_id: i64) -> Result<i64, AppError> {
    sqlx::query_scalar::<_, i64>("SELECT id FROM drivers WHERE user_id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await?
        .ok_or(AppError::NotFound("Driver profile not found".to_string()))
}

pub(crate) async fn passenger_id_for_user(pool: &PgPool, user_id: i64) -> Result<i64, AppError> {
    sqlx::query_scalar::<_, i64>("SELECT id FROM passengers WHERE user_id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await?
        .ok_or(AppError::NotFound("Passenger profile not found".to_string()))
}

/// Enrol the authenticated user as a driver. Idempotent.
pub async fn become_driver(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;

    let mut tx = pool.begin().await?;

    sqlx::query("INSERT INTO drivers (user_id) VALUES ($1) ON CONFLICT (user_id) DO NOTHING")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    let updated = sqlx::query("UPDATE users SET last_role = 'driver' WHERE id = $1")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    if updated.rows_affected() == 0 {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    let driver = sqlx::query_as::<_, Driver>(
        "SELECT id, user_id, push_token, status FROM drivers WHERE user_id = $1",
    )
    .bind(user_id)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok((StatusCode::CREATED, Json(driver)))
}

/// Enrol the authenticated user as a passenger. Idempotent.
pub async fn become_passenger(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;

    let mut tx = pool.begin().await?;

    sqlx::query("INSERT INTO passengers (user_id) VALUES ($1) ON CONFLICT (user_id) DO NOTHING")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    let updated = sqlx::query("UPDATE users SET last_role = 'passenger' WHERE id = $1")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    if updated.rows_affected() == 0 {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    let passenger = sqlx::query_as::<_, Passenger>(
        "SELECT id, user_id, push_token FROM passengers WHERE user_id = $1",
    )
    .bind(user_id)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok((StatusCode::CREATED, Json(passenger)))
}

/// Fetch the driver profile attached to a user, 404 if not enrolled.
pub async fn get_driver_by_user(
    State(pool): State<PgPool>,
    Path(user_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let driver = sqlx::query_as::<_, Driver>(
        "SELECT id, user_id, push_token, status FROM drivers WHERE user_id = $1",
    )
    .bind(user_id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("Driver profile not found".to_string()))?;

    Ok(Json(driver))
}

/// Fetch the passenger profile attached to a user, 404 if not enrolled.
pub async fn get_passenger_by_user(
    State(pool): State<PgPool>,
    Path(user_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let passenger = sqlx::query_as::<_, Passenger>(
        "SELECT id, user_id, push_token FROM passengers WHERE user_id = $1",
    )
    .bind(user_id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("Passenger profile not found".to_string()))?;

    Ok(Json(passenger))
}

/// Store the Expo push token on the authenticated user's driver row.
pub async fn set_driver_push_token(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<PushTokenRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let result = sqlx::query("UPDATE drivers SET push_token = $1 WHERE user_id = $2")
        .bind(&payload.push_token)
        .bind(claims.user_id()?)
        .execute(&pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Driver profile not found".to_string()));
    }

    Ok(Json(serde_json::json!({ "message": "Push token saved" })))
}

/// Store the Expo push token on the authenticated user's passenger row.
pub async fn set_passenger_push_token(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<PushTokenRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let result = sqlx::query("UPDATE passengers SET push_token = $1 WHERE user_id = $2")
        .bind(&payload.push_token)
        .bind(claims.user_id()?)
        .execute(&pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Passenger profile not found".to_string()));
    }

    Ok(Json(serde_json::json!({ "message": "Push token saved" })))
}

/// Update a driver's vetting status ('pending' | 'accepted' | 'rejected').
pub async fn set_driver_status(
    State(pool): State<PgPool>,
    Path(driver_id): Path<i64>,
    Json(payload): Json<DriverStatusRequest>,
) -> Result<impl IntoResponse, AppError> {
    if !payload.is_valid() {
        return Err(AppError::BadRequest(
            "Status must be 'pending', 'accepted' or 'rejected'".to_string(),
        ));
    }

    let driver = sqlx::query_as::<_, Driver>(
        r#"
        UPDATE drivers SET status = $1 WHERE id = $2
        RETURNING id, user_id, push_token, status
        "#,
    )
    .bind(&payload.status)
    .bind(driver_id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("Driver not found".to_string()))?;

    Ok(Json(driver))
}
