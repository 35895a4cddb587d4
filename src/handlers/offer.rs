// src/handlers/offer.rs

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
    handlers::role::driver_id_for_user,
    models::carpool::{CarpoolOffer, CreateOfferRequest},
    utils::jwt::Claims,
};

const OFFER_COLUMNS: &str =
    "id, driver_id, user_id, pickup_location, dropoff_location, pickup_time, \
     dropoff_time, date, seats, route_type, recurring_days, created_at";

/// Register a route the authenticated driver is willing to run.
pub async fn create_offer(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateOfferRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let user_id = claims.user_id()?;
    let driver_id = driver_id_for_user(&pool, user_id).await?;

    let offer = sqlx::query_as::<_, CarpoolOffer>(&format!(
        r#"
        INSERT INTO carpool_offers
            (driver_id, user_id, pickup_location, dropoff_location, pickup_time,
             dropoff_time, date, seats, route_type, recurring_days)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        RETURNING {OFFER_COLUMNS}
        "#
    ))
    .bind(driver_id)
    .bind(user_id)
    .bind(&payload.pickup_location)
    .bind(&payload.dropoff_location)
    .bind(payload.pickup_time)
    .bind(payload.dropoff_time)
    .bind(payload.date)
    .bind(payload.seats)
    .bind(&payload.route_type)
    .bind(&payload.recurring_days)
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to create carpool offer: {:?}", e);
        AppError::from(e)
    })?;

    Ok((StatusCode::CREATED, Json(offer)))
}

/// List a driver's registered routes, newest first.
pub async fn list_driver_offers(
    State(pool): State<PgPool>,
    Path(driver_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let offers = sqlx::query_as::<_, CarpoolOffer>(&format!(
        "SELECT {OFFER_COLUMNS} FROM carpool_offers WHERE driver_id = $1 ORDER BY created_at DESC"
    ))
    .bind(driver_id)
    .fetch_all(&pool)
    .await?;

    Ok(Json(offers))
}

/// Delete one of the authenticated driver's offers.
pub async fn delete_offer(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let owner_user_id =
        sqlx::query_scalar::<_, i64>("SELECT user_id FROM carpool_offers WHERE id = $1")
            .bind(id)
            .fetch_optional(&pool)
            .await?
            .ok_or(AppError::NotFound("Offer not found".to_string()))?;

    if owner_user_id != claims.user_id()? {
        return Err(AppError::AuthError(
            "You are not authorized to delete this offer".to_string(),
        ));
    }

    sqlx::query("DELETE FROM carpool_offers WHERE id = $1")
        .bind(id)
        .execute(&pool)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
