// src/handlers/request.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::PgPool;
use validator::Validate;

use crate::{
    domain::fare::{FareParams, quote},
    error::AppError,
    handlers::role::{driver_id_for_user, passenger_id_for_user},
    models::carpool::{CarpoolRequest, CreateRideRequest, RideProfile, SaveRideProfileRequest},
    utils::jwt::Claims,
};

const REQUEST_COLUMNS: &str =
    "id, passenger_id, driver_id, pickup_location, dropoff_location, pickup_time, \
     dropoff_time, date, seats, route_type, recurring_days, fare, smoking_allowed, \
     music_allowed, conversation_allowed, allows_luggage, status, created_at";

/// Book a ride as the authenticated passenger. Starts out 'pending'.
///
/// The fare may be supplied by the client (it previews one with the fare
/// endpoint); when omitted, it is computed here from `distance_km`.
pub async fn create_request(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateRideRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let passenger_id = passenger_id_for_user(&pool, claims.user_id()?).await?;

    let fare = match (payload.fare, payload.distance_km) {
        (Some(fare), _) => fare,
        (None, Some(distance_km)) => {
            let return_time =
                (payload.route_type == "Two Way").then_some(payload.dropoff_time).flatten();
            quote(
                &FareParams::default(),
                distance_km,
                payload.seats as u32,
                payload.pickup_time,
                return_time,
            )
            .total_fare
        }
        (None, None) => {
            return Err(AppError::BadRequest(
                "Either 'fare' or 'distance_km' must be provided".to_string(),
            ));
        }
    };

    let request = sqlx::query_as::<_, CarpoolRequest>(&format!(
        r#"
        INSERT INTO carpool_requests
            (passenger_id, pickup_location, dropoff_location, pickup_time, dropoff_time,
             date, seats, route_type, recurring_days, fare,
             smoking_allowed, music_allowed, conversation_allowed, allows_luggage)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
        RETURNING {REQUEST_COLUMNS}
        "#
    ))
    .bind(passenger_id)
    .bind(&payload.pickup_location)
    .bind(&payload.dropoff_location)
    .bind(payload.pickup_time)
    .bind(payload.dropoff_time)
    .bind(payload.date)
    .bind(payload.seats)
    .bind(&payload.route_type)
    .bind(&payload.recurring_days)
    .bind(fare)
    .bind(payload.smoking_allowed)
    .bind(payload.music_allowed)
    .bind(payload.conversation_allowed)
    .bind(payload.allows_luggage)
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to create carpool request: {:?}", e);
        AppError::from(e)
    })?;

    Ok((StatusCode::CREATED, Json(request)))
}

/// A passenger's booking history, newest first.
pub async fn list_passenger_requests(
    State(pool): State<PgPool>,
    Path(passenger_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let requests = sqlx::query_as::<_, CarpoolRequest>(&format!(
        "SELECT {REQUEST_COLUMNS} FROM carpool_requests WHERE passenger_id = $1 \
         ORDER BY created_at DESC"
    ))
    .bind(passenger_id)
    .fetch_all(&pool)
    .await?;

    Ok(Json(requests))
}

/// All requests still waiting for a driver.
pub async fn list_pending_requests(
    State(pool): State<PgPool>,
) -> Result<impl IntoResponse, AppError> {
    let requests = sqlx::query_as::<_, CarpoolRequest>(&format!(
        "SELECT {REQUEST_COLUMNS} FROM carpool_requests WHERE status = 'pending' \
         ORDER BY created_at DESC"
    ))
    .fetch_all(&pool)
    .await?;

    Ok(Json(requests))
}

/// Accept a pending request as the authenticated driver.
///
/// Sets driver_id and notifies the passenger in the same transaction, so an
/// accepted ride always has its notification row.
pub async fn accept_request(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let driver_id = driver_id_for_user(&pool, claims.user_id()?).await?;

    let mut tx = pool.begin().await?;

    let request = sqlx::query_as::<_, CarpoolRequest>(&format!(
        r#"
        UPDATE carpool_requests
        SET status = 'accepted', driver_id = $1
        WHERE id = $2 AND status = 'pending'
        RETURNING {REQUEST_COLUMNS}
        "#
    ))
    .bind(driver_id)
    .bind(id)
    .fetch_optional(&mut *tx)
    .await?;

    let request = match request {
        Some(r) => r,
        None => return Err(transition_error(&pool, id).await),
    };

    let passenger_user_id =
        sqlx::query_scalar::<_, i64>("SELECT user_id FROM passengers WHERE id = $1")
            .bind(request.passenger_id)
            .fetch_one(&mut *tx)
            .await?;

    sqlx::query(
        "INSERT INTO notifications (user_id, kind, message) VALUES ($1, 'ride_update', $2)",
    )
    .bind(passenger_user_id)
    .bind(format!(
        "Your carpool request from {} to {} has been accepted",
        request.pickup_location, request.dropoff_location
    ))
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok(Json(request))
}

/// Reject a pending request.
pub async fn reject_request(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    transition(&pool, id, &["pending"], "rejected").await
}

/// Passenger confirms the pickup: accepted -> joined.
pub async fn join_request(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    transition(&pool, id, &["accepted"], "joined").await
}

/// End the ride: accepted or joined -> completed.
pub async fn complete_request(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    transition(&pool, id, &["accepted", "joined"], "completed").await
}

async fn transition(
    pool: &PgPool,
    id: i64,
    from: &[&str],
    to: &str,
) -> Result<Json<CarpoolRequest>, AppError> {
    let request = sqlx::query_as::<_, CarpoolRequest>(&format!(
        r#"
        UPDATE carpool_requests
        SET status = $1
        WHERE id = $2 AND status = ANY($3)
        RETURNING {REQUEST_COLUMNS}
        "#
    ))
    .bind(to)
    .bind(id)
    .bind(from.iter().map(|s| s.to_string()).collect::<Vec<_>>())
    .fetch_optional(pool)
    .await?;

    match request {
        Some(r) => Ok(Json(r)),
        None => Err(transition_error(pool, id).await),
    }
}

/// Distinguishes "no such request" (404) from "wrong status" (409).
async fn transition_error(pool: &PgPool, id: i64) -> AppError {
    let status =
        sqlx::query_scalar::<_, String>("SELECT status FROM carpool_requests WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await;

    match status {
        Ok(Some(status)) => {
            AppError::Conflict(format!("Request is already '{}'", status))
        }
        Ok(None) => AppError::NotFound("Request not found".to_string()),
        Err(e) => AppError::from(e),
    }
}

/// Upsert the authenticated passenger's reusable ride-preference template.
pub async fn save_ride_profile(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<SaveRideProfileRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let rider_id = passenger_id_for_user(&pool, claims.user_id()?).await?;

    let profile = sqlx::query_as::<_, RideProfile>(
        r#"
        INSERT INTO ride_profiles
            (rider_id, smoking_allowed, music_allowed, conversation_allowed,
             allows_luggage, seats, route_type, recurring_days)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        ON CONFLICT (rider_id) DO UPDATE SET
            smoking_allowed = EXCLUDED.smoking_allowed,
            music_allowed = EXCLUDED.music_allowed,
            conversation_allowed = EXCLUDED.conversation_allowed,
            allows_luggage = EXCLUDED.allows_luggage,
            seats = EXCLUDED.seats,
            route_type = EXCLUDED.route_type,
            recurring_days = EXCLUDED.recurring_days
        RETURNING id, rider_id, smoking_allowed, music_allowed, conversation_allowed,
                  allows_luggage, seats, route_type, recurring_days
        "#,
    )
    .bind(rider_id)
    .bind(payload.smoking_allowed)
    .bind(payload.music_allowed)
    .bind(payload.conversation_allowed)
    .bind(payload.allows_luggage)
    .bind(payload.seats)
    .bind(&payload.route_type)
    .bind(&payload.recurring_days)
    .fetch_one(&pool)
    .await?;

    Ok(Json(profile))
}

/// Fetch a passenger's ride-preference template, 404 if never saved.
pub async fn get_ride_profile(
    State(pool): State<PgPool>,
    Path(rider_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let profile = sqlx::query_as::<_, RideProfile>(
        r#"
        SELECT id, rider_id, smoking_allowed, music_allowed, conversation_allowed,
               allows_luggage, seats, route_type, recurring_days
        FROM ride_profiles
        WHERE rider_id = $1
        "#,
    )
    .bind(rider_id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("No ride profile saved".to_string()))?;

    Ok(Json(profile))
}
