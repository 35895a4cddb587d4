// src/handlers/matching.rs

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use serde::Serialize;
use sqlx::PgPool;

use crate::{
    domain::matching,
    error::AppError,
    models::carpool::{CarpoolOffer, CarpoolRequest},
};

/// A pending request paired with the offer(s) it matched.
#[derive(Debug, Serialize)]
pub struct MatchedRequest {
    pub offer_ids: Vec<i64>,
    #[serde(flatten)]
    pub request: CarpoolRequest,
}

/// Pending passenger requests that line up with one of the driver's offers.
///
/// Two batch fetches, then the pure matching predicate over the candidate
/// set in application code. Nothing is persisted; every poll recomputes the
/// set against current data.
pub async fn matches_for_driver(
    State(pool): State<PgPool>,
    Path(driver_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let offers = sqlx::query_as::<_, CarpoolOffer>(
        r#"
        SELECT id, driver_id, user_id, pickup_location, dropoff_location, pickup_time,
               dropoff_time, date, seats, route_type, recurring_days, created_at
        FROM carpool_offers
        WHERE driver_id = $1
        "#,
    )
    .bind(driver_id)
    .fetch_all(&pool)
    .await?;

    if offers.is_empty() {
        return Ok(Json(Vec::<MatchedRequest>::new()));
    }

    let pending = sqlx::query_as::<_, CarpoolRequest>(
        r#"
        SELECT id, passenger_id, driver_id, pickup_location, dropoff_location, pickup_time,
               dropoff_time, date, seats, route_type, recurring_days, fare, smoking_allowed,
               music_allowed, conversation_allowed, allows_luggage, status, created_at
        FROM carpool_requests
        WHERE status = 'pending'
        ORDER BY created_at DESC
        "#,
    )
    .fetch_all(&pool)
    .await?;

    let matched: Vec<MatchedRequest> = pending
        .into_iter()
        .filter_map(|request| {
            let offer_ids: Vec<i64> = offers
                .iter()
                .filter(|offer| matching::matches(offer, &request))
                .map(|offer| offer.id)
                .collect();
            if offer_ids.is_empty() {
                None
            } else {
                Some(MatchedRequest { offer_ids, request })
            }
        })
        .collect();

    Ok(Json(matched))
}
