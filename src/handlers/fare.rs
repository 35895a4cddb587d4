// src/handlers/fare.rs

use axum::{Json, extract::Query, response::IntoResponse};
use chrono::NaiveTime;
use serde::Deserialize;

use crate::{
    domain::fare::{FareParams, quote},
    error::AppError,
};

#[derive(Debug, Deserialize)]
pub struct FareQuoteParams {
    pub distance_km: f64,
    pub seats: u32,
    /// e.g. "08:30:00"
    pub pickup_time: NaiveTime,
    /// Present for two-way trips; the return leg is priced independently.
    pub return_time: Option<NaiveTime>,
}

/// Fare preview for a prospective booking. Pure arithmetic, no database.
pub async fn quote_fare(
    Query(params): Query<FareQuoteParams>,
) -> Result<impl IntoResponse, AppError> {
    if params.distance_km <= 0.0 || !params.distance_km.is_finite() {
        return Err(AppError::BadRequest(
            "distance_km must be a positive number".to_string(),
        ));
    }
    if params.seats == 0 || params.seats > 50 {
        return Err(AppError::BadRequest(
            "seats must be between 1 and 50".to_string(),
        ));
    }

    let breakdown = quote(
        &FareParams::default(),
        params.distance_km,
        params.seats,
        params.pickup_time,
        params.return_time,
    );

    Ok(Json(breakdown))
}
