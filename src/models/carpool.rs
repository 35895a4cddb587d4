// src/models/carpool.rs

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

const WEEKDAYS: &[&str] = &[
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
    "sunday",
];

/// Represents the 'carpool_offers' table: a route a driver has registered.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct CarpoolOffer {
    pub id: i64,
    pub driver_id: i64,
    pub user_id: i64,
    pub pickup_location: String,
    pub dropoff_location: String,
    pub pickup_time: NaiveTime,
    pub dropoff_time: Option<NaiveTime>,
    pub date: Option<NaiveDate>,
    pub seats: i32,

    /// 'One Way' or 'Two Way'.
    pub route_type: String,

    /// Comma-joined weekday names ('Monday,Wednesday'), None for one-off rides.
    pub recurring_days: Option<String>,

    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Represents the 'carpool_requests' table: a passenger's booking.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct CarpoolRequest {
    pub id: i64,
    pub passenger_id: i64,

    /// Set when a driver accepts the request, NULL until then.
    pub driver_id: Option<i64>,

    pub pickup_location: String,
    pub dropoff_location: String,
    pub pickup_time: NaiveTime,
    pub dropoff_time: Option<NaiveTime>,
    pub date: NaiveDate,
    pub seats: i32,
    pub route_type: String,
    pub recurring_days: Option<String>,
    pub fare: f64,

    pub smoking_allowed: bool,
    pub music_allowed: bool,
    pub conversation_allowed: bool,
    pub allows_luggage: bool,

    /// 'pending' | 'accepted' | 'rejected' | 'joined' | 'completed'.
    pub status: String,

    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// DTO for a driver registering a route.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateOfferRequest {
    #[validate(length(min = 1, max = 200))]
    pub pickup_location: String,
    #[validate(length(min = 1, max = 200))]
    pub dropoff_location: String,
    pub pickup_time: NaiveTime,
    pub dropoff_time: Option<NaiveTime>,
    pub date: Option<NaiveDate>,
    #[validate(range(min = 1, max = 50))]
    pub seats: i32,
    #[validate(custom(function = validate_route_type))]
    pub route_type: String,
    #[validate(custom(function = validate_recurring_days))]
    pub recurring_days: Option<String>,
}

/// DTO for a passenger booking a ride.
///
/// `fare` is optional: when omitted, the server computes it from
/// `distance_km` with the fare calculator.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateRideRequest {
    #[validate(length(min = 1, max = 200))]
    pub pickup_location: String,
    #[validate(length(min = 1, max = 200))]
    pub dropoff_location: String,
    pub pickup_time: NaiveTime,
    pub dropoff_time: Option<NaiveTime>,
    pub date: NaiveDate,
    #[validate(range(min = 1, max = 50))]
    pub seats: i32,
    #[validate(custom(function = validate_route_type))]
    pub route_type: String,
    #[validate(custom(function = validate_recurring_days))]
    pub recurring_days: Option<String>,

    #[validate(range(min = 0.0))]
    pub fare: Option<f64>,
    #[validate(range(min = 0.1, max = 2000.0))]
    pub distance_km: Option<f64>,

    #[serde(default)]
    pub smoking_allowed: bool,
    #[serde(default = "default_true")]
    pub music_allowed: bool,
    #[serde(default = "default_true")]
    pub conversation_allowed: bool,
    #[serde(default = "default_true")]
    pub allows_luggage: bool,
}

/// Represents the 'ride_profiles' table: a passenger's reusable
/// ride-preference template, used to prefill new bookings.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct RideProfile {
    pub id: i64,
    pub rider_id: i64,
    pub smoking_allowed: bool,
    pub music_allowed: bool,
    pub conversation_allowed: bool,
    pub allows_luggage: bool,
    pub seats: i32,
    pub route_type: String,
    pub recurring_days: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SaveRideProfileRequest {
    #[serde(default)]
    pub smoking_allowed: bool,
    #[serde(default = "default_true")]
    pub music_allowed: bool,
    #[serde(default = "default_true")]
    pub conversation_allowed: bool,
    #[serde(default = "default_true")]
    pub allows_luggage: bool,
    #[validate(range(min = 1, max = 50))]
    pub seats: i32,
    #[validate(custom(function = validate_route_type))]
    pub route_type: String,
    #[validate(custom(function = validate_recurring_days))]
    pub recurring_days: Option<String>,
}

fn default_true() -> bool {
    true
}

fn validate_route_type(route_type: &str) -> Result<(), validator::ValidationError> {
    if route_type != "One Way" && route_type != "Two Way" {
        return Err(validator::ValidationError::new("invalid_route_type"));
    }
    Ok(())
}

/// Validates a comma-joined weekday list such as 'Monday,Wednesday'.
/// An empty string is rejected; omit the field for one-off rides instead.
fn validate_recurring_days(days: &str) -> Result<(), validator::ValidationError> {
    if days.trim().is_empty() {
        return Err(validator::ValidationError::new("empty_recurring_days"));
    }
    for day in days.split(',') {
        if !WEEKDAYS.contains(&day.trim().to_lowercase().as_str()) {
            return Err(validator::ValidationError::new("invalid_weekday"));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn route_type_accepts_both_variants() {
        assert!(validate_route_type("One Way").is_ok());
        assert!(validate_route_type("Two Way").is_ok());
        assert!(validate_route_type("Round Trip").is_err());
    }

    #[test]
    fn recurring_days_accepts_mixed_case_lists() {
        assert!(validate_recurring_days("Monday,Wednesday").is_ok());
        assert!(validate_recurring_days("monday, FRIDAY").is_ok());
        assert!(validate_recurring_days("Funday").is_err());
        assert!(validate_recurring_days("").is_err());
    }
}
