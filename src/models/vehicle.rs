// src/models/vehicle.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'vehicles' table. Uniquely owned by one driver.
///
/// Most columns are nullable because the row is assembled piecemeal:
/// details, the vehicle photo and the license photos each arrive through
/// their own endpoint, all converging on this one row.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: i64,
    pub driver_id: i64,
    pub model: Option<String>,
    pub vehicle_type: Option<String>,
    pub color: Option<String>,
    pub capacity: Option<i32>,
    pub plate_number: Option<String>,
    pub vehicle_url: Option<String>,
    pub license_front_url: Option<String>,
    pub license_back_url: Option<String>,
}

/// DTO for saving vehicle details.
#[derive(Debug, Deserialize, Validate)]
pub struct VehicleDetailsRequest {
    #[validate(length(min = 1, max = 100))]
    pub model: String,
    #[validate(length(min = 1, max = 50))]
    pub vehicle_type: String,
    #[validate(length(min = 1, max = 50))]
    pub color: String,
    #[validate(range(min = 1, max = 50, message = "Capacity must be between 1 and 50."))]
    pub capacity: i32,
    #[validate(length(min = 1, max = 20))]
    pub plate_number: String,
}
