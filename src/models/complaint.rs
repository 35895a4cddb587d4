// src/models/complaint.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::error::AppError;

/// Represents the 'complaints' table.
/// A complaint targets exactly one of a driver or a passenger.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Complaint {
    pub id: i64,
    pub driver_id: Option<i64>,
    pub passenger_id: Option<i64>,
    pub description: String,
    pub status: String,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct CreateComplaintRequest {
    pub driver_id: Option<i64>,
    pub passenger_id: Option<i64>,
    pub description: String,
}

impl CreateComplaintRequest {
    /// Exactly one of driver_id / passenger_id must be set, and the
    /// description must not be blank. Mirrors the CHECK constraint so the
    /// client gets a 400 with a usable message instead of a bare DB error.
    pub fn validate_target(&self) -> Result<(), AppError> {
        match (self.driver_id, self.passenger_id) {
            (Some(_), Some(_)) => Err(AppError::BadRequest(
                "A complaint may target a driver or a passenger, not both.".to_string(),
            )),
            (None, None) => Err(AppError::BadRequest(
                "A complaint must target a driver or a passenger.".to_string(),
            )),
            _ => {
                if self.description.trim().is_empty() {
                    Err(AppError::BadRequest(
                        "Complaint description must not be empty.".to_string(),
                    ))
                } else {
                    Ok(())
                }
            }
        }
    }
}
