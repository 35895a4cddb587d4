// src/models/role.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'drivers' table. One row per user who opted into driving.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Driver {
    pub id: i64,
    pub user_id: i64,

    /// Expo push token, stored verbatim for the notification dispatcher.
    pub push_token: Option<String>,

    /// Vetting status: 'pending', 'accepted' or 'rejected'.
    pub status: String,
}

/// Represents the 'passengers' table. One row per user who opted into riding.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Passenger {
    pub id: i64,
    pub user_id: i64,
    pub push_token: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct PushTokenRequest {
    #[validate(length(min = 1, max = 500))]
    pub push_token: String,
}

/// DTO for updating a driver's vetting status.
#[derive(Debug, Deserialize)]
pub struct DriverStatusRequest {
    pub status: String,
}

impl DriverStatusRequest {
    pub fn is_valid(&self) -> bool {
        matches!(self.status.as_str(), "pending" | "accepted" | "rejected")
    }
}
