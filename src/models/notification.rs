// src/models/notification.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'notifications' table. Append-only; only `is_read` ever
/// changes after insertion.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Notification {
    pub id: i64,
    pub user_id: i64,

    /// Category tag, e.g. 'ride_update' or 'system'.
    pub kind: String,

    pub message: String,
    pub is_read: bool,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateNotificationRequest {
    pub user_id: i64,
    #[validate(length(min = 1, max = 50))]
    pub kind: String,
    #[validate(length(min = 1, max = 1000))]
    pub message: String,
}
