// src/models/feedback.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Per-ride rating submitted by a passenger ('ride_feedback' table).
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct RideFeedback {
    pub id: i64,
    pub passenger_id: i64,
    pub request_id: Option<i64>,
    pub rating: i32,
    pub comments: Option<String>,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// General app feedback tied to a user account ('app_feedback' table).
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct AppFeedback {
    pub id: i64,
    pub user_id: i64,
    pub rating: i32,
    pub comments: Option<String>,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RideFeedbackRequest {
    pub request_id: Option<i64>,
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5."))]
    pub rating: i32,
    #[validate(length(max = 2000))]
    pub comments: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct AppFeedbackRequest {
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5."))]
    pub rating: i32,
    #[validate(length(max = 2000))]
    pub comments: Option<String>,
}
