//! Review domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A guest review, tied 1:1 to a completed booking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    pub id: Uuid,
    pub user_id: Uuid,
    pub property_id: Uuid,
    pub booking_id: Uuid,
    /// 1 to 5 inclusive.
    pub rating: u8,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateReview {
    pub user_id: Uuid,
    /// The completed booking being reviewed; the property follows from it.
    pub booking_id: Uuid,
    pub rating: u8,
    pub comment: Option<String>,
}
