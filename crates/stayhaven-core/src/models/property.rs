//! Property domain model.
//!
//! Nightly rates are carried as [`Decimal`] — monetary arithmetic never
//! touches floating point.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PropertyKind {
    Apartment,
    House,
    Villa,
    Condo,
}

/// Listing approval state. Only `Approved` properties are bookable.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PropertyStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Property {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub description: String,
    pub kind: PropertyKind,
    pub location: String,
    pub city: String,
    pub state: String,
    pub country: String,
    /// Price per night. Invariant: strictly positive.
    pub nightly_rate: Decimal,
    pub bedrooms: u32,
    pub bathrooms: u32,
    /// Invariant: at least 1.
    pub max_guests: u32,
    pub amenities: Vec<String>,
    pub images: Vec<String>,
    pub status: PropertyStatus,
    /// Average review rating, maintained by the review repository.
    pub rating: Decimal,
    pub review_count: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProperty {
    pub owner_id: Uuid,
    pub title: String,
    pub description: String,
    pub kind: PropertyKind,
    pub location: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub nightly_rate: Decimal,
    pub bedrooms: u32,
    pub bathrooms: u32,
    pub max_guests: u32,
    pub amenities: Vec<String>,
    pub images: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateProperty {
    pub title: Option<String>,
    pub description: Option<String>,
    pub nightly_rate: Option<Decimal>,
    pub bedrooms: Option<u32>,
    pub bathrooms: Option<u32>,
    pub max_guests: Option<u32>,
    pub amenities: Option<Vec<String>>,
    pub images: Option<Vec<String>>,
}
