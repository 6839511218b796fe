//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. Implementations live in
//! `stayhaven-db`; services depend only on these traits.

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::error::HavenResult;
use crate::models::{
    booking::{Booking, BookingStatus, CreateBooking, PaymentStatus},
    otp::{CreateOtp, OtpRecord},
    property::{CreateProperty, Property, PropertyStatus, UpdateProperty},
    review::{CreateReview, Review},
    user::{CreateUser, UpdateUser, User},
};

/// Pagination parameters for list queries.
#[derive(Debug, Clone)]
pub struct Pagination {
    pub offset: u64,
    pub limit: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 50,
        }
    }
}

/// A paginated result set.
#[derive(Debug, Clone)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub offset: u64,
    pub limit: u64,
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

pub trait UserRepository: Send + Sync {
    /// Create a user. The raw password in the input is hashed before
    /// storage; emails are unique.
    fn create(&self, input: CreateUser) -> impl Future<Output = HavenResult<User>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = HavenResult<User>> + Send;
    fn get_by_email(&self, email: &str) -> impl Future<Output = HavenResult<User>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateUser,
    ) -> impl Future<Output = HavenResult<User>> + Send;
    /// Replace the stored credential with an already-hashed password.
    fn update_password(
        &self,
        id: Uuid,
        password_hash: &str,
    ) -> impl Future<Output = HavenResult<()>> + Send;
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

pub trait PropertyRepository: Send + Sync {
    /// Create a listing in `Pending` status. Rejects non-positive
    /// nightly rates and zero guest capacity.
    fn create(&self, input: CreateProperty)
    -> impl Future<Output = HavenResult<Property>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = HavenResult<Property>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateProperty,
    ) -> impl Future<Output = HavenResult<Property>> + Send;
    /// Approval decision (admin operation).
    fn set_status(
        &self,
        id: Uuid,
        status: PropertyStatus,
    ) -> impl Future<Output = HavenResult<Property>> + Send;
    /// Bookable listings, newest first.
    fn list_approved(
        &self,
        pagination: Pagination,
    ) -> impl Future<Output = HavenResult<PaginatedResult<Property>>> + Send;
    fn list_by_owner(
        &self,
        owner_id: Uuid,
        pagination: Pagination,
    ) -> impl Future<Output = HavenResult<PaginatedResult<Property>>> + Send;
}

// ---------------------------------------------------------------------------
// Bookings
// ---------------------------------------------------------------------------

pub trait BookingRepository: Send + Sync {
    fn create(&self, input: CreateBooking) -> impl Future<Output = HavenResult<Booking>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = HavenResult<Booking>> + Send;
    /// Persist a lifecycle transition; `payment_status` is left
    /// untouched when `None`.
    fn update_status(
        &self,
        id: Uuid,
        status: BookingStatus,
        payment_status: Option<PaymentStatus>,
    ) -> impl Future<Output = HavenResult<Booking>> + Send;
    /// Pending or confirmed bookings of the property whose half-open
    /// `[check_in, check_out)` range intersects the given one.
    fn find_overlapping(
        &self,
        property_id: Uuid,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> impl Future<Output = HavenResult<Vec<Booking>>> + Send;
    fn list_by_user(
        &self,
        user_id: Uuid,
        pagination: Pagination,
    ) -> impl Future<Output = HavenResult<PaginatedResult<Booking>>> + Send;
    fn list_by_property(
        &self,
        property_id: Uuid,
        pagination: Pagination,
    ) -> impl Future<Output = HavenResult<PaginatedResult<Booking>>> + Send;
    /// Mark every confirmed booking with `check_out < today` as
    /// completed. Returns the number of bookings transitioned.
    fn complete_departed(&self, today: NaiveDate)
    -> impl Future<Output = HavenResult<u64>> + Send;
}

// ---------------------------------------------------------------------------
// OTP records (password reset)
// ---------------------------------------------------------------------------

pub trait OtpRepository: Send + Sync {
    /// Create or replace the record for the input's email. Replacement
    /// supersedes any earlier code: at most one live code per email.
    fn upsert(&self, input: CreateOtp) -> impl Future<Output = HavenResult<OtpRecord>> + Send;
    fn get_by_email(&self, email: &str)
    -> impl Future<Output = HavenResult<OtpRecord>> + Send;
    /// Flip the single-use flag after a successful verification.
    fn mark_used(&self, email: &str) -> impl Future<Output = HavenResult<()>> + Send;
    /// Count a failed verification; returns the updated attempt count.
    fn record_failed_attempt(
        &self,
        email: &str,
    ) -> impl Future<Output = HavenResult<u32>> + Send;
    fn delete(&self, email: &str) -> impl Future<Output = HavenResult<()>> + Send;
    /// Remove all expired records. Returns the number removed.
    fn delete_expired(
        &self,
        now: DateTime<Utc>,
    ) -> impl Future<Output = HavenResult<u64>> + Send;
}

// ---------------------------------------------------------------------------
// Reviews
// ---------------------------------------------------------------------------

pub trait ReviewRepository: Send + Sync {
    /// Create a review for a completed booking owned by the reviewer,
    /// updating the property's rating aggregate.
    fn create(&self, input: CreateReview) -> impl Future<Output = HavenResult<Review>> + Send;
    fn list_by_property(
        &self,
        property_id: Uuid,
        pagination: Pagination,
    ) -> impl Future<Output = HavenResult<PaginatedResult<Review>>> + Send;
}
