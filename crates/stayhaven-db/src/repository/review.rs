//! SurrealDB implementation of [`ReviewRepository`].
//!
//! A review may only be written by the guest of a completed booking,
//! once per booking. Creating one recomputes the property's rating
//! aggregate.

use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::Deserialize;
use stayhaven_core::error::{HavenError, HavenResult};
use stayhaven_core::models::review::{CreateReview, Review};
use stayhaven_core::repository::{PaginatedResult, Pagination, ReviewRepository};
use surrealdb::sql::Datetime;
use surrealdb::{Connection, Surreal};
use uuid::Uuid;

use crate::error::DbError;

#[derive(Debug, Deserialize)]
struct ReviewRow {
    user_id: String,
    property_id: String,
    booking_id: String,
    rating: u8,
    comment: Option<String>,
    created_at: Datetime,
}

/// Row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, Deserialize)]
struct ReviewRowWithId {
    record_id: String,
    user_id: String,
    property_id: String,
    booking_id: String,
    rating: u8,
    comment: Option<String>,
    created_at: Datetime,
}

/// Just enough of a booking row to validate the review.
#[derive(Debug, Deserialize)]
struct BookingRef {
    user_id: String,
    property_id: String,
    status: String,
}

#[derive(Debug, Deserialize)]
struct CountRow {
    total: u64,
}

#[derive(Debug, Deserialize)]
struct RatingAggregateRow {
    average: f64,
    total: u64,
}

fn parse_uuid(s: &str, what: &str) -> Result<Uuid, DbError> {
    Uuid::parse_str(s).map_err(|e| DbError::Schema(format!("invalid {what} UUID: {e}")))
}

impl ReviewRow {
    fn into_review(self, id: Uuid) -> Result<Review, DbError> {
        Ok(Review {
            id,
            user_id: parse_uuid(&self.user_id, "user")?,
            property_id: parse_uuid(&self.property_id, "property")?,
            booking_id: parse_uuid(&self.booking_id, "booking")?,
            rating: self.rating,
            comment: self.comment,
            created_at: self.created_at.0,
        })
    }
}

impl ReviewRowWithId {
    fn try_into_review(self) -> Result<Review, DbError> {
        let id = parse_uuid(&self.record_id, "review")?;
        Ok(Review {
            id,
            user_id: parse_uuid(&self.user_id, "user")?,
            property_id: parse_uuid(&self.property_id, "property")?,
            booking_id: parse_uuid(&self.booking_id, "booking")?,
            rating: self.rating,
            comment: self.comment,
            created_at: self.created_at.0,
        })
    }
}

/// SurrealDB implementation of the Review repository.
#[derive(Clone)]
pub struct SurrealReviewRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealReviewRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    /// Recompute the property's average rating and review count from
    /// the review table.
    async fn refresh_rating_aggregate(&self, property_id: &str) -> HavenResult<()> {
        let mut result = self
            .db
            .query(
                "SELECT <float> math::mean(rating) AS average, count() AS total \
                 FROM review WHERE property_id = $property_id GROUP ALL",
            )
            .bind(("property_id", property_id.to_string()))
            .await
            .map_err(DbError::from)?;
        let rows: Vec<RatingAggregateRow> = result.take(0).map_err(DbError::from)?;

        let (average, total) = rows
            .first()
            .map(|r| (r.average, r.total))
            .unwrap_or((0.0, 0));
        let rating = Decimal::from_f64(average)
            .ok_or_else(|| DbError::Schema(format!("invalid rating average: {average}")))?
            .round_dp(2);

        self.db
            .query(
                "UPDATE type::thing('property', $property_id) SET \
                 rating = $rating, \
                 review_count = $review_count, \
                 updated_at = time::now()",
            )
            .bind(("property_id", property_id.to_string()))
            .bind(("rating", rating.to_string()))
            .bind(("review_count", total))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }
}

impl<C: Connection> ReviewRepository for SurrealReviewRepository<C> {
    async fn create(&self, input: CreateReview) -> HavenResult<Review> {
        if !(1..=5).contains(&input.rating) {
            return Err(HavenError::Validation {
                message: "rating must be between 1 and 5".into(),
            });
        }

        let booking_id_str = input.booking_id.to_string();

        // The booking must exist, belong to the reviewer, and be over.
        let mut result = self
            .db
            .query("SELECT * FROM type::thing('booking', $booking_id)")
            .bind(("booking_id", booking_id_str.clone()))
            .await
            .map_err(DbError::from)?;
        let bookings: Vec<BookingRef> = result.take(0).map_err(DbError::from)?;
        let booking = bookings
            .into_iter()
            .next()
            .ok_or_else(|| DbError::NotFound {
                entity: "booking".into(),
                id: booking_id_str.clone(),
            })?;

        if booking.user_id != input.user_id.to_string() {
            return Err(HavenError::Validation {
                message: "booking does not belong to the reviewer".into(),
            });
        }
        if booking.status != "Completed" {
            return Err(HavenError::Validation {
                message: "only completed stays can be reviewed".into(),
            });
        }

        // One review per booking; the unique index is the backstop.
        let mut existing = self
            .db
            .query("SELECT count() AS total FROM review WHERE booking_id = $booking_id GROUP ALL")
            .bind(("booking_id", booking_id_str.clone()))
            .await
            .map_err(DbError::from)?;
        let counts: Vec<CountRow> = existing.take(0).map_err(DbError::from)?;
        if counts.first().map(|r| r.total).unwrap_or(0) > 0 {
            return Err(HavenError::AlreadyExists {
                entity: "review".into(),
            });
        }

        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::thing('review', $id) SET \
                 user_id = $user_id, \
                 property_id = $property_id, \
                 booking_id = $booking_id, \
                 rating = $rating, \
                 comment = $comment",
            )
            .bind(("id", id_str.clone()))
            .bind(("user_id", input.user_id.to_string()))
            .bind(("property_id", booking.property_id.clone()))
            .bind(("booking_id", booking_id_str))
            .bind(("rating", input.rating))
            .bind(("comment", input.comment))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(|e| DbError::Schema(e.to_string()))?;

        let rows: Vec<ReviewRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "review".into(),
            id: id_str,
        })?;

        self.refresh_rating_aggregate(&booking.property_id).await?;

        Ok(row.into_review(id)?)
    }

    async fn list_by_property(
        &self,
        property_id: Uuid,
        pagination: Pagination,
    ) -> HavenResult<PaginatedResult<Review>> {
        let property_id_str = property_id.to_string();

        let mut count_result = self
            .db
            .query(
                "SELECT count() AS total FROM review \
                 WHERE property_id = $property_id GROUP ALL",
            )
            .bind(("property_id", property_id_str.clone()))
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM review \
                 WHERE property_id = $property_id \
                 ORDER BY created_at DESC \
                 LIMIT $limit START $offset",
            )
            .bind(("property_id", property_id_str))
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ReviewRowWithId> = result.take(0).map_err(DbError::from)?;
        let items = rows
            .into_iter()
            .map(|row| row.try_into_review())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }
}
