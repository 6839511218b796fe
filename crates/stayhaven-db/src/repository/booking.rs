//! SurrealDB implementation of [`BookingRepository`].
//!
//! Stay dates are stored as ISO `YYYY-MM-DD` strings; lexicographic
//! comparison on those is chronological comparison, so the overlap and
//! completion queries compare them directly.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use stayhaven_core::error::HavenResult;
use stayhaven_core::models::booking::{Booking, BookingStatus, CreateBooking, PaymentStatus};
use stayhaven_core::repository::{BookingRepository, PaginatedResult, Pagination};
use surrealdb::sql::Datetime;
use surrealdb::{Connection, Surreal};
use uuid::Uuid;

use crate::error::DbError;

#[derive(Debug, Deserialize)]
struct BookingRow {
    user_id: String,
    property_id: String,
    check_in: String,
    check_out: String,
    guests: u32,
    total_amount: String,
    status: String,
    payment_status: String,
    created_at: Datetime,
    updated_at: Datetime,
}

/// Row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, Deserialize)]
struct BookingRowWithId {
    record_id: String,
    user_id: String,
    property_id: String,
    check_in: String,
    check_out: String,
    guests: u32,
    total_amount: String,
    status: String,
    payment_status: String,
    created_at: Datetime,
    updated_at: Datetime,
}

#[derive(Debug, Deserialize)]
struct CountRow {
    total: u64,
}

fn parse_status(s: &str) -> Result<BookingStatus, DbError> {
    match s {
        "Pending" => Ok(BookingStatus::Pending),
        "Confirmed" => Ok(BookingStatus::Confirmed),
        "Cancelled" => Ok(BookingStatus::Cancelled),
        "Completed" => Ok(BookingStatus::Completed),
        other => Err(DbError::Schema(format!("unknown booking status: {other}"))),
    }
}

fn status_to_string(status: BookingStatus) -> &'static str {
    match status {
        BookingStatus::Pending => "Pending",
        BookingStatus::Confirmed => "Confirmed",
        BookingStatus::Cancelled => "Cancelled",
        BookingStatus::Completed => "Completed",
    }
}

fn parse_payment_status(s: &str) -> Result<PaymentStatus, DbError> {
    match s {
        "Pending" => Ok(PaymentStatus::Pending),
        "Paid" => Ok(PaymentStatus::Paid),
        "Refunded" => Ok(PaymentStatus::Refunded),
        other => Err(DbError::Schema(format!("unknown payment status: {other}"))),
    }
}

fn payment_status_to_string(status: PaymentStatus) -> &'static str {
    match status {
        PaymentStatus::Pending => "Pending",
        PaymentStatus::Paid => "Paid",
        PaymentStatus::Refunded => "Refunded",
    }
}

fn parse_date(s: &str) -> Result<NaiveDate, DbError> {
    s.parse::<NaiveDate>()
        .map_err(|e| DbError::Schema(format!("invalid date '{s}': {e}")))
}

fn parse_decimal(s: &str) -> Result<Decimal, DbError> {
    s.parse::<Decimal>()
        .map_err(|e| DbError::Schema(format!("invalid decimal '{s}': {e}")))
}

impl BookingRow {
    fn into_booking(self, id: Uuid) -> Result<Booking, DbError> {
        let user_id = Uuid::parse_str(&self.user_id)
            .map_err(|e| DbError::Schema(format!("invalid user UUID: {e}")))?;
        let property_id = Uuid::parse_str(&self.property_id)
            .map_err(|e| DbError::Schema(format!("invalid property UUID: {e}")))?;
        Ok(Booking {
            id,
            user_id,
            property_id,
            check_in: parse_date(&self.check_in)?,
            check_out: parse_date(&self.check_out)?,
            guests: self.guests,
            total_amount: parse_decimal(&self.total_amount)?,
            status: parse_status(&self.status)?,
            payment_status: parse_payment_status(&self.payment_status)?,
            created_at: self.created_at.0,
            updated_at: self.updated_at.0,
        })
    }
}

impl BookingRowWithId {
    fn try_into_booking(self) -> Result<Booking, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Schema(format!("invalid UUID: {e}")))?;
        let row = BookingRow {
            user_id: self.user_id,
            property_id: self.property_id,
            check_in: self.check_in,
            check_out: self.check_out,
            guests: self.guests,
            total_amount: self.total_amount,
            status: self.status,
            payment_status: self.payment_status,
            created_at: self.created_at,
            updated_at: self.updated_at,
        };
        row.into_booking(id)
    }
}

/// SurrealDB implementation of the Booking repository.
#[derive(Clone)]
pub struct SurrealBookingRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealBookingRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    async fn list_where(
        &self,
        condition: &'static str,
        bind: (&'static str, String),
        pagination: Pagination,
    ) -> HavenResult<PaginatedResult<Booking>> {
        let count_query =
            format!("SELECT count() AS total FROM booking WHERE {condition} GROUP ALL");
        let mut count_result = self
            .db
            .query(count_query)
            .bind((bind.0, bind.1.clone()))
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        let page_query = format!(
            "SELECT meta::id(id) AS record_id, * FROM booking \
             WHERE {condition} \
             ORDER BY created_at DESC \
             LIMIT $limit START $offset"
        );
        let mut result = self
            .db
            .query(page_query)
            .bind((bind.0, bind.1))
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<BookingRowWithId> = result.take(0).map_err(DbError::from)?;
        let items = rows
            .into_iter()
            .map(|row| row.try_into_booking())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }
}

impl<C: Connection> BookingRepository for SurrealBookingRepository<C> {
    async fn create(&self, input: CreateBooking) -> HavenResult<Booking> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::thing('booking', $id) SET \
                 user_id = $user_id, \
                 property_id = $property_id, \
                 check_in = $check_in, \
                 check_out = $check_out, \
                 guests = $guests, \
                 total_amount = $total_amount, \
                 status = 'Pending', \
                 payment_status = 'Pending'",
            )
            .bind(("id", id_str.clone()))
            .bind(("user_id", input.user_id.to_string()))
            .bind(("property_id", input.property_id.to_string()))
            .bind(("check_in", input.check_in.to_string()))
            .bind(("check_out", input.check_out.to_string()))
            .bind(("guests", input.guests))
            .bind(("total_amount", input.total_amount.to_string()))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(|e| DbError::Schema(e.to_string()))?;

        let rows: Vec<BookingRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "booking".into(),
            id: id_str,
        })?;

        Ok(row.into_booking(id)?)
    }

    async fn get_by_id(&self, id: Uuid) -> HavenResult<Booking> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::thing('booking', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<BookingRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "booking".into(),
            id: id_str,
        })?;

        Ok(row.into_booking(id)?)
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: BookingStatus,
        payment_status: Option<PaymentStatus>,
    ) -> HavenResult<Booking> {
        let id_str = id.to_string();

        let query = if payment_status.is_some() {
            "UPDATE type::thing('booking', $id) SET \
             status = $status, \
             payment_status = $payment_status, \
             updated_at = time::now()"
        } else {
            "UPDATE type::thing('booking', $id) SET \
             status = $status, \
             updated_at = time::now()"
        };

        let mut builder = self
            .db
            .query(query)
            .bind(("id", id_str.clone()))
            .bind(("status", status_to_string(status)));
        if let Some(payment) = payment_status {
            builder = builder.bind(("payment_status", payment_status_to_string(payment)));
        }

        let mut result = builder.await.map_err(DbError::from)?;

        let rows: Vec<BookingRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "booking".into(),
            id: id_str,
        })?;

        Ok(row.into_booking(id)?)
    }

    async fn find_overlapping(
        &self,
        property_id: Uuid,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> HavenResult<Vec<Booking>> {
        // Half-open ranges [check_in, check_out) intersect iff each
        // starts before the other ends.
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM booking \
                 WHERE property_id = $property_id \
                 AND status IN ['Pending', 'Confirmed'] \
                 AND check_in < $check_out \
                 AND check_out > $check_in",
            )
            .bind(("property_id", property_id.to_string()))
            .bind(("check_in", check_in.to_string()))
            .bind(("check_out", check_out.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<BookingRowWithId> = result.take(0).map_err(DbError::from)?;
        let bookings = rows
            .into_iter()
            .map(|row| row.try_into_booking())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(bookings)
    }

    async fn list_by_user(
        &self,
        user_id: Uuid,
        pagination: Pagination,
    ) -> HavenResult<PaginatedResult<Booking>> {
        self.list_where(
            "user_id = $user_id",
            ("user_id", user_id.to_string()),
            pagination,
        )
        .await
    }

    async fn list_by_property(
        &self,
        property_id: Uuid,
        pagination: Pagination,
    ) -> HavenResult<PaginatedResult<Booking>> {
        self.list_where(
            "property_id = $property_id",
            ("property_id", property_id.to_string()),
            pagination,
        )
        .await
    }

    async fn complete_departed(&self, today: NaiveDate) -> HavenResult<u64> {
        // Count the departures first, then transition them.
        let mut count_result = self
            .db
            .query(
                "SELECT count() AS total FROM booking \
                 WHERE status = 'Confirmed' AND check_out < $today \
                 GROUP ALL",
            )
            .bind(("today", today.to_string()))
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        self.db
            .query(
                "UPDATE booking SET status = 'Completed', updated_at = time::now() \
                 WHERE status = 'Confirmed' AND check_out < $today",
            )
            .bind(("today", today.to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(total)
    }
}
