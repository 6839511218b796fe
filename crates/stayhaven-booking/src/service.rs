//! Booking service — quoting, creation, payment confirmation, and
//! cancellation orchestration.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use stayhaven_core::error::HavenResult;
use stayhaven_core::models::booking::{
    Booking, BookingStatus, CreateBooking, PaymentStatus,
};
use stayhaven_core::models::property::PropertyStatus;
use stayhaven_core::repository::{BookingRepository, PropertyRepository};
use tracing::info;
use uuid::Uuid;

use crate::error::BookingError;
use crate::lifecycle::{BookingAction, next_status, refund_percentage, resolve_status};
use crate::payment::{PaymentGateway, PaymentMethod};
use crate::pricing::{Quote, compute_quote};

/// Input for the booking creation flow.
#[derive(Debug)]
pub struct CreateBookingRequest {
    pub user_id: Uuid,
    pub property_id: Uuid,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub guests: u32,
}

/// Outcome of a cancellation.
#[derive(Debug)]
pub struct Cancellation {
    pub booking: Booking,
    /// Refund tier applied (100, 50, or 0).
    pub refund_percent: u8,
    /// Amount returned to the guest; zero unless the booking was paid.
    pub refund_amount: Decimal,
}

/// Booking service.
///
/// Generic over repository and gateway implementations so that the
/// booking layer has no dependency on the database crate or any
/// payment provider SDK.
pub struct BookingService<P: PropertyRepository, B: BookingRepository, G: PaymentGateway> {
    properties: P,
    bookings: B,
    gateway: G,
}

impl<P: PropertyRepository, B: BookingRepository, G: PaymentGateway> BookingService<P, B, G> {
    pub fn new(properties: P, bookings: B, gateway: G) -> Self {
        Self {
            properties,
            bookings,
            gateway,
        }
    }

    /// Price a prospective stay against the property's current rate.
    pub async fn quote(
        &self,
        property_id: Uuid,
        check_in: NaiveDate,
        check_out: NaiveDate,
        guests: u32,
    ) -> HavenResult<Quote> {
        let property = self.properties.get_by_id(property_id).await?;
        if property.status != PropertyStatus::Approved {
            return Err(BookingError::PropertyNotBookable.into());
        }

        let quote = compute_quote(
            property.nightly_rate,
            check_in,
            check_out,
            guests,
            property.max_guests,
        )?;
        Ok(quote)
    }

    /// Create a booking in `Pending`/`Pending` with a freshly computed
    /// total.
    pub async fn create_booking(&self, request: CreateBookingRequest) -> HavenResult<Booking> {
        // 1. Validate the stay and price it. The total is computed
        //    here, never taken from the client.
        let quote = self
            .quote(
                request.property_id,
                request.check_in,
                request.check_out,
                request.guests,
            )
            .await?;

        // 2. Reject if any pending or confirmed booking already holds
        //    an overlapping date range.
        let overlapping = self
            .bookings
            .find_overlapping(request.property_id, request.check_in, request.check_out)
            .await?;
        if !overlapping.is_empty() {
            return Err(BookingError::DatesUnavailable.into());
        }

        // 3. Persist.
        let booking = self
            .bookings
            .create(CreateBooking {
                user_id: request.user_id,
                property_id: request.property_id,
                check_in: request.check_in,
                check_out: request.check_out,
                guests: request.guests,
                total_amount: quote.total,
            })
            .await?;

        info!(booking_id = %booking.id, total = %booking.total_amount, "Booking created");
        Ok(booking)
    }

    /// Capture payment and confirm a pending booking.
    pub async fn confirm_payment(
        &self,
        booking_id: Uuid,
        method: &PaymentMethod,
    ) -> HavenResult<Booking> {
        let booking = self.bookings.get_by_id(booking_id).await?;

        // 1. Gate on the lifecycle graph before touching money.
        next_status(booking.status, BookingAction::Confirm)?;

        // 2. Re-check availability right before capture: another
        //    booking may have been confirmed since this one was
        //    created.
        let overlapping = self
            .bookings
            .find_overlapping(booking.property_id, booking.check_in, booking.check_out)
            .await?;
        if overlapping.iter().any(|b| b.id != booking.id) {
            return Err(BookingError::DatesUnavailable.into());
        }

        // 3. Capture the charge; a gateway failure leaves the booking
        //    pending and is surfaced verbatim for the user to retry.
        let receipt = self
            .gateway
            .capture(booking.total_amount, method)
            .await
            .map_err(|e| BookingError::PaymentFailure(e.to_string()))?;

        // 4. Persist the transition.
        let confirmed = self
            .bookings
            .update_status(booking.id, BookingStatus::Confirmed, Some(PaymentStatus::Paid))
            .await?;

        info!(
            booking_id = %confirmed.id,
            reference = %receipt.reference,
            "Booking confirmed"
        );
        Ok(confirmed)
    }

    /// Cancel a pending or confirmed booking, applying the refund
    /// policy tiers.
    pub async fn cancel_booking(
        &self,
        booking_id: Uuid,
        now: DateTime<Utc>,
    ) -> HavenResult<Cancellation> {
        let booking = self.bookings.get_by_id(booking_id).await?;

        // 1. Terminal states (and completed stays) cannot be cancelled.
        next_status(booking.status, BookingAction::Cancel)?;

        // 2. Evaluate the refund tier from booking age and lead time.
        let refund_percent = refund_percentage(booking.created_at, booking.check_in, now);
        let refund_amount = if booking.payment_status == PaymentStatus::Paid {
            booking.total_amount * Decimal::from(refund_percent) / Decimal::ONE_HUNDRED
        } else {
            Decimal::ZERO
        };

        // 3. Persist. The payment moves to Refunded only when money
        //    actually flows back; the refund itself is the payment
        //    collaborator's job.
        let payment_status = if refund_amount > Decimal::ZERO {
            Some(PaymentStatus::Refunded)
        } else {
            None
        };
        let cancelled = self
            .bookings
            .update_status(booking.id, BookingStatus::Cancelled, payment_status)
            .await?;

        info!(
            booking_id = %cancelled.id,
            refund_percent,
            refund = %refund_amount,
            "Booking cancelled"
        );
        Ok(Cancellation {
            booking: cancelled,
            refund_percent,
            refund_amount,
        })
    }

    /// Status as it should be displayed right now — confirmed stays
    /// whose checkout has elapsed read as completed even before the
    /// sweep persists them.
    pub fn current_status(&self, booking: &Booking, today: NaiveDate) -> BookingStatus {
        resolve_status(booking.status, booking.check_out, today)
    }

    /// Persist completion for every confirmed booking whose checkout
    /// date has elapsed. Driven periodically by the server.
    pub async fn complete_departed(&self, today: NaiveDate) -> HavenResult<u64> {
        let completed = self.bookings.complete_departed(today).await?;
        if completed > 0 {
            info!(completed, "Swept departed bookings to Completed");
        }
        Ok(completed)
    }
}
