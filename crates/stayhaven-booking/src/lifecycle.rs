//! Booking lifecycle — the transition table, read-time completion, and
//! the cancellation refund policy.
//!
//! The graph is `Pending → Confirmed → Completed`, with `Cancelled`
//! reachable from `Pending` and `Confirmed`. `Cancelled` and
//! `Completed` are terminal: every action from them fails with
//! [`BookingError::InvalidTransition`], never a silent no-op.

use chrono::{DateTime, NaiveDate, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use stayhaven_core::models::booking::BookingStatus;

use crate::error::BookingError;

/// Events that drive the booking lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BookingAction {
    /// Payment capture succeeded.
    Confirm,
    /// Explicit guest or owner cancellation.
    Cancel,
    /// Checkout date has elapsed without a cancellation.
    Complete,
}

/// Apply an action to a status, yielding the next status.
pub fn next_status(
    current: BookingStatus,
    action: BookingAction,
) -> Result<BookingStatus, BookingError> {
    use BookingAction::*;
    use BookingStatus::*;

    match (current, action) {
        (Pending, Confirm) => Ok(Confirmed),
        (Pending, Cancel) | (Confirmed, Cancel) => Ok(Cancelled),
        (Confirmed, Complete) => Ok(Completed),
        (from, action) => Err(BookingError::InvalidTransition { from, action }),
    }
}

/// Read-time status resolution.
///
/// A confirmed booking whose checkout date has passed reads as
/// `Completed` even if the periodic sweep has not persisted the
/// transition yet. The checkout day itself does not count as elapsed.
pub fn resolve_status(status: BookingStatus, check_out: NaiveDate, today: NaiveDate) -> BookingStatus {
    match status {
        BookingStatus::Confirmed if check_out < today => BookingStatus::Completed,
        other => other,
    }
}

/// Cancellation refund policy, as a percentage of the amount paid.
///
/// - 100% within 24 hours of booking;
/// - otherwise 50% when check-in is at least 7 days away;
/// - otherwise 0%.
pub fn refund_percentage(
    booked_at: DateTime<Utc>,
    check_in: NaiveDate,
    now: DateTime<Utc>,
) -> u8 {
    if now - booked_at < TimeDelta::hours(24) {
        return 100;
    }
    if (check_in - now.date_naive()).num_days() >= 7 {
        return 50;
    }
    0
}
