//! Booking error types.

use stayhaven_core::error::HavenError;
use stayhaven_core::models::booking::BookingStatus;
use thiserror::Error;

use crate::lifecycle::BookingAction;

#[derive(Debug, Error)]
pub enum BookingError {
    #[error("check-out must be after check-in")]
    InvalidDateRange,

    #[error("guest count {guests} outside 1..={max_guests}")]
    GuestCountOutOfRange { guests: u32, max_guests: u32 },

    #[error("nightly rate must be positive")]
    InvalidRate,

    #[error("property is not open for booking")]
    PropertyNotBookable,

    #[error("cannot {action:?} a {from:?} booking")]
    InvalidTransition {
        from: BookingStatus,
        action: BookingAction,
    },

    #[error("the requested dates are unavailable")]
    DatesUnavailable,

    #[error("payment failed: {0}")]
    PaymentFailure(String),
}

impl From<BookingError> for HavenError {
    fn from(err: BookingError) -> Self {
        match err {
            BookingError::InvalidDateRange
            | BookingError::GuestCountOutOfRange { .. }
            | BookingError::InvalidRate
            | BookingError::PropertyNotBookable => HavenError::Validation {
                message: err.to_string(),
            },
            BookingError::InvalidTransition { from, action } => HavenError::InvalidTransition {
                from: format!("{from:?}"),
                action: format!("{action:?}"),
            },
            BookingError::DatesUnavailable => HavenError::Conflict {
                message: err.to_string(),
            },
            BookingError::PaymentFailure(reason) => HavenError::PaymentFailed { reason },
        }
    }
}
