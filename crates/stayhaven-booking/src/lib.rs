//! Stayhaven Booking — price quoting, booking lifecycle, and payment
//! orchestration.

pub mod error;
pub mod lifecycle;
pub mod payment;
pub mod pricing;
pub mod service;

pub use error::BookingError;
pub use lifecycle::{BookingAction, next_status, refund_percentage, resolve_status};
pub use payment::{CaptureReceipt, PaymentError, PaymentGateway, PaymentMethod};
pub use pricing::{Quote, compute_quote};
pub use service::{BookingService, Cancellation, CreateBookingRequest};
