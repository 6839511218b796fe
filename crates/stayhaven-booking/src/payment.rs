//! Payment collaborator interface.
//!
//! The actual charge processor lives outside this repository; the
//! booking service only needs a capture call that either succeeds with
//! a receipt or fails with a user-retryable reason.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// An opaque payment instrument reference (tokenized card, wallet id).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentMethod {
    pub token: String,
    /// Display label, e.g. "visa ending 4242".
    pub label: String,
}

/// Proof of a captured charge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureReceipt {
    pub reference: String,
    pub amount: Decimal,
}

#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("charge declined: {0}")]
    Declined(String),

    #[error("payment provider unavailable: {0}")]
    ProviderUnavailable(String),
}

/// Charge capture collaborator.
pub trait PaymentGateway: Send + Sync {
    fn capture(
        &self,
        amount: Decimal,
        method: &PaymentMethod,
    ) -> impl Future<Output = Result<CaptureReceipt, PaymentError>> + Send;
}
