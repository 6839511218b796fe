//! Error types for the Stayhaven system.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HavenError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Entity already exists: {entity}")]
    AlreadyExists { entity: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Invalid booking transition: {action} from {from}")]
    InvalidTransition { from: String, action: String },

    #[error("Conflict: {message}")]
    Conflict { message: String },

    #[error("Payment failed: {reason}")]
    PaymentFailed { reason: String },

    #[error("Invalid or expired OTP")]
    InvalidOrExpiredOtp,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Cryptography error: {0}")]
    Crypto(String),

    #[error("Mail dispatch failed: {0}")]
    Mailer(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type HavenResult<T> = Result<T, HavenError>;
