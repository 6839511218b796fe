//! Authentication error types.

use stayhaven_core::error::HavenError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    /// Deliberately generic: callers must not learn which part of the
    /// check failed.
    #[error("invalid or expired OTP")]
    InvalidOrExpiredOtp,

    #[error("password must be at least {min} characters")]
    PasswordTooShort { min: usize },

    #[error("failed to dispatch OTP: {0}")]
    MailerFailure(String),

    #[error("cryptography error: {0}")]
    Crypto(String),
}

impl From<AuthError> for HavenError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidOrExpiredOtp => HavenError::InvalidOrExpiredOtp,
            AuthError::PasswordTooShort { .. } => HavenError::Validation {
                message: err.to_string(),
            },
            AuthError::MailerFailure(msg) => HavenError::Mailer(msg),
            AuthError::Crypto(msg) => HavenError::Crypto(msg),
        }
    }
}
