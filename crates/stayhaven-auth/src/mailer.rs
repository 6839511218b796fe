//! Out-of-band OTP dispatch collaborator.
//!
//! The real transport (SMTP, SMS) lives outside this repository. A
//! dispatch failure fails the whole reset request — the user would
//! otherwise wait on a code that never arrives.

use thiserror::Error;

#[derive(Debug, Error)]
#[error("delivery failed: {0}")]
pub struct MailerError(pub String);

/// Sends a one-time code to the address it was issued for.
pub trait OtpMailer: Send + Sync {
    fn send_otp(
        &self,
        email: &str,
        code: &str,
    ) -> impl Future<Output = Result<(), MailerError>> + Send;
}
