//! Stayhaven Auth — Argon2id password hashing and the OTP-based
//! password-reset flow.

pub mod config;
pub mod error;
pub mod mailer;
pub mod otp;
pub mod password;
pub mod service;

pub use config::AuthConfig;
pub use error::AuthError;
pub use mailer::{MailerError, OtpMailer};
pub use service::{PasswordResetService, ResetStep};
