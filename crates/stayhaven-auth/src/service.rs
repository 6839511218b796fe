//! Password-reset service — the email → otp → password flow.

use chrono::{Duration, Utc};
use stayhaven_core::error::{HavenError, HavenResult};
use stayhaven_core::models::otp::{CreateOtp, OtpRecord};
use stayhaven_core::repository::{OtpRepository, UserRepository};
use tracing::debug;

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::mailer::OtpMailer;
use crate::otp;
use crate::password;

/// Where the caller stands in the reset flow after each operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetStep {
    AwaitingOtp,
    AwaitingNewPassword,
    Done,
}

/// Password-reset service.
///
/// Generic over repository and mailer implementations so that the
/// flow has no dependency on the database crate or any mail
/// transport.
pub struct PasswordResetService<U: UserRepository, O: OtpRepository, M: OtpMailer> {
    users: U,
    otps: O,
    mailer: M,
    config: AuthConfig,
}

/// Lowercased, trimmed form used for lookups and as the OTP record key.
fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl<U: UserRepository, O: OtpRepository, M: OtpMailer> PasswordResetService<U, O, M> {
    pub fn new(users: U, otps: O, mailer: M, config: AuthConfig) -> Self {
        Self {
            users,
            otps,
            mailer,
            config,
        }
    }

    /// Issue a fresh code for the address and dispatch it out of band.
    ///
    /// Succeeds whether or not an account exists — responses must not
    /// reveal which addresses are registered. A repeat request
    /// supersedes the previous code: at most one code is live per
    /// email.
    pub async fn request_otp(&self, email: &str) -> HavenResult<ResetStep> {
        let email = normalize_email(email);

        // 1. Look up the account; unknown addresses get the same
        //    answer with nothing sent.
        let user = match self.users.get_by_email(&email).await {
            Ok(user) => user,
            Err(HavenError::NotFound { .. }) => {
                debug!("Password reset requested for unknown email");
                return Ok(ResetStep::AwaitingOtp);
            }
            Err(e) => return Err(e),
        };

        // 2. Generate and store the code (hash only).
        let code = otp::generate_code();
        let expires_at = Utc::now() + Duration::seconds(self.config.otp_lifetime_secs as i64);
        self.otps
            .upsert(CreateOtp {
                email: user.email.clone(),
                code_hash: otp::hash_code(&code),
                expires_at,
            })
            .await?;

        // 3. Dispatch. Delivery failure fails the request — the user
        //    would otherwise wait on a code that never arrives.
        self.mailer
            .send_otp(&user.email, &code)
            .await
            .map_err(|e| AuthError::MailerFailure(e.to_string()))?;

        debug!("Password reset code issued");
        Ok(ResetStep::AwaitingOtp)
    }

    /// Check a submitted code and consume it on success.
    ///
    /// Every failure mode — no record, superseded, expired, already
    /// used, attempt cap reached, wrong code — yields the same
    /// generic error.
    pub async fn verify_otp(&self, email: &str, code: &str) -> HavenResult<ResetStep> {
        let email = normalize_email(email);
        let record = self.fetch_record(&email).await?;

        if !record.is_live(Utc::now(), self.config.otp_max_attempts) {
            return Err(AuthError::InvalidOrExpiredOtp.into());
        }
        if !self.code_matches(&record, code) {
            self.otps.record_failed_attempt(&email).await?;
            return Err(AuthError::InvalidOrExpiredOtp.into());
        }

        // Single-use: a second verification of the same code fails.
        self.otps.mark_used(&email).await?;
        Ok(ResetStep::AwaitingNewPassword)
    }

    /// Re-validate the code and replace the account password.
    ///
    /// The code is checked again here — client-held step state is not
    /// trusted. A record consumed by [`Self::verify_otp`] is still
    /// accepted as long as the code matches and it has not expired;
    /// the record is deleted on success, so a completed flow cannot
    /// be replayed.
    pub async fn reset_password(
        &self,
        email: &str,
        code: &str,
        new_password: &str,
    ) -> HavenResult<ResetStep> {
        // 1. Password policy first: a policy failure must not consume
        //    the code.
        if new_password.len() < self.config.min_password_length {
            return Err(AuthError::PasswordTooShort {
                min: self.config.min_password_length,
            }
            .into());
        }

        // 2. Re-validate the code.
        let email = normalize_email(email);
        let record = self.fetch_record(&email).await?;

        let expired_or_capped = Utc::now() >= record.expires_at
            || record.attempts >= self.config.otp_max_attempts;
        if expired_or_capped || !self.code_matches(&record, code) {
            return Err(AuthError::InvalidOrExpiredOtp.into());
        }

        // 3. Rotate the credential.
        let user = self.users.get_by_email(&email).await?;
        let hash = password::hash_password(new_password, self.config.pepper.as_deref())?;
        self.users.update_password(user.id, &hash).await?;

        // 4. Burn the record.
        self.otps.delete(&email).await?;

        debug!("Password reset completed");
        Ok(ResetStep::Done)
    }

    async fn fetch_record(&self, email: &str) -> HavenResult<OtpRecord> {
        match self.otps.get_by_email(email).await {
            Ok(record) => Ok(record),
            Err(HavenError::NotFound { .. }) => Err(AuthError::InvalidOrExpiredOtp.into()),
            Err(e) => Err(e),
        }
    }

    fn code_matches(&self, record: &OtpRecord, code: &str) -> bool {
        otp::hash_code(code.trim()) == record.code_hash
    }
}
