//! One-time password record for the password-reset flow.
//!
//! There is at most one record per email — a new request supersedes the
//! previous code. Only the SHA-256 hash of the code is stored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OtpRecord {
    /// Normalized (trimmed, lowercased) email the code was issued for.
    pub email: String,
    /// SHA-256 hash of the 6-digit code, hex-encoded.
    pub code_hash: String,
    pub expires_at: DateTime<Utc>,
    pub used: bool,
    /// Failed verification attempts against this code.
    pub attempts: u32,
    pub created_at: DateTime<Utc>,
}

impl OtpRecord {
    /// Whether the code can still be verified: unused, unexpired, and
    /// under the attempt cap.
    pub fn is_live(&self, now: DateTime<Utc>, max_attempts: u32) -> bool {
        !self.used && now < self.expires_at && self.attempts < max_attempts
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOtp {
    pub email: String,
    pub code_hash: String,
    pub expires_at: DateTime<Utc>,
}
