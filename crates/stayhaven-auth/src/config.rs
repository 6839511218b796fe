//! Authentication configuration.

/// Configuration for the password-reset flow.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// OTP validity window in seconds (default: 600 = 10 minutes).
    pub otp_lifetime_secs: u64,
    /// Failed verification attempts before a code stops working
    /// (default: 5).
    pub otp_max_attempts: u32,
    /// Minimum accepted password length (default: 6).
    pub min_password_length: usize,
    /// Optional pepper prepended to passwords before Argon2id hashing.
    /// Must match the pepper used by the user repository.
    pub pepper: Option<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            otp_lifetime_secs: 600,
            otp_max_attempts: 5,
            min_password_length: 6,
            pepper: None,
        }
    }
}
