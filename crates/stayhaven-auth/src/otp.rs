//! OTP code generation and hashing.

use sha2::{Digest, Sha256};

/// Generate a uniformly random 6-digit code, zero-padded.
pub fn generate_code() -> String {
    let mut rng = rand::rng();
    let n: u32 = rand::Rng::random_range(&mut rng, 0..1_000_000);
    format!("{n:06}")
}

/// SHA-256 hash of an OTP code, hex-encoded.
///
/// This is the value stored in the database as `otp.code_hash` — the
/// raw code only ever travels to the mailer.
pub fn hash_code(code: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(code.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_six_digits() {
        for _ in 0..100 {
            let code = generate_code();
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn code_hash_is_deterministic() {
        assert_eq!(hash_code("123456"), hash_code("123456"));
    }

    #[test]
    fn different_codes_different_hashes() {
        assert_ne!(hash_code("123456"), hash_code("654321"));
    }
}
