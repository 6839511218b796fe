//! SurrealDB implementation of [`OtpRepository`].
//!
//! OTP records are keyed by the normalized email itself, so there is
//! exactly one record per address and `UPSERT` atomically supersedes
//! any earlier code when a new one is requested. Concurrent requests
//! for the same email serialize on that single record.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use stayhaven_core::error::HavenResult;
use stayhaven_core::models::otp::{CreateOtp, OtpRecord};
use stayhaven_core::repository::OtpRepository;
use surrealdb::sql::Datetime;
use surrealdb::{Connection, Surreal};

use crate::error::DbError;

#[derive(Debug, Deserialize)]
struct OtpRow {
    email: String,
    code_hash: String,
    expires_at: Datetime,
    used: bool,
    attempts: u32,
    created_at: Datetime,
}

#[derive(Debug, Deserialize)]
struct CountRow {
    total: u64,
}

impl OtpRow {
    fn into_record(self) -> OtpRecord {
        OtpRecord {
            email: self.email,
            code_hash: self.code_hash,
            expires_at: self.expires_at.0,
            used: self.used,
            attempts: self.attempts,
            created_at: self.created_at.0,
        }
    }
}

/// SurrealDB implementation of the OTP repository.
#[derive(Clone)]
pub struct SurrealOtpRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealOtpRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> OtpRepository for SurrealOtpRepository<C> {
    async fn upsert(&self, input: CreateOtp) -> HavenResult<OtpRecord> {
        let email = input.email.clone();

        let result = self
            .db
            .query(
                "UPSERT type::thing('otp', $email) SET \
                 email = $email, \
                 code_hash = $code_hash, \
                 expires_at = $expires_at, \
                 used = false, \
                 attempts = 0, \
                 created_at = time::now()",
            )
            .bind(("email", email.clone()))
            .bind(("code_hash", input.code_hash))
            .bind(("expires_at", Datetime::from(input.expires_at)))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(|e| DbError::Schema(e.to_string()))?;

        let rows: Vec<OtpRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "otp".into(),
            id: email,
        })?;

        Ok(row.into_record())
    }

    async fn get_by_email(&self, email: &str) -> HavenResult<OtpRecord> {
        let email = email.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::thing('otp', $email)")
            .bind(("email", email.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<OtpRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "otp".into(),
            id: email,
        })?;

        Ok(row.into_record())
    }

    async fn mark_used(&self, email: &str) -> HavenResult<()> {
        let email = email.to_string();

        let mut result = self
            .db
            .query("UPDATE type::thing('otp', $email) SET used = true")
            .bind(("email", email.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<OtpRow> = result.take(0).map_err(DbError::from)?;
        if rows.is_empty() {
            return Err(DbError::NotFound {
                entity: "otp".into(),
                id: email,
            }
            .into());
        }

        Ok(())
    }

    async fn record_failed_attempt(&self, email: &str) -> HavenResult<u32> {
        let email = email.to_string();

        let mut result = self
            .db
            .query("UPDATE type::thing('otp', $email) SET attempts += 1")
            .bind(("email", email.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<OtpRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "otp".into(),
            id: email,
        })?;

        Ok(row.attempts)
    }

    async fn delete(&self, email: &str) -> HavenResult<()> {
        self.db
            .query("DELETE type::thing('otp', $email)")
            .bind(("email", email.to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> HavenResult<u64> {
        // Count expired records first, then delete.
        let mut count_result = self
            .db
            .query(
                "SELECT count() AS total FROM otp \
                 WHERE expires_at < $now GROUP ALL",
            )
            .bind(("now", Datetime::from(now)))
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        self.db
            .query("DELETE otp WHERE expires_at < $now")
            .bind(("now", Datetime::from(now)))
            .await
            .map_err(DbError::from)?;

        Ok(total)
    }
}
