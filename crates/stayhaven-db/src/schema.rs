//! Schema definitions and migration runner for SurrealDB.
//!
//! All table definitions use SCHEMAFULL mode for data integrity.
//! UUIDs are stored as strings. Enums are stored as strings with
//! ASSERT constraints for validation. Monetary amounts are stored as
//! decimal strings, and stay dates as ISO `YYYY-MM-DD` strings —
//! lexicographic order on those is chronological order, which is what
//! the booking overlap and completion queries rely on.

use serde::Deserialize;
use surrealdb::{Connection, Surreal};
use tracing::info;

use crate::error::DbError;

// -----------------------------------------------------------------------
// Migration tracking
// -----------------------------------------------------------------------

const MIGRATION_TABLE_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_migration_version ON TABLE _migration \
    COLUMNS version UNIQUE;
";

#[derive(Debug, Deserialize)]
struct MigrationRecord {
    version: u32,
    #[allow(dead_code)]
    name: String,
}

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "initial_schema",
    sql: SCHEMA_V1,
}];

// -----------------------------------------------------------------------
// Schema v1 — initial table definitions
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Users
-- =======================================================================
DEFINE TABLE user SCHEMAFULL;
DEFINE FIELD email ON TABLE user TYPE string;
DEFINE FIELD password_hash ON TABLE user TYPE string;
DEFINE FIELD first_name ON TABLE user TYPE string;
DEFINE FIELD last_name ON TABLE user TYPE string;
DEFINE FIELD mobile ON TABLE user TYPE option<string>;
DEFINE FIELD role ON TABLE user TYPE string \
    ASSERT $value IN ['Renter', 'Owner', 'Admin'];
DEFINE FIELD is_verified ON TABLE user TYPE bool DEFAULT false;
DEFINE FIELD created_at ON TABLE user TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE user TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_user_email ON TABLE user COLUMNS email UNIQUE;

-- =======================================================================
-- Properties
-- =======================================================================
DEFINE TABLE property SCHEMAFULL;
DEFINE FIELD owner_id ON TABLE property TYPE string;
DEFINE FIELD title ON TABLE property TYPE string;
DEFINE FIELD description ON TABLE property TYPE string;
DEFINE FIELD kind ON TABLE property TYPE string \
    ASSERT $value IN ['Apartment', 'House', 'Villa', 'Condo'];
DEFINE FIELD location ON TABLE property TYPE string;
DEFINE FIELD city ON TABLE property TYPE string;
DEFINE FIELD state ON TABLE property TYPE string;
DEFINE FIELD country ON TABLE property TYPE string;
DEFINE FIELD nightly_rate ON TABLE property TYPE string;
DEFINE FIELD bedrooms ON TABLE property TYPE int;
DEFINE FIELD bathrooms ON TABLE property TYPE int;
DEFINE FIELD max_guests ON TABLE property TYPE int;
DEFINE FIELD amenities ON TABLE property TYPE array;
DEFINE FIELD amenities.* ON TABLE property TYPE string;
DEFINE FIELD images ON TABLE property TYPE array;
DEFINE FIELD images.* ON TABLE property TYPE string;
DEFINE FIELD status ON TABLE property TYPE string \
    ASSERT $value IN ['Pending', 'Approved', 'Rejected'];
DEFINE FIELD rating ON TABLE property TYPE string;
DEFINE FIELD review_count ON TABLE property TYPE int DEFAULT 0;
DEFINE FIELD created_at ON TABLE property TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE property TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_property_owner ON TABLE property COLUMNS owner_id;
DEFINE INDEX idx_property_status ON TABLE property COLUMNS status;

-- =======================================================================
-- Bookings
-- =======================================================================
DEFINE TABLE booking SCHEMAFULL;
DEFINE FIELD user_id ON TABLE booking TYPE string;
DEFINE FIELD property_id ON TABLE booking TYPE string;
DEFINE FIELD check_in ON TABLE booking TYPE string;
DEFINE FIELD check_out ON TABLE booking TYPE string;
DEFINE FIELD guests ON TABLE booking TYPE int;
DEFINE FIELD total_amount ON TABLE booking TYPE string;
DEFINE FIELD status ON TABLE booking TYPE string \
    ASSERT $value IN ['Pending', 'Confirmed', 'Cancelled', 'Completed'];
DEFINE FIELD payment_status ON TABLE booking TYPE string \
    ASSERT $value IN ['Pending', 'Paid', 'Refunded'];
DEFINE FIELD created_at ON TABLE booking TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE booking TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_booking_property ON TABLE booking \
    COLUMNS property_id, status;
DEFINE INDEX idx_booking_user ON TABLE booking COLUMNS user_id;

-- =======================================================================
-- Reviews (1:1 with a completed booking)
-- =======================================================================
DEFINE TABLE review SCHEMAFULL;
DEFINE FIELD user_id ON TABLE review TYPE string;
DEFINE FIELD property_id ON TABLE review TYPE string;
DEFINE FIELD booking_id ON TABLE review TYPE string;
DEFINE FIELD rating ON TABLE review TYPE int;
DEFINE FIELD comment ON TABLE review TYPE option<string>;
DEFINE FIELD created_at ON TABLE review TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_review_property ON TABLE review COLUMNS property_id;
DEFINE INDEX idx_review_booking ON TABLE review \
    COLUMNS booking_id UNIQUE;

-- =======================================================================
-- OTP records (password reset; record id is the normalized email)
-- =======================================================================
DEFINE TABLE otp SCHEMAFULL;
DEFINE FIELD email ON TABLE otp TYPE string;
DEFINE FIELD code_hash ON TABLE otp TYPE string;
DEFINE FIELD expires_at ON TABLE otp TYPE datetime;
DEFINE FIELD used ON TABLE otp TYPE bool DEFAULT false;
DEFINE FIELD attempts ON TABLE otp TYPE int DEFAULT 0;
DEFINE FIELD created_at ON TABLE otp TYPE datetime \
    DEFAULT time::now();
";

// -----------------------------------------------------------------------
// Public API
// -----------------------------------------------------------------------

/// Run all pending migrations against the given SurrealDB client.
///
/// Creates a `_migration` tracking table on first run, then applies
/// each migration whose version exceeds the current maximum.
/// All DEFINE statements are idempotent so re-running is safe.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    // Ensure migration tracking table exists (idempotent).
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Schema(e.to_string()))?;

    // Determine current schema version.
    let mut result = db
        .query("SELECT * FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let records: Vec<MigrationRecord> = result.take(0)?;
    let current_version = records.first().map(|m| m.version).unwrap_or(0);

    for migration in MIGRATIONS {
        if migration.version > current_version {
            info!(
                version = migration.version,
                name = migration.name,
                "Applying migration"
            );
            db.query(migration.sql).await?.check().map_err(|e| {
                DbError::Schema(format!(
                    "Migration v{} '{}' failed: {}",
                    migration.version, migration.name, e,
                ))
            })?;

            // Record the applied migration.
            db.query(
                "CREATE _migration SET version = $version, \
                 name = $name",
            )
            .bind(("version", migration.version))
            .bind(("name", migration.name))
            .await?
            .check()
            .map_err(|e| {
                DbError::Schema(format!(
                    "Failed to record migration v{}: {}",
                    migration.version, e,
                ))
            })?;

            info!(
                version = migration.version,
                "Migration applied successfully"
            );
        }
    }

    Ok(())
}

/// Returns the raw schema DDL for version 1.
///
/// Exposed for testing with in-memory SurrealDB instances that
/// bypass the migration runner.
pub fn schema_v1() -> &'static str {
    SCHEMA_V1
}
