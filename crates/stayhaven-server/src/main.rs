//! Stayhaven Server — application entry point.
//!
//! Connects to SurrealDB, applies migrations, and runs the periodic
//! maintenance sweep (booking completion + expired-OTP purge) until
//! interrupted. The HTTP API fronting these services is deployed
//! separately.

use std::env;
use std::time::Duration;

use anyhow::Context;
use chrono::Utc;
use stayhaven_core::repository::{BookingRepository, OtpRepository};
use stayhaven_db::repository::{SurrealBookingRepository, SurrealOtpRepository};
use stayhaven_db::{DbConfig, DbManager};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Seconds between maintenance sweeps.
const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 3600;

fn db_config_from_env() -> DbConfig {
    let defaults = DbConfig::default();
    DbConfig {
        url: env::var("STAYHAVEN_DB_URL").unwrap_or(defaults.url),
        namespace: env::var("STAYHAVEN_DB_NS").unwrap_or(defaults.namespace),
        database: env::var("STAYHAVEN_DB_NAME").unwrap_or(defaults.database),
        username: env::var("STAYHAVEN_DB_USER").unwrap_or(defaults.username),
        password: env::var("STAYHAVEN_DB_PASS").unwrap_or(defaults.password),
    }
}

fn sweep_interval_from_env() -> Duration {
    let secs = env::var("STAYHAVEN_SWEEP_INTERVAL_SECS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_SWEEP_INTERVAL_SECS);
    Duration::from_secs(secs)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting Stayhaven server...");

    let config = db_config_from_env();
    let manager = DbManager::connect(&config)
        .await
        .context("connecting to SurrealDB")?;
    stayhaven_db::run_migrations(manager.client())
        .await
        .context("running migrations")?;

    let bookings = SurrealBookingRepository::new(manager.client().clone());
    let otps = SurrealOtpRepository::new(manager.client().clone());

    let interval = sweep_interval_from_env();
    info!(interval_secs = interval.as_secs(), "Maintenance sweep scheduled");

    let sweeper = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;

            let now = Utc::now();
            match bookings.complete_departed(now.date_naive()).await {
                Ok(0) => {}
                Ok(completed) => info!(completed, "Departed bookings completed"),
                Err(e) => error!(error = %e, "Booking completion sweep failed"),
            }
            match otps.delete_expired(now).await {
                Ok(0) => {}
                Ok(purged) => info!(purged, "Expired OTP records purged"),
                Err(e) => error!(error = %e, "OTP purge failed"),
            }
        }
    });

    tokio::signal::ctrl_c()
        .await
        .context("waiting for shutdown signal")?;
    sweeper.abort();

    info!("Stayhaven server stopped.");
    Ok(())
}
