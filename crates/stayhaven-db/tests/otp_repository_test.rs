//! Integration tests for the OTP repository.

use chrono::{Duration, Utc};
use stayhaven_core::HavenError;
use stayhaven_core::models::otp::CreateOtp;
use stayhaven_core::repository::OtpRepository;
use stayhaven_db::repository::SurrealOtpRepository;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};

async fn setup() -> Surreal<Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    stayhaven_db::run_migrations(&db).await.unwrap();
    db
}

fn code_for(email: &str, hash: &str) -> CreateOtp {
    CreateOtp {
        email: email.into(),
        code_hash: hash.into(),
        expires_at: Utc::now() + Duration::minutes(10),
    }
}

#[tokio::test]
async fn upsert_and_fetch() {
    let db = setup().await;
    let repo = SurrealOtpRepository::new(db);

    let record = repo
        .upsert(code_for("a@x.com", "hash-1"))
        .await
        .unwrap();
    assert_eq!(record.email, "a@x.com");
    assert_eq!(record.code_hash, "hash-1");
    assert!(!record.used);
    assert_eq!(record.attempts, 0);

    let fetched = repo.get_by_email("a@x.com").await.unwrap();
    assert_eq!(fetched.code_hash, "hash-1");
}

#[tokio::test]
async fn missing_record_is_not_found() {
    let db = setup().await;
    let repo = SurrealOtpRepository::new(db);

    let err = repo.get_by_email("nobody@x.com").await.unwrap_err();
    assert!(matches!(err, HavenError::NotFound { .. }));
}

#[tokio::test]
async fn reupsert_supersedes_previous_code() {
    let db = setup().await;
    let repo = SurrealOtpRepository::new(db);

    repo.upsert(code_for("a@x.com", "hash-1")).await.unwrap();
    repo.mark_used("a@x.com").await.unwrap();
    repo.record_failed_attempt("a@x.com").await.unwrap();

    // The replacement starts from a clean slate.
    let fresh = repo.upsert(code_for("a@x.com", "hash-2")).await.unwrap();
    assert_eq!(fresh.code_hash, "hash-2");
    assert!(!fresh.used);
    assert_eq!(fresh.attempts, 0);

    // Still exactly one record for the address.
    let fetched = repo.get_by_email("a@x.com").await.unwrap();
    assert_eq!(fetched.code_hash, "hash-2");
}

#[tokio::test]
async fn mark_used_flips_flag() {
    let db = setup().await;
    let repo = SurrealOtpRepository::new(db);

    repo.upsert(code_for("a@x.com", "hash-1")).await.unwrap();
    repo.mark_used("a@x.com").await.unwrap();

    assert!(repo.get_by_email("a@x.com").await.unwrap().used);
}

#[tokio::test]
async fn failed_attempts_accumulate() {
    let db = setup().await;
    let repo = SurrealOtpRepository::new(db);

    repo.upsert(code_for("a@x.com", "hash-1")).await.unwrap();
    assert_eq!(repo.record_failed_attempt("a@x.com").await.unwrap(), 1);
    assert_eq!(repo.record_failed_attempt("a@x.com").await.unwrap(), 2);
    assert_eq!(repo.get_by_email("a@x.com").await.unwrap().attempts, 2);
}

#[tokio::test]
async fn delete_removes_record() {
    let db = setup().await;
    let repo = SurrealOtpRepository::new(db);

    repo.upsert(code_for("a@x.com", "hash-1")).await.unwrap();
    repo.delete("a@x.com").await.unwrap();

    assert!(matches!(
        repo.get_by_email("a@x.com").await.unwrap_err(),
        HavenError::NotFound { .. }
    ));
}

#[tokio::test]
async fn delete_expired_purges_only_expired() {
    let db = setup().await;
    let repo = SurrealOtpRepository::new(db);

    repo.upsert(CreateOtp {
        email: "stale@x.com".into(),
        code_hash: "hash-old".into(),
        expires_at: Utc::now() - Duration::minutes(1),
    })
    .await
    .unwrap();
    repo.upsert(code_for("live@x.com", "hash-new")).await.unwrap();

    let purged = repo.delete_expired(Utc::now()).await.unwrap();
    assert_eq!(purged, 1);

    assert!(repo.get_by_email("stale@x.com").await.is_err());
    assert!(repo.get_by_email("live@x.com").await.is_ok());
}
