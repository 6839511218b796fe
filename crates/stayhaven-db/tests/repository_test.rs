//! Integration tests for the user and property repositories.

use rust_decimal::Decimal;
use stayhaven_core::HavenError;
use stayhaven_core::models::property::{CreateProperty, PropertyKind, PropertyStatus, UpdateProperty};
use stayhaven_core::models::user::{CreateUser, UpdateUser, UserRole};
use stayhaven_core::repository::{Pagination, PropertyRepository, UserRepository};
use stayhaven_db::repository::{SurrealPropertyRepository, SurrealUserRepository};
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use uuid::Uuid;

/// Spin up an in-memory DB and run migrations.
async fn setup() -> Surreal<Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    stayhaven_db::run_migrations(&db).await.unwrap();
    db
}

fn alice() -> CreateUser {
    CreateUser {
        email: "alice@example.com".into(),
        password: "correct-horse-battery".into(),
        first_name: "Alice".into(),
        last_name: "Larsen".into(),
        mobile: None,
        role: UserRole::Renter,
    }
}

fn cabin(owner_id: Uuid) -> CreateProperty {
    CreateProperty {
        owner_id,
        title: "Lakeside cabin".into(),
        description: "Two-bedroom cabin by the lake".into(),
        kind: PropertyKind::House,
        location: "12 Shore Rd".into(),
        city: "Tahoe City".into(),
        state: "CA".into(),
        country: "USA".into(),
        nightly_rate: Decimal::from(150),
        bedrooms: 2,
        bathrooms: 1,
        max_guests: 4,
        amenities: vec!["wifi".into(), "fireplace".into()],
        images: vec![],
    }
}

#[tokio::test]
async fn create_and_fetch_user() {
    let db = setup().await;
    let repo = SurrealUserRepository::new(db);

    let user = repo.create(alice()).await.unwrap();
    assert_eq!(user.email, "alice@example.com");
    assert_eq!(user.role, UserRole::Renter);
    assert!(!user.is_verified);
    // Password never stored raw.
    assert_ne!(user.password_hash, "correct-horse-battery");
    assert!(user.password_hash.starts_with("$argon2id$"));

    let by_id = repo.get_by_id(user.id).await.unwrap();
    assert_eq!(by_id.email, user.email);
}

#[tokio::test]
async fn email_lookup_is_normalized() {
    let db = setup().await;
    let repo = SurrealUserRepository::new(db);
    let user = repo.create(alice()).await.unwrap();

    let found = repo.get_by_email("  Alice@Example.COM ").await.unwrap();
    assert_eq!(found.id, user.id);
}

#[tokio::test]
async fn duplicate_email_rejected() {
    let db = setup().await;
    let repo = SurrealUserRepository::new(db);
    repo.create(alice()).await.unwrap();

    let err = repo.create(alice()).await.unwrap_err();
    assert!(matches!(err, HavenError::AlreadyExists { .. }));
}

#[tokio::test]
async fn update_user_fields() {
    let db = setup().await;
    let repo = SurrealUserRepository::new(db);
    let user = repo.create(alice()).await.unwrap();

    let updated = repo
        .update(
            user.id,
            UpdateUser {
                mobile: Some(Some("+4670000000".into())),
                is_verified: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.mobile.as_deref(), Some("+4670000000"));
    assert!(updated.is_verified);
    assert_eq!(updated.first_name, "Alice");
}

#[tokio::test]
async fn update_password_replaces_hash() {
    let db = setup().await;
    let repo = SurrealUserRepository::new(db);
    let user = repo.create(alice()).await.unwrap();

    repo.update_password(user.id, "$argon2id$new-hash")
        .await
        .unwrap();

    let reloaded = repo.get_by_id(user.id).await.unwrap();
    assert_eq!(reloaded.password_hash, "$argon2id$new-hash");
}

#[tokio::test]
async fn update_password_unknown_user() {
    let db = setup().await;
    let repo = SurrealUserRepository::new(db);

    let err = repo
        .update_password(Uuid::new_v4(), "$argon2id$hash")
        .await
        .unwrap_err();
    assert!(matches!(err, HavenError::NotFound { .. }));
}

#[tokio::test]
async fn new_property_starts_pending() {
    let db = setup().await;
    let repo = SurrealPropertyRepository::new(db);

    let property = repo.create(cabin(Uuid::new_v4())).await.unwrap();
    assert_eq!(property.status, PropertyStatus::Pending);
    assert_eq!(property.nightly_rate, Decimal::from(150));
    assert_eq!(property.rating, Decimal::ZERO);
    assert_eq!(property.review_count, 0);
}

#[tokio::test]
async fn property_invariants_enforced() {
    let db = setup().await;
    let repo = SurrealPropertyRepository::new(db);

    let mut zero_rate = cabin(Uuid::new_v4());
    zero_rate.nightly_rate = Decimal::ZERO;
    assert!(matches!(
        repo.create(zero_rate).await.unwrap_err(),
        HavenError::Validation { .. }
    ));

    let mut no_guests = cabin(Uuid::new_v4());
    no_guests.max_guests = 0;
    assert!(matches!(
        repo.create(no_guests).await.unwrap_err(),
        HavenError::Validation { .. }
    ));

    let property = repo.create(cabin(Uuid::new_v4())).await.unwrap();
    let err = repo
        .update(
            property.id,
            UpdateProperty {
                nightly_rate: Some(Decimal::from(-5)),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, HavenError::Validation { .. }));
}

#[tokio::test]
async fn approval_gates_listing() {
    let db = setup().await;
    let repo = SurrealPropertyRepository::new(db);
    let owner = Uuid::new_v4();

    let first = repo.create(cabin(owner)).await.unwrap();
    let second = repo.create(cabin(owner)).await.unwrap();
    repo.set_status(first.id, PropertyStatus::Approved)
        .await
        .unwrap();
    repo.set_status(second.id, PropertyStatus::Rejected)
        .await
        .unwrap();

    let listed = repo.list_approved(Pagination::default()).await.unwrap();
    assert_eq!(listed.total, 1);
    assert_eq!(listed.items.len(), 1);
    assert_eq!(listed.items[0].id, first.id);
    assert_eq!(listed.items[0].status, PropertyStatus::Approved);
}

#[tokio::test]
async fn list_by_owner_pagination() {
    let db = setup().await;
    let repo = SurrealPropertyRepository::new(db);
    let owner = Uuid::new_v4();

    for _ in 0..3 {
        repo.create(cabin(owner)).await.unwrap();
    }
    repo.create(cabin(Uuid::new_v4())).await.unwrap();

    let page = repo
        .list_by_owner(
            owner,
            Pagination {
                offset: 0,
                limit: 2,
            },
        )
        .await
        .unwrap();
    assert_eq!(page.total, 3);
    assert_eq!(page.items.len(), 2);

    let rest = repo
        .list_by_owner(
            owner,
            Pagination {
                offset: 2,
                limit: 2,
            },
        )
        .await
        .unwrap();
    assert_eq!(rest.items.len(), 1);
}

#[tokio::test]
async fn update_property_fields() {
    let db = setup().await;
    let repo = SurrealPropertyRepository::new(db);
    let property = repo.create(cabin(Uuid::new_v4())).await.unwrap();

    let updated = repo
        .update(
            property.id,
            UpdateProperty {
                title: Some("Lakeside cabin with sauna".into()),
                nightly_rate: Some("189.50".parse().unwrap()),
                amenities: Some(vec!["wifi".into(), "sauna".into()]),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.title, "Lakeside cabin with sauna");
    assert_eq!(updated.nightly_rate, "189.50".parse::<Decimal>().unwrap());
    assert_eq!(updated.amenities, vec!["wifi".to_string(), "sauna".to_string()]);
    // Untouched fields survive.
    assert_eq!(updated.bedrooms, 2);
}
