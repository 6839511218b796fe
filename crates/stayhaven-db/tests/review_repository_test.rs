//! Integration tests for the review repository.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use stayhaven_core::HavenError;
use stayhaven_core::models::booking::{BookingStatus, CreateBooking, PaymentStatus};
use stayhaven_core::models::property::{CreateProperty, PropertyKind};
use stayhaven_core::models::review::CreateReview;
use stayhaven_core::repository::{
    BookingRepository, Pagination, PropertyRepository, ReviewRepository,
};
use stayhaven_db::repository::{
    SurrealBookingRepository, SurrealPropertyRepository, SurrealReviewRepository,
};
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use uuid::Uuid;

async fn setup() -> Surreal<Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    stayhaven_db::run_migrations(&db).await.unwrap();
    db
}

fn date(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

/// Create a property plus a booking for it in the given status.
/// Returns `(property_id, booking_id, guest_id)`.
async fn property_with_booking(db: &Surreal<Db>, status: BookingStatus) -> (Uuid, Uuid, Uuid) {
    let properties = SurrealPropertyRepository::new(db.clone());
    let bookings = SurrealBookingRepository::new(db.clone());
    let guest = Uuid::new_v4();

    let property = properties
        .create(CreateProperty {
            owner_id: Uuid::new_v4(),
            title: "City loft".into(),
            description: "Loft near the station".into(),
            kind: PropertyKind::Apartment,
            location: "1 Main St".into(),
            city: "Lisbon".into(),
            state: "Lisbon".into(),
            country: "PT".into(),
            nightly_rate: Decimal::from(90),
            bedrooms: 1,
            bathrooms: 1,
            max_guests: 2,
            amenities: vec![],
            images: vec![],
        })
        .await
        .unwrap();

    let booking = bookings
        .create(CreateBooking {
            user_id: guest,
            property_id: property.id,
            check_in: date("2024-05-01"),
            check_out: date("2024-05-04"),
            guests: 2,
            total_amount: Decimal::from(594),
        })
        .await
        .unwrap();
    if status != BookingStatus::Pending {
        bookings
            .update_status(booking.id, status, Some(PaymentStatus::Paid))
            .await
            .unwrap();
    }

    (property.id, booking.id, guest)
}

#[tokio::test]
async fn review_requires_completed_booking() {
    let db = setup().await;
    let (_, booking_id, guest) = property_with_booking(&db, BookingStatus::Confirmed).await;
    let reviews = SurrealReviewRepository::new(db);

    let err = reviews
        .create(CreateReview {
            user_id: guest,
            booking_id,
            rating: 5,
            comment: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, HavenError::Validation { .. }));
}

#[tokio::test]
async fn review_requires_the_guest() {
    let db = setup().await;
    let (_, booking_id, _) = property_with_booking(&db, BookingStatus::Completed).await;
    let reviews = SurrealReviewRepository::new(db);

    let err = reviews
        .create(CreateReview {
            user_id: Uuid::new_v4(),
            booking_id,
            rating: 5,
            comment: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, HavenError::Validation { .. }));
}

#[tokio::test]
async fn rating_bounds_enforced() {
    let db = setup().await;
    let (_, booking_id, guest) = property_with_booking(&db, BookingStatus::Completed).await;
    let reviews = SurrealReviewRepository::new(db);

    for rating in [0, 6] {
        let err = reviews
            .create(CreateReview {
                user_id: guest,
                booking_id,
                rating,
                comment: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, HavenError::Validation { .. }));
    }
}

#[tokio::test]
async fn review_updates_property_aggregate() {
    let db = setup().await;
    let (property_id, booking_id, guest) =
        property_with_booking(&db, BookingStatus::Completed).await;
    let properties = SurrealPropertyRepository::new(db.clone());
    let reviews = SurrealReviewRepository::new(db);

    let review = reviews
        .create(CreateReview {
            user_id: guest,
            booking_id,
            rating: 4,
            comment: Some("Great stay, noisy street".into()),
        })
        .await
        .unwrap();
    assert_eq!(review.property_id, property_id);
    assert_eq!(review.rating, 4);

    let property = properties.get_by_id(property_id).await.unwrap();
    assert_eq!(property.review_count, 1);
    assert_eq!(property.rating, Decimal::from(4));
}

#[tokio::test]
async fn one_review_per_booking() {
    let db = setup().await;
    let (_, booking_id, guest) = property_with_booking(&db, BookingStatus::Completed).await;
    let reviews = SurrealReviewRepository::new(db);

    reviews
        .create(CreateReview {
            user_id: guest,
            booking_id,
            rating: 4,
            comment: None,
        })
        .await
        .unwrap();

    let err = reviews
        .create(CreateReview {
            user_id: guest,
            booking_id,
            rating: 2,
            comment: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, HavenError::AlreadyExists { .. }));
}

#[tokio::test]
async fn list_by_property_pages() {
    let db = setup().await;
    let (property_id, booking_id, guest) =
        property_with_booking(&db, BookingStatus::Completed).await;
    let reviews = SurrealReviewRepository::new(db);

    reviews
        .create(CreateReview {
            user_id: guest,
            booking_id,
            rating: 5,
            comment: None,
        })
        .await
        .unwrap();

    let page = reviews
        .list_by_property(property_id, Pagination::default())
        .await
        .unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].booking_id, booking_id);

    let empty = reviews
        .list_by_property(Uuid::new_v4(), Pagination::default())
        .await
        .unwrap();
    assert_eq!(empty.total, 0);
    assert!(empty.items.is_empty());
}
