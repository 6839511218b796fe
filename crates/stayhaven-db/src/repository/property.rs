//! SurrealDB implementation of [`PropertyRepository`].
//!
//! Listing invariants (positive nightly rate, at least one guest) are
//! enforced here so no other write path can bypass them.

use rust_decimal::Decimal;
use serde::Deserialize;
use stayhaven_core::error::{HavenError, HavenResult};
use stayhaven_core::models::property::{
    CreateProperty, Property, PropertyKind, PropertyStatus, UpdateProperty,
};
use stayhaven_core::repository::{PaginatedResult, Pagination, PropertyRepository};
use surrealdb::sql::Datetime;
use surrealdb::{Connection, Surreal};
use uuid::Uuid;

use crate::error::DbError;

#[derive(Debug, Deserialize)]
struct PropertyRow {
    owner_id: String,
    title: String,
    description: String,
    kind: String,
    location: String,
    city: String,
    state: String,
    country: String,
    nightly_rate: String,
    bedrooms: u32,
    bathrooms: u32,
    max_guests: u32,
    amenities: Vec<String>,
    images: Vec<String>,
    status: String,
    rating: String,
    review_count: u32,
    created_at: Datetime,
    updated_at: Datetime,
}

/// Row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, Deserialize)]
struct PropertyRowWithId {
    record_id: String,
    owner_id: String,
    title: String,
    description: String,
    kind: String,
    location: String,
    city: String,
    state: String,
    country: String,
    nightly_rate: String,
    bedrooms: u32,
    bathrooms: u32,
    max_guests: u32,
    amenities: Vec<String>,
    images: Vec<String>,
    status: String,
    rating: String,
    review_count: u32,
    created_at: Datetime,
    updated_at: Datetime,
}

#[derive(Debug, Deserialize)]
struct CountRow {
    total: u64,
}

fn parse_kind(s: &str) -> Result<PropertyKind, DbError> {
    match s {
        "Apartment" => Ok(PropertyKind::Apartment),
        "House" => Ok(PropertyKind::House),
        "Villa" => Ok(PropertyKind::Villa),
        "Condo" => Ok(PropertyKind::Condo),
        other => Err(DbError::Schema(format!("unknown property kind: {other}"))),
    }
}

fn kind_to_string(kind: PropertyKind) -> &'static str {
    match kind {
        PropertyKind::Apartment => "Apartment",
        PropertyKind::House => "House",
        PropertyKind::Villa => "Villa",
        PropertyKind::Condo => "Condo",
    }
}

fn parse_status(s: &str) -> Result<PropertyStatus, DbError> {
    match s {
        "Pending" => Ok(PropertyStatus::Pending),
        "Approved" => Ok(PropertyStatus::Approved),
        "Rejected" => Ok(PropertyStatus::Rejected),
        other => Err(DbError::Schema(format!("unknown property status: {other}"))),
    }
}

fn status_to_string(status: PropertyStatus) -> &'static str {
    match status {
        PropertyStatus::Pending => "Pending",
        PropertyStatus::Approved => "Approved",
        PropertyStatus::Rejected => "Rejected",
    }
}

fn parse_decimal(s: &str) -> Result<Decimal, DbError> {
    s.parse::<Decimal>()
        .map_err(|e| DbError::Schema(format!("invalid decimal '{s}': {e}")))
}

impl PropertyRow {
    fn into_property(self, id: Uuid) -> Result<Property, DbError> {
        let owner_id = Uuid::parse_str(&self.owner_id)
            .map_err(|e| DbError::Schema(format!("invalid owner UUID: {e}")))?;
        Ok(Property {
            id,
            owner_id,
            title: self.title,
            description: self.description,
            kind: parse_kind(&self.kind)?,
            location: self.location,
            city: self.city,
            state: self.state,
            country: self.country,
            nightly_rate: parse_decimal(&self.nightly_rate)?,
            bedrooms: self.bedrooms,
            bathrooms: self.bathrooms,
            max_guests: self.max_guests,
            amenities: self.amenities,
            images: self.images,
            status: parse_status(&self.status)?,
            rating: parse_decimal(&self.rating)?,
            review_count: self.review_count,
            created_at: self.created_at.0,
            updated_at: self.updated_at.0,
        })
    }
}

impl PropertyRowWithId {
    fn try_into_property(self) -> Result<Property, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Schema(format!("invalid UUID: {e}")))?;
        let owner_id = Uuid::parse_str(&self.owner_id)
            .map_err(|e| DbError::Schema(format!("invalid owner UUID: {e}")))?;
        Ok(Property {
            id,
            owner_id,
            title: self.title,
            description: self.description,
            kind: parse_kind(&self.kind)?,
            location: self.location,
            city: self.city,
            state: self.state,
            country: self.country,
            nightly_rate: parse_decimal(&self.nightly_rate)?,
            bedrooms: self.bedrooms,
            bathrooms: self.bathrooms,
            max_guests: self.max_guests,
            amenities: self.amenities,
            images: self.images,
            status: parse_status(&self.status)?,
            rating: parse_decimal(&self.rating)?,
            review_count: self.review_count,
            created_at: self.created_at.0,
            updated_at: self.updated_at.0,
        })
    }
}

fn validate_rate(rate: Decimal) -> HavenResult<()> {
    if rate <= Decimal::ZERO {
        return Err(HavenError::Validation {
            message: "nightly rate must be positive".into(),
        });
    }
    Ok(())
}

fn validate_capacity(max_guests: u32) -> HavenResult<()> {
    if max_guests < 1 {
        return Err(HavenError::Validation {
            message: "max guests must be at least 1".into(),
        });
    }
    Ok(())
}

/// SurrealDB implementation of the Property repository.
#[derive(Clone)]
pub struct SurrealPropertyRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealPropertyRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    async fn list_where(
        &self,
        condition: &'static str,
        bind: (&'static str, String),
        pagination: Pagination,
    ) -> HavenResult<PaginatedResult<Property>> {
        let count_query =
            format!("SELECT count() AS total FROM property WHERE {condition} GROUP ALL");
        let mut count_result = self
            .db
            .query(count_query)
            .bind((bind.0, bind.1.clone()))
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        let page_query = format!(
            "SELECT meta::id(id) AS record_id, * FROM property \
             WHERE {condition} \
             ORDER BY created_at DESC \
             LIMIT $limit START $offset"
        );
        let mut result = self
            .db
            .query(page_query)
            .bind((bind.0, bind.1))
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PropertyRowWithId> = result.take(0).map_err(DbError::from)?;
        let items = rows
            .into_iter()
            .map(|row| row.try_into_property())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }
}

impl<C: Connection> PropertyRepository for SurrealPropertyRepository<C> {
    async fn create(&self, input: CreateProperty) -> HavenResult<Property> {
        validate_rate(input.nightly_rate)?;
        validate_capacity(input.max_guests)?;

        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::thing('property', $id) SET \
                 owner_id = $owner_id, \
                 title = $title, \
                 description = $description, \
                 kind = $kind, \
                 location = $location, \
                 city = $city, \
                 state = $state, \
                 country = $country, \
                 nightly_rate = $nightly_rate, \
                 bedrooms = $bedrooms, \
                 bathrooms = $bathrooms, \
                 max_guests = $max_guests, \
                 amenities = $amenities, \
                 images = $images, \
                 status = 'Pending', \
                 rating = '0', \
                 review_count = 0",
            )
            .bind(("id", id_str.clone()))
            .bind(("owner_id", input.owner_id.to_string()))
            .bind(("title", input.title))
            .bind(("description", input.description))
            .bind(("kind", kind_to_string(input.kind)))
            .bind(("location", input.location))
            .bind(("city", input.city))
            .bind(("state", input.state))
            .bind(("country", input.country))
            .bind(("nightly_rate", input.nightly_rate.to_string()))
            .bind(("bedrooms", input.bedrooms))
            .bind(("bathrooms", input.bathrooms))
            .bind(("max_guests", input.max_guests))
            .bind(("amenities", input.amenities))
            .bind(("images", input.images))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(|e| DbError::Schema(e.to_string()))?;

        let rows: Vec<PropertyRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "property".into(),
            id: id_str,
        })?;

        Ok(row.into_property(id)?)
    }

    async fn get_by_id(&self, id: Uuid) -> HavenResult<Property> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::thing('property', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PropertyRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "property".into(),
            id: id_str,
        })?;

        Ok(row.into_property(id)?)
    }

    async fn update(&self, id: Uuid, input: UpdateProperty) -> HavenResult<Property> {
        if let Some(rate) = input.nightly_rate {
            validate_rate(rate)?;
        }
        if let Some(max_guests) = input.max_guests {
            validate_capacity(max_guests)?;
        }

        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.title.is_some() {
            sets.push("title = $title");
        }
        if input.description.is_some() {
            sets.push("description = $description");
        }
        if input.nightly_rate.is_some() {
            sets.push("nightly_rate = $nightly_rate");
        }
        if input.bedrooms.is_some() {
            sets.push("bedrooms = $bedrooms");
        }
        if input.bathrooms.is_some() {
            sets.push("bathrooms = $bathrooms");
        }
        if input.max_guests.is_some() {
            sets.push("max_guests = $max_guests");
        }
        if input.amenities.is_some() {
            sets.push("amenities = $amenities");
        }
        if input.images.is_some() {
            sets.push("images = $images");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::thing('property', $id) SET {}",
            sets.join(", ")
        );

        let mut builder = self.db.query(query).bind(("id", id_str.clone()));

        if let Some(title) = input.title {
            builder = builder.bind(("title", title));
        }
        if let Some(description) = input.description {
            builder = builder.bind(("description", description));
        }
        if let Some(nightly_rate) = input.nightly_rate {
            builder = builder.bind(("nightly_rate", nightly_rate.to_string()));
        }
        if let Some(bedrooms) = input.bedrooms {
            builder = builder.bind(("bedrooms", bedrooms));
        }
        if let Some(bathrooms) = input.bathrooms {
            builder = builder.bind(("bathrooms", bathrooms));
        }
        if let Some(max_guests) = input.max_guests {
            builder = builder.bind(("max_guests", max_guests));
        }
        if let Some(amenities) = input.amenities {
            builder = builder.bind(("amenities", amenities));
        }
        if let Some(images) = input.images {
            builder = builder.bind(("images", images));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result.check().map_err(|e| DbError::Schema(e.to_string()))?;

        let rows: Vec<PropertyRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "property".into(),
            id: id_str,
        })?;

        Ok(row.into_property(id)?)
    }

    async fn set_status(&self, id: Uuid, status: PropertyStatus) -> HavenResult<Property> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(
                "UPDATE type::thing('property', $id) SET \
                 status = $status, updated_at = time::now()",
            )
            .bind(("id", id_str.clone()))
            .bind(("status", status_to_string(status)))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PropertyRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "property".into(),
            id: id_str,
        })?;

        Ok(row.into_property(id)?)
    }

    async fn list_approved(
        &self,
        pagination: Pagination,
    ) -> HavenResult<PaginatedResult<Property>> {
        self.list_where(
            "status = $status",
            ("status", "Approved".to_string()),
            pagination,
        )
        .await
    }

    async fn list_by_owner(
        &self,
        owner_id: Uuid,
        pagination: Pagination,
    ) -> HavenResult<PaginatedResult<Property>> {
        self.list_where(
            "owner_id = $owner_id",
            ("owner_id", owner_id.to_string()),
            pagination,
        )
        .await
    }
}
