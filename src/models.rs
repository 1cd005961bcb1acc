use crate::error::ValidationError;
use crate::query::PageInfo;
use bson::oid::ObjectId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Availability {
    #[default]
    #[serde(rename = "available")]
    Available,
    #[serde(rename = "not available")]
    NotAvailable,
}

impl Availability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Availability::Available => "available",
            Availability::NotAvailable => "not available",
        }
    }
}

impl fmt::Display for Availability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A roommate listing as stored in the `roommates` collection.
///
/// Text fields default to empty so documents written by older clients
/// without them still decode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub rent: f64,
    #[serde(default)]
    pub room_type: String,
    #[serde(default)]
    pub lifestyle: Vec<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub contact_info: String,
    #[serde(default)]
    pub availability: Availability,
    #[serde(default)]
    pub user_email: String,
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub like_count: i64,
    #[serde(default)]
    pub view_count: i64,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

/// JSON shape of a listing returned to clients: `_id` as a hex string and
/// RFC 3339 timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub location: String,
    pub rent: f64,
    pub room_type: String,
    pub lifestyle: Vec<String>,
    pub description: String,
    pub contact_info: String,
    pub availability: Availability,
    pub user_email: String,
    pub user_name: String,
    pub like_count: i64,
    pub view_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Listing> for ListingResponse {
    fn from(listing: Listing) -> Self {
        ListingResponse {
            id: listing.id.to_hex(),
            title: listing.title,
            location: listing.location,
            rent: listing.rent,
            room_type: listing.room_type,
            lifestyle: listing.lifestyle,
            description: listing.description,
            contact_info: listing.contact_info,
            availability: listing.availability,
            user_email: listing.user_email,
            user_name: listing.user_name,
            like_count: listing.like_count,
            view_count: listing.view_count,
            created_at: listing.created_at,
            updated_at: listing.updated_at,
        }
    }
}

//Create_listing

/// Payload of `POST /roommates`. Every field is optional; engagement
/// counters are not accepted from clients and unknown fields such as
/// `likeCount` are ignored.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewListing {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub rent: f64,
    #[serde(default)]
    pub room_type: String,
    #[serde(default)]
    pub lifestyle: Vec<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub contact_info: String,
    #[serde(default)]
    pub availability: Availability,
    #[serde(default)]
    pub user_email: String,
    #[serde(default)]
    pub user_name: String,
}

impl NewListing {
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_rent(self.rent)
    }

    pub fn into_listing(self, id: ObjectId, now: DateTime<Utc>) -> Listing {
        Listing {
            id,
            title: self.title,
            location: self.location,
            rent: self.rent,
            room_type: self.room_type,
            lifestyle: self.lifestyle,
            description: self.description,
            contact_info: self.contact_info,
            availability: self.availability,
            user_email: self.user_email,
            user_name: self.user_name,
            like_count: 0,
            view_count: 0,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Payload of `PUT /roommates/{id}`. Only the fields present are changed.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingUpdate {
    pub title: Option<String>,
    pub location: Option<String>,
    pub rent: Option<f64>,
    pub room_type: Option<String>,
    pub lifestyle: Option<Vec<String>>,
    pub description: Option<String>,
    pub contact_info: Option<String>,
    pub availability: Option<Availability>,
    pub user_email: Option<String>,
    pub user_name: Option<String>,
}

impl ListingUpdate {
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self.rent {
            Some(rent) => check_rent(rent),
            None => Ok(()),
        }
    }

    pub fn apply(&self, listing: &mut Listing, now: DateTime<Utc>) {
        fn set<T: Clone>(target: &mut T, value: &Option<T>) {
            if let Some(value) = value {
                *target = value.clone();
            }
        }

        set(&mut listing.title, &self.title);
        set(&mut listing.location, &self.location);
        set(&mut listing.rent, &self.rent);
        set(&mut listing.room_type, &self.room_type);
        set(&mut listing.lifestyle, &self.lifestyle);
        set(&mut listing.description, &self.description);
        set(&mut listing.contact_info, &self.contact_info);
        set(&mut listing.availability, &self.availability);
        set(&mut listing.user_email, &self.user_email);
        set(&mut listing.user_name, &self.user_name);
        listing.updated_at = now;
    }
}

fn check_rent(rent: f64) -> Result<(), ValidationError> {
    if !rent.is_finite() || rent < 0.0 {
        return Err(ValidationError(
            "rent must be a non-negative number".to_string(),
        ));
    }
    Ok(())
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreatedListing {
    pub message: String,
    pub roommate: ListingResponse,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpdatedListing {
    pub message: String,
    pub updated: ListingResponse,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikedListing {
    pub message: String,
    pub like_count: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Message {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ListingPage {
    pub items: Vec<ListingResponse>,
    pub pagination: PageInfo,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Health {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub uptime: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_listing() -> NewListing {
        NewListing {
            title: "Sunny room".to_string(),
            location: "Berlin".to_string(),
            rent: 450.0,
            room_type: "Private".to_string(),
            lifestyle: vec!["non-smoker".to_string()],
            description: String::new(),
            contact_info: String::new(),
            availability: Availability::default(),
            user_email: "a@example.com".to_string(),
            user_name: "A".to_string(),
        }
    }

    #[test]
    fn new_listing_starts_with_zero_counters() {
        let now = Utc::now();
        let listing = new_listing().into_listing(ObjectId::new(), now);
        assert_eq!(listing.like_count, 0);
        assert_eq!(listing.view_count, 0);
        assert_eq!(listing.availability, Availability::Available);
        assert_eq!(listing.created_at, now);
        assert_eq!(listing.updated_at, now);
    }

    #[test]
    fn validation_only_checks_rent() {
        let mut payload = new_listing();
        payload.rent = -1.0;
        assert_eq!(
            payload.validate().unwrap_err().to_string(),
            "rent must be a non-negative number"
        );

        let mut payload = new_listing();
        payload.rent = f64::NAN;
        assert!(payload.validate().is_err());

        assert!(new_listing().validate().is_ok());
        assert!(NewListing::default().validate().is_ok());
    }

    #[test]
    fn partial_payload_uses_defaults() {
        let payload: NewListing = bson::from_document(bson::doc! {
            "rent": 500.0,
            "userEmail": "a@b.c",
        })
        .unwrap();
        assert!(payload.validate().is_ok());
        let listing = payload.into_listing(ObjectId::new(), Utc::now());
        assert_eq!(listing.title, "");
        assert_eq!(listing.location, "");
        assert_eq!(listing.rent, 500.0);
        assert_eq!(listing.user_email, "a@b.c");
        assert_eq!(listing.availability, Availability::Available);
    }

    #[test]
    fn update_applies_only_present_fields() {
        let created = Utc::now();
        let mut listing = new_listing().into_listing(ObjectId::new(), created);
        listing.like_count = 4;
        let update = ListingUpdate {
            rent: Some(500.0),
            availability: Some(Availability::NotAvailable),
            ..Default::default()
        };
        let later = created + chrono::Duration::seconds(5);
        update.apply(&mut listing, later);

        assert_eq!(listing.rent, 500.0);
        assert_eq!(listing.availability, Availability::NotAvailable);
        assert_eq!(listing.title, "Sunny room");
        assert_eq!(listing.like_count, 4);
        assert_eq!(listing.updated_at, later);
        assert_eq!(listing.created_at, created);
    }

    #[test]
    fn availability_uses_wire_names() {
        let value: Availability = bson::from_bson(bson::Bson::String(
            "not available".to_string(),
        ))
        .unwrap();
        assert_eq!(value, Availability::NotAvailable);
        assert_eq!(Availability::Available.to_string(), "available");
    }
}
