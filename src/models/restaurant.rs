use std::sync::Arc;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;
use crate::models::place::{LatLng, OpeningHours, PlaceRecord};

pub const UNKNOWN_NAME: &str = "未知餐廳";
pub const DEFAULT_CATEGORY: &str = "餐廳";
pub const UNKNOWN_ADDRESS: &str = "地址未提供";

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Default)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

impl From<LatLng> for Coordinate {
    fn from(location: LatLng) -> Self {
        Self::new(location.lat, location.lng)
    }
}

/// Opaque handle on the record the provider returned. Only used to look up
/// details and photos with the provider's own identifiers.
#[derive(Clone, Debug, Default)]
pub struct ProviderHandle(Arc<PlaceRecord>);

impl ProviderHandle {
    pub fn place_id(&self) -> Option<&str> {
        self.0.place_id.as_deref().filter(|id| !id.is_empty())
    }

    pub fn photo_reference(&self) -> Option<&str> {
        self.0
            .photos
            .first()
            .map(|photo| photo.photo_reference.as_str())
            .filter(|reference| !reference.is_empty())
    }
}

#[derive(Clone, Serialize, Deserialize, Debug, Default, PartialEq)]
pub struct PlaceDetails {
    pub phone: Option<String>,
    pub website: Option<String>,
    pub opening_hours: Option<OpeningHours>,
}

impl PlaceDetails {
    pub fn is_empty(&self) -> bool {
        self.phone.is_none() && self.website.is_none() && self.opening_hours.is_none()
    }
}

#[derive(Clone, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct DisplayRestaurant {
    pub id: String,
    pub name: String,
    pub category: String,
    pub address: String,
    pub rating: f64,
    pub rating_count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_level: Option<u8>,
    /// Same-origin path served by the photo proxy route.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    pub location: Coordinate,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub opening_hours: Option<OpeningHours>,
    #[serde(skip)]
    pub provider: ProviderHandle,
}

impl DisplayRestaurant {
    /// Normalizes a provider place. Never fails: missing or malformed
    /// fields fall back to sentinels.
    pub fn from_place(place: PlaceRecord) -> Self {
        let id = place
            .place_id
            .clone()
            .filter(|id| !id.is_empty())
            .unwrap_or_else(fallback_id);
        let name = non_empty(place.name.as_deref()).unwrap_or(UNKNOWN_NAME).to_string();
        let category = place
            .types
            .first()
            .and_then(|t| non_empty(Some(t.as_str())))
            .map(|t| t.replace('_', " "))
            .unwrap_or_else(|| DEFAULT_CATEGORY.to_string());
        let address = non_empty(place.vicinity.as_deref())
            .or_else(|| non_empty(place.formatted_address.as_deref()))
            .unwrap_or(UNKNOWN_ADDRESS)
            .to_string();
        let rating = place
            .rating
            .filter(|r| r.is_finite())
            .map(|r| r.clamp(0.0, 5.0))
            .unwrap_or(0.0);
        let location = place
            .geometry
            .as_ref()
            .and_then(|g| g.location)
            .filter(|l| l.lat.is_finite() && l.lng.is_finite())
            .map(Coordinate::from)
            .unwrap_or_default();
        let rating_count = place.user_ratings_total.unwrap_or(0);
        let price_level = place.price_level.filter(|p| *p <= 4);
        let provider = ProviderHandle(Arc::new(place));
        let photo_url = provider.photo_reference().map(|_| photo_path(&id));

        Self {
            id,
            name,
            category,
            address,
            rating,
            rating_count,
            price_level,
            photo_url,
            location,
            phone: None,
            website: None,
            opening_hours: None,
            provider,
        }
    }

    /// Gives the record a new id, keeping its photo path in step.
    pub fn reassign_id(&mut self, id: String) {
        if self.photo_url.is_some() {
            self.photo_url = Some(photo_path(&id));
        }
        self.id = id;
    }

    pub fn apply_details(&mut self, details: PlaceDetails) {
        self.phone = details.phone;
        self.website = details.website;
        self.opening_hours = details.opening_hours;
    }
}

fn photo_path(id: &str) -> String {
    format!("/api/restaurants/{id}/photo")
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// `temp_<unix millis>_<random>`; not stable across searches.
pub fn fallback_id() -> String {
    let millis = OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000;
    format!("temp_{}_{}", millis, Uuid::new_v4().simple())
}
