use async_trait::async_trait;
use crate::error::ProviderError;
use crate::models::place::{
    GeocodeResponse, PlaceDetailsResponse, PlacePhoto, PlacesSearchResponse,
};
use crate::models::restaurant::Coordinate;

pub const DETAIL_FIELDS: [&str; 4] = ["name", "formatted_phone_number", "website", "opening_hours"];

/// Geocoding and places lookups. Implementations return the provider's own
/// status alongside the payload; only transport problems are errors.
#[async_trait]
pub trait PlacesProvider: Send + Sync {
    /// Cheap request used at startup to check the provider is reachable.
    async fn ping(&self) -> Result<(), ProviderError>;

    async fn geocode(&self, address: &str) -> Result<GeocodeResponse, ProviderError>;

    async fn text_search(
        &self,
        location: Coordinate,
        radius_meters: u32,
        query: &str,
    ) -> Result<PlacesSearchResponse, ProviderError>;

    async fn nearby_search(
        &self,
        location: Coordinate,
        radius_meters: u32,
        keyword: &str,
    ) -> Result<PlacesSearchResponse, ProviderError>;

    async fn place_details(
        &self,
        place_id: &str,
        fields: &[&str],
    ) -> Result<PlaceDetailsResponse, ProviderError>;

    /// Fetches the image behind a photo reference. Credentials stay on this
    /// side; callers only ever see the bytes.
    async fn photo(
        &self,
        photo_reference: &str,
        max_width: u32,
        max_height: u32,
    ) -> Result<PlacePhoto, ProviderError>;
}
