use std::time::Duration;
use anyhow::Context;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde::de::DeserializeOwned;
use tracing::debug;
use crate::config::Config;
use crate::error::ProviderError;
use crate::models::place::{
    GeocodeResponse, PlaceDetailsResponse, PlacePhoto, PlacesSearchResponse,
};
use crate::models::restaurant::Coordinate;
use crate::repositories::places_provider::PlacesProvider;

/// Google Geocoding + Places web services over HTTPS.
pub struct GooglePlacesRepo {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    language: String,
}

impl GooglePlacesRepo {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent("restaurant-finder")
            .timeout(Duration::from_secs(config.provider_request_timeout_secs))
            .build()
            .context("Failed to build HTTP client for the places provider")?;

        Ok(Self {
            http,
            base_url: config.places_base_url.trim_end_matches('/').to_string(),
            api_key: config.google_maps_api_key.clone(),
            language: config.places_language.clone(),
        })
    }

    async fn get(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<reqwest::Response, ProviderError> {
        let url = format!("{}/{}", self.base_url, endpoint);
        debug!("Calling places provider endpoint {}", endpoint);

        let response = self
            .http
            .get(&url)
            .query(params)
            .query(&[("key", self.api_key.as_str()), ("language", self.language.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Http(status));
        }
        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<T, ProviderError> {
        let body = self.get(endpoint, params).await?.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| ProviderError::Decode(e.to_string()))
    }
}

fn location_param(location: Coordinate) -> String {
    format!("{},{}", location.latitude, location.longitude)
}

#[async_trait]
impl PlacesProvider for GooglePlacesRepo {
    async fn ping(&self) -> Result<(), ProviderError> {
        // Any well-formed reply counts, even REQUEST_DENIED.
        self.get_json::<GeocodeResponse>("geocode/json", &[("address", String::new())])
            .await
            .map(|_| ())
    }

    async fn geocode(&self, address: &str) -> Result<GeocodeResponse, ProviderError> {
        self.get_json("geocode/json", &[("address", address.to_string())]).await
    }

    async fn text_search(
        &self,
        location: Coordinate,
        radius_meters: u32,
        query: &str,
    ) -> Result<PlacesSearchResponse, ProviderError> {
        self.get_json(
            "place/textsearch/json",
            &[
                ("query", query.to_string()),
                ("location", location_param(location)),
                ("radius", radius_meters.to_string()),
            ],
        )
        .await
    }

    async fn nearby_search(
        &self,
        location: Coordinate,
        radius_meters: u32,
        keyword: &str,
    ) -> Result<PlacesSearchResponse, ProviderError> {
        self.get_json(
            "place/nearbysearch/json",
            &[
                ("location", location_param(location)),
                ("radius", radius_meters.to_string()),
                ("keyword", keyword.to_string()),
            ],
        )
        .await
    }

    async fn place_details(
        &self,
        place_id: &str,
        fields: &[&str],
    ) -> Result<PlaceDetailsResponse, ProviderError> {
        self.get_json(
            "place/details/json",
            &[("place_id", place_id.to_string()), ("fields", fields.join(","))],
        )
        .await
    }

    async fn photo(
        &self,
        photo_reference: &str,
        max_width: u32,
        max_height: u32,
    ) -> Result<PlacePhoto, ProviderError> {
        // The endpoint answers with a redirect to the image; reqwest follows it.
        let response = self
            .get(
                "place/photo",
                &[
                    ("maxwidth", max_width.to_string()),
                    ("maxheight", max_height.to_string()),
                    ("photo_reference", photo_reference.to_string()),
                ],
            )
            .await?;

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("image/jpeg")
            .to_string();
        let bytes = response.bytes().await?.to_vec();
        Ok(PlacePhoto { content_type, bytes })
    }
}
