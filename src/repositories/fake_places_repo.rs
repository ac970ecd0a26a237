use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use async_trait::async_trait;
use tokio::sync::Notify;
use crate::error::ProviderError;
use crate::models::place::{
    GeocodeCandidate, GeocodeResponse, Geometry, LatLng, PlaceDetailsResponse, PlacePhoto,
    PlaceRecord, PlacesSearchResponse, ProviderStatus,
};
use crate::models::restaurant::Coordinate;
use crate::repositories::places_provider::PlacesProvider;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Call {
    Ping,
    Geocode(String),
    TextSearch(String),
    NearbySearch(String),
    Details(String),
    Photo(String),
}

/// Scripted provider for tests. Unscripted calls answer `ZERO_RESULTS`.
/// Per-address and per-location scripts win over the catch-all ones.
#[derive(Default)]
pub struct FakePlacesProvider {
    pub ping_failures: Mutex<usize>,
    pub geocode: Mutex<Option<Result<GeocodeResponse, String>>>,
    pub geocode_by_address: Mutex<HashMap<String, GeocodeResponse>>,
    pub text_search: Mutex<Option<Result<PlacesSearchResponse, String>>>,
    pub text_search_near: Mutex<Vec<(Coordinate, PlacesSearchResponse)>>,
    pub text_search_holds: Mutex<Vec<(Coordinate, Arc<Notify>)>>,
    pub nearby_search: Mutex<Option<Result<PlacesSearchResponse, String>>>,
    pub details: Mutex<HashMap<String, Result<PlaceDetailsResponse, String>>>,
    pub calls: Mutex<VecDeque<Call>>,
}

impl FakePlacesProvider {
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().iter().cloned().collect()
    }

    pub fn geocodes_to(self, lat: f64, lng: f64) -> Self {
        *self.geocode.lock().unwrap() = Some(Ok(geocode_response(lat, lng)));
        self
    }

    pub fn geocodes_address(self, address: &str, lat: f64, lng: f64) -> Self {
        self.geocode_by_address
            .lock()
            .unwrap()
            .insert(address.to_string(), geocode_response(lat, lng));
        self
    }

    pub fn text_search_near(self, lat: f64, lng: f64, places: Vec<PlaceRecord>) -> Self {
        self.text_search_near
            .lock()
            .unwrap()
            .push((Coordinate::new(lat, lng), search_response(ProviderStatus::Ok, places)));
        self
    }

    /// Text searches around `(lat, lng)` wait until `release` is notified.
    pub fn hold_text_search_near(self, lat: f64, lng: f64, release: Arc<Notify>) -> Self {
        self.text_search_holds
            .lock()
            .unwrap()
            .push((Coordinate::new(lat, lng), release));
        self
    }

    pub fn text_search_returns(self, status: ProviderStatus, places: Vec<PlaceRecord>) -> Self {
        *self.text_search.lock().unwrap() = Some(Ok(search_response(status, places)));
        self
    }

    pub fn text_search_fails(self) -> Self {
        *self.text_search.lock().unwrap() = Some(Err("connection reset".to_string()));
        self
    }

    pub fn nearby_search_returns(self, status: ProviderStatus, places: Vec<PlaceRecord>) -> Self {
        *self.nearby_search.lock().unwrap() = Some(Ok(search_response(status, places)));
        self
    }

    pub fn details_for(self, place_id: &str, phone: &str, website: &str) -> Self {
        let place = PlaceRecord {
            name: Some(place_id.to_string()),
            formatted_phone_number: Some(phone.to_string()),
            website: Some(website.to_string()),
            ..Default::default()
        };
        self.details.lock().unwrap().insert(
            place_id.to_string(),
            Ok(PlaceDetailsResponse { status: ProviderStatus::Ok, result: Some(place) }),
        );
        self
    }

    pub fn details_fail_for(self, place_id: &str) -> Self {
        self.details
            .lock()
            .unwrap()
            .insert(place_id.to_string(), Err("timeout".to_string()));
        self
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push_back(call);
    }
}

fn geocode_response(lat: f64, lng: f64) -> GeocodeResponse {
    GeocodeResponse {
        status: ProviderStatus::Ok,
        results: vec![GeocodeCandidate {
            geometry: Geometry { location: Some(LatLng { lat, lng }) },
            formatted_address: None,
        }],
    }
}

pub fn search_response(status: ProviderStatus, results: Vec<PlaceRecord>) -> PlacesSearchResponse {
    PlacesSearchResponse { status, results, error_message: None }
}

pub fn place(id: &str, name: &str, lat: f64, lng: f64) -> PlaceRecord {
    PlaceRecord {
        place_id: Some(id.to_string()),
        name: Some(name.to_string()),
        types: vec!["restaurant".to_string()],
        vicinity: Some(format!("{name} 地址")),
        rating: Some(4.2),
        user_ratings_total: Some(88),
        geometry: Some(Geometry { location: Some(LatLng { lat, lng }) }),
        ..Default::default()
    }
}

fn scripted<T: Clone>(slot: &Mutex<Option<Result<T, String>>>, fallback: T) -> Result<T, ProviderError> {
    match slot.lock().unwrap().clone() {
        Some(Ok(value)) => Ok(value),
        Some(Err(message)) => Err(ProviderError::Decode(message)),
        None => Ok(fallback),
    }
}

#[async_trait]
impl PlacesProvider for FakePlacesProvider {
    async fn ping(&self) -> Result<(), ProviderError> {
        self.record(Call::Ping);
        let mut failures = self.ping_failures.lock().unwrap();
        if *failures > 0 {
            *failures -= 1;
            return Err(ProviderError::Decode("not ready".to_string()));
        }
        Ok(())
    }

    async fn geocode(&self, address: &str) -> Result<GeocodeResponse, ProviderError> {
        self.record(Call::Geocode(address.to_string()));
        if let Some(response) = self.geocode_by_address.lock().unwrap().get(address).cloned() {
            return Ok(response);
        }
        scripted(
            &self.geocode,
            GeocodeResponse { status: ProviderStatus::ZeroResults, results: Vec::new() },
        )
    }

    async fn text_search(
        &self,
        location: Coordinate,
        _radius_meters: u32,
        query: &str,
    ) -> Result<PlacesSearchResponse, ProviderError> {
        self.record(Call::TextSearch(query.to_string()));
        let hold = self
            .text_search_holds
            .lock()
            .unwrap()
            .iter()
            .find(|(at, _)| *at == location)
            .map(|(_, release)| release.clone());
        if let Some(release) = hold {
            release.notified().await;
        }
        let near = self
            .text_search_near
            .lock()
            .unwrap()
            .iter()
            .find(|(at, _)| *at == location)
            .map(|(_, response)| response.clone());
        if let Some(response) = near {
            return Ok(response);
        }
        scripted(&self.text_search, search_response(ProviderStatus::ZeroResults, Vec::new()))
    }

    async fn nearby_search(
        &self,
        _location: Coordinate,
        _radius_meters: u32,
        keyword: &str,
    ) -> Result<PlacesSearchResponse, ProviderError> {
        self.record(Call::NearbySearch(keyword.to_string()));
        scripted(&self.nearby_search, search_response(ProviderStatus::ZeroResults, Vec::new()))
    }

    async fn place_details(
        &self,
        place_id: &str,
        _fields: &[&str],
    ) -> Result<PlaceDetailsResponse, ProviderError> {
        self.record(Call::Details(place_id.to_string()));
        match self.details.lock().unwrap().get(place_id).cloned() {
            Some(Ok(response)) => Ok(response),
            Some(Err(message)) => Err(ProviderError::Decode(message)),
            None => Ok(PlaceDetailsResponse { status: ProviderStatus::NotFound, result: None }),
        }
    }

    async fn photo(
        &self,
        photo_reference: &str,
        max_width: u32,
        max_height: u32,
    ) -> Result<PlacePhoto, ProviderError> {
        self.record(Call::Photo(photo_reference.to_string()));
        Ok(PlacePhoto {
            content_type: "image/jpeg".to_string(),
            bytes: format!("{photo_reference}@{max_width}x{max_height}").into_bytes(),
        })
    }
}
