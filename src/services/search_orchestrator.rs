use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info, warn};
use crate::error::{FinderError, ProviderError, SearchError};
use crate::models::map::{MapSnapshot, MapView, SEARCH_ZOOM};
use crate::models::place::{PlacePhoto, PlaceRecord};
use crate::models::restaurant::{fallback_id, Coordinate, DisplayRestaurant, PlaceDetails};
use crate::repositories::places_provider::{PlacesProvider, DETAIL_FIELDS};

pub const TEXT_SEARCH_QUERY: &str = "餐廳 restaurant";
pub const NEARBY_SEARCH_KEYWORD: &str = "餐廳 restaurant food";
const PHOTO_MAX_WIDTH: u32 = 300;
const PHOTO_MAX_HEIGHT: u32 = 200;
const READY_RETRY_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug)]
pub struct SearchResults {
    pub location: Coordinate,
    pub restaurants: Vec<DisplayRestaurant>,
}

/// Turns an address into a ranked list of restaurants and owns the map the
/// results are shown on.
pub struct SearchOrchestrator {
    provider: Arc<dyn PlacesProvider>,
    map: Mutex<MapView>,
}

impl SearchOrchestrator {
    /// Waits for the provider to answer, then binds a map at the default
    /// viewport. Gives up with `FinderError::Initialization` after `ready_timeout`.
    pub async fn initialize(
        provider: Arc<dyn PlacesProvider>,
        ready_timeout: Duration,
    ) -> Result<Self, FinderError> {
        let wait = async {
            loop {
                match provider.ping().await {
                    Ok(()) => break,
                    Err(e) => {
                        warn!("Places provider not ready yet: {}, retrying", e);
                        tokio::time::sleep(READY_RETRY_INTERVAL).await;
                    }
                }
            }
        };

        tokio::time::timeout(ready_timeout, wait).await.map_err(|_| {
            FinderError::Initialization(format!(
                "places provider unavailable after {}s",
                ready_timeout.as_secs()
            ))
        })?;

        info!("Places provider ready, map initialized");
        Ok(Self::new(provider))
    }

    pub fn new(provider: Arc<dyn PlacesProvider>) -> Self {
        Self {
            provider,
            map: Mutex::new(MapView::default()),
        }
    }

    pub async fn geocode_address(&self, address: &str) -> Result<Coordinate, FinderError> {
        let response = match self.provider.geocode(address).await {
            Ok(response) => response,
            Err(e) => {
                warn!("Geocoding {} failed due to: {}", address, e);
                return Err(FinderError::Geocode { address: address.to_string() });
            }
        };

        if !response.status.is_ok() {
            warn!("Geocoding {} returned status {}", address, response.status);
            return Err(FinderError::Geocode { address: address.to_string() });
        }

        response
            .results
            .first()
            .and_then(|candidate| candidate.geometry.location)
            .map(Coordinate::from)
            .ok_or_else(|| FinderError::Geocode { address: address.to_string() })
    }

    /// Geocode, then text search with a nearby search fallback. The map is
    /// left alone; results reach it through `show_results` once committed.
    pub async fn search_restaurants(
        &self,
        address: &str,
        radius_meters: u32,
    ) -> Result<SearchResults, FinderError> {
        let location = self.geocode_address(address).await?;

        let restaurants = match self.perform_text_search(location, radius_meters).await {
            Ok(restaurants) => restaurants,
            Err(e) => {
                warn!("Text search failed, falling back to nearby search: {}", e);
                self.perform_nearby_search(location, radius_meters).await?
            }
        };

        info!("Found {} restaurants near {}", restaurants.len(), address);
        Ok(SearchResults { location, restaurants })
    }

    async fn perform_text_search(
        &self,
        location: Coordinate,
        radius_meters: u32,
    ) -> Result<Vec<DisplayRestaurant>, FinderError> {
        let response = self
            .provider
            .text_search(location, radius_meters, TEXT_SEARCH_QUERY)
            .await?;
        debug!("Text search status: {}, {} results", response.status, response.results.len());

        if !response.status.is_ok() {
            return Err(SearchError::from(&response.status).into());
        }
        if response.results.is_empty() {
            return Err(SearchError::NoResults.into());
        }
        Ok(self.format_all(response.results))
    }

    async fn perform_nearby_search(
        &self,
        location: Coordinate,
        radius_meters: u32,
    ) -> Result<Vec<DisplayRestaurant>, FinderError> {
        let response = self
            .provider
            .nearby_search(location, radius_meters, NEARBY_SEARCH_KEYWORD)
            .await?;
        debug!("Nearby search status: {}, {} results", response.status, response.results.len());

        if !response.status.is_ok() {
            let error = SearchError::from(&response.status);
            warn!("Places API error {}: {}", response.status, error);
            return Err(error.into());
        }

        let operational: Vec<PlaceRecord> = response
            .results
            .into_iter()
            .filter(PlaceRecord::is_operational)
            .collect();
        if operational.is_empty() {
            return Err(SearchError::NoResults.into());
        }
        Ok(self.format_all(operational))
    }

    /// Normalizes in ranking order. A repeated id keeps its first occurrence.
    fn format_all(&self, places: Vec<PlaceRecord>) -> Vec<DisplayRestaurant> {
        let mut seen = HashSet::new();
        let mut restaurants = Vec::with_capacity(places.len());
        for place in places {
            let mut restaurant = self.format_restaurant(place);
            while restaurant.provider.place_id().is_none() && seen.contains(&restaurant.id) {
                restaurant.reassign_id(fallback_id());
            }
            if !seen.insert(restaurant.id.clone()) {
                warn!("Dropping duplicate place {} from results", restaurant.id);
                continue;
            }
            restaurants.push(restaurant);
        }
        restaurants
    }

    pub fn format_restaurant(&self, place: PlaceRecord) -> DisplayRestaurant {
        DisplayRestaurant::from_place(place)
    }

    /// Best effort: any failure yields empty details.
    pub async fn get_details(&self, place_id: &str) -> PlaceDetails {
        match self.provider.place_details(place_id, &DETAIL_FIELDS).await {
            Ok(response) if response.status.is_ok() => response
                .result
                .map(|place| PlaceDetails {
                    phone: place.formatted_phone_number,
                    website: place.website,
                    opening_hours: place.opening_hours,
                })
                .unwrap_or_default(),
            Ok(response) => {
                debug!("No details for {}: {}", place_id, response.status);
                PlaceDetails::default()
            }
            Err(e) => {
                warn!("Failed to fetch details for {} due to: {}", place_id, e);
                PlaceDetails::default()
            }
        }
    }

    pub async fn fetch_photo(&self, photo_reference: &str) -> Result<PlacePhoto, ProviderError> {
        self.provider
            .photo(photo_reference, PHOTO_MAX_WIDTH, PHOTO_MAX_HEIGHT)
            .await
    }

    /// Recenters on the searched location and replaces every marker with one
    /// per restaurant, under a single lock of the map.
    pub async fn show_results(&self, location: Coordinate, restaurants: &[DisplayRestaurant]) {
        let mut map = self.map.lock().await;
        map.recenter(location, SEARCH_ZOOM);
        map.clear_markers();
        for restaurant in restaurants {
            map.add_marker(restaurant.clone());
        }
    }

    /// Silently ignored when the restaurant has no live marker.
    pub async fn focus_on(&self, restaurant: &DisplayRestaurant) {
        let mut map = self.map.lock().await;
        if !map.focus(&restaurant.id, Instant::now()) {
            debug!("No marker for {}, skipping focus", restaurant.id);
        }
    }

    pub async fn clear_markers(&self) {
        self.map.lock().await.clear_markers();
    }

    pub async fn map_snapshot(&self) -> MapSnapshot {
        self.map.lock().await.snapshot(Instant::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::map::{DEFAULT_CENTER, FOCUS_ZOOM};
    use crate::models::place::{Photo, ProviderStatus};
    use crate::repositories::fake_places_repo::{place, Call, FakePlacesProvider};

    fn orchestrator(provider: FakePlacesProvider) -> (Arc<FakePlacesProvider>, SearchOrchestrator) {
        let provider = Arc::new(provider);
        let orchestrator = SearchOrchestrator::new(provider.clone());
        (provider, orchestrator)
    }

    #[tokio::test]
    async fn text_search_results_are_returned_in_order() {
        let (provider, orchestrator) = orchestrator(
            FakePlacesProvider::default()
                .geocodes_to(25.0339, 121.5645)
                .text_search_returns(
                    ProviderStatus::Ok,
                    vec![place("a", "甲", 25.0, 121.0), place("b", "乙", 25.1, 121.1)],
                ),
        );

        let found = orchestrator.search_restaurants("台北101", 500).await.unwrap();
        let ids: Vec<_> = found.restaurants.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["a", "b"]);
        assert_eq!(found.location, Coordinate::new(25.0339, 121.5645));

        assert_eq!(
            provider.calls(),
            vec![
                Call::Geocode("台北101".to_string()),
                Call::TextSearch(TEXT_SEARCH_QUERY.to_string()),
            ]
        );

        assert!(orchestrator.map_snapshot().await.markers.is_empty());
        orchestrator.show_results(found.location, &found.restaurants).await;
        let map = orchestrator.map_snapshot().await;
        assert_eq!(map.center, Coordinate::new(25.0339, 121.5645));
        assert_eq!(map.zoom, SEARCH_ZOOM);
        assert_eq!(map.markers.len(), 2);
    }

    #[tokio::test]
    async fn falls_back_to_nearby_search_and_filters_closed_places() {
        let mut closed = place("closed", "歇業", 25.0, 121.0);
        closed.business_status = Some("CLOSED_TEMPORARILY".to_string());
        let mut open = place("open", "營業", 25.0, 121.0);
        open.business_status = Some("OPERATIONAL".to_string());
        let unknown = place("unknown", "不明", 25.0, 121.0);

        let (provider, orchestrator) = orchestrator(
            FakePlacesProvider::default()
                .geocodes_to(25.0, 121.0)
                .text_search_returns(ProviderStatus::RequestDenied, Vec::new())
                .nearby_search_returns(ProviderStatus::Ok, vec![closed, open, unknown]),
        );

        let found = orchestrator.search_restaurants("台北車站", 500).await.unwrap();
        let ids: Vec<_> = found.restaurants.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["open", "unknown"]);
        assert!(provider
            .calls()
            .contains(&Call::NearbySearch(NEARBY_SEARCH_KEYWORD.to_string())));
    }

    #[tokio::test]
    async fn text_search_transport_error_also_falls_back() {
        let (_, orchestrator) = orchestrator(
            FakePlacesProvider::default()
                .geocodes_to(25.0, 121.0)
                .text_search_fails()
                .nearby_search_returns(ProviderStatus::Ok, vec![place("a", "甲", 25.0, 121.0)]),
        );

        let found = orchestrator.search_restaurants("台北", 500).await.unwrap();
        assert_eq!(found.restaurants.len(), 1);
    }

    #[tokio::test]
    async fn ok_text_search_without_results_falls_back_to_nearby() {
        let (provider, orchestrator) = orchestrator(
            FakePlacesProvider::default()
                .geocodes_to(25.0, 121.0)
                .text_search_returns(ProviderStatus::Ok, Vec::new())
                .nearby_search_returns(
                    ProviderStatus::Ok,
                    vec![place("n1", "近一", 25.0, 121.0), place("n2", "近二", 25.0, 121.0)],
                ),
        );

        let found = orchestrator.search_restaurants("台北", 500).await.unwrap();
        let ids: Vec<_> = found.restaurants.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["n1", "n2"]);
        assert_eq!(
            provider.calls(),
            vec![
                Call::Geocode("台北".to_string()),
                Call::TextSearch(TEXT_SEARCH_QUERY.to_string()),
                Call::NearbySearch(NEARBY_SEARCH_KEYWORD.to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn empty_fallback_is_a_no_results_error() {
        let (_, orchestrator) = orchestrator(
            FakePlacesProvider::default()
                .geocodes_to(25.0, 121.0)
                .text_search_returns(ProviderStatus::ZeroResults, Vec::new())
                .nearby_search_returns(ProviderStatus::Ok, Vec::new()),
        );

        let error = orchestrator.search_restaurants("沙漠", 500).await.unwrap_err();
        assert!(matches!(error, FinderError::Search(SearchError::NoResults)));
        assert!(orchestrator.map_snapshot().await.markers.is_empty());
    }

    #[tokio::test]
    async fn nearby_status_maps_to_specific_error() {
        let (_, orchestrator) = orchestrator(
            FakePlacesProvider::default()
                .geocodes_to(25.0, 121.0)
                .nearby_search_returns(ProviderStatus::OverQueryLimit, Vec::new()),
        );

        let error = orchestrator.search_restaurants("台北", 500).await.unwrap_err();
        assert!(matches!(error, FinderError::Search(SearchError::OverQueryLimit)));
    }

    #[tokio::test]
    async fn geocode_failure_echoes_address_and_skips_search() {
        let (provider, orchestrator) = orchestrator(FakePlacesProvider::default());

        let error = orchestrator.search_restaurants("不存在的路", 500).await.unwrap_err();
        assert!(matches!(&error, FinderError::Geocode { address } if address == "不存在的路"));
        assert!(error.to_string().contains("不存在的路"));
        assert_eq!(provider.calls(), vec![Call::Geocode("不存在的路".to_string())]);
    }

    #[tokio::test]
    async fn show_results_replaces_markers() {
        let (_, orchestrator) = orchestrator(FakePlacesProvider::default());
        let first = [
            DisplayRestaurant::from_place(place("a", "甲", 25.0, 121.0)),
            DisplayRestaurant::from_place(place("b", "乙", 25.0, 121.0)),
        ];
        let second = [DisplayRestaurant::from_place(place("c", "丙", 24.0, 120.0))];

        orchestrator.show_results(Coordinate::new(25.0, 121.0), &first).await;
        orchestrator.focus_on(&first[0]).await;
        orchestrator.show_results(Coordinate::new(24.0, 120.0), &second).await;

        let map = orchestrator.map_snapshot().await;
        let ids: Vec<_> = map.markers.iter().map(|m| m.restaurant_id.as_str()).collect();
        assert_eq!(ids, ["c"]);
        assert_eq!(map.center, Coordinate::new(24.0, 120.0));
        assert_eq!(map.zoom, SEARCH_ZOOM);
        assert!(map.info_popup.is_none());
    }

    #[tokio::test]
    async fn duplicate_ids_keep_first_occurrence() {
        let (_, orchestrator) = orchestrator(FakePlacesProvider::default());
        let restaurants = orchestrator.format_all(vec![
            place("a", "first", 25.0, 121.0),
            place("a", "second", 25.0, 121.0),
            PlaceRecord::default(),
            PlaceRecord::default(),
        ]);

        assert_eq!(restaurants.len(), 3);
        assert_eq!(restaurants[0].name, "first");
        assert_ne!(restaurants[1].id, restaurants[2].id);
    }

    #[tokio::test]
    async fn first_photo_is_served_through_a_local_path() {
        let (provider, orchestrator) = orchestrator(FakePlacesProvider::default());
        let mut record = place("a", "甲", 25.0, 121.0);
        record.photos = vec![Photo {
            height: 1,
            html_attributions: Vec::new(),
            photo_reference: "ref1".to_string(),
            width: 1,
        }];

        let restaurant = orchestrator.format_restaurant(record);
        assert_eq!(restaurant.photo_url.as_deref(), Some("/api/restaurants/a/photo"));

        let reference = restaurant.provider.photo_reference().unwrap();
        let photo = orchestrator.fetch_photo(reference).await.unwrap();
        assert_eq!(photo.bytes, b"ref1@300x200");
        assert_eq!(provider.calls(), vec![Call::Photo("ref1".to_string())]);
    }

    #[tokio::test]
    async fn details_failures_yield_empty_details() {
        let (_, orchestrator) = orchestrator(
            FakePlacesProvider::default()
                .details_for("a", "02-1234", "https://a.test")
                .details_fail_for("b"),
        );

        let details = orchestrator.get_details("a").await;
        assert_eq!(details.phone.as_deref(), Some("02-1234"));
        assert!(orchestrator.get_details("b").await.is_empty());
        assert!(orchestrator.get_details("missing").await.is_empty());
    }

    #[tokio::test]
    async fn focus_on_stale_restaurant_is_a_no_op() {
        let (_, orchestrator) = orchestrator(FakePlacesProvider::default());
        let stale = DisplayRestaurant::from_place(place("gone", "舊", 1.0, 1.0));

        orchestrator.focus_on(&stale).await;
        let map = orchestrator.map_snapshot().await;
        assert_eq!(map.center, DEFAULT_CENTER);
        assert!(map.info_popup.is_none());
    }

    #[tokio::test]
    async fn focus_on_opens_popup() {
        let (_, orchestrator) = orchestrator(FakePlacesProvider::default());
        let restaurant = DisplayRestaurant::from_place(place("a", "甲", 25.5, 121.5));
        orchestrator
            .show_results(Coordinate::new(25.0, 121.0), std::slice::from_ref(&restaurant))
            .await;

        orchestrator.focus_on(&restaurant).await;
        let map = orchestrator.map_snapshot().await;
        assert_eq!(map.zoom, FOCUS_ZOOM);
        assert_eq!(map.center, Coordinate::new(25.5, 121.5));
        assert!(map.markers[0].bouncing);
        assert_eq!(map.info_popup.unwrap().name, "甲");
    }

    #[tokio::test]
    async fn clear_markers_is_idempotent() {
        let (_, orchestrator) = orchestrator(FakePlacesProvider::default());
        orchestrator.clear_markers().await;
        orchestrator.clear_markers().await;
        assert!(orchestrator.map_snapshot().await.markers.is_empty());
    }

    #[tokio::test]
    async fn initialize_waits_for_provider() {
        let provider = FakePlacesProvider::default();
        *provider.ping_failures.lock().unwrap() = 2;
        let provider = Arc::new(provider);

        let orchestrator = SearchOrchestrator::initialize(provider.clone(), Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(provider.calls().len(), 3);
        assert_eq!(orchestrator.map_snapshot().await.center, DEFAULT_CENTER);
    }

    #[tokio::test]
    async fn initialize_times_out() {
        let provider = FakePlacesProvider::default();
        *provider.ping_failures.lock().unwrap() = usize::MAX;

        let result = SearchOrchestrator::initialize(Arc::new(provider), Duration::from_millis(250)).await;
        assert!(matches!(result, Err(FinderError::Initialization(_))));
    }
}
