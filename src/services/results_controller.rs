use std::sync::Arc;
use rand::Rng;
use serde::Serialize;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{info, warn};
use crate::error::{FinderError, ProviderError};
use crate::helpers::render::render_list;
use crate::models::map::MapSnapshot;
use crate::models::place::PlacePhoto;
use crate::models::restaurant::DisplayRestaurant;
use crate::models::session::{SearchSession, UiStatus};
use crate::services::search_orchestrator::SearchOrchestrator;

pub const NOTHING_TO_PICK: &str = "沒有可選擇的餐廳";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrollBehavior {
    Smooth,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrollBlock {
    Center,
}

/// Where the client should scroll the list after a random pick.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ScrollTarget {
    pub index: usize,
    pub behavior: ScrollBehavior,
    pub block: ScrollBlock,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RandomPick {
    pub restaurant: DisplayRestaurant,
    pub scroll_to: ScrollTarget,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub status: UiStatus,
    pub loading: bool,
    pub error: Option<String>,
    pub count: usize,
    pub random_enabled: bool,
    pub selected_id: Option<String>,
    pub restaurants: Vec<DisplayRestaurant>,
    pub list_html: String,
    pub map: MapSnapshot,
}

/// Owns the search session and keeps list, map and status in step with it.
/// The session lock is never held across a provider call. Map changes that
/// follow a session change are made while the session lock is held, so list
/// and markers always come from the same search.
pub struct ResultsController {
    orchestrator: Arc<SearchOrchestrator>,
    session: Mutex<SearchSession>,
    radius_meters: u32,
}

impl ResultsController {
    pub fn new(orchestrator: Arc<SearchOrchestrator>, radius_meters: u32) -> Self {
        Self {
            orchestrator,
            session: Mutex::new(SearchSession::default()),
            radius_meters,
        }
    }

    pub async fn handle_search(&self, raw_input: &str) {
        let address = raw_input.trim();
        if address.is_empty() {
            self.session
                .lock()
                .await
                .reject_input(FinderError::EmptyInput.user_message(), Instant::now());
            return;
        }

        {
            let mut session = self.session.lock().await;
            session.begin_loading();
            self.orchestrator.clear_markers().await;
        }
        info!("Searching restaurants near {}", address);

        let mut found = match self
            .orchestrator
            .search_restaurants(address, self.radius_meters)
            .await
        {
            Ok(found) => found,
            Err(e) => {
                warn!("Search for {} failed due to: {}", address, e);
                let mut session = self.session.lock().await;
                session.fail(e.user_message(), Instant::now());
                self.orchestrator.clear_markers().await;
                return;
            }
        };

        self.load_details(&mut found.restaurants).await;

        let mut session = self.session.lock().await;
        self.orchestrator
            .show_results(found.location, &found.restaurants)
            .await;
        session.complete(found.restaurants);
    }

    /// One request at a time, in ranking order.
    async fn load_details(&self, restaurants: &mut [DisplayRestaurant]) {
        for restaurant in restaurants.iter_mut() {
            let Some(place_id) = restaurant.provider.place_id().map(str::to_string) else {
                continue;
            };
            let details = self.orchestrator.get_details(&place_id).await;
            if details.is_empty() {
                warn!("No details loaded for restaurant {}", restaurant.name);
            }
            restaurant.apply_details(details);
        }
    }

    /// Ignored while a search is in flight, since the list is about to be
    /// replaced.
    pub async fn handle_random_selection(&self) -> Option<RandomPick> {
        let mut session = self.session.lock().await;
        if session.is_loading() {
            info!("Random pick ignored while a search is loading");
            return None;
        }
        let count = session.restaurants().len();
        if count == 0 {
            session.raise(NOTHING_TO_PICK.to_string(), Instant::now());
            return None;
        }

        let index = rand::thread_rng().gen_range(0..count);
        let restaurant = session.restaurants()[index].clone();
        session.select(&restaurant.id);
        info!("Randomly picked {}", restaurant.name);
        self.orchestrator.focus_on(&restaurant).await;

        Some(RandomPick {
            restaurant,
            scroll_to: ScrollTarget {
                index,
                behavior: ScrollBehavior::Smooth,
                block: ScrollBlock::Center,
            },
        })
    }

    /// List entry or marker click. `None` when `id` is not in the current results.
    pub async fn select_restaurant(&self, id: &str) -> Option<DisplayRestaurant> {
        let mut session = self.session.lock().await;
        let index = session.select(id)?;
        let restaurant = session.restaurants()[index].clone();
        self.orchestrator.focus_on(&restaurant).await;
        Some(restaurant)
    }

    /// Image for a restaurant in the current results. `Ok(None)` when the id
    /// is unknown or the restaurant has no photo.
    pub async fn photo(&self, id: &str) -> Result<Option<PlacePhoto>, ProviderError> {
        let reference = {
            let session = self.session.lock().await;
            session
                .restaurants()
                .iter()
                .find(|restaurant| restaurant.id == id)
                .and_then(|restaurant| restaurant.provider.photo_reference())
                .map(str::to_string)
        };
        match reference {
            Some(reference) => self.orchestrator.fetch_photo(&reference).await.map(Some),
            None => Ok(None),
        }
    }

    pub async fn on_input_edited(&self) {
        self.session.lock().await.dismiss_error();
    }

    pub async fn render(&self) -> String {
        let session = self.session.lock().await;
        render_list(session.restaurants(), session.selected_id())
    }

    pub async fn view(&self) -> SessionView {
        let session = self.session.lock().await;
        let map = self.orchestrator.map_snapshot().await;
        let now = Instant::now();

        SessionView {
            status: session.status().clone(),
            loading: session.is_loading(),
            error: session.visible_error(now).map(str::to_string),
            count: session.restaurants().len(),
            random_enabled: session.random_enabled(),
            selected_id: session.selected_id().map(str::to_string),
            restaurants: session.restaurants().to_vec(),
            list_html: render_list(session.restaurants(), session.selected_id()),
            map,
        }
    }
}
