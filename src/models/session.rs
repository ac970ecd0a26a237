use serde::Serialize;
use tokio::time::{Duration, Instant};
use crate::models::restaurant::DisplayRestaurant;

pub const ERROR_BANNER_TTL: Duration = Duration::from_secs(5);

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UiStatus {
    Idle,
    Loading,
    Ready,
    Failed,
}

#[derive(Clone, Debug)]
pub struct ErrorBanner {
    pub message: String,
    raised_at: Instant,
}

impl ErrorBanner {
    pub fn is_visible(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.raised_at) < ERROR_BANNER_TTL
    }
}

/// The one active search session. Results are replaced wholesale on each
/// search and kept in provider ranking order.
#[derive(Debug)]
pub struct SearchSession {
    restaurants: Vec<DisplayRestaurant>,
    selected_id: Option<String>,
    status: UiStatus,
    random_enabled: bool,
    banner: Option<ErrorBanner>,
}

impl Default for SearchSession {
    fn default() -> Self {
        Self {
            restaurants: Vec::new(),
            selected_id: None,
            status: UiStatus::Idle,
            random_enabled: false,
            banner: None,
        }
    }
}

impl SearchSession {
    pub fn restaurants(&self) -> &[DisplayRestaurant] {
        &self.restaurants
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.selected_id.as_deref()
    }

    pub fn status(&self) -> &UiStatus {
        &self.status
    }

    pub fn is_loading(&self) -> bool {
        self.status == UiStatus::Loading
    }

    pub fn random_enabled(&self) -> bool {
        self.random_enabled && !self.is_loading()
    }

    pub fn visible_error(&self, now: Instant) -> Option<&str> {
        self.banner
            .as_ref()
            .filter(|banner| banner.is_visible(now))
            .map(|banner| banner.message.as_str())
    }

    pub fn begin_loading(&mut self) {
        self.status = UiStatus::Loading;
        self.random_enabled = false;
        self.banner = None;
    }

    pub fn complete(&mut self, restaurants: Vec<DisplayRestaurant>) {
        self.random_enabled = !restaurants.is_empty();
        self.restaurants = restaurants;
        self.selected_id = None;
        self.status = UiStatus::Ready;
    }

    /// Search failure: the result list is cleared along with the selection.
    pub fn fail(&mut self, message: String, now: Instant) {
        self.restaurants.clear();
        self.selected_id = None;
        self.random_enabled = false;
        self.status = UiStatus::Failed;
        self.raise(message, now);
    }

    /// Local validation failure. Results from an earlier search stay.
    pub fn reject_input(&mut self, message: String, now: Instant) {
        self.status = UiStatus::Failed;
        self.raise(message, now);
    }

    pub fn raise(&mut self, message: String, now: Instant) {
        self.banner = Some(ErrorBanner { message, raised_at: now });
    }

    pub fn dismiss_error(&mut self) {
        self.banner = None;
    }

    /// Returns the index of the selected entry, if `id` is in the list.
    pub fn select(&mut self, id: &str) -> Option<usize> {
        let index = self.restaurants.iter().position(|r| r.id == id)?;
        self.selected_id = Some(id.to_string());
        Some(index)
    }
}
