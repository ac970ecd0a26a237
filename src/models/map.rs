use serde::Serialize;
use tokio::time::{Duration, Instant};
use crate::helpers::render::InfoPopup;
use crate::models::restaurant::{Coordinate, DisplayRestaurant};

pub const DEFAULT_CENTER: Coordinate = Coordinate::new(25.0330, 121.5654);
pub const DEFAULT_ZOOM: u8 = 15;
pub const SEARCH_ZOOM: u8 = 16;
pub const FOCUS_ZOOM: u8 = 18;
pub const MARKER_ICON_URL: &str = "https://maps.google.com/mapfiles/ms/icons/red-dot.png";
pub const MARKER_ICON_SIZE: u32 = 32;
pub const BOUNCE_DURATION: Duration = Duration::from_millis(1500);

#[derive(Clone, Debug)]
pub struct MarkerHandle {
    pub id: u64,
    pub position: Coordinate,
    pub title: String,
    bounce_until: Option<Instant>,
}

impl MarkerHandle {
    pub fn is_bouncing(&self, now: Instant) -> bool {
        self.bounce_until.map_or(false, |until| now < until)
    }
}

#[derive(Clone, Debug)]
pub struct MarkerEntry {
    pub restaurant: DisplayRestaurant,
    pub marker: MarkerHandle,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerView {
    pub marker_id: u64,
    pub restaurant_id: String,
    pub title: String,
    pub position: Coordinate,
    pub icon_url: &'static str,
    pub icon_size: u32,
    pub bouncing: bool,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapSnapshot {
    pub center: Coordinate,
    pub zoom: u8,
    pub markers: Vec<MarkerView>,
    pub info_popup: Option<InfoPopup>,
}

/// Server-side state of the map pane: viewport, live markers and the one
/// reusable info popup.
#[derive(Debug)]
pub struct MapView {
    center: Coordinate,
    zoom: u8,
    markers: Vec<MarkerEntry>,
    info_popup: Option<InfoPopup>,
    next_marker_id: u64,
}

impl Default for MapView {
    fn default() -> Self {
        Self {
            center: DEFAULT_CENTER,
            zoom: DEFAULT_ZOOM,
            markers: Vec::new(),
            info_popup: None,
            next_marker_id: 1,
        }
    }
}

impl MapView {
    pub fn center(&self) -> Coordinate {
        self.center
    }

    pub fn zoom(&self) -> u8 {
        self.zoom
    }

    pub fn markers(&self) -> &[MarkerEntry] {
        &self.markers
    }

    pub fn info_popup(&self) -> Option<&InfoPopup> {
        self.info_popup.as_ref()
    }

    pub fn recenter(&mut self, center: Coordinate, zoom: u8) {
        self.center = center;
        self.zoom = zoom;
    }

    pub fn add_marker(&mut self, restaurant: DisplayRestaurant) {
        let marker = MarkerHandle {
            id: self.next_marker_id,
            position: restaurant.location,
            title: restaurant.name.clone(),
            bounce_until: None,
        };
        self.next_marker_id += 1;
        self.markers.push(MarkerEntry { restaurant, marker });
    }

    /// Drops every marker and closes the popup. Safe on an empty map.
    pub fn clear_markers(&mut self) {
        self.markers.clear();
        self.info_popup = None;
    }

    /// Returns `false` when no marker exists for `restaurant_id`.
    pub fn focus(&mut self, restaurant_id: &str, now: Instant) -> bool {
        let Some(entry) = self
            .markers
            .iter_mut()
            .find(|entry| entry.restaurant.id == restaurant_id)
        else {
            return false;
        };

        entry.marker.bounce_until = Some(now + BOUNCE_DURATION);
        self.center = entry.marker.position;
        self.zoom = FOCUS_ZOOM;
        self.info_popup = Some(InfoPopup::for_restaurant(&entry.restaurant));
        true
    }

    pub fn snapshot(&self, now: Instant) -> MapSnapshot {
        MapSnapshot {
            center: self.center(),
            zoom: self.zoom(),
            markers: self
                .markers()
                .iter()
                .map(|entry| MarkerView {
                    marker_id: entry.marker.id,
                    restaurant_id: entry.restaurant.id.clone(),
                    title: entry.marker.title.clone(),
                    position: entry.marker.position,
                    icon_url: MARKER_ICON_URL,
                    icon_size: MARKER_ICON_SIZE,
                    bouncing: entry.marker.is_bouncing(now),
                })
                .collect(),
            info_popup: self.info_popup().cloned(),
        }
    }
}
