use serde::{Deserialize, Serialize};

/// Status string carried by every Geocoding/Places web service response.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ProviderStatus {
    Ok,
    ZeroResults,
    OverQueryLimit,
    RequestDenied,
    InvalidRequest,
    NotFound,
    UnknownError,
    Other(String),
}

impl ProviderStatus {
    pub fn is_ok(&self) -> bool {
        matches!(self, ProviderStatus::Ok)
    }

    pub fn code(&self) -> &str {
        match self {
            ProviderStatus::Ok => "OK",
            ProviderStatus::ZeroResults => "ZERO_RESULTS",
            ProviderStatus::OverQueryLimit => "OVER_QUERY_LIMIT",
            ProviderStatus::RequestDenied => "REQUEST_DENIED",
            ProviderStatus::InvalidRequest => "INVALID_REQUEST",
            ProviderStatus::NotFound => "NOT_FOUND",
            ProviderStatus::UnknownError => "UNKNOWN_ERROR",
            ProviderStatus::Other(code) => code,
        }
    }
}

impl From<String> for ProviderStatus {
    fn from(code: String) -> Self {
        match code.as_str() {
            "OK" => ProviderStatus::Ok,
            "ZERO_RESULTS" => ProviderStatus::ZeroResults,
            "OVER_QUERY_LIMIT" => ProviderStatus::OverQueryLimit,
            "REQUEST_DENIED" => ProviderStatus::RequestDenied,
            "INVALID_REQUEST" => ProviderStatus::InvalidRequest,
            "NOT_FOUND" => ProviderStatus::NotFound,
            "UNKNOWN_ERROR" => ProviderStatus::UnknownError,
            _ => ProviderStatus::Other(code),
        }
    }
}

impl From<ProviderStatus> for String {
    fn from(status: ProviderStatus) -> Self {
        status.code().to_string()
    }
}

impl std::fmt::Display for ProviderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Clone, Serialize, Deserialize, Debug, Default)]
pub struct Geometry {
    pub location: Option<LatLng>,
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct Photo {
    #[serde(default)]
    pub height: i64,
    #[serde(default)]
    pub html_attributions: Vec<String>,
    pub photo_reference: String,
    #[serde(default)]
    pub width: i64,
}

/// Image bytes fetched from the provider's photo endpoint.
#[derive(Clone, Debug, PartialEq)]
pub struct PlacePhoto {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Clone, Serialize, Deserialize, Debug, Default, PartialEq)]
pub struct OpeningHours {
    pub open_now: Option<bool>,
    #[serde(default)]
    pub weekday_text: Vec<String>,
}

/// A place as returned by text search, nearby search, or details.
/// Every field is optional on the wire.
#[derive(Clone, Serialize, Deserialize, Debug, Default)]
pub struct PlaceRecord {
    pub place_id: Option<String>,
    pub name: Option<String>,
    #[serde(default)]
    pub types: Vec<String>,
    pub vicinity: Option<String>,
    pub formatted_address: Option<String>,
    pub rating: Option<f64>,
    pub user_ratings_total: Option<u64>,
    pub price_level: Option<u8>,
    #[serde(default)]
    pub photos: Vec<Photo>,
    pub geometry: Option<Geometry>,
    pub business_status: Option<String>,
    pub formatted_phone_number: Option<String>,
    pub website: Option<String>,
    pub opening_hours: Option<OpeningHours>,
}

impl PlaceRecord {
    /// Places without a business status are treated as operating.
    pub fn is_operational(&self) -> bool {
        match self.business_status.as_deref() {
            None | Some("") | Some("OPERATIONAL") => true,
            Some(_) => false,
        }
    }
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct GeocodeCandidate {
    pub geometry: Geometry,
    pub formatted_address: Option<String>,
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct GeocodeResponse {
    pub status: ProviderStatus,
    #[serde(default)]
    pub results: Vec<GeocodeCandidate>,
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct PlacesSearchResponse {
    pub status: ProviderStatus,
    #[serde(default)]
    pub results: Vec<PlaceRecord>,
    pub error_message: Option<String>,
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct PlaceDetailsResponse {
    pub status: ProviderStatus,
    pub result: Option<PlaceRecord>,
}
