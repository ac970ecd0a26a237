use crate::models::place::ProviderStatus;

/// Transport-level failures talking to the places provider.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("request to places provider failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("places provider returned HTTP {0}")]
    Http(reqwest::StatusCode),

    #[error("invalid response from places provider: {0}")]
    Decode(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SearchError {
    #[error("在此地址附近沒有找到餐廳，請嘗試其他地址。")]
    NoResults,

    #[error("API 查詢次數已達上限，請稍後再試。")]
    OverQueryLimit,

    #[error("API 請求被拒絕，請檢查 API Key 權限設定。")]
    RequestDenied,

    #[error("搜尋請求格式錯誤，請重新輸入地址。")]
    InvalidRequest,

    #[error("找不到指定的地址，請檢查地址是否正確。")]
    NotFound,

    #[error("搜尋餐廳時發生錯誤：{0}，請稍後再試。")]
    Other(String),
}

impl From<&ProviderStatus> for SearchError {
    fn from(status: &ProviderStatus) -> Self {
        match status {
            ProviderStatus::ZeroResults => SearchError::NoResults,
            ProviderStatus::OverQueryLimit => SearchError::OverQueryLimit,
            ProviderStatus::RequestDenied => SearchError::RequestDenied,
            ProviderStatus::InvalidRequest => SearchError::InvalidRequest,
            ProviderStatus::NotFound => SearchError::NotFound,
            other => SearchError::Other(other.code().to_string()),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FinderError {
    #[error("應用程式初始化失敗，請重新整理頁面再試。（{0}）")]
    Initialization(String),

    #[error("無法解析地址：{address}。請檢查地址格式是否正確。")]
    Geocode { address: String },

    #[error(transparent)]
    Search(#[from] SearchError),

    #[error("請輸入地址")]
    EmptyInput,

    #[error("無法連線至地圖服務，請稍後再試。")]
    Provider(#[from] ProviderError),
}

pub const API_KEY_MISCONFIGURED: &str = "Google Maps API Key 設定有誤，請檢查設定。";

impl FinderError {
    /// Message shown in the error banner. Provider wording that points at
    /// the API key or quota is rewritten into its actionable form. The key
    /// check runs first, so a denied request reads as a key problem.
    pub fn user_message(&self) -> String {
        let message = self.to_string();
        if message.contains("API Key") {
            API_KEY_MISCONFIGURED.to_string()
        } else if message.contains("OVER_QUERY_LIMIT") {
            SearchError::OverQueryLimit.to_string()
        } else if message.contains("REQUEST_DENIED") {
            SearchError::RequestDenied.to_string()
        } else {
            message
        }
    }
}
