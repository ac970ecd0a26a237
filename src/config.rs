use clap::Parser;

#[derive(Parser, Clone, Debug)]
pub struct Config {
    #[clap(env, long)]
    pub google_maps_api_key: String,

    #[clap(env, long, default_value = "https://maps.googleapis.com/maps/api")]
    pub places_base_url: String,

    #[clap(env, long, default_value = "zh-TW")]
    pub places_language: String,

    #[clap(env, long, default_value_t = 500)]
    pub search_radius_meters: u32,

    /// How long startup waits for the places provider to answer.
    #[clap(env, long, default_value_t = 30)]
    pub provider_ready_timeout_secs: u64,

    #[clap(env, long, default_value_t = 10)]
    pub provider_request_timeout_secs: u64,

    /// Comma separated list of allowed CORS origins.
    #[clap(env, long, default_value = "http://localhost:3000")]
    pub origin_urls: String,

    #[clap(env, long, default_value = "127.0.0.1:3000")]
    pub listen_addr: String,
}
