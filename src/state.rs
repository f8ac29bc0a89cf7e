// src/state.rs

use std::sync::Arc;

use crate::chat::provider::GeminiClient;
use crate::config::GlobeConfig;
use crate::places::PlacesClient;

/// Shared handler state. The gateway is stateless beyond these two clients,
/// which are the only holders of the upstream credentials.
#[derive(Clone)]
pub struct AppState {
    pub places: Arc<PlacesClient>,
    pub gemini: Arc<GeminiClient>,
    pub default_radius: u32,
    pub default_keyword: String,
}

impl AppState {
    pub fn from_config(config: &GlobeConfig) -> Self {
        let timeout = config.upstream_timeout_duration();
        Self::new(
            PlacesClient::new(&config.places_base_url, &config.maps_api_key, timeout),
            GeminiClient::new(
                &config.gemini_base_url,
                &config.gemini_api_key,
                &config.gemini_model,
                timeout,
            ),
            config.search_radius_meters,
            config.search_keyword.clone(),
        )
    }

    pub fn new(
        places: PlacesClient,
        gemini: GeminiClient,
        default_radius: u32,
        default_keyword: String,
    ) -> Self {
        Self {
            places: Arc::new(places),
            gemini: Arc::new(gemini),
            default_radius,
            default_keyword,
        }
    }
}
