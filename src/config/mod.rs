// src/config/mod.rs
// All tunables load from the environment (.env supported), with defaults
// matching the deployed demo.

use once_cell::sync::Lazy;
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct GlobeConfig {
    // ── Upstream credentials
    pub maps_api_key: String,
    pub gemini_api_key: String,

    // ── Upstream endpoints (overridable so tests can point at a local mock)
    pub places_base_url: String,
    pub gemini_base_url: String,
    pub gemini_model: String,

    // ── Search defaults
    pub search_radius_meters: u32,
    pub search_keyword: String,

    // ── Server Configuration
    pub host: String,
    pub port: u16,

    // ── CORS Settings
    pub cors_origin: String,

    // ── Timeouts (in seconds)
    pub upstream_timeout: u64,

    // ── Logging Configuration
    pub log_level: String,
}

// Handles values with trailing comments and stray whitespace.
fn env_var_or<T>(key: &str, default: T) -> T
where
    T: FromStr,
{
    match std::env::var(key) {
        Ok(val) => {
            let clean_val = val.split('#').next().unwrap_or("").trim();
            match clean_val.parse::<T>() {
                Ok(parsed) => parsed,
                Err(_) => {
                    eprintln!("Config: {} = '{}' (parse failed, using default)", key, val);
                    default
                }
            }
        }
        Err(_) => default,
    }
}

impl GlobeConfig {
    pub fn from_env() -> Self {
        if dotenvy::dotenv().is_err() {
            eprintln!("Warning: .env file not found. Using environment variables and defaults.");
        }

        Self {
            maps_api_key: env_var_or("GOOGLE_MAPS_API_KEY", String::new()),
            gemini_api_key: env_var_or("GEMINI_API_KEY", String::new()),
            places_base_url: env_var_or(
                "PLACES_BASE_URL",
                "https://maps.googleapis.com/maps/api/place".to_string(),
            ),
            gemini_base_url: env_var_or(
                "GEMINI_BASE_URL",
                "https://generativelanguage.googleapis.com/v1beta".to_string(),
            ),
            gemini_model: env_var_or("GEMINI_MODEL", "gemini-1.5-flash".to_string()),
            search_radius_meters: env_var_or("SEARCH_RADIUS_METERS", 10_000),
            search_keyword: env_var_or("SEARCH_KEYWORD", "charity donation".to_string()),
            host: env_var_or("HOST", "0.0.0.0".to_string()),
            port: env_var_or("PORT", 5000),
            cors_origin: env_var_or("CORS_ORIGIN", "http://localhost:5173".to_string()),
            upstream_timeout: env_var_or("UPSTREAM_TIMEOUT_SECS", 10),
            log_level: env_var_or("LOG_LEVEL", "info".to_string()),
        }
    }

    /// Get server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn upstream_timeout_duration(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.upstream_timeout)
    }
}

// Global config instance - loaded once at startup
pub static CONFIG: Lazy<GlobeConfig> = Lazy::new(GlobeConfig::from_env);
