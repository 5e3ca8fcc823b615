use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    #[serde(default = "default_location")]
    pub default_location: String,
    #[serde(default = "default_ollama_host")]
    pub ollama_host: String,
    #[serde(default = "default_ollama_model")]
    pub ollama_model: String,
    #[serde(default = "default_osm_contact")]
    pub osm_contact: String,
    #[serde(default = "default_nominatim_url")]
    pub nominatim_url: String,
    #[serde(default = "default_overpass_url")]
    pub overpass_url: String,
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    #[serde(default = "default_rate_limit_per_minute")]
    pub rate_limit_per_minute: u32,
}

fn default_max_results() -> usize {
    5
}

fn default_location() -> String {
    "Jakarta, Indonesia".to_string()
}

fn default_ollama_host() -> String {
    "http://127.0.0.1:11434".to_string()
}

fn default_ollama_model() -> String {
    "llama3.1:8b".to_string()
}

fn default_osm_contact() -> String {
    "repo-demo@example.com".to_string()
}

fn default_nominatim_url() -> String {
    "https://nominatim.openstreetmap.org".to_string()
}

fn default_overpass_url() -> String {
    "https://overpass-api.de/api/interpreter".to_string()
}

fn default_bind_addr() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_rate_limit_per_minute() -> u32 {
    30
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl AppConfig {
    /// Load configuration from the process environment, after reading an
    /// optional `.env` file in the working directory.
    pub fn from_env() -> Self {
        // A missing .env is normal outside development
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup. Blank or
    /// unparseable values fall back to the defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        Self {
            max_results: get("MAX_RESULTS")
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(default_max_results),
            default_location: get("DEFAULT_LOCATION").unwrap_or_else(default_location),
            ollama_host: get("OLLAMA_HOST")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or_else(default_ollama_host),
            ollama_model: get("OLLAMA_MODEL").unwrap_or_else(default_ollama_model),
            osm_contact: get("OSM_CONTACT").unwrap_or_else(default_osm_contact),
            nominatim_url: get("NOMINATIM_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or_else(default_nominatim_url),
            overpass_url: get("OVERPASS_URL").unwrap_or_else(default_overpass_url),
            bind_addr: get("BIND_ADDR").unwrap_or_else(default_bind_addr),
            rate_limit_per_minute: get("RATE_LIMIT_PER_MINUTE")
                .and_then(|v| v.parse().ok())
                .filter(|v| *v > 0)
                .unwrap_or_else(default_rate_limit_per_minute),
        }
    }

    /// Identifying `User-Agent` sent with every outbound request.
    pub fn user_agent(&self) -> String {
        format!("places-chat-backend/1.0 ({})", self.osm_contact)
    }
}
