use std::env;
use std::path::PathBuf;

use crate::model::Fixture;

pub const DEVELOPMENT_BASE_URL: &str = "http://localhost:8080";
pub const PRODUCTION_BASE_URL: &str = "https://fctracker.laytonreynolds.com";
pub const DEFAULT_GEOCODER_BASE_URL: &str = "https://api.postcodes.io";

const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_FETCH_PARALLELISM: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    /// Unknown or empty modes fall back to development.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Environment::Production,
            _ => Environment::Development,
        }
    }

    pub fn base_url(self) -> &'static str {
        match self {
            Environment::Development => DEVELOPMENT_BASE_URL,
            Environment::Production => PRODUCTION_BASE_URL,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Environment::Development => "dev",
            Environment::Production => "prod",
        }
    }
}

#[derive(Debug, Clone)]
pub struct MapConfig {
    pub access_token: Option<String>,
    pub style: String,
    pub default_zoom: u8,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            access_token: None,
            style: "mapbox/streets-v11".to_string(),
            default_zoom: 13,
        }
    }
}

impl MapConfig {
    pub fn has_credentials(&self) -> bool {
        self.access_token.as_deref().is_some_and(|t| !t.trim().is_empty())
    }

    /// Static map image URL for a marker at the given coordinates, if a token is set.
    pub fn static_map_url(&self, latitude: f64, longitude: f64) -> Option<String> {
        let token = self.access_token.as_deref().filter(|t| !t.trim().is_empty())?;
        Some(format!(
            "https://api.mapbox.com/styles/v1/{}/static/pin-l+1976d2({longitude},{latitude})/{longitude},{latitude},{}/600x300?access_token={token}",
            self.style, self.default_zoom
        ))
    }
}

/// What the fixture detail location panel shows.
#[derive(Debug, Clone, PartialEq)]
pub enum MapPanel {
    Unavailable,
    NoLocation,
    Marker {
        latitude: f64,
        longitude: f64,
        static_url: Option<String>,
    },
}

impl MapPanel {
    pub fn resolve(map: &MapConfig, fixture: &Fixture) -> Self {
        if !map.has_credentials() {
            return MapPanel::Unavailable;
        }
        match fixture.coordinates() {
            Some(loc) => MapPanel::Marker {
                latitude: loc.latitude,
                longitude: loc.longitude,
                static_url: map.static_map_url(loc.latitude, loc.longitude),
            },
            None => MapPanel::NoLocation,
        }
    }

    pub fn placeholder(&self) -> Option<&'static str> {
        match self {
            MapPanel::Unavailable => Some("Map not available"),
            MapPanel::NoLocation => Some("No location data available for this fixture"),
            MapPanel::Marker { .. } => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: Environment,
    pub api_base_url: String,
    pub geocoder_base_url: String,
    pub http_timeout_secs: u64,
    pub fetch_parallelism: usize,
    pub preferences_path: Option<PathBuf>,
    pub map: MapConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            environment: Environment::Development,
            api_base_url: DEVELOPMENT_BASE_URL.to_string(),
            geocoder_base_url: DEFAULT_GEOCODER_BASE_URL.to_string(),
            http_timeout_secs: DEFAULT_TIMEOUT_SECS,
            fetch_parallelism: DEFAULT_FETCH_PARALLELISM,
            preferences_path: None,
            map: MapConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let environment = read("FCTRACKER_ENV")
            .map(|raw| Environment::parse(&raw))
            .unwrap_or(Environment::Development);
        let api_base_url = read("FCTRACKER_API_BASE")
            .map(|raw| trim_base(&raw))
            .unwrap_or_else(|| environment.base_url().to_string());
        let geocoder_base_url = read("FCTRACKER_GEOCODER_BASE")
            .map(|raw| trim_base(&raw))
            .unwrap_or_else(|| DEFAULT_GEOCODER_BASE_URL.to_string());
        let http_timeout_secs = read("FCTRACKER_HTTP_TIMEOUT_SECS")
            .and_then(|val| val.trim().parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS)
            .max(1);
        let fetch_parallelism = read("FCTRACKER_FETCH_PARALLELISM")
            .and_then(|val| val.trim().parse::<usize>().ok())
            .unwrap_or(DEFAULT_FETCH_PARALLELISM)
            .clamp(2, 16);
        let preferences_path = read("FCTRACKER_PREFERENCES").map(PathBuf::from);
        let map = MapConfig {
            access_token: read("MAPBOX_ACCESS_TOKEN"),
            ..MapConfig::default()
        };

        Self {
            environment,
            api_base_url,
            geocoder_base_url,
            http_timeout_secs,
            fetch_parallelism,
            preferences_path,
            map,
        }
    }

    pub fn api_url(&self, endpoint: &str) -> String {
        build_api_url(&self.api_base_url, endpoint)
    }
}

/// Joins a base origin and an endpoint path with exactly one slash between them.
pub fn build_api_url(base: &str, endpoint: &str) -> String {
    let base = base.trim_end_matches('/');
    if endpoint.is_empty() {
        return base.to_string();
    }
    if endpoint.starts_with('/') {
        format!("{base}{endpoint}")
    } else {
        format!("{base}/{endpoint}")
    }
}

fn trim_base(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_string()
}
