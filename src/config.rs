use std::env;

use crate::entities::TravelMode;
use crate::error::{invalid_input_error, Error};

pub const DEFAULT_GOOGLE_MAPS_API_BASE: &str = "maps.googleapis.com";
pub const DEFAULT_ROUTE_THRESHOLD: usize = 2;

#[derive(Clone, Debug)]
pub struct Config {
    pub google_maps_api_base: String,
    pub google_maps_api_key: Option<String>,
    /// Self-hosted OSRM server; unset uses the public server for the travel mode.
    pub osrm_url: Option<String>,
    /// Route and reset controls show once more than this many waypoints are placed.
    pub route_threshold: usize,
    pub travel_mode: TravelMode,
    /// Drop service completions issued before the latest reset.
    pub discard_stale: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            google_maps_api_base: DEFAULT_GOOGLE_MAPS_API_BASE.into(),
            google_maps_api_key: None,
            osrm_url: None,
            route_threshold: DEFAULT_ROUTE_THRESHOLD,
            travel_mode: TravelMode::Walking,
            discard_stale: false,
        }
    }
}

impl Config {
    /// Reads the process environment, after loading `.env` if there is one.
    #[tracing::instrument(name = "Config::from_env")]
    pub fn from_env() -> Result<Self, Error> {
        dotenv::dotenv().ok();

        Self::from_vars(|name| env::var(name).ok())
    }

    pub fn from_vars<F>(var: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(base) = var("GOOGLE_MAPS_API_BASE") {
            config.google_maps_api_base = base;
        }

        config.google_maps_api_key = var("GOOGLE_MAPS_API_KEY").filter(|key| !key.is_empty());

        config.osrm_url = var("OSRM_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty());

        if let Some(threshold) = var("PINROUTE_ROUTE_THRESHOLD") {
            config.route_threshold = threshold.trim().parse().map_err(|_| {
                tracing::warn!("invalid PINROUTE_ROUTE_THRESHOLD: {:?}", threshold);
                invalid_input_error()
            })?;
        }

        if let Some(mode) = var("PINROUTE_TRAVEL_MODE") {
            config.travel_mode = TravelMode::parse(&mode).ok_or_else(|| {
                tracing::warn!("invalid PINROUTE_TRAVEL_MODE: {:?}", mode);
                invalid_input_error()
            })?;
        }

        if let Some(flag) = var("PINROUTE_DISCARD_STALE") {
            config.discard_stale = match flag.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => true,
                "0" | "false" | "no" | "" => false,
                _ => {
                    tracing::warn!("invalid PINROUTE_DISCARD_STALE: {:?}", flag);
                    return Err(invalid_input_error());
                }
            };
        }

        Ok(config)
    }
}

#[cfg(test)]
fn vars(pairs: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
    move |name: &str| {
        pairs
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.to_string())
    }
}

#[test]
fn defaults_without_environment() {
    let config = Config::from_vars(vars(&[])).unwrap();

    assert_eq!(config.google_maps_api_base, "maps.googleapis.com");
    assert_eq!(config.google_maps_api_key, None);
    assert_eq!(config.osrm_url, None);
    assert_eq!(config.route_threshold, 2);
    assert_eq!(config.travel_mode, TravelMode::Walking);
    assert!(!config.discard_stale);
}

#[test]
fn overrides_from_environment() {
    let config = Config::from_vars(vars(&[
        ("GOOGLE_MAPS_API_KEY", "secret"),
        ("OSRM_URL", "http://localhost:5000/"),
        ("PINROUTE_ROUTE_THRESHOLD", "4"),
        ("PINROUTE_TRAVEL_MODE", "cycling"),
        ("PINROUTE_DISCARD_STALE", "true"),
    ]))
    .unwrap();

    assert_eq!(config.google_maps_api_key.as_deref(), Some("secret"));
    assert_eq!(config.osrm_url.as_deref(), Some("http://localhost:5000"));
    assert_eq!(config.route_threshold, 4);
    assert_eq!(config.travel_mode, TravelMode::Cycling);
    assert!(config.discard_stale);
}

#[test]
fn rejects_bad_values() {
    assert!(Config::from_vars(vars(&[("PINROUTE_ROUTE_THRESHOLD", "three")])).is_err());
    assert!(Config::from_vars(vars(&[("PINROUTE_TRAVEL_MODE", "swim")])).is_err());
    assert!(Config::from_vars(vars(&[("PINROUTE_DISCARD_STALE", "maybe")])).is_err());
}
