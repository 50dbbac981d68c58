use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{
    api::GeocodingAPI,
    config::Config,
    entities::Coordinates,
    error::{invalid_input_error, upstream_error, Error},
};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Place {
    pub formatted_address: String,
    pub geometry: Geometry,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Geometry {
    pub location: LatLng,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl From<LatLng> for Coordinates {
    fn from(location: LatLng) -> Self {
        Coordinates::new(location.lat, location.lng)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct Response<T> {
    status: String,
    results: Option<T>,
    error_message: Option<String>,
}

#[derive(Debug)]
pub struct GoogleMapsClient {
    api_base: String,
    key: String,
    client: reqwest::Client,
}

impl GoogleMapsClient {
    pub fn new(api_base: String, key: String) -> Self {
        Self {
            api_base,
            key,
            client: reqwest::Client::new(),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, Error> {
        let key = config
            .google_maps_api_key
            .clone()
            .ok_or_else(|| invalid_input_error())?;

        Ok(Self::new(config.google_maps_api_base.clone(), key))
    }

    #[tracing::instrument(skip(self))]
    pub async fn find_places(&self, address: &str) -> Result<Vec<Place>, Error> {
        let url = format!("https://{}/maps/api/geocode/json", self.api_base);

        let res = self
            .client
            .get(url)
            .query(&[("key", self.key.as_str())])
            .query(&[("address", address)])
            .send()
            .await?;

        let status_code = res.status().as_u16();

        if status_code >= 400 && status_code < 500 {
            return Err(invalid_input_error());
        } else if status_code != 200 {
            return Err(upstream_error());
        }

        let data: Response<Vec<Place>> = res.json().await?;

        parse_places(data)
    }
}

fn parse_places(data: Response<Vec<Place>>) -> Result<Vec<Place>, Error> {
    match data.status.as_str() {
        "OK" => Ok(data.results.ok_or_else(|| upstream_error())?),
        "ZERO_RESULTS" => Ok(vec![]),
        status => {
            tracing::warn!(
                "geocoding status {}: {}",
                status,
                data.error_message.unwrap_or_default()
            );
            Err(upstream_error())
        }
    }
}

#[async_trait]
impl GeocodingAPI for GoogleMapsClient {
    async fn geocode(&self, address: &str) -> Result<Vec<Coordinates>, Error> {
        let places = self.find_places(address).await?;

        Ok(places
            .into_iter()
            .map(|place| place.geometry.location.into())
            .collect())
    }
}

#[test]
fn parse_ok_response() {
    let data: Response<Vec<Place>> = serde_json::from_str(
        r#"{
            "status": "OK",
            "results": [
                {
                    "formatted_address": "221B Baker St, London NW1 6XE, UK",
                    "geometry": { "location": { "lat": 51.5237, "lng": -0.1585 } },
                    "place_id": "ChIJEYJiM88adkgR4SKDqHd2XUQ"
                }
            ]
        }"#,
    )
    .unwrap();

    let places = parse_places(data).unwrap();
    assert_eq!(places.len(), 1);

    let coordinates: Coordinates = places[0].geometry.location.into();
    assert_eq!(coordinates, Coordinates::new(51.5237, -0.1585));
}

#[test]
fn parse_zero_results() {
    let data: Response<Vec<Place>> =
        serde_json::from_str(r#"{ "status": "ZERO_RESULTS", "results": [] }"#).unwrap();

    assert!(parse_places(data).unwrap().is_empty());
}

#[test]
fn parse_denied_request() {
    let data: Response<Vec<Place>> = serde_json::from_str(
        r#"{ "status": "REQUEST_DENIED", "error_message": "The provided API key is invalid." }"#,
    )
    .unwrap();

    assert_eq!(parse_places(data).unwrap_err(), upstream_error());
}

#[test]
fn client_requires_key() {
    assert!(GoogleMapsClient::from_config(&Config::default()).is_err());
}
