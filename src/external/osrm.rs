use async_trait::async_trait;
use geo_types::LineString;
use serde::Deserialize;

use crate::{
    api::DirectionsAPI,
    entities::{Coordinates, RouteCandidate, TravelMode},
    error::{upstream_error, Error},
};

pub const OSRM_ROUTE_API_PATH: &str = "/route/v1/";

/// Public OSRM host serving one profile per `routed-*` prefix.
pub const DEFAULT_OSRM_HOST: &str = "https://routing.openstreetmap.de";

#[derive(Deserialize)]
struct RouteResponse {
    code: String,
    message: Option<String>,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Deserialize)]
struct OsrmRoute {
    /// Meters
    distance: f64,
    /// Seconds
    duration: f64,
    geometry: OsrmGeometry,
}

#[derive(Deserialize)]
struct OsrmGeometry {
    coordinates: Vec<[f64; 2]>,
}

impl From<OsrmRoute> for RouteCandidate {
    fn from(route: OsrmRoute) -> Self {
        RouteCandidate {
            distance: route.distance,
            duration: route.duration,
            geometry: LineString::from(route.geometry.coordinates),
        }
    }
}

fn profile(mode: TravelMode) -> &'static str {
    match mode {
        TravelMode::Walking => "foot",
        TravelMode::Driving => "driving",
        TravelMode::Cycling => "bike",
    }
}

/// Base URL of the public server loaded with the profile for `mode`.
pub fn default_base_url(mode: TravelMode) -> String {
    let routed = match mode {
        TravelMode::Walking => "routed-foot",
        TravelMode::Driving => "routed-car",
        TravelMode::Cycling => "routed-bike",
    };

    format!("{}/{}", DEFAULT_OSRM_HOST, routed)
}

pub struct OsrmDirectionsClient {
    /// A single self-hosted server used for every mode; `None` picks the
    /// public server per mode.
    osrm_url: Option<String>,
    client: reqwest::Client,
}

impl OsrmDirectionsClient {
    pub fn new(osrm_url: Option<String>) -> Self {
        Self {
            osrm_url,
            client: reqwest::Client::new(),
        }
    }

    fn route_url(&self, origin: Coordinates, destination: Coordinates, mode: TravelMode) -> String {
        let origin: String = origin.into();
        let destination: String = destination.into();

        let mut url = match &self.osrm_url {
            Some(osrm_url) => osrm_url.clone(),
            None => default_base_url(mode),
        };
        url.push_str(OSRM_ROUTE_API_PATH);
        url.push_str(profile(mode));
        url.push('/');
        url.push_str(&format!("{};{}", origin, destination));

        url
    }
}

fn parse_routes(data: RouteResponse) -> Result<Option<Vec<RouteCandidate>>, Error> {
    match data.code.as_str() {
        "Ok" => Ok(Some(data.routes.into_iter().map(Into::into).collect())),
        "NoRoute" | "NoSegment" => Ok(None),
        code => {
            tracing::warn!("osrm code {}: {}", code, data.message.unwrap_or_default());
            Err(upstream_error())
        }
    }
}

#[async_trait]
impl DirectionsAPI for OsrmDirectionsClient {
    #[tracing::instrument(skip(self))]
    async fn directions(
        &self,
        origin: Coordinates,
        destination: Coordinates,
        mode: TravelMode,
        alternatives: bool,
    ) -> Result<Option<Vec<RouteCandidate>>, Error> {
        let url = self.route_url(origin, destination, mode);

        let res = self
            .client
            .get(url)
            .query(&[
                ("alternatives", if alternatives { "true" } else { "false" }),
                ("geometries", "geojson"),
                ("overview", "full"),
            ])
            .send()
            .await?;

        // OSRM reports NoRoute with a 400, so the body decides.
        let status_code = res.status().as_u16();
        if status_code >= 500 {
            return Err(upstream_error());
        }

        let data: RouteResponse = res.json().await?;

        parse_routes(data)
    }
}

#[test]
fn default_route_url_targets_foot_server() {
    let client = OsrmDirectionsClient::new(None);
    let url = client.route_url(
        Coordinates::new(51.5237, -0.1585),
        Coordinates::new(51.5034, -0.1276),
        TravelMode::Walking,
    );

    assert_eq!(
        url,
        "https://routing.openstreetmap.de/routed-foot/route/v1/foot/-0.1585,51.5237;-0.1276,51.5034"
    );
    assert_eq!(
        default_base_url(TravelMode::Cycling),
        "https://routing.openstreetmap.de/routed-bike"
    );
}

#[test]
fn route_url_uses_lng_lat_order() {
    let client = OsrmDirectionsClient::new(Some("http://localhost:5000".into()));
    let url = client.route_url(
        Coordinates::new(51.5237, -0.1585),
        Coordinates::new(51.5034, -0.1276),
        TravelMode::Walking,
    );

    assert_eq!(
        url,
        "http://localhost:5000/route/v1/foot/-0.1585,51.5237;-0.1276,51.5034"
    );
}

#[test]
fn parse_alternatives() {
    let data: RouteResponse = serde_json::from_str(
        r#"{
            "code": "Ok",
            "routes": [
                {
                    "distance": 3120.4,
                    "duration": 2246.0,
                    "geometry": { "type": "LineString", "coordinates": [[-0.1585, 51.5237], [-0.1276, 51.5034]] }
                },
                {
                    "distance": 2980.1,
                    "duration": 2301.5,
                    "geometry": { "type": "LineString", "coordinates": [[-0.1585, 51.5237], [-0.14, 51.51], [-0.1276, 51.5034]] }
                }
            ],
            "waypoints": []
        }"#,
    )
    .unwrap();

    let routes = parse_routes(data).unwrap().unwrap();
    assert_eq!(routes.len(), 2);
    assert_eq!(routes[1].geometry.0.len(), 3);

    let shortest = RouteCandidate::shortest(routes).unwrap();
    assert_eq!(shortest.distance, 2980.1);
}

#[test]
fn parse_no_route() {
    let data: RouteResponse =
        serde_json::from_str(r#"{ "code": "NoRoute", "message": "Impossible route between points" }"#)
            .unwrap();

    assert!(parse_routes(data).unwrap().is_none());
}

#[test]
fn parse_invalid_query() {
    let data: RouteResponse =
        serde_json::from_str(r#"{ "code": "InvalidQuery", "message": "Query string malformed" }"#)
            .unwrap();

    assert!(parse_routes(data).is_err());
}
