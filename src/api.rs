use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::entities::{Coordinates, Overlay, RouteCandidate, TravelMode, Waypoint};
use crate::error::Error;

#[async_trait]
pub trait GeocodingAPI {
    /// Candidate locations for a free-text address, best match first.
    /// An empty list means the address was understood but nothing matched.
    async fn geocode(&self, address: &str) -> Result<Vec<Coordinates>, Error>;
}

#[async_trait]
pub trait DirectionsAPI {
    /// `Ok(None)` means the service answered without a usable response.
    async fn directions(
        &self,
        origin: Coordinates,
        destination: Coordinates,
        mode: TravelMode,
        alternatives: bool,
    ) -> Result<Option<Vec<RouteCandidate>>, Error>;
}

/// The map view the controller draws on.
pub trait MapSurface {
    fn add_marker(&mut self, waypoint: &Waypoint);
    fn remove_all_markers(&mut self);

    fn add_overlay(&mut self, overlay: Overlay) -> Uuid;
    fn overlays(&self) -> Vec<Overlay>;
    fn remove_overlay(&mut self, id: Uuid);

    fn fit_view(&mut self, points: &[Coordinates]);
    fn set_route_controls_visible(&mut self, visible: bool);

    fn show_error(&mut self, title: &str, message: &str);
}

pub type DynGeocodingAPI = Arc<dyn GeocodingAPI + Send + Sync>;
pub type DynDirectionsAPI = Arc<dyn DirectionsAPI + Send + Sync>;
