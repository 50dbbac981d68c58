mod address;
mod reset;
mod route;
#[cfg(test)]
mod tests;

use async_channel::{unbounded, Receiver, Sender};
use std::collections::BTreeMap;

use crate::{
    api::{DynDirectionsAPI, DynGeocodingAPI, MapSurface},
    config::Config,
    entities::{Coordinates, RouteCandidate, RouteSegment, WaypointSequence},
    error::{unexpected_error, Error},
};

/// Everything the controller reacts to: user commands and service completions.
#[derive(Debug)]
pub enum Message {
    AddAddress(String),
    ComputeRoute,
    Reset,
    Geocoded {
        /// Issue order of the `AddAddress` this answers.
        ticket: u64,
        generation: u64,
        address: String,
        result: Result<Vec<Coordinates>, Error>,
    },
    Directions {
        generation: u64,
        index: usize,
        result: Result<Option<Vec<RouteCandidate>>, Error>,
    },
    Quit,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScreenState {
    Empty,
    Partial,
    Ready,
}

impl ScreenState {
    pub fn from_len(len: usize, threshold: usize) -> Self {
        if len == 0 {
            Self::Empty
        } else if len <= threshold {
            Self::Partial
        } else {
            Self::Ready
        }
    }

    pub fn name(&self) -> String {
        match self {
            Self::Empty => "empty".into(),
            Self::Partial => "partial".into(),
            Self::Ready => "ready".into(),
        }
    }
}

/// A geocoding result waiting for the results of earlier addresses.
#[derive(Debug)]
struct PendingGeocode {
    generation: u64,
    address: String,
    result: Result<Vec<Coordinates>, Error>,
}

/// Sole owner of the placed waypoints and drawn segments.
///
/// Service calls run on spawned tasks and report back through the controller's
/// channel; only [`Controller::handle`] mutates state.
pub struct Controller<S> {
    config: Config,
    geocoder: DynGeocodingAPI,
    directions: DynDirectionsAPI,
    surface: S,
    waypoints: WaypointSequence,
    segments: Vec<RouteSegment>,
    controls_visible: bool,
    generation: u64,
    in_flight: usize,
    next_ticket: u64,
    next_to_apply: u64,
    geocoded: BTreeMap<u64, PendingGeocode>,
    sender: Sender<Message>,
    receiver: Receiver<Message>,
}

impl<S: MapSurface> Controller<S> {
    pub fn new(
        config: Config,
        geocoder: DynGeocodingAPI,
        directions: DynDirectionsAPI,
        mut surface: S,
    ) -> Self {
        let (sender, receiver) = unbounded();

        surface.set_route_controls_visible(false);

        Self {
            config,
            geocoder,
            directions,
            surface,
            waypoints: WaypointSequence::new(),
            segments: vec![],
            controls_visible: false,
            generation: 0,
            in_flight: 0,
            next_ticket: 0,
            next_to_apply: 0,
            geocoded: BTreeMap::new(),
            sender,
            receiver,
        }
    }

    pub fn sender(&self) -> Sender<Message> {
        self.sender.clone()
    }

    pub fn waypoints(&self) -> &WaypointSequence {
        &self.waypoints
    }

    pub fn segments(&self) -> &[RouteSegment] {
        &self.segments
    }

    pub fn state(&self) -> ScreenState {
        ScreenState::from_len(self.waypoints.len(), self.config.route_threshold)
    }

    pub fn controls_visible(&self) -> bool {
        self.controls_visible
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Applies one message. Returns `false` once the session should end.
    pub fn handle(&mut self, message: Message) -> bool {
        match message {
            Message::AddAddress(address) => {
                if let Err(err) = self.add_address(address) {
                    tracing::debug!("address ignored: {}", err);
                }
            }
            Message::ComputeRoute => {
                if let Err(err) = self.compute_route() {
                    tracing::debug!("route not computed: {}", err);
                }
            }
            Message::Reset => self.reset(),
            Message::Geocoded {
                ticket,
                generation,
                address,
                result,
            } => {
                self.in_flight = self.in_flight.saturating_sub(1);
                self.geocoded.insert(
                    ticket,
                    PendingGeocode {
                        generation,
                        address,
                        result,
                    },
                );
                self.apply_geocoded_in_order();
            }
            Message::Directions {
                generation,
                index,
                result,
            } => {
                self.in_flight = self.in_flight.saturating_sub(1);
                if self.accepts(generation) {
                    self.on_directions(index, result);
                }
            }
            Message::Quit => return false,
        }

        true
    }

    /// Processes messages until `Quit` arrives.
    #[tracing::instrument(name = "Controller::run", skip(self))]
    pub async fn run(&mut self) -> Result<(), Error> {
        loop {
            let message = self.receiver.recv().await.map_err(|_| unexpected_error())?;

            if !self.handle(message) {
                tracing::info!("session finished with {} waypoints", self.waypoints.len());
                return Ok(());
            }
        }
    }

    /// Waits for every outstanding service request to report back.
    pub async fn settle(&mut self) -> Result<(), Error> {
        while self.in_flight > 0 {
            let message = self.receiver.recv().await.map_err(|_| unexpected_error())?;
            self.handle(message);
        }

        Ok(())
    }

    fn accepts(&self, generation: u64) -> bool {
        if generation == self.generation || !self.config.discard_stale {
            return true;
        }

        tracing::debug!(
            "dropping completion from generation {} (current {})",
            generation,
            self.generation
        );
        false
    }

    fn fit_to_waypoints(&mut self) {
        let points = self.waypoints.coordinates();
        self.surface.fit_view(&points);
    }

    fn set_controls_visible(&mut self, visible: bool) {
        if self.controls_visible != visible {
            self.controls_visible = visible;
            self.surface.set_route_controls_visible(visible);
        }
    }

    fn show_error(&mut self, err: &Error) {
        self.surface
            .show_error(crate::error::ERROR_TITLE, &err.message);
    }
}
