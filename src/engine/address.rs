use tokio::runtime::Handle;

use super::{Controller, Message};

use crate::{
    api::MapSurface,
    entities::{Coordinates, Waypoint},
    error::{geocoding_failed_error, invalid_input_error, no_runtime_error, Error},
};

impl<S: MapSurface> Controller<S> {
    /// Starts geocoding `address`. The waypoint is placed when the result
    /// arrives, after the waypoints of every earlier call.
    ///
    /// Must be called from within a tokio runtime; otherwise nothing is
    /// requested and `no_runtime_error` is returned.
    #[tracing::instrument(skip(self))]
    pub fn add_address(&mut self, address: String) -> Result<(), Error> {
        if address.trim().is_empty() {
            return Err(invalid_input_error());
        }

        let runtime = Handle::try_current().map_err(|_| no_runtime_error())?;

        let geocoder = self.geocoder.clone();
        let sender = self.sender.clone();
        let generation = self.generation;
        let ticket = self.next_ticket;

        self.next_ticket += 1;
        self.in_flight += 1;

        runtime.spawn(async move {
            let result = geocoder.geocode(&address).await;

            let message = Message::Geocoded {
                ticket,
                generation,
                address,
                result,
            };

            if sender.send(message).await.is_err() {
                tracing::debug!("controller gone, geocoding result dropped");
            }
        });

        Ok(())
    }

    /// Applies received results while the next one in issue order is present.
    pub(super) fn apply_geocoded_in_order(&mut self) {
        while let Some(pending) = self.geocoded.remove(&self.next_to_apply) {
            self.next_to_apply += 1;

            if self.accepts(pending.generation) {
                self.on_geocoded(pending.address, pending.result);
            }
        }

        if !self.geocoded.is_empty() {
            tracing::debug!(
                "{} geocoding results held for address {}",
                self.geocoded.len(),
                self.next_to_apply
            );
        }
    }

    #[tracing::instrument(skip(self, result))]
    fn on_geocoded(&mut self, address: String, result: Result<Vec<Coordinates>, Error>) {
        let candidates = match result {
            Ok(candidates) => candidates,
            Err(err) => {
                tracing::warn!("geocoding failed: {}", err);
                self.show_error(&geocoding_failed_error());
                return;
            }
        };

        let coordinates = match candidates.first() {
            Some(coordinates) => *coordinates,
            None => {
                tracing::warn!("no location found");
                self.show_error(&geocoding_failed_error());
                return;
            }
        };

        let waypoint = Waypoint::new(coordinates, address);
        self.surface.add_marker(&waypoint);
        self.waypoints.push(waypoint);

        tracing::info!(
            "placed waypoint {} at {}, {} ({})",
            self.waypoints.len(),
            coordinates.latitude,
            coordinates.longitude,
            self.state().name()
        );

        if self.waypoints.len() > self.config.route_threshold {
            self.set_controls_visible(true);
        }

        self.fit_to_waypoints();
    }
}
