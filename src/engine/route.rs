use tokio::runtime::Handle;

use super::{Controller, Message};

use crate::{
    api::MapSurface,
    entities::{Overlay, RouteCandidate, RouteSegment},
    error::{
        directions_failed_error, directions_unavailable_error, insufficient_waypoints_error,
        no_runtime_error, Error,
    },
};

impl<S: MapSurface> Controller<S> {
    /// Requests directions for every consecutive pair of waypoints and fits the
    /// view right away; segments are drawn as their results arrive.
    ///
    /// Returns the number of requests issued. Must be called from within a
    /// tokio runtime; otherwise nothing is requested and `no_runtime_error` is
    /// returned.
    #[tracing::instrument(skip(self))]
    pub fn compute_route(&mut self) -> Result<usize, Error> {
        if self.waypoints.len() < 2 {
            let err = insufficient_waypoints_error();
            self.show_error(&err);
            return Err(err);
        }

        let runtime = Handle::try_current().map_err(|_| no_runtime_error())?;

        let mode = self.config.travel_mode;
        let generation = self.generation;
        let mut issued = 0;

        for (index, from, to) in self.waypoints.pairs() {
            let directions = self.directions.clone();
            let sender = self.sender.clone();
            let origin = from.coordinates;
            let destination = to.coordinates;

            runtime.spawn(async move {
                let result = directions
                    .directions(origin, destination, mode, true)
                    .await
                    .map_err(directions_failed_error);

                let message = Message::Directions {
                    generation,
                    index,
                    result,
                };

                if sender.send(message).await.is_err() {
                    tracing::debug!("controller gone, directions result dropped");
                }
            });

            issued += 1;
        }

        self.in_flight += issued;

        tracing::info!("requested {} {} segments", issued, mode.name());

        self.fit_to_waypoints();

        Ok(issued)
    }

    #[tracing::instrument(skip(self, result))]
    pub(super) fn on_directions(
        &mut self,
        index: usize,
        result: Result<Option<Vec<RouteCandidate>>, Error>,
    ) {
        let candidates = match result {
            Ok(Some(candidates)) => candidates,
            Ok(None) => {
                self.show_error(&directions_unavailable_error());
                return;
            }
            Err(err) => {
                tracing::warn!("segment {} skipped: {}", index, err);
                return;
            }
        };

        let route = match RouteCandidate::shortest(candidates) {
            Some(route) => route,
            None => {
                self.show_error(&directions_unavailable_error());
                return;
            }
        };

        tracing::info!("segment {} drawn, {:.0} m", index, route.distance);

        let segment = RouteSegment::new(index, route);
        self.surface.add_overlay(Overlay::Route(segment.clone()));
        self.segments.push(segment);
    }
}
