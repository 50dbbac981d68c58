use super::Controller;

use crate::api::MapSurface;

impl<S: MapSurface> Controller<S> {
    /// Clears waypoints, markers and route overlays. User-location overlays stay.
    ///
    /// Requests already in flight are not cancelled; with `discard_stale` their
    /// results are ignored when they arrive.
    #[tracing::instrument(skip(self))]
    pub fn reset(&mut self) {
        for overlay in self.surface.overlays() {
            if !overlay.is_user_location() {
                self.surface.remove_overlay(overlay.id());
            }
        }

        self.surface.remove_all_markers();
        self.waypoints.clear();
        self.segments.clear();
        self.set_controls_visible(false);
        self.generation += 1;

        tracing::info!("reset, generation {}", self.generation);
    }
}
