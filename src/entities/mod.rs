mod location;
mod route;
mod waypoint;

pub use location::{Coordinates, TravelMode};
pub use route::{Overlay, RouteCandidate, RouteSegment};
pub use waypoint::{Waypoint, WaypointSequence};
