use geo_types::LineString;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::Coordinates;

/// One alternative returned by the directions service for a pair of waypoints.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RouteCandidate {
    /// meters
    pub distance: f64,
    /// seconds
    pub duration: f64,
    pub geometry: LineString<f64>,
}

impl RouteCandidate {
    /// Shortest candidate by distance; ties keep the earliest.
    pub fn shortest(candidates: Vec<RouteCandidate>) -> Option<RouteCandidate> {
        candidates.into_iter().fold(None, |min, candidate| match min {
            Some(min) if min.distance <= candidate.distance => Some(min),
            _ => Some(candidate),
        })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RouteSegment {
    pub id: Uuid,
    /// Index of the first waypoint of the pair this segment joins.
    pub index: usize,
    pub route: RouteCandidate,
}

impl RouteSegment {
    pub fn new(index: usize, route: RouteCandidate) -> Self {
        Self {
            id: Uuid::new_v4(),
            index,
            route,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Overlay {
    UserLocation { id: Uuid, coordinates: Coordinates },
    Route(RouteSegment),
}

impl Overlay {
    pub fn user_location(coordinates: Coordinates) -> Self {
        Self::UserLocation {
            id: Uuid::new_v4(),
            coordinates,
        }
    }

    pub fn id(&self) -> Uuid {
        match self {
            Self::UserLocation { id, .. } => *id,
            Self::Route(segment) => segment.id,
        }
    }

    pub fn is_user_location(&self) -> bool {
        match self {
            Self::UserLocation { .. } => true,
            _ => false,
        }
    }
}

#[cfg(test)]
fn candidate(distance: f64) -> RouteCandidate {
    RouteCandidate {
        distance,
        duration: distance / 1.4,
        geometry: LineString::from(vec![(0.0, 0.0), (distance, 0.0)]),
    }
}

#[test]
fn shortest_picks_minimum_distance() {
    let chosen = RouteCandidate::shortest(vec![candidate(900.0), candidate(450.0), candidate(610.0)])
        .unwrap();
    assert_eq!(chosen.distance, 450.0);
}

#[test]
fn shortest_keeps_first_on_tie() {
    let mut first = candidate(300.0);
    first.duration = 1.0;
    let mut second = candidate(300.0);
    second.duration = 2.0;

    let chosen = RouteCandidate::shortest(vec![first, second]).unwrap();
    assert_eq!(chosen.duration, 1.0);
}

#[test]
fn shortest_of_nothing() {
    assert!(RouteCandidate::shortest(vec![]).is_none());
}

#[test]
fn overlay_kinds() {
    let location = Overlay::user_location(Coordinates::new(0.0, 0.0));
    let segment = RouteSegment::new(0, candidate(10.0));
    let route = Overlay::Route(segment.clone());

    assert!(location.is_user_location());
    if let Overlay::UserLocation { id, .. } = &location {
        assert_eq!(location.id(), *id);
    }
    assert!(!route.is_user_location());
    assert_eq!(route.id(), segment.id);
}
