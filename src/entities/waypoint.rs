use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::Coordinates;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Waypoint {
    pub id: Uuid,
    pub coordinates: Coordinates,
    pub label: String,
    pub placed_at: DateTime<Utc>,
}

impl Waypoint {
    pub fn new(coordinates: Coordinates, label: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            coordinates,
            label,
            placed_at: Utc::now(),
        }
    }
}

/// Placed waypoints in visiting order.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct WaypointSequence {
    waypoints: Vec<Waypoint>,
}

impl WaypointSequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, waypoint: Waypoint) {
        self.waypoints.push(waypoint);
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    pub fn clear(&mut self) {
        self.waypoints.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &Waypoint> {
        self.waypoints.iter()
    }

    /// Consecutive `(i, i + 1)` pairs, yielded with the index of the first.
    pub fn pairs(&self) -> impl Iterator<Item = (usize, &Waypoint, &Waypoint)> {
        self.waypoints
            .windows(2)
            .enumerate()
            .map(|(index, pair)| (index, &pair[0], &pair[1]))
    }

    pub fn coordinates(&self) -> Vec<Coordinates> {
        self.waypoints.iter().map(|w| w.coordinates).collect()
    }

    pub fn labels(&self) -> Vec<&str> {
        self.waypoints.iter().map(|w| w.label.as_str()).collect()
    }
}

#[test]
fn pairs_follow_insertion_order() {
    let mut sequence = WaypointSequence::new();
    assert_eq!(sequence.pairs().count(), 0);

    sequence.push(Waypoint::new(Coordinates::new(0.0, 0.0), "a".into()));
    assert_eq!(sequence.pairs().count(), 0);

    sequence.push(Waypoint::new(Coordinates::new(1.0, 0.0), "b".into()));
    sequence.push(Waypoint::new(Coordinates::new(2.0, 0.0), "c".into()));

    let pairs: Vec<(usize, &str, &str)> = sequence
        .pairs()
        .map(|(i, from, to)| (i, from.label.as_str(), to.label.as_str()))
        .collect();

    assert_eq!(pairs, vec![(0, "a", "b"), (1, "b", "c")]);
    assert_eq!(sequence.labels(), vec!["a", "b", "c"]);

    sequence.clear();
    assert!(sequence.is_empty());
}
