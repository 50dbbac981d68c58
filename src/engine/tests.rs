use async_trait::async_trait;
use geo_types::LineString;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_test::block_on;

use super::{Controller, Message, ScreenState};
use crate::{
    api::{DirectionsAPI, GeocodingAPI, MapSurface},
    config::Config,
    console::ConsoleSurface,
    entities::{Coordinates, Overlay, RouteCandidate, TravelMode},
    error::{upstream_error, Error},
};

#[derive(Default)]
struct MockGeocoder {
    places: HashMap<String, Result<Vec<Coordinates>, Error>>,
    delays: HashMap<String, Duration>,
    calls: AtomicUsize,
}

impl MockGeocoder {
    fn with(mut self, address: &str, result: Result<Vec<Coordinates>, Error>) -> Self {
        self.places.insert(address.into(), result);
        self
    }

    fn slow(mut self, address: &str, delay: Duration) -> Self {
        self.delays.insert(address.into(), delay);
        self
    }
}

#[async_trait]
impl GeocodingAPI for MockGeocoder {
    async fn geocode(&self, address: &str) -> Result<Vec<Coordinates>, Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delays.get(address) {
            tokio::time::sleep(*delay).await;
        }
        self.places.get(address).cloned().unwrap_or_else(|| Ok(vec![]))
    }
}

type DirectionsResult = Result<Option<Vec<RouteCandidate>>, Error>;

/// Answers by the latitude of the origin, which the fixtures keep unique.
#[derive(Default)]
struct MockDirections {
    answers: Vec<(f64, DirectionsResult)>,
    requests: Mutex<Vec<(Coordinates, Coordinates, TravelMode, bool)>>,
}

impl MockDirections {
    fn with(mut self, origin: Coordinates, result: DirectionsResult) -> Self {
        self.answers.push((origin.latitude, result));
        self
    }
}

#[async_trait]
impl DirectionsAPI for MockDirections {
    async fn directions(
        &self,
        origin: Coordinates,
        destination: Coordinates,
        mode: TravelMode,
        alternatives: bool,
    ) -> DirectionsResult {
        self.requests
            .lock()
            .unwrap()
            .push((origin, destination, mode, alternatives));

        self.answers
            .iter()
            .find(|(latitude, _)| *latitude == origin.latitude)
            .map(|(_, result)| result.clone())
            .unwrap_or_else(|| Ok(Some(vec![candidate(origin, destination, 1000.0)])))
    }
}

fn candidate(from: Coordinates, to: Coordinates, distance: f64) -> RouteCandidate {
    RouteCandidate {
        distance,
        duration: distance / 1.4,
        geometry: LineString::from(vec![
            (from.longitude, from.latitude),
            (to.longitude, to.latitude),
        ]),
    }
}

const BAKER_STREET: Coordinates = Coordinates {
    latitude: 51.5237,
    longitude: -0.1585,
};
const DOWNING_STREET: Coordinates = Coordinates {
    latitude: 51.5034,
    longitude: -0.1276,
};
const BIG_BEN: Coordinates = Coordinates {
    latitude: 51.5007,
    longitude: -0.1246,
};
const TOWER_BRIDGE: Coordinates = Coordinates {
    latitude: 51.5055,
    longitude: -0.0754,
};
const ST_PAULS: Coordinates = Coordinates {
    latitude: 51.5138,
    longitude: -0.0984,
};

fn london() -> MockGeocoder {
    MockGeocoder::default()
        .with("221B Baker Street", Ok(vec![BAKER_STREET]))
        .with("10 Downing Street", Ok(vec![DOWNING_STREET]))
        .with("Big Ben", Ok(vec![BIG_BEN, DOWNING_STREET]))
        .with("Tower Bridge", Ok(vec![TOWER_BRIDGE]))
        .with("St Paul's Cathedral", Ok(vec![ST_PAULS]))
}

fn controller(
    config: Config,
    geocoder: Arc<MockGeocoder>,
    directions: Arc<MockDirections>,
) -> Controller<ConsoleSurface> {
    Controller::new(config, geocoder, directions, ConsoleSurface::quiet())
}

async fn add(controller: &mut Controller<ConsoleSurface>, address: &str) {
    controller.add_address(address.into()).unwrap();
    controller.settle().await.unwrap();
}

#[test]
fn successful_adds_keep_call_order() {
    block_on(async {
        let mut controller = controller(
            Config::default(),
            Arc::new(london()),
            Arc::new(MockDirections::default()),
        );

        add(&mut controller, "221B Baker Street").await;
        assert_eq!(controller.waypoints().labels(), vec!["221B Baker Street"]);
        assert_eq!(controller.state(), ScreenState::Partial);

        add(&mut controller, "10 Downing Street").await;
        assert_eq!(
            controller.waypoints().labels(),
            vec!["221B Baker Street", "10 Downing Street"]
        );
        assert!(!controller.controls_visible());
        assert!(!controller.surface().controls_visible());

        add(&mut controller, "Big Ben").await;
        assert_eq!(controller.waypoints().len(), 3);
        assert_eq!(controller.state(), ScreenState::Ready);
        assert!(controller.controls_visible());
        assert!(controller.surface().controls_visible());

        // first candidate wins
        let placed = controller.waypoints().iter().last().unwrap();
        assert_eq!(placed.coordinates, BIG_BEN);

        assert_eq!(controller.surface().markers().len(), 3);
        assert_eq!(
            controller.surface().view(),
            &[BAKER_STREET, DOWNING_STREET, BIG_BEN][..]
        );

        add(&mut controller, "Tower Bridge").await;
        assert!(controller.controls_visible());
    });
}

#[test]
fn threshold_is_configurable() {
    block_on(async {
        let config = Config {
            route_threshold: 1,
            ..Config::default()
        };
        let mut controller = controller(
            config,
            Arc::new(london()),
            Arc::new(MockDirections::default()),
        );

        add(&mut controller, "221B Baker Street").await;
        assert!(!controller.controls_visible());

        add(&mut controller, "10 Downing Street").await;
        assert!(controller.controls_visible());
    });
}

#[test]
fn empty_geocoding_result_leaves_sequence_unchanged() {
    block_on(async {
        let geocoder = Arc::new(london().with("Atlantis", Ok(vec![])));
        let mut controller = controller(
            Config::default(),
            geocoder.clone(),
            Arc::new(MockDirections::default()),
        );

        add(&mut controller, "221B Baker Street").await;
        add(&mut controller, "Atlantis").await;

        assert_eq!(controller.waypoints().len(), 1);
        assert_eq!(
            controller.surface().errors(),
            &[("Error".to_string(), "Server is not available".to_string())][..]
        );
        assert_eq!(geocoder.calls.load(Ordering::SeqCst), 2);

        // session continues
        add(&mut controller, "10 Downing Street").await;
        assert_eq!(controller.waypoints().len(), 2);
    });
}

#[test]
fn geocoding_error_is_surfaced() {
    block_on(async {
        let geocoder = Arc::new(london().with("Nowhere", Err(upstream_error())));
        let mut controller = controller(
            Config::default(),
            geocoder,
            Arc::new(MockDirections::default()),
        );

        add(&mut controller, "Nowhere").await;

        assert!(controller.waypoints().is_empty());
        assert_eq!(controller.state(), ScreenState::Empty);
        assert_eq!(controller.surface().errors().len(), 1);
        assert_eq!(controller.surface().errors()[0].1, "Server is not available");
    });
}

#[test]
fn empty_address_is_not_geocoded() {
    block_on(async {
        let geocoder = Arc::new(london());
        let mut controller = controller(
            Config::default(),
            geocoder.clone(),
            Arc::new(MockDirections::default()),
        );

        assert!(controller.add_address("   ".into()).is_err());
        assert_eq!(controller.in_flight(), 0);
        controller.settle().await.unwrap();

        assert_eq!(geocoder.calls.load(Ordering::SeqCst), 0);
        assert!(controller.surface().errors().is_empty());
    });
}

#[test]
fn route_requests_walking_alternatives_per_pair() {
    block_on(async {
        let directions = Arc::new(MockDirections::default());
        let mut controller = controller(Config::default(), Arc::new(london()), directions.clone());

        for address in ["221B Baker Street", "10 Downing Street", "Big Ben", "Tower Bridge"] {
            add(&mut controller, address).await;
        }

        assert_eq!(controller.compute_route().unwrap(), 3);
        controller.settle().await.unwrap();

        let requests = directions.requests.lock().unwrap().clone();
        assert_eq!(requests.len(), 3);
        assert!(requests
            .iter()
            .all(|(_, _, mode, alternatives)| *mode == TravelMode::Walking && *alternatives));

        let mut pairs: Vec<(f64, f64)> = requests
            .iter()
            .map(|(from, to, _, _)| (from.latitude, to.latitude))
            .collect();
        pairs.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap());
        assert_eq!(
            pairs,
            vec![
                (BAKER_STREET.latitude, DOWNING_STREET.latitude),
                (DOWNING_STREET.latitude, BIG_BEN.latitude),
                (BIG_BEN.latitude, TOWER_BRIDGE.latitude),
            ]
        );

        let mut indexes: Vec<usize> = controller.segments().iter().map(|s| s.index).collect();
        indexes.sort();
        assert_eq!(indexes, vec![0, 1, 2]);
        assert_eq!(controller.surface().route_segments().len(), 3);
    });
}

#[test]
fn each_segment_is_the_shortest_alternative() {
    block_on(async {
        let directions = Arc::new(
            MockDirections::default()
                .with(
                    BAKER_STREET,
                    Ok(Some(vec![
                        candidate(BAKER_STREET, DOWNING_STREET, 3400.0),
                        candidate(BAKER_STREET, DOWNING_STREET, 3120.0),
                        candidate(BAKER_STREET, DOWNING_STREET, 3900.0),
                    ])),
                )
                .with(
                    DOWNING_STREET,
                    Ok(Some(vec![
                        candidate(DOWNING_STREET, BIG_BEN, 450.0),
                        candidate(DOWNING_STREET, BIG_BEN, 610.0),
                    ])),
                ),
        );
        let mut controller = controller(Config::default(), Arc::new(london()), directions);

        for address in ["221B Baker Street", "10 Downing Street", "Big Ben"] {
            add(&mut controller, address).await;
        }

        controller.compute_route().unwrap();
        controller.settle().await.unwrap();

        let mut distances: Vec<(usize, f64)> = controller
            .segments()
            .iter()
            .map(|s| (s.index, s.route.distance))
            .collect();
        distances.sort_by_key(|(index, _)| *index);

        assert_eq!(distances, vec![(0, 3120.0), (1, 450.0)]);
        assert!(controller.surface().errors().is_empty());
    });
}

#[test]
fn missing_directions_response_skips_only_that_segment() {
    block_on(async {
        let directions = Arc::new(MockDirections::default().with(DOWNING_STREET, Ok(None)));
        let mut controller = controller(Config::default(), Arc::new(london()), directions);

        for address in ["221B Baker Street", "10 Downing Street", "Big Ben", "Tower Bridge"] {
            add(&mut controller, address).await;
        }

        controller.compute_route().unwrap();
        controller.settle().await.unwrap();

        let mut indexes: Vec<usize> = controller.segments().iter().map(|s| s.index).collect();
        indexes.sort();
        assert_eq!(indexes, vec![0, 2]);
        assert_eq!(
            controller.surface().errors(),
            &[("Error".to_string(), "Route is not available".to_string())][..]
        );
    });
}

#[test]
fn empty_alternatives_count_as_unavailable() {
    block_on(async {
        let directions = Arc::new(MockDirections::default().with(BAKER_STREET, Ok(Some(vec![]))));
        let mut controller = controller(Config::default(), Arc::new(london()), directions);

        add(&mut controller, "221B Baker Street").await;
        add(&mut controller, "10 Downing Street").await;

        controller.compute_route().unwrap();
        controller.settle().await.unwrap();

        assert!(controller.segments().is_empty());
        assert_eq!(controller.surface().errors()[0].1, "Route is not available");
    });
}

#[test]
fn directions_error_is_logged_not_shown() {
    block_on(async {
        let directions =
            Arc::new(MockDirections::default().with(BAKER_STREET, Err(upstream_error())));
        let mut controller = controller(Config::default(), Arc::new(london()), directions);

        for address in ["221B Baker Street", "10 Downing Street", "Big Ben"] {
            add(&mut controller, address).await;
        }

        controller.compute_route().unwrap();
        controller.settle().await.unwrap();

        assert_eq!(controller.segments().len(), 1);
        assert_eq!(controller.segments()[0].index, 1);
        assert!(controller.surface().errors().is_empty());
    });
}

#[test]
fn route_needs_two_waypoints() {
    block_on(async {
        let directions = Arc::new(MockDirections::default());
        let mut controller = controller(Config::default(), Arc::new(london()), directions.clone());

        let err = controller.compute_route().unwrap_err();
        assert_eq!(err.code, 113);

        add(&mut controller, "221B Baker Street").await;
        assert!(controller.compute_route().is_err());

        assert_eq!(controller.in_flight(), 0);
        assert!(directions.requests.lock().unwrap().is_empty());
        assert_eq!(controller.surface().errors().len(), 2);
        assert_eq!(
            controller.surface().errors()[0].1,
            "Not enough addresses to build a route"
        );
    });
}

#[test]
fn route_fits_view_before_segments_arrive() {
    block_on(async {
        let mut controller = controller(
            Config::default(),
            Arc::new(london()),
            Arc::new(MockDirections::default()),
        );

        add(&mut controller, "221B Baker Street").await;
        add(&mut controller, "10 Downing Street").await;
        controller.surface_mut().fit_view(&[]);

        controller.compute_route().unwrap();

        assert_eq!(controller.in_flight(), 1);
        assert!(controller.segments().is_empty());
        assert_eq!(controller.surface().view(), &[BAKER_STREET, DOWNING_STREET][..]);

        controller.settle().await.unwrap();
        assert_eq!(controller.segments().len(), 1);
    });
}

#[test]
fn reset_clears_everything_but_user_location() {
    block_on(async {
        let mut controller = controller(
            Config::default(),
            Arc::new(london()),
            Arc::new(MockDirections::default()),
        );
        controller
            .surface_mut()
            .add_overlay(Overlay::user_location(BAKER_STREET));

        for address in [
            "221B Baker Street",
            "10 Downing Street",
            "Big Ben",
            "Tower Bridge",
            "St Paul's Cathedral",
        ] {
            add(&mut controller, address).await;
        }

        controller.compute_route().unwrap();
        controller.settle().await.unwrap();

        assert_eq!(controller.waypoints().len(), 5);
        assert_eq!(controller.surface().route_segments().len(), 4);

        controller.reset();

        assert!(controller.waypoints().is_empty());
        assert!(controller.segments().is_empty());
        assert_eq!(controller.state(), ScreenState::Empty);
        assert!(!controller.controls_visible());
        assert!(!controller.surface().controls_visible());
        assert!(controller.surface().markers().is_empty());
        assert!(controller.surface().route_segments().is_empty());

        let overlays = controller.surface().overlays();
        assert_eq!(overlays.len(), 1);
        assert!(overlays[0].is_user_location());
    });
}

#[test]
fn reset_from_any_state() {
    block_on(async {
        let mut controller = controller(
            Config::default(),
            Arc::new(london()),
            Arc::new(MockDirections::default()),
        );

        controller.reset();
        assert_eq!(controller.state(), ScreenState::Empty);

        add(&mut controller, "221B Baker Street").await;
        controller.reset();
        assert_eq!(controller.state(), ScreenState::Empty);
        assert!(!controller.controls_visible());

        add(&mut controller, "221B Baker Street").await;
        assert_eq!(controller.waypoints().len(), 1);
        assert_eq!(controller.generation(), 2);
    });
}

#[test]
fn stale_geocode_applies_by_default() {
    block_on(async {
        let mut controller = controller(
            Config::default(),
            Arc::new(london()),
            Arc::new(MockDirections::default()),
        );

        controller.add_address("221B Baker Street".into()).unwrap();
        controller.reset();
        controller.settle().await.unwrap();

        assert_eq!(controller.waypoints().labels(), vec!["221B Baker Street"]);
    });
}

#[test]
fn stale_results_dropped_when_configured() {
    block_on(async {
        let config = Config {
            discard_stale: true,
            ..Config::default()
        };
        let mut controller = controller(
            config,
            Arc::new(london()),
            Arc::new(MockDirections::default()),
        );

        add(&mut controller, "221B Baker Street").await;
        add(&mut controller, "10 Downing Street").await;
        controller.compute_route().unwrap();
        controller.add_address("Big Ben".into()).unwrap();
        controller.reset();
        controller.settle().await.unwrap();

        assert_eq!(controller.in_flight(), 0);
        assert!(controller.waypoints().is_empty());
        assert!(controller.segments().is_empty());
        assert!(controller.surface().route_segments().is_empty());
    });
}

#[test]
fn run_processes_commands_until_quit() {
    block_on(async {
        let mut controller = controller(
            Config::default(),
            Arc::new(london()),
            Arc::new(MockDirections::default()),
        );
        let sender = controller.sender();

        for message in [
            Message::AddAddress("221B Baker Street".into()),
            Message::AddAddress("".into()),
            Message::AddAddress("10 Downing Street".into()),
            Message::AddAddress("Big Ben".into()),
        ] {
            sender.send(message).await.unwrap();
        }
        sender.send(Message::Quit).await.unwrap();

        controller.run().await.unwrap();
        controller.settle().await.unwrap();

        assert_eq!(controller.waypoints().len(), 3);
        assert!(controller.controls_visible());

        sender.send(Message::ComputeRoute).await.unwrap();
        sender.send(Message::Quit).await.unwrap();
        controller.run().await.unwrap();
        controller.settle().await.unwrap();

        assert_eq!(controller.segments().len(), 2);

        sender.send(Message::Reset).await.unwrap();
        sender.send(Message::Quit).await.unwrap();
        controller.run().await.unwrap();

        assert!(controller.waypoints().is_empty());
    });
}

#[test]
fn slow_geocode_keeps_call_order() {
    block_on(async {
        let geocoder = Arc::new(london().slow("221B Baker Street", Duration::from_millis(50)));
        let mut controller = controller(
            Config::default(),
            geocoder,
            Arc::new(MockDirections::default()),
        );
        let sender = controller.sender();

        for address in ["221B Baker Street", "10 Downing Street", "Big Ben"] {
            sender
                .send(Message::AddAddress(address.into()))
                .await
                .unwrap();
        }
        sender.send(Message::Quit).await.unwrap();

        controller.run().await.unwrap();
        controller.settle().await.unwrap();

        assert_eq!(
            controller.waypoints().labels(),
            vec!["221B Baker Street", "10 Downing Street", "Big Ben"]
        );
        let markers: Vec<&str> = controller
            .surface()
            .markers()
            .iter()
            .map(|w| w.label.as_str())
            .collect();
        assert_eq!(markers, vec!["221B Baker Street", "10 Downing Street", "Big Ben"]);
        assert!(controller.controls_visible());
    });
}

#[test]
fn slow_failed_geocode_releases_later_addresses() {
    block_on(async {
        let geocoder = Arc::new(
            london()
                .with("Atlantis", Ok(vec![]))
                .slow("Atlantis", Duration::from_millis(30)),
        );
        let mut controller = controller(
            Config::default(),
            geocoder,
            Arc::new(MockDirections::default()),
        );

        controller.add_address("Atlantis".into()).unwrap();
        controller.add_address("221B Baker Street".into()).unwrap();
        controller.add_address("10 Downing Street".into()).unwrap();
        controller.settle().await.unwrap();

        assert_eq!(
            controller.waypoints().labels(),
            vec!["221B Baker Street", "10 Downing Street"]
        );
        assert_eq!(controller.surface().errors().len(), 1);

        add(&mut controller, "Big Ben").await;
        assert_eq!(controller.waypoints().len(), 3);
    });
}

#[test]
fn requests_outside_runtime_are_refused() {
    let directions = Arc::new(MockDirections::default());
    let mut controller = controller(Config::default(), Arc::new(london()), directions.clone());

    let err = controller.add_address("221B Baker Street".into()).unwrap_err();
    assert_eq!(err.code, 6);
    assert_eq!(controller.in_flight(), 0);

    block_on(async {
        add(&mut controller, "221B Baker Street").await;
        add(&mut controller, "10 Downing Street").await;
    });

    let err = controller.compute_route().unwrap_err();
    assert_eq!(err.code, 6);
    assert_eq!(controller.in_flight(), 0);
    assert!(directions.requests.lock().unwrap().is_empty());

    // the refused call took no ticket
    block_on(async {
        add(&mut controller, "Big Ben").await;
    });
    assert_eq!(
        controller.waypoints().labels(),
        vec!["221B Baker Street", "10 Downing Street", "Big Ben"]
    );
}
