use geo_types::Point;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

impl From<Coordinates> for Point<f64> {
    fn from(coordinates: Coordinates) -> Self {
        Point::new(coordinates.longitude, coordinates.latitude)
    }
}

impl From<Point<f64>> for Coordinates {
    fn from(point: Point<f64>) -> Self {
        Coordinates::new(point.y(), point.x())
    }
}

// "lng,lat" as used in routing service paths
impl From<Coordinates> for String {
    fn from(coordinates: Coordinates) -> Self {
        format!("{},{}", coordinates.longitude, coordinates.latitude)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TravelMode {
    #[default]
    Walking,
    Driving,
    Cycling,
}

impl TravelMode {
    pub fn name(&self) -> String {
        match self {
            Self::Walking => "walking".into(),
            Self::Driving => "driving".into(),
            Self::Cycling => "cycling".into(),
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "walking" | "foot" => Some(Self::Walking),
            "driving" | "car" => Some(Self::Driving),
            "cycling" | "bike" => Some(Self::Cycling),
            _ => None,
        }
    }
}

#[test]
fn point_conversion_swaps_axes() {
    let coordinates = Coordinates::new(51.5237, -0.1585);
    let point: Point<f64> = coordinates.into();

    assert_eq!(point.x(), -0.1585);
    assert_eq!(point.y(), 51.5237);
    assert_eq!(Coordinates::from(point), coordinates);

    let path: String = coordinates.into();
    assert_eq!(path, "-0.1585,51.5237");
}

#[test]
fn travel_mode_parse() {
    assert_eq!(TravelMode::parse("Walking"), Some(TravelMode::Walking));
    assert_eq!(TravelMode::parse("bike"), Some(TravelMode::Cycling));
    assert_eq!(TravelMode::parse("teleport"), None);
    assert_eq!(TravelMode::default().name(), "walking");
}
