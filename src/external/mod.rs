pub mod google_maps;
pub mod osrm;

pub use google_maps::GoogleMapsClient;
pub use osrm::OsrmDirectionsClient;
