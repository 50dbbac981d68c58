use uuid::Uuid;

use crate::{
    api::MapSurface,
    engine::Message,
    entities::{Coordinates, Overlay, RouteSegment, Waypoint},
    error::{invalid_input_error, Error},
};

pub const HELP: &str = "commands: add <address> | route | reset | quit";

/// A map surface that keeps what would be on screen and prints each change.
#[derive(Debug, Default)]
pub struct ConsoleSurface {
    echo: bool,
    markers: Vec<Waypoint>,
    overlays: Vec<Overlay>,
    view: Vec<Coordinates>,
    controls_visible: bool,
    errors: Vec<(String, String)>,
}

impl ConsoleSurface {
    pub fn new() -> Self {
        Self {
            echo: true,
            ..Self::default()
        }
    }

    /// Same bookkeeping, nothing printed.
    pub fn quiet() -> Self {
        Self::default()
    }

    pub fn markers(&self) -> &[Waypoint] {
        &self.markers
    }

    pub fn route_segments(&self) -> Vec<&RouteSegment> {
        self.overlays
            .iter()
            .filter_map(|overlay| match overlay {
                Overlay::Route(segment) => Some(segment),
                _ => None,
            })
            .collect()
    }

    /// Points of the last fit-view command.
    pub fn view(&self) -> &[Coordinates] {
        &self.view
    }

    pub fn controls_visible(&self) -> bool {
        self.controls_visible
    }

    pub fn errors(&self) -> &[(String, String)] {
        &self.errors
    }

    fn print(&self, line: String) {
        if self.echo {
            println!("{}", line);
        }
    }
}

impl MapSurface for ConsoleSurface {
    fn add_marker(&mut self, waypoint: &Waypoint) {
        self.print(format!(
            "pin {}: {} ({:.5}, {:.5})",
            self.markers.len() + 1,
            waypoint.label,
            waypoint.coordinates.latitude,
            waypoint.coordinates.longitude
        ));
        self.markers.push(waypoint.clone());
    }

    fn remove_all_markers(&mut self) {
        self.markers.clear();
    }

    fn add_overlay(&mut self, overlay: Overlay) -> Uuid {
        if let Overlay::Route(segment) = &overlay {
            self.print(format!(
                "leg {} -> {}: {:.0} m, {:.0} min, {} points",
                segment.index + 1,
                segment.index + 2,
                segment.route.distance,
                segment.route.duration / 60.0,
                segment.route.geometry.0.len()
            ));
        }

        let id = overlay.id();
        self.overlays.push(overlay);
        id
    }

    fn overlays(&self) -> Vec<Overlay> {
        self.overlays.clone()
    }

    fn remove_overlay(&mut self, id: Uuid) {
        self.overlays.retain(|overlay| overlay.id() != id);
    }

    fn fit_view(&mut self, points: &[Coordinates]) {
        self.view = points.to_vec();
    }

    fn set_route_controls_visible(&mut self, visible: bool) {
        if visible && !self.controls_visible {
            self.print("route and reset available".into());
        }
        self.controls_visible = visible;
    }

    fn show_error(&mut self, title: &str, message: &str) {
        self.print(format!("{}: {}", title, message));
        self.errors.push((title.into(), message.into()));
    }
}

/// Maps one console line to a controller message. Blank lines map to nothing.
pub fn parse_command(line: &str) -> Result<Option<Message>, Error> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (command, rest) = match line.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (line, ""),
    };

    let message = match command.to_ascii_lowercase().as_str() {
        "add" | "a" => {
            if rest.is_empty() {
                return Err(invalid_input_error());
            }
            Message::AddAddress(rest.into())
        }
        "route" | "r" => Message::ComputeRoute,
        "reset" => Message::Reset,
        "quit" | "exit" | "q" => Message::Quit,
        _ => return Err(invalid_input_error()),
    };

    Ok(Some(message))
}

#[test]
fn parse_commands() {
    match parse_command("add 221B Baker Street  ") {
        Ok(Some(Message::AddAddress(address))) => assert_eq!(address, "221B Baker Street"),
        other => panic!("unexpected {:?}", other),
    }

    assert!(matches!(parse_command("route"), Ok(Some(Message::ComputeRoute))));
    assert!(matches!(parse_command("RESET"), Ok(Some(Message::Reset))));
    assert!(matches!(parse_command("q"), Ok(Some(Message::Quit))));
    assert!(matches!(parse_command("   "), Ok(None)));
    assert!(parse_command("add").is_err());
    assert!(parse_command("fly to the moon").is_err());
}

#[test]
fn surface_keeps_user_location_separate() {
    use crate::entities::RouteCandidate;
    use geo_types::LineString;

    let mut surface = ConsoleSurface::quiet();
    surface.add_overlay(Overlay::user_location(Coordinates::new(51.5, -0.12)));
    let segment = RouteSegment::new(
        0,
        RouteCandidate {
            distance: 120.0,
            duration: 90.0,
            geometry: LineString::from(vec![(-0.12, 51.5), (-0.121, 51.501)]),
        },
    );
    let id = surface.add_overlay(Overlay::Route(segment));

    assert_eq!(surface.route_segments().len(), 1);

    surface.remove_overlay(id);
    assert!(surface.route_segments().is_empty());
    assert_eq!(surface.overlays().len(), 1);
}
