//! Shareable map-directions links.
//!
//! A link is the map service's `/dir/` endpoint followed by one
//! `lat,lon/` path segment per waypoint, in visiting order.

use std::fmt::Write;

use crate::model::Coordinate;

pub const DEFAULT_MAP_SERVICE: &str = "https://www.google.com/maps";

/// Builds a directions link through `waypoints`.
///
/// Coordinates are written with Rust's shortest round-trip formatting, so
/// `51.0` renders as `51`.
pub fn directions_link(map_service: &str, waypoints: &[Coordinate]) -> String {
    let mut url = format!("{}/dir/", map_service.trim_end_matches('/'));
    for point in waypoints {
        // Writing into a String cannot fail.
        let _ = write!(url, "{},{}/", point.lat(), point.lon());
    }
    url
}

/// Waypoints of a closed tour: depot, the stops in order, depot.
pub fn closed_tour(depot: Coordinate, stops: impl IntoIterator<Item = Coordinate>) -> Vec<Coordinate> {
    let mut tour = vec![depot];
    tour.extend(stops);
    tour.push(depot);
    tour
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segments_are_lat_lon_in_order() {
        let link = directions_link(
            DEFAULT_MAP_SERVICE,
            &[Coordinate::new(5.0, 51.0), Coordinate::new(6.0, 52.0)],
        );
        let first = link.find("51,5/").expect("first segment present");
        let second = link.find("52,6/").expect("second segment present");
        assert!(first < second);
        assert_eq!(link, "https://www.google.com/maps/dir/51,5/52,6/");
    }

    #[test]
    fn test_trailing_slash_on_service_is_ignored() {
        let link = directions_link("https://maps.example/", &[Coordinate::new(1.5, 2.5)]);
        assert_eq!(link, "https://maps.example/dir/2.5,1.5/");
    }

    #[test]
    fn test_empty_waypoints() {
        assert_eq!(directions_link("https://m.example", &[]), "https://m.example/dir/");
    }

    #[test]
    fn test_closed_tour_wraps_depot() {
        let depot = Coordinate::new(0.0, 0.0);
        let tour = closed_tour(depot, [Coordinate::new(1.0, 1.0)]);
        assert_eq!(tour.len(), 3);
        assert_eq!(tour.first(), Some(&depot));
        assert_eq!(tour.last(), Some(&depot));
    }
}
