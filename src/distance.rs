//! Planar distance between coordinates.
//!
//! Longitude and latitude are treated as plain Euclidean axes. This is not a
//! geodesic distance; at city scale it is good enough to order a handful of
//! stops.

use crate::model::Coordinate;

/// Straight-line distance on the lon/lat plane.
pub fn euclidean(from: Coordinate, to: Coordinate) -> f64 {
    (to.x - from.x).hypot(to.y - from.y)
}

/// Total length of a closed or open path.
pub fn path_length(points: &[Coordinate]) -> f64 {
    points
        .windows(2)
        .map(|pair| euclidean(pair[0], pair[1]))
        .sum()
}
