//! Tree sensor locations around Eindhoven for realistic fixtures.
//!
//! Coordinates are `(lon, lat)` pairs scattered within a few kilometres of
//! the city centre, the same area the default depot sits in.

/// A named location with coordinates.
#[derive(Debug, Clone)]
pub struct Location {
    pub name: &'static str,
    pub lon: f64,
    pub lat: f64,
}

impl Location {
    pub const fn new(name: &'static str, lon: f64, lat: f64) -> Self {
        Self { name, lon, lat }
    }
}

// ============================================================================
// Depot
// ============================================================================

pub const DEPOT: Location = Location::new("Operations yard", 5.453487298268298, 51.45081456926727);

// ============================================================================
// Tree sensors
// ============================================================================

pub const TREES: &[Location] = &[
    Location::new("Stadswandelpark oak", 5.4756, 51.4268),
    Location::new("Genneper Parken beech", 5.4838, 51.4146),
    Location::new("Philipsdorp lime", 5.4590, 51.4472),
    Location::new("Karpendonkse Plas willow", 5.5012, 51.4431),
    Location::new("Vestdijk plane", 5.4817, 51.4393),
    Location::new("Kennedypark chestnut", 5.4721, 51.4482),
    Location::new("Strijp-S maple", 5.4573, 51.4484),
    Location::new("Woensel birch", 5.4795, 51.4689),
    Location::new("Tongelre ash", 5.5043, 51.4465),
    Location::new("Gestel elm", 5.4650, 51.4206),
    Location::new("Meerhoven alder", 5.4078, 51.4397),
    Location::new("Stratum hornbeam", 5.4902, 51.4300),
];
