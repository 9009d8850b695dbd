//! Domain model: entities, attribute values, coordinates and route results.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

use crate::error::{PersistenceError, SolverError};

/// Attribute holding an entity's coordinate.
pub const LOCATION: &str = "location";

/// Attribute holding the 1-based route position (0 = not routed).
pub const ROUTE_POSITION: &str = "routeId";

/// Free-text annotation attribute; receives the shareable map link.
pub const NOTES: &str = "notes";

/// Upper bound on entities selected for a single route.
pub const MAX_CANDIDATES: usize = 10;

/// Stable entity identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(String);

impl EntityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Supported entity kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityKind {
    /// A tree sensor carrying soil and water readings.
    Tree,
    /// A grouping entity used as the parent of sensors.
    Group,
}

impl EntityKind {
    pub const ALL: [EntityKind; 2] = [EntityKind::Tree, EntityKind::Group];

    pub fn name(&self) -> &'static str {
        match self {
            EntityKind::Tree => "tree",
            EntityKind::Group => "group",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a type name does not name a supported kind.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown entity kind: {0:?}")]
pub struct UnknownKind(pub String);

impl FromStr for EntityKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tree" | "treeasset" => Ok(EntityKind::Tree),
            "group" | "thing" | "thingasset" => Ok(EntityKind::Group),
            _ => Err(UnknownKind(s.to_string())),
        }
    }
}

/// A point on the plane: `x` is longitude, `y` is latitude.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub x: f64,
    pub y: f64,
}

impl Coordinate {
    pub const fn new(lon: f64, lat: f64) -> Self {
        Self { x: lon, y: lat }
    }

    pub fn lon(&self) -> f64 {
        self.x
    }

    pub fn lat(&self) -> f64 {
        self.y
    }

    /// `[lon, lat]`, the order the solver API expects.
    pub fn to_lon_lat(self) -> [f64; 2] {
        [self.x, self.y]
    }

    pub fn from_lon_lat(pair: [f64; 2]) -> Self {
        Self::new(pair[0], pair[1])
    }
}

/// A typed attribute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum AttributeValue {
    Integer(i64),
    Number(f64),
    Boolean(bool),
    Text(String),
    Point(Coordinate),
}

impl AttributeValue {
    /// Whether the value has a natural ordering usable for ranking.
    pub fn is_rankable(&self) -> bool {
        !matches!(self, AttributeValue::Point(_))
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttributeValue::Integer(value) => Some(*value as f64),
            AttributeValue::Number(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_coordinate(&self) -> Option<Coordinate> {
        match self {
            AttributeValue::Point(point) => Some(*point),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            AttributeValue::Text(text) => Some(text),
            _ => None,
        }
    }

    fn variant_rank(&self) -> u8 {
        match self {
            AttributeValue::Integer(_) | AttributeValue::Number(_) => 0,
            AttributeValue::Boolean(_) => 1,
            AttributeValue::Text(_) => 2,
            AttributeValue::Point(_) => 3,
        }
    }

    /// Total order used for ranking.
    ///
    /// Integers and numbers compare numerically with each other. Values of
    /// different families fall back to a fixed family order so a sort over
    /// mixed data is still deterministic.
    pub fn rank_cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (AttributeValue::Integer(a), AttributeValue::Integer(b)) => a.cmp(b),
            (AttributeValue::Boolean(a), AttributeValue::Boolean(b)) => a.cmp(b),
            (AttributeValue::Text(a), AttributeValue::Text(b)) => a.cmp(b),
            (AttributeValue::Point(a), AttributeValue::Point(b)) => {
                a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y))
            }
            _ => match (self.as_f64(), other.as_f64()) {
                (Some(a), Some(b)) => a.total_cmp(&b),
                _ => self.variant_rank().cmp(&other.variant_rank()),
            },
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Integer(value) => write!(f, "{value}"),
            AttributeValue::Number(value) => write!(f, "{value}"),
            AttributeValue::Boolean(value) => write!(f, "{value}"),
            AttributeValue::Text(value) => f.write_str(value),
            AttributeValue::Point(point) => write!(f, "[{}, {}]", point.x, point.y),
        }
    }
}

/// A persisted entity that can be ranked by attribute and placed on a route.
///
/// Attributes are declared by name; a declared attribute may still hold no
/// value (`None`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankableEntity {
    id: EntityId,
    name: String,
    kind: EntityKind,
    parent_id: Option<EntityId>,
    attributes: BTreeMap<String, Option<AttributeValue>>,
}

impl RankableEntity {
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: EntityKind) -> Self {
        Self {
            id: EntityId::new(id),
            name: name.into(),
            kind,
            parent_id: None,
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(EntityId::new(parent_id));
        self
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: Option<AttributeValue>) -> Self {
        self.attributes.insert(name.into(), value);
        self
    }

    pub fn with_location(self, lon: f64, lat: f64) -> Self {
        self.with_attribute(LOCATION, Some(AttributeValue::Point(Coordinate::new(lon, lat))))
    }

    pub fn id(&self) -> &EntityId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn parent_id(&self) -> Option<&EntityId> {
        self.parent_id.as_ref()
    }

    /// Whether the entity declares the attribute, with or without a value.
    pub fn declares(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    /// The attribute's value, if declared and present.
    pub fn attribute(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes.get(name).and_then(Option::as_ref)
    }

    pub fn set_attribute(&mut self, name: impl Into<String>, value: Option<AttributeValue>) {
        self.attributes.insert(name.into(), value);
    }

    pub fn location(&self) -> Option<Coordinate> {
        self.attribute(LOCATION).and_then(AttributeValue::as_coordinate)
    }

    pub fn route_position(&self) -> u32 {
        match self.attribute(ROUTE_POSITION) {
            Some(AttributeValue::Integer(value)) => u32::try_from(*value).unwrap_or(0),
            _ => 0,
        }
    }

    pub fn set_route_position(&mut self, position: u32) {
        self.set_attribute(ROUTE_POSITION, Some(AttributeValue::Integer(i64::from(position))));
    }

    pub fn notes(&self) -> Option<&str> {
        self.attribute(NOTES).and_then(AttributeValue::as_text)
    }

    pub fn set_notes(&mut self, notes: impl Into<String>) {
        self.set_attribute(NOTES, Some(AttributeValue::Text(notes.into())));
    }
}

/// Opaque per-request job identifier, 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct JobId(pub u32);

/// One entity at its place on a computed route.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteStop {
    pub job: JobId,
    pub entity: RankableEntity,
}

/// A successfully computed route.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlannedRoute {
    pub link: String,
    pub stops: Vec<RouteStop>,
}

impl PlannedRoute {
    pub fn entities(&self) -> impl Iterator<Item = &RankableEntity> {
        self.stops.iter().map(|stop| &stop.entity)
    }
}

/// Why no route was produced.
#[derive(Debug, thiserror::Error)]
pub enum RouteFailure {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("no candidates matched the selection")]
    NoCandidates,

    #[error("route solver failed: {0}")]
    Solver(#[from] SolverError),

    #[error("route computed but not fully persisted: {error}")]
    Persistence {
        route: PlannedRoute,
        error: PersistenceError,
    },
}

impl RouteFailure {
    /// Stable machine-readable failure category.
    pub fn reason(&self) -> &'static str {
        match self {
            RouteFailure::InvalidInput(_) => "invalid_input",
            RouteFailure::NoCandidates => "no_candidates",
            RouteFailure::Solver(_) => "solver",
            RouteFailure::Persistence { .. } => "persistence",
        }
    }
}

/// Serialized as `{reason, message}`; persistence failures also carry the computed `route`.
impl Serialize for RouteFailure {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let route = match self {
            RouteFailure::Persistence { route, .. } => Some(route),
            _ => None,
        };
        let mut state = serializer.serialize_struct("RouteFailure", 2 + usize::from(route.is_some()))?;
        state.serialize_field("reason", self.reason())?;
        state.serialize_field("message", &self.to_string())?;
        if let Some(route) = route {
            state.serialize_field("route", route)?;
        }
        state.end()
    }
}

/// Outcome of a planning or optimization call.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RouteResult {
    Planned(PlannedRoute),
    Failed(RouteFailure),
}

impl RouteResult {
    pub fn failed(failure: impl Into<RouteFailure>) -> Self {
        RouteResult::Failed(failure.into())
    }

    pub fn is_planned(&self) -> bool {
        matches!(self, RouteResult::Planned(_))
    }

    /// The shareable map link; absent on failure.
    pub fn link(&self) -> Option<&str> {
        match self {
            RouteResult::Planned(route) => Some(&route.link),
            RouteResult::Failed(_) => None,
        }
    }

    /// Ordered route stops; empty on failure.
    pub fn stops(&self) -> &[RouteStop] {
        match self {
            RouteResult::Planned(route) => &route.stops,
            RouteResult::Failed(_) => &[],
        }
    }

    pub fn entities(&self) -> Vec<&RankableEntity> {
        self.stops().iter().map(|stop| &stop.entity).collect()
    }

    pub fn failure(&self) -> Option<&RouteFailure> {
        match self {
            RouteResult::Failed(failure) => Some(failure),
            RouteResult::Planned(_) => None,
        }
    }
}
