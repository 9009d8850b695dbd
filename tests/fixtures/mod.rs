//! Test fixtures for route-planner.
//!
//! Provides:
//! - Tree sensor locations around Eindhoven
//! - Builders for tree and group entities
//! - A repository wrapper that fails on demand
#![allow(dead_code)]

pub mod eindhoven_locations;

use std::collections::HashSet;

use parking_lot::Mutex;
use route_planner::error::RepositoryError;
use route_planner::memory::InMemoryRepository;
use route_planner::model::{AttributeValue, EntityId, EntityKind, RankableEntity, ROUTE_POSITION};
use route_planner::traits::EntityRepository;

pub use eindhoven_locations::*;

pub const PARENT_ID: &str = "treeorg-assets";
pub const WATER_LEVEL: &str = "waterLevel";
pub const SOIL_TEMPERATURE: &str = "soilTemperature";

pub fn group() -> RankableEntity {
    RankableEntity::new(PARENT_ID, "TreeOrg Assets", EntityKind::Group)
        .with_location(DEPOT.lon, DEPOT.lat)
        .with_attribute(route_planner::model::NOTES, None)
}

/// A tree under the group with every sensor attribute declared but empty.
pub fn tree(id: &str, location: &Location) -> RankableEntity {
    RankableEntity::new(id, location.name, EntityKind::Tree)
        .with_parent(PARENT_ID)
        .with_location(location.lon, location.lat)
        .with_attribute(WATER_LEVEL, None)
        .with_attribute(SOIL_TEMPERATURE, None)
        .with_attribute(ROUTE_POSITION, Some(AttributeValue::Integer(0)))
}

pub trait TreeExt {
    fn water_level(self, level: i64) -> Self;
    fn soil_temperature(self, celsius: f64) -> Self;
    fn routed_at(self, position: u32) -> Self;
}

impl TreeExt for RankableEntity {
    fn water_level(self, level: i64) -> Self {
        self.with_attribute(WATER_LEVEL, Some(AttributeValue::Integer(level)))
    }

    fn soil_temperature(self, celsius: f64) -> Self {
        self.with_attribute(SOIL_TEMPERATURE, Some(AttributeValue::Number(celsius)))
    }

    fn routed_at(mut self, position: u32) -> Self {
        self.set_route_position(position);
        self
    }
}

/// Group plus one tree per location, `tree-1..`, water level `100 * (n - i)`
/// so the last location has the lowest level.
pub fn trees_with_water_levels(count: usize) -> Vec<RankableEntity> {
    TREES
        .iter()
        .cycle()
        .take(count)
        .enumerate()
        .map(|(i, location)| {
            tree(&format!("tree-{}", i + 1), location).water_level(100 * (count - i) as i64)
        })
        .collect()
}

pub fn seeded_repository(trees: Vec<RankableEntity>) -> InMemoryRepository {
    InMemoryRepository::with_entities(std::iter::once(group()).chain(trees))
}

pub fn ids<'a>(entities: impl IntoIterator<Item = &'a RankableEntity>) -> Vec<String> {
    entities
        .into_iter()
        .map(|entity| entity.id().as_str().to_string())
        .collect()
}

/// Wraps an [`InMemoryRepository`] and fails selected operations.
#[derive(Default)]
pub struct FlakyRepository {
    pub inner: InMemoryRepository,
    failing_merges: Mutex<HashSet<EntityId>>,
    failing_queries: Mutex<bool>,
    pub merge_attempts: Mutex<Vec<EntityId>>,
}

impl FlakyRepository {
    pub fn new(inner: InMemoryRepository) -> Self {
        Self {
            inner,
            ..Default::default()
        }
    }

    pub fn fail_merge_for(self, id: &str) -> Self {
        self.failing_merges.lock().insert(EntityId::new(id));
        self
    }

    pub fn fail_queries(self) -> Self {
        *self.failing_queries.lock() = true;
        self
    }
}

impl EntityRepository for FlakyRepository {
    fn find_by_type_and_attribute_present(
        &self,
        kind: EntityKind,
        attribute: &str,
    ) -> Result<Vec<RankableEntity>, RepositoryError> {
        if *self.failing_queries.lock() {
            return Err(RepositoryError::Backend("query unavailable".to_string()));
        }
        self.inner.find_by_type_and_attribute_present(kind, attribute)
    }

    fn find_by_id(&self, id: &EntityId) -> Result<Option<RankableEntity>, RepositoryError> {
        self.inner.find_by_id(id)
    }

    fn find_all_by_ids(
        &self,
        kind: EntityKind,
        ids: &[EntityId],
    ) -> Result<Vec<RankableEntity>, RepositoryError> {
        self.inner.find_all_by_ids(kind, ids)
    }

    fn merge(&self, entity: &RankableEntity) -> Result<(), RepositoryError> {
        self.merge_attempts.lock().push(entity.id().clone());
        if self.failing_merges.lock().contains(entity.id()) {
            return Err(RepositoryError::Backend(format!("write rejected for {}", entity.id())));
        }
        self.inner.merge(entity)
    }
}
