//! Attribute ranking: picks the lowest-valued entities of a kind.

use std::collections::HashMap;

use crate::error::RepositoryError;
use crate::model::{EntityKind, LOCATION, MAX_CANDIDATES, NOTES, RankableEntity, ROUTE_POSITION};
use crate::traits::EntityRepository;

/// Per-kind query behaviour.
pub trait KindAdapter: Send + Sync {
    fn kind(&self) -> EntityKind;

    /// Attribute names entities of this kind are known to declare.
    /// Individual entities may declare more.
    fn attributes(&self) -> &[&'static str];

    fn is_known(&self, attribute: &str) -> bool {
        self.attributes().contains(&attribute)
    }

    fn query(
        &self,
        repository: &dyn EntityRepository,
        attribute: &str,
    ) -> Result<Vec<RankableEntity>, RepositoryError> {
        repository.find_by_type_and_attribute_present(self.kind(), attribute)
    }
}

/// Tree sensors.
#[derive(Debug, Clone, Copy, Default)]
pub struct TreeAdapter;

impl TreeAdapter {
    pub const SOIL_TEMPERATURE: &'static str = "soilTemperature";
    pub const WATER_LEVEL: &'static str = "waterLevel";
    pub const TREE_TYPE: &'static str = "treeType";
    pub const PRIORITY: &'static str = "priority";
}

impl KindAdapter for TreeAdapter {
    fn kind(&self) -> EntityKind {
        EntityKind::Tree
    }

    fn attributes(&self) -> &[&'static str] {
        &[
            Self::SOIL_TEMPERATURE,
            Self::WATER_LEVEL,
            Self::TREE_TYPE,
            ROUTE_POSITION,
            Self::PRIORITY,
            LOCATION,
            NOTES,
        ]
    }
}

/// Grouping entities; they carry a location and the route link.
#[derive(Debug, Clone, Copy, Default)]
pub struct GroupAdapter;

impl KindAdapter for GroupAdapter {
    fn kind(&self) -> EntityKind {
        EntityKind::Group
    }

    fn attributes(&self) -> &[&'static str] {
        &[LOCATION, NOTES]
    }
}

/// Maps each supported kind to its adapter.
pub struct KindRegistry {
    adapters: HashMap<EntityKind, Box<dyn KindAdapter>>,
}

impl KindRegistry {
    pub fn empty() -> Self {
        Self {
            adapters: HashMap::new(),
        }
    }

    pub fn register(&mut self, adapter: impl KindAdapter + 'static) {
        self.adapters.insert(adapter.kind(), Box::new(adapter));
    }

    pub fn get(&self, kind: EntityKind) -> Option<&dyn KindAdapter> {
        self.adapters.get(&kind).map(Box::as_ref)
    }
}

impl Default for KindRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(TreeAdapter);
        registry.register(GroupAdapter);
        registry
    }
}

pub struct AttributeRankingSelector<R> {
    repository: R,
    registry: KindRegistry,
    limit: usize,
}

impl<R: EntityRepository> AttributeRankingSelector<R> {
    pub fn new(repository: R) -> Self {
        Self::with_registry(repository, KindRegistry::default(), MAX_CANDIDATES)
    }

    pub fn with_registry(repository: R, registry: KindRegistry, limit: usize) -> Self {
        Self {
            repository,
            registry,
            limit,
        }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Ranks entities named by a type name. Unknown names yield nothing.
    pub fn rank_by_name(&self, kind: &str, attribute: &str) -> Vec<RankableEntity> {
        match kind.parse::<EntityKind>() {
            Ok(kind) => self.rank(kind, attribute),
            Err(err) => {
                tracing::warn!(error = %err, attribute, "cannot rank entities");
                Vec::new()
            }
        }
    }

    /// Up to `limit` entities of `kind` with a value for `attribute`,
    /// ascending by that value.
    ///
    /// Never fails: invalid input and repository errors are logged and
    /// produce an empty result.
    pub fn rank(&self, kind: EntityKind, attribute: &str) -> Vec<RankableEntity> {
        if attribute.trim().is_empty() {
            tracing::warn!(%kind, "attribute name is empty, nothing to rank");
            return Vec::new();
        }

        let Some(adapter) = self.registry.get(kind) else {
            tracing::warn!(%kind, "no adapter registered for entity kind");
            return Vec::new();
        };
        if !adapter.is_known(attribute) {
            tracing::debug!(%kind, attribute, "attribute is not a known attribute of the kind");
        }

        let candidates = match adapter.query(&self.repository, attribute) {
            Ok(candidates) => candidates,
            Err(err) => {
                tracing::error!(%kind, attribute, error = %err, "entity query failed");
                return Vec::new();
            }
        };

        let mut ranked: Vec<RankableEntity> = candidates
            .into_iter()
            .filter(|entity| entity.kind() == kind)
            .filter(|entity| entity.attribute(attribute).is_some_and(|value| value.is_rankable()))
            .collect();

        ranked.sort_by(|a, b| match (a.attribute(attribute), b.attribute(attribute)) {
            (Some(a), Some(b)) => a.rank_cmp(b),
            _ => std::cmp::Ordering::Equal,
        });
        ranked.truncate(self.limit);

        if ranked.is_empty() {
            tracing::info!(%kind, attribute, "no entities with a value for attribute");
        }
        for entity in &ranked {
            if let Some(value) = entity.attribute(attribute) {
                tracing::info!(
                    entity_id = %entity.id(),
                    name = entity.name(),
                    attribute,
                    value = %value,
                    "selected entity"
                );
            }
        }

        ranked
    }
}
