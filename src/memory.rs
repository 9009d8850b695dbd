//! In-memory entity repository.

use std::collections::BTreeMap;

use parking_lot::RwLock;

use crate::error::RepositoryError;
use crate::model::{EntityId, EntityKind, RankableEntity};
use crate::traits::EntityRepository;

/// Entities keyed by id, iterated in id order.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    entities: RwLock<BTreeMap<EntityId, RankableEntity>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entities(entities: impl IntoIterator<Item = RankableEntity>) -> Self {
        let repository = Self::new();
        {
            let mut map = repository.entities.write();
            for entity in entities {
                map.insert(entity.id().clone(), entity);
            }
        }
        repository
    }

    pub fn get(&self, id: &str) -> Option<RankableEntity> {
        self.entities.read().get(&EntityId::new(id)).cloned()
    }

    pub fn len(&self) -> usize {
        self.entities.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.read().is_empty()
    }
}

impl EntityRepository for InMemoryRepository {
    fn find_by_type_and_attribute_present(
        &self,
        kind: EntityKind,
        attribute: &str,
    ) -> Result<Vec<RankableEntity>, RepositoryError> {
        Ok(self
            .entities
            .read()
            .values()
            .filter(|entity| entity.kind() == kind && entity.declares(attribute))
            .cloned()
            .collect())
    }

    fn find_by_id(&self, id: &EntityId) -> Result<Option<RankableEntity>, RepositoryError> {
        Ok(self.entities.read().get(id).cloned())
    }

    fn find_all_by_ids(
        &self,
        kind: EntityKind,
        ids: &[EntityId],
    ) -> Result<Vec<RankableEntity>, RepositoryError> {
        let entities = self.entities.read();
        Ok(ids
            .iter()
            .filter_map(|id| entities.get(id))
            .filter(|entity| entity.kind() == kind)
            .cloned()
            .collect())
    }

    fn merge(&self, entity: &RankableEntity) -> Result<(), RepositoryError> {
        self.entities
            .write()
            .insert(entity.id().clone(), entity.clone());
        Ok(())
    }
}
