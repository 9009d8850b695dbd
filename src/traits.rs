//! Seams between the planner core and its collaborators.
//!
//! The entity store and the external solver live outside this crate; callers
//! implement these traits for their own backends.

use std::sync::Arc;

use crate::error::{RepositoryError, SolverError};
use crate::model::{Coordinate, EntityId, EntityKind, RankableEntity, RouteStop};

/// Persistence and query engine owning the entities.
///
/// Implementations are expected to be internally synchronized; every method
/// takes `&self`.
pub trait EntityRepository {
    /// All entities of `kind` that declare `attribute`, with or without a value.
    fn find_by_type_and_attribute_present(
        &self,
        kind: EntityKind,
        attribute: &str,
    ) -> Result<Vec<RankableEntity>, RepositoryError>;

    fn find_by_id(&self, id: &EntityId) -> Result<Option<RankableEntity>, RepositoryError>;

    fn find_all_by_ids(
        &self,
        kind: EntityKind,
        ids: &[EntityId],
    ) -> Result<Vec<RankableEntity>, RepositoryError>;

    /// Upsert. Idempotent per entity.
    fn merge(&self, entity: &RankableEntity) -> Result<(), RepositoryError>;
}

/// Submits a serialized optimization document to an external solver.
pub trait OptimizationClient {
    /// Returns the raw response body of a successful call.
    fn submit(&self, payload: &str) -> Result<String, SolverError>;
}

/// Produces a visiting order for located entities.
///
/// `entities` and `locations` are index-aligned; job ids are `index + 1`.
pub trait RouteStrategy {
    fn order(
        &self,
        entities: &[RankableEntity],
        locations: &[Coordinate],
        depot: Coordinate,
    ) -> Result<Vec<RouteStop>, SolverError>;
}

impl<T: EntityRepository + ?Sized> EntityRepository for &T {
    fn find_by_type_and_attribute_present(
        &self,
        kind: EntityKind,
        attribute: &str,
    ) -> Result<Vec<RankableEntity>, RepositoryError> {
        (**self).find_by_type_and_attribute_present(kind, attribute)
    }

    fn find_by_id(&self, id: &EntityId) -> Result<Option<RankableEntity>, RepositoryError> {
        (**self).find_by_id(id)
    }

    fn find_all_by_ids(
        &self,
        kind: EntityKind,
        ids: &[EntityId],
    ) -> Result<Vec<RankableEntity>, RepositoryError> {
        (**self).find_all_by_ids(kind, ids)
    }

    fn merge(&self, entity: &RankableEntity) -> Result<(), RepositoryError> {
        (**self).merge(entity)
    }
}

impl<T: EntityRepository + ?Sized> EntityRepository for Arc<T> {
    fn find_by_type_and_attribute_present(
        &self,
        kind: EntityKind,
        attribute: &str,
    ) -> Result<Vec<RankableEntity>, RepositoryError> {
        (**self).find_by_type_and_attribute_present(kind, attribute)
    }

    fn find_by_id(&self, id: &EntityId) -> Result<Option<RankableEntity>, RepositoryError> {
        (**self).find_by_id(id)
    }

    fn find_all_by_ids(
        &self,
        kind: EntityKind,
        ids: &[EntityId],
    ) -> Result<Vec<RankableEntity>, RepositoryError> {
        (**self).find_all_by_ids(kind, ids)
    }

    fn merge(&self, entity: &RankableEntity) -> Result<(), RepositoryError> {
        (**self).merge(entity)
    }
}

impl<T: OptimizationClient + ?Sized> OptimizationClient for &T {
    fn submit(&self, payload: &str) -> Result<String, SolverError> {
        (**self).submit(payload)
    }
}
