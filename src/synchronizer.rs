//! Writes a computed route back onto the entity store.
//!
//! Every write is an independent merge. A failing write does not stop the
//! others and nothing is rolled back; failures are collected and reported
//! together once every write has been attempted.

use std::collections::HashSet;

use crate::error::{PersistenceError, RepositoryError};
use crate::model::{EntityId, EntityKind, PlannedRoute, RankableEntity, ROUTE_POSITION};
use crate::traits::EntityRepository;

/// What a successful synchronization wrote.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Entities given a route position.
    pub positioned: usize,
    /// Entities whose position was reset to 0.
    pub reset: usize,
    /// Ancestor that received the route link.
    pub parent: Option<EntityId>,
}

#[derive(Default)]
struct Writes {
    written: usize,
    failed: Vec<(EntityId, RepositoryError)>,
}

impl Writes {
    fn merge<R: EntityRepository>(&mut self, repository: &R, entity: &RankableEntity) -> bool {
        match repository.merge(entity) {
            Ok(()) => {
                self.written += 1;
                true
            }
            Err(err) => {
                tracing::error!(entity_id = %entity.id(), error = %err, "failed to persist route state");
                self.failed.push((entity.id().clone(), err));
                false
            }
        }
    }
}

pub struct RouteStateSynchronizer<R> {
    repository: R,
}

impl<R: EntityRepository> RouteStateSynchronizer<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Persists `route` for entities of `kind`.
    ///
    /// Routed entities that still exist get positions `1..=n`. Candidates and
    /// previously routed entities that are not on the new route are reset to
    /// 0. The link is written to the parent of the first candidate that has one.
    pub fn synchronize(
        &self,
        kind: EntityKind,
        route: &PlannedRoute,
        candidates: &[RankableEntity],
    ) -> Result<SyncReport, PersistenceError> {
        let route_ids: Vec<EntityId> = route.entities().map(|entity| entity.id().clone()).collect();
        let on_route: HashSet<&EntityId> = route_ids.iter().collect();

        // The routed re-read and the previous-route query both precede any
        // write; a failure in either leaves the store untouched.
        let fresh = self.repository.find_all_by_ids(kind, &route_ids)?;
        let previously_routed = self
            .repository
            .find_by_type_and_attribute_present(kind, ROUTE_POSITION)?;

        let mut writes = Writes::default();
        let mut report = SyncReport::default();

        let mut position = 0;
        for id in &route_ids {
            let Some(entity) = fresh.iter().find(|entity| entity.id() == id) else {
                tracing::warn!(entity_id = %id, "routed entity no longer exists");
                continue;
            };
            position += 1;
            let mut entity = entity.clone();
            entity.set_route_position(position);
            if writes.merge(&self.repository, &entity) {
                tracing::info!(entity_id = %id, name = entity.name(), position, "route position set");
                report.positioned += 1;
            }
        }

        let mut seen = HashSet::new();
        let stale = candidates
            .iter()
            .chain(previously_routed.iter().filter(|entity| entity.route_position() > 0))
            .filter(|entity| !on_route.contains(entity.id()))
            .filter(|entity| seen.insert(entity.id().clone()));

        for candidate in stale {
            let entity = match self.repository.find_by_id(candidate.id()) {
                Ok(Some(entity)) => entity,
                Ok(None) => continue,
                Err(err) => {
                    tracing::error!(entity_id = %candidate.id(), error = %err, "failed to load entity for reset");
                    writes.failed.push((candidate.id().clone(), err));
                    continue;
                }
            };
            if entity.route_position() == 0 && entity.declares(ROUTE_POSITION) {
                continue;
            }
            let mut entity = entity;
            entity.set_route_position(0);
            if writes.merge(&self.repository, &entity) {
                tracing::info!(entity_id = %entity.id(), "route position reset");
                report.reset += 1;
            }
        }

        report.parent = self.annotate_parent(&route.link, candidates, &mut writes);

        if writes.failed.is_empty() {
            Ok(report)
        } else {
            Err(PersistenceError::Partial {
                written: writes.written,
                failed: writes.failed,
            })
        }
    }

    fn annotate_parent(
        &self,
        link: &str,
        candidates: &[RankableEntity],
        writes: &mut Writes,
    ) -> Option<EntityId> {
        let Some(parent_id) = candidates.iter().find_map(RankableEntity::parent_id) else {
            tracing::warn!("no candidate has a parent, route link not stored");
            return None;
        };

        let mut parent = match self.repository.find_by_id(parent_id) {
            Ok(Some(parent)) => parent,
            Ok(None) => {
                tracing::warn!(parent_id = %parent_id, "parent entity not found, route link not stored");
                return None;
            }
            Err(err) => {
                tracing::error!(parent_id = %parent_id, error = %err, "failed to load parent entity");
                writes.failed.push((parent_id.clone(), err));
                return None;
            }
        };

        parent.set_notes(link);
        if writes.merge(&self.repository, &parent) {
            tracing::info!(parent_id = %parent_id, name = parent.name(), "route link stored on parent");
            Some(parent_id.clone())
        } else {
            None
        }
    }
}
