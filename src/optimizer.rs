//! Ranking, planning and persistence composed into a single operation.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::config::PlannerConfig;
use crate::error::SolverError;
use crate::model::{Coordinate, EntityKind, PlannedRoute, RankableEntity, RouteFailure, RouteResult};
use crate::ors::OrsClient;
use crate::planner::{NearestNeighbor, RoutePlanner, SolverDelegation};
use crate::selector::{AttributeRankingSelector, KindRegistry, TreeAdapter};
use crate::synchronizer::RouteStateSynchronizer;
use crate::traits::{EntityRepository, RouteStrategy};

/// Routes refreshed by [`RouteOptimizer::optimize_defaults`].
pub const DEFAULT_TARGETS: [(EntityKind, &str); 2] = [
    (EntityKind::Tree, TreeAdapter::WATER_LEVEL),
    (EntityKind::Tree, TreeAdapter::SOIL_TEMPERATURE),
];

/// Selects, plans and persists routes.
///
/// Route positions are stored per kind, so calls for the same kind are
/// serialized whatever their attribute. Calls for different kinds run
/// concurrently.
pub struct RouteOptimizer<R, S> {
    selector: AttributeRankingSelector<R>,
    planner: RoutePlanner<S>,
    synchronizer: RouteStateSynchronizer<R>,
    depot: Coordinate,
    locks: HashMap<EntityKind, Arc<Mutex<()>>>,
}

impl<R: EntityRepository + Clone> RouteOptimizer<R, NearestNeighbor> {
    /// Optimizer using the local nearest-neighbor heuristic.
    pub fn heuristic(repository: R, config: &PlannerConfig) -> Self {
        Self::new(repository, NearestNeighbor, config)
    }
}

impl<R: EntityRepository + Clone> RouteOptimizer<R, SolverDelegation<OrsClient>> {
    /// Optimizer delegating to the configured external solver.
    pub fn with_solver(repository: R, config: &PlannerConfig) -> Result<Self, SolverError> {
        let client = OrsClient::new(config.solver.clone())?;
        let strategy = SolverDelegation::new(client, config.solver.profile.clone(), config.max_candidates);
        Ok(Self::new(repository, strategy, config))
    }
}

impl<R: EntityRepository + Clone, S: RouteStrategy> RouteOptimizer<R, S> {
    pub fn new(repository: R, strategy: S, config: &PlannerConfig) -> Self {
        Self {
            selector: AttributeRankingSelector::with_registry(
                repository.clone(),
                KindRegistry::default(),
                config.max_candidates,
            ),
            planner: RoutePlanner::new(strategy, config.map_service.clone()),
            synchronizer: RouteStateSynchronizer::new(repository),
            depot: config.depot,
            locks: EntityKind::ALL
                .into_iter()
                .map(|kind| (kind, Arc::default()))
                .collect(),
        }
    }

    pub fn planner(&self) -> &RoutePlanner<S> {
        &self.planner
    }

    /// Ranked entities for a type name and attribute.
    pub fn rank(&self, kind: &str, attribute: &str) -> Vec<RankableEntity> {
        self.selector.rank_by_name(kind, attribute)
    }

    /// Selects, plans and persists a route for a type name and attribute.
    pub fn optimize(&self, kind: &str, attribute: &str) -> RouteResult {
        let kind = match kind.parse::<EntityKind>() {
            Ok(kind) => kind,
            Err(err) => {
                tracing::error!(error = %err, attribute, "unable to optimize route");
                return RouteResult::failed(RouteFailure::InvalidInput(err.to_string()));
            }
        };
        self.optimize_kind(kind, attribute)
    }

    pub fn optimize_kind(&self, kind: EntityKind, attribute: &str) -> RouteResult {
        if attribute.trim().is_empty() {
            tracing::error!(%kind, "attribute name is empty, unable to optimize route");
            return RouteResult::failed(RouteFailure::InvalidInput(
                "attribute name is empty".to_string(),
            ));
        }

        let lock = self.lock_for(kind);
        let _guard = lock.lock();

        let candidates = self.selector.rank(kind, attribute);
        if candidates.is_empty() {
            tracing::warn!(%kind, attribute, "no ranked entities, unable to optimize route");
            return RouteResult::failed(RouteFailure::NoCandidates);
        }

        let route = match self.planner.plan(&candidates, self.depot) {
            RouteResult::Planned(route) => route,
            failed => return failed,
        };
        log_visitation(&route, attribute);

        match self.synchronizer.synchronize(kind, &route, &candidates) {
            Ok(report) => {
                tracing::info!(
                    %kind,
                    attribute,
                    positioned = report.positioned,
                    reset = report.reset,
                    "route synchronized"
                );
                RouteResult::Planned(route)
            }
            Err(error) => {
                tracing::error!(%kind, attribute, error = %error, "route synchronization incomplete");
                RouteResult::failed(RouteFailure::Persistence { route, error })
            }
        }
    }

    /// Refreshes the routes in [`DEFAULT_TARGETS`].
    pub fn optimize_defaults(&self) -> Vec<(EntityKind, &'static str, RouteResult)> {
        DEFAULT_TARGETS
            .iter()
            .map(|&(kind, attribute)| (kind, attribute, self.optimize_kind(kind, attribute)))
            .collect()
    }

    fn lock_for(&self, kind: EntityKind) -> Arc<Mutex<()>> {
        self.locks.get(&kind).cloned().unwrap_or_default()
    }
}

fn log_visitation(route: &PlannedRoute, attribute: &str) {
    for (index, entity) in route.entities().enumerate() {
        let value = entity
            .attribute(attribute)
            .map(ToString::to_string)
            .unwrap_or_default();
        tracing::info!(
            position = index + 1,
            entity_id = %entity.id(),
            name = entity.name(),
            attribute,
            value = %value,
            "visit"
        );
    }
}
