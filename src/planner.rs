//! Route planner: orders selected entities into a depot-to-depot tour.
//!
//! Two strategies are provided. [`NearestNeighbor`] is self-contained and
//! deterministic. [`SolverDelegation`] hands the problem to an external
//! optimization service and maps the returned job ids back onto entities.
//! The strategy is a type parameter of [`RoutePlanner`], fixed when the
//! planner is built.

use crate::distance::{euclidean, path_length};
use crate::error::SolverError;
use crate::link::{closed_tour, directions_link};
use crate::model::{Coordinate, JobId, PlannedRoute, RankableEntity, RouteFailure, RouteResult, RouteStop};
use crate::ors::{OptimizationRequest, OptimizationResponse};
use crate::traits::{OptimizationClient, RouteStrategy};

#[derive(Debug, Clone)]
pub struct RoutePlanner<S> {
    strategy: S,
    map_service: String,
}

impl<S: RouteStrategy> RoutePlanner<S> {
    pub fn new(strategy: S, map_service: impl Into<String>) -> Self {
        Self {
            strategy,
            map_service: map_service.into(),
        }
    }

    pub fn strategy(&self) -> &S {
        &self.strategy
    }

    /// Plans a closed tour from `depot` through `entities`.
    ///
    /// Entities without a location cannot be placed and are left out.
    pub fn plan(&self, entities: &[RankableEntity], depot: Coordinate) -> RouteResult {
        let mut located = Vec::with_capacity(entities.len());
        let mut locations = Vec::with_capacity(entities.len());
        for entity in entities {
            match entity.location() {
                Some(location) => {
                    located.push(entity.clone());
                    locations.push(location);
                }
                None => tracing::warn!(entity_id = %entity.id(), "entity has no location, leaving it off the route"),
            }
        }

        if located.is_empty() {
            tracing::warn!("no located entities to route");
            return RouteResult::failed(RouteFailure::NoCandidates);
        }

        let stops = match self.strategy.order(&located, &locations, depot) {
            Ok(stops) => stops,
            Err(err) => {
                tracing::error!(error = %err, "route planning failed");
                return RouteResult::failed(err);
            }
        };

        let waypoints = closed_tour(depot, stops.iter().filter_map(|stop| stop.entity.location()));
        let link = directions_link(&self.map_service, &waypoints);
        tracing::info!(
            stops = stops.len(),
            length = path_length(&waypoints),
            link = %link,
            "route planned"
        );

        RouteResult::Planned(PlannedRoute { link, stops })
    }
}

/// Greedy nearest-neighbor tour.
///
/// From the depot, repeatedly moves to the closest unvisited location.
/// Distance ties go to the location that comes first in the input.
#[derive(Debug, Clone, Copy, Default)]
pub struct NearestNeighbor;

impl RouteStrategy for NearestNeighbor {
    fn order(
        &self,
        entities: &[RankableEntity],
        locations: &[Coordinate],
        depot: Coordinate,
    ) -> Result<Vec<RouteStop>, SolverError> {
        Ok(nearest_neighbor_order(depot, locations)
            .into_iter()
            .map(|index| RouteStop {
                job: job_for_index(index),
                entity: entities[index].clone(),
            })
            .collect())
    }
}

/// Visiting order as indices into `locations`.
pub fn nearest_neighbor_order(depot: Coordinate, locations: &[Coordinate]) -> Vec<usize> {
    let mut visited = vec![false; locations.len()];
    let mut order = Vec::with_capacity(locations.len());
    let mut current = depot;

    for _ in 0..locations.len() {
        let mut best: Option<(usize, f64)> = None;
        for (index, location) in locations.iter().enumerate() {
            if visited[index] {
                continue;
            }
            let distance = euclidean(current, *location);
            if best.is_none_or(|(_, best_distance)| distance.total_cmp(&best_distance).is_lt()) {
                best = Some((index, distance));
            }
        }

        let Some((index, _)) = best else { break };
        visited[index] = true;
        current = locations[index];
        order.push(index);
    }

    order
}

/// Delegates ordering to an external optimization service.
#[derive(Debug, Clone)]
pub struct SolverDelegation<C> {
    client: C,
    profile: String,
    max_candidates: usize,
}

impl<C: OptimizationClient> SolverDelegation<C> {
    pub fn new(client: C, profile: impl Into<String>, max_candidates: usize) -> Self {
        Self {
            client,
            profile: profile.into(),
            max_candidates,
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }
}

impl<C: OptimizationClient> RouteStrategy for SolverDelegation<C> {
    fn order(
        &self,
        entities: &[RankableEntity],
        locations: &[Coordinate],
        depot: Coordinate,
    ) -> Result<Vec<RouteStop>, SolverError> {
        let request = OptimizationRequest::round_trip(depot, locations, &self.profile);
        let payload = serde_json::to_string(&request)?;
        let body = self.client.submit(&payload)?;
        let steps = OptimizationResponse::parse(&body)?.job_steps()?;

        Ok(reconcile(entities, locations, &steps, self.max_candidates))
    }
}

/// Maps solver steps back onto entities by job id.
///
/// Repeated jobs keep their first position. If fewer entities than
/// `min(limit, entities.len())` were matched, the remainder is appended in
/// input order.
pub fn reconcile(
    entities: &[RankableEntity],
    locations: &[Coordinate],
    steps: &[(JobId, Option<Coordinate>)],
    limit: usize,
) -> Vec<RouteStop> {
    let mut placed = vec![false; entities.len()];
    let mut stops = Vec::with_capacity(entities.len());

    for (job, location) in steps {
        let Some(index) = index_for_job(*job, entities.len()) else {
            tracing::warn!(job = job.0, "solver returned an unknown job id");
            continue;
        };
        if placed[index] {
            continue;
        }
        if location.is_some_and(|location| location != locations[index]) {
            tracing::debug!(job = job.0, "solver moved job location");
        }
        placed[index] = true;
        stops.push(RouteStop {
            job: *job,
            entity: entities[index].clone(),
        });
    }

    let target = limit.min(entities.len());
    if stops.len() < target {
        tracing::warn!(matched = stops.len(), target, "solver omitted jobs, appending them in input order");
        for (index, entity) in entities.iter().enumerate() {
            if stops.len() >= target {
                break;
            }
            if !placed[index] {
                placed[index] = true;
                stops.push(RouteStop {
                    job: job_for_index(index),
                    entity: entity.clone(),
                });
            }
        }
    }

    stops
}

fn job_for_index(index: usize) -> JobId {
    JobId(index as u32 + 1)
}

fn index_for_job(job: JobId, len: usize) -> Option<usize> {
    (job.0 as usize).checked_sub(1).filter(|index| *index < len)
}
