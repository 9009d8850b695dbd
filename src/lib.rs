//! route-planner core
//!
//! Ranks geo-located entities by an attribute, orders the lowest-ranked ones
//! into a depot-to-depot route and records that route back on the entities.

pub mod config;
pub mod distance;
pub mod error;
pub mod link;
pub mod memory;
pub mod model;
pub mod optimizer;
pub mod ors;
pub mod planner;
pub mod selector;
pub mod synchronizer;
pub mod traits;
