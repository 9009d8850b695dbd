//! Planner configuration.
//!
//! Values come from defaults, then an optional TOML file, then environment
//! overrides:
//!
//! ```toml
//! map_service = "https://www.google.com/maps"
//! max_candidates = 10
//!
//! [depot]
//! x = 5.453487298268298
//! y = 51.45081456926727
//!
//! [solver]
//! endpoint = "https://api.openrouteservice.org/optimization"
//! profile = "driving-car"
//! timeout_secs = 10
//! ```
//!
//! The API key is never read from a checked-in default; set it in the file or
//! through `ROUTE_SOLVER_API_KEY`.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::link::DEFAULT_MAP_SERVICE;
use crate::model::{Coordinate, MAX_CANDIDATES};

pub const ENV_ENDPOINT: &str = "ROUTE_SOLVER_ENDPOINT";
pub const ENV_API_KEY: &str = "ROUTE_SOLVER_API_KEY";
pub const ENV_TIMEOUT_SECS: &str = "ROUTE_SOLVER_TIMEOUT_SECS";

/// Default depot, the operations yard every route starts from.
pub const DEFAULT_DEPOT: Coordinate = Coordinate::new(5.453487298268298, 51.45081456926727);

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    pub endpoint: String,
    pub api_key: Option<String>,
    pub profile: String,
    pub timeout_secs: u64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openrouteservice.org/optimization".to_string(),
            api_key: None,
            profile: "driving-car".to_string(),
            timeout_secs: 10,
        }
    }
}

impl fmt::Debug for SolverConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SolverConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("profile", &self.profile)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    pub depot: Coordinate,
    pub map_service: String,
    /// Upper bound on selected entities per route.
    pub max_candidates: usize,
    pub solver: SolverConfig,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            depot: DEFAULT_DEPOT,
            map_service: DEFAULT_MAP_SERVICE.to_string(),
            max_candidates: MAX_CANDIDATES,
            solver: SolverConfig::default(),
        }
    }
}

impl PlannerConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Applies `ROUTE_SOLVER_*` environment variables.
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        if let Some(endpoint) = lookup(ENV_ENDPOINT) {
            self.solver.endpoint = endpoint;
        }
        if let Some(api_key) = lookup(ENV_API_KEY) {
            self.solver.api_key = Some(api_key);
        }
        if let Some(value) = lookup(ENV_TIMEOUT_SECS) {
            self.solver.timeout_secs = value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                key: ENV_TIMEOUT_SECS,
                value,
            })?;
        }
        Ok(self)
    }
}
