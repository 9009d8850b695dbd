//! OpenRouteService-style HTTP adapter for route optimization.

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap};
use serde::{Deserialize, Serialize};

use crate::config::SolverConfig;
use crate::error::SolverError;
use crate::model::{Coordinate, JobId};
use crate::traits::OptimizationClient;

pub const RATE_LIMIT_REMAINING: &str = "X-Ratelimit-Remaining";
pub const RATE_LIMIT_RESET: &str = "X-Ratelimit-Reset";

#[derive(Debug, Clone)]
pub struct OrsClient {
    config: SolverConfig,
    client: reqwest::blocking::Client,
}

impl OrsClient {
    pub fn new(config: SolverConfig) -> Result<Self, SolverError> {
        if config.api_key.as_deref().is_none_or(str::is_empty) {
            return Err(SolverError::MissingApiKey);
        }

        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }
}

impl OptimizationClient for OrsClient {
    fn submit(&self, payload: &str) -> Result<String, SolverError> {
        let api_key = self.config.api_key.as_deref().unwrap_or_default();

        let response = self
            .client
            .post(&self.config.endpoint)
            .header(CONTENT_TYPE, "application/json")
            .header(AUTHORIZATION, format!("Bearer {}", api_key))
            .body(payload.to_string())
            .send()
            .inspect_err(|err| tracing::error!(error = %err, "route solver request failed"))?;

        let (remaining, reset) = rate_limit(response.headers());
        tracing::info!(remaining, reset, "route solver rate limit");

        let status = response.status();
        let body = response.text()?;
        if !status.is_success() {
            tracing::error!(status = status.as_u16(), "route solver rejected request");
            return Err(SolverError::Status {
                status: status.as_u16(),
                body,
            });
        }

        tracing::debug!(body = %body, "route solver response");
        Ok(body)
    }
}

/// `(remaining, reset)` rate-limit indicators, `"unknown"` when absent.
pub fn rate_limit(headers: &HeaderMap) -> (&str, &str) {
    let read = |name: &str| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("unknown")
    };
    (read(RATE_LIMIT_REMAINING), read(RATE_LIMIT_RESET))
}

/// Optimization request: jobs plus a single vehicle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationRequest {
    pub vehicles: Vec<Vehicle>,
    pub jobs: Vec<Job>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: u32,
    /// `[lon, lat]`
    pub start: [f64; 2],
    pub return_to_depot: bool,
    pub profile: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: u32,
    /// `[lon, lat]`
    pub location: [f64; 2],
}

impl OptimizationRequest {
    /// One job per location with ids `1..=n`, one vehicle starting and ending at `depot`.
    pub fn round_trip(depot: Coordinate, locations: &[Coordinate], profile: &str) -> Self {
        let jobs = locations
            .iter()
            .zip(1..)
            .map(|(location, id)| Job {
                id,
                location: location.to_lon_lat(),
            })
            .collect();

        Self {
            vehicles: vec![Vehicle {
                id: 1,
                start: depot.to_lon_lat(),
                return_to_depot: true,
                profile: profile.to_string(),
            }],
            jobs,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OptimizationResponse {
    #[serde(default)]
    pub routes: Vec<SolvedRoute>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SolvedRoute {
    #[serde(default)]
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Step {
    /// `start`, `job` or `end`.
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub job: Option<u32>,
    #[serde(default)]
    pub location: Option<[f64; 2]>,
}

impl Step {
    /// Untyped steps count as jobs when they carry a job id.
    pub fn is_job(&self) -> bool {
        self.kind.as_deref().is_none_or(|kind| kind == "job")
    }
}

impl OptimizationResponse {
    pub fn parse(body: &str) -> Result<Self, SolverError> {
        Ok(serde_json::from_str(body)?)
    }

    /// Job visits of the first route, in order. Steps of any other type are skipped.
    pub fn job_steps(&self) -> Result<Vec<(JobId, Option<Coordinate>)>, SolverError> {
        let route = self.routes.first().ok_or(SolverError::EmptyResponse)?;
        Ok(route
            .steps
            .iter()
            .filter(|step| step.is_job())
            .filter_map(|step| {
                step.job
                    .map(|job| (JobId(job), step.location.map(Coordinate::from_lon_lat)))
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use reqwest::header::HeaderValue;

    use super::*;

    #[test]
    fn test_new_requires_api_key() {
        let result = OrsClient::new(SolverConfig::default());
        assert!(matches!(result, Err(SolverError::MissingApiKey)));

        let mut config = SolverConfig::default();
        config.api_key = Some(String::new());
        assert!(matches!(OrsClient::new(config), Err(SolverError::MissingApiKey)));
    }

    #[test]
    fn test_rate_limit_defaults_to_unknown() {
        let headers = HeaderMap::new();
        assert_eq!(rate_limit(&headers), ("unknown", "unknown"));
    }

    #[test]
    fn test_rate_limit_reads_headers() {
        let mut headers = HeaderMap::new();
        headers.insert("x-ratelimit-remaining", HeaderValue::from_static("39"));
        headers.insert("x-ratelimit-reset", HeaderValue::from_static("1700000000"));
        assert_eq!(rate_limit(&headers), ("39", "1700000000"));
    }

    #[test]
    fn test_request_document_shape() {
        let request = OptimizationRequest::round_trip(
            Coordinate::new(5.45, 51.45),
            &[Coordinate::new(5.47, 51.43), Coordinate::new(5.48, 51.44)],
            "driving-car",
        );
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "vehicles": [{
                    "id": 1,
                    "start": [5.45, 51.45],
                    "return_to_depot": true,
                    "profile": "driving-car"
                }],
                "jobs": [
                    {"id": 1, "location": [5.47, 51.43]},
                    {"id": 2, "location": [5.48, 51.44]}
                ]
            })
        );
    }

    #[test]
    fn test_job_steps_skip_start_and_end() {
        let response = OptimizationResponse::parse(
            r#"{"code":0,"routes":[{"vehicle":1,"steps":[
                {"type":"start","location":[5.45,51.45]},
                {"type":"job","job":2,"location":[5.48,51.44]},
                {"type":"job","job":1,"location":[5.47,51.43]},
                {"type":"end","location":[5.45,51.45]}
            ]}]}"#,
        )
        .unwrap();
        let steps = response.job_steps().unwrap();
        assert_eq!(
            steps,
            vec![
                (JobId(2), Some(Coordinate::new(5.48, 51.44))),
                (JobId(1), Some(Coordinate::new(5.47, 51.43))),
            ]
        );
    }

    #[test]
    fn test_job_steps_only_take_job_typed_steps() {
        let response = OptimizationResponse::parse(
            r#"{"routes":[{"steps":[
                {"type":"start","job":1,"location":[5.45,51.45]},
                {"type":"break","job":3},
                {"job":2,"location":[5.48,51.44]},
                {"type":"job","job":1,"location":[5.47,51.43]}
            ]}]}"#,
        )
        .unwrap();
        let jobs: Vec<JobId> = response.job_steps().unwrap().into_iter().map(|(job, _)| job).collect();
        assert_eq!(jobs, vec![JobId(2), JobId(1)]);
    }

    #[test]
    fn test_no_routes_is_an_error() {
        let response = OptimizationResponse::parse(r#"{"routes":[]}"#).unwrap();
        assert!(matches!(response.job_steps(), Err(SolverError::EmptyResponse)));
    }

    #[test]
    fn test_malformed_body() {
        assert!(matches!(
            OptimizationResponse::parse("<html>bad gateway</html>"),
            Err(SolverError::Payload(_))
        ));
    }
}
