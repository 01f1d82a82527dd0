//! Status and results surface over a work pool.
//!
//! Responses are plain serializable structs with hypermedia links; a
//! transport layer only needs to map request targets through [`StatusService::route`]
//! and write the JSON out.

use std::marker::PhantomData;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use super::work_pool::{JobId, JobStatus, WorkPool};
use crate::core::{ServiceConfig, ServiceError};
use crate::engine::{BattleEngine, Snapshot};
use crate::runner::ExplorationResult;

const BASE_PATH: &str = "explorer";
const START_COMMAND: &str = "start";
const STATUS_COMMAND: &str = "status";
const RESULTS_COMMAND: &str = "results";
const TARGET_ORIGIN: &str = "http://localhost/";

/// Summary of one job.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkSummary {
    pub id: JobId,
    pub result_count: usize,
    pub finished: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub status_link: String,
    pub results_link: String,
}

/// One page of a job's results.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultsPage {
    pub results: Vec<ExplorationResult>,
    pub result_count: usize,
    pub finished: bool,
    pub status_link: String,
    pub self_link: String,
    pub prev_link: Option<String>,
    pub next_link: Option<String>,
}

/// Outcome of routing a request target.
#[derive(Clone, Debug, PartialEq)]
pub enum Response {
    Json(Value),
    NotFound,
}

/// Starts exploration jobs from one base snapshot and reports on them.
pub struct StatusService<E> {
    pool: WorkPool,
    base: Snapshot,
    config: ServiceConfig,
    _engine: PhantomData<fn() -> E>,
}

impl<E: BattleEngine + 'static> StatusService<E> {
    /// Create a service that forks every job from `base`.
    pub fn new(base: Snapshot, config: ServiceConfig) -> Self {
        Self {
            pool: WorkPool::new(),
            base,
            config,
            _engine: PhantomData,
        }
    }

    /// Service configuration.
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// The underlying pool.
    pub fn pool_mut(&mut self) -> &mut WorkPool {
        &mut self.pool
    }

    /// Start a new job.
    pub fn start(&mut self) -> Result<WorkSummary, ServiceError> {
        let id = self
            .pool
            .start_new::<E>(self.base.clone(), self.config.explorer.clone())?;
        let status = JobStatus {
            id,
            result_count: 0,
            finished: false,
            error: None,
        };
        Ok(self.summary(&status))
    }

    /// Status of a job, or `None` for an unknown id.
    pub fn status(&mut self, id: JobId) -> Option<WorkSummary> {
        let status = self.pool.status(id)?;
        Some(self.summary(&status))
    }

    /// A page of results, or `None` for an unknown id.
    pub fn results(&mut self, id: JobId, skip: usize, count: usize) -> Option<ResultsPage> {
        let (status, page) = self.pool.results(id, skip, count)?;
        let results = page.to_vec();
        let link = |skip: usize| self.results_link(id, skip, count);

        Some(ResultsPage {
            results,
            result_count: status.result_count,
            finished: status.finished,
            status_link: self.status_link(id),
            self_link: link(skip),
            prev_link: (skip >= count).then(|| link(skip - count)),
            next_link: (skip.saturating_add(count) < status.result_count)
                .then(|| link(skip + count)),
        })
    }

    /// Map a request target such as `/explorer/results/3?skip=10&count=5`
    /// onto the operations above.
    ///
    /// Targets may be absolute URLs or relative to the host. Query values are
    /// percent-decoded and fragments are ignored.
    pub fn route(&mut self, target: &str) -> Response {
        debug!(target, "routing request");
        let Some(url) = parse_target(target) else {
            return Response::NotFound;
        };
        let parts: Vec<&str> = match url.path_segments() {
            Some(segments) => segments.collect(),
            None => return Response::NotFound,
        };

        if parts.len() < 2 || parts[0] != BASE_PATH {
            return Response::NotFound;
        }

        let job = parts.get(2).and_then(|id| id.parse::<JobId>().ok());
        let value = match (parts[1], job) {
            (START_COMMAND, _) => match self.start() {
                Ok(summary) => serde_json::to_value(summary),
                Err(err) => {
                    warn!(error = %err, "could not start job");
                    return Response::NotFound;
                }
            },
            (STATUS_COMMAND, Some(id)) => match self.status(id) {
                Some(summary) => serde_json::to_value(summary),
                None => return Response::NotFound,
            },
            (RESULTS_COMMAND, Some(id)) => {
                let skip = query_param(&url, "skip").unwrap_or(0);
                let count = query_param(&url, "count").unwrap_or(self.config.default_page_size);
                match self.results(id, skip, count) {
                    Some(page) => serde_json::to_value(page),
                    None => return Response::NotFound,
                }
            }
            _ => return Response::NotFound,
        };

        match value {
            Ok(json) => Response::Json(json),
            Err(err) => {
                warn!(error = %err, "could not serialize response");
                Response::NotFound
            }
        }
    }

    fn summary(&self, status: &JobStatus) -> WorkSummary {
        WorkSummary {
            id: status.id,
            result_count: status.result_count,
            finished: status.finished,
            error: status.error.clone(),
            status_link: self.status_link(status.id),
            results_link: format!("{}/{BASE_PATH}/{RESULTS_COMMAND}/{}", self.config.host_prefix, status.id),
        }
    }

    fn status_link(&self, id: JobId) -> String {
        format!("{}/{BASE_PATH}/{STATUS_COMMAND}/{id}", self.config.host_prefix)
    }

    fn results_link(&self, id: JobId, skip: usize, count: usize) -> String {
        format!(
            "{}/{BASE_PATH}/{RESULTS_COMMAND}/{id}?skip={skip}&count={count}",
            self.config.host_prefix
        )
    }
}

/// Resolve a target against a placeholder origin so bare paths parse too.
fn parse_target(target: &str) -> Option<Url> {
    let origin = Url::parse(TARGET_ORIGIN).ok()?;
    match origin.join(target) {
        Ok(url) => Some(url),
        Err(err) => {
            debug!(target, error = %err, "unparseable request target");
            None
        }
    }
}

/// First value for `name`. Unparseable values fall back to the default, like a missing one.
fn query_param(url: &Url, name: &str) -> Option<usize> {
    url.query_pairs()
        .find(|(key, _)| key == name)
        .and_then(|(_, value)| value.parse().ok())
}
