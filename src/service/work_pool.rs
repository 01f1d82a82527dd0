//! Job distribution.
//!
//! Every job runs one full exploration on its own OS thread, restoring a
//! private engine from the base snapshot. Results stream back over a
//! channel and are appended to the job's log whenever the pool is queried.
//! A job is finished once its worker hangs up.

use std::fmt;
use std::str::FromStr;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{unbounded, Receiver, TryRecvError};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::core::{ExplorerConfig, ServiceError};
use crate::engine::{BattleEngine, Snapshot};
use crate::runner::{ExplorationResult, ExplorerRunner};

/// Identifier of a job within one pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub u64);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for JobId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(JobId)
    }
}

/// Point-in-time view of a job.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JobStatus {
    pub id: JobId,
    pub result_count: usize,
    pub finished: bool,
    /// Why the worker stopped early, if it failed.
    pub error: Option<String>,
}

enum WorkerMessage {
    Result(Box<ExplorationResult>),
    Failed(String),
}

struct Job {
    results: Vec<ExplorationResult>,
    receiver: Option<Receiver<WorkerMessage>>,
    handle: Option<JoinHandle<()>>,
    error: Option<String>,
}

impl Job {
    fn apply(&mut self, message: WorkerMessage) {
        match message {
            WorkerMessage::Result(result) => self.results.push(*result),
            WorkerMessage::Failed(err) => self.error = Some(err),
        }
    }

    /// Pull everything the worker has sent so far.
    fn drain(&mut self, id: JobId) {
        let mut hung_up = false;
        if let Some(receiver) = &self.receiver {
            let mut pending = Vec::new();
            loop {
                match receiver.try_recv() {
                    Ok(message) => pending.push(message),
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => {
                        hung_up = true;
                        break;
                    }
                }
            }
            for message in pending {
                self.apply(message);
            }
        }
        if hung_up {
            self.finish(id);
        }
    }

    /// Block until the worker hangs up.
    fn wait(&mut self, id: JobId) {
        if let Some(receiver) = self.receiver.take() {
            for message in receiver.iter() {
                self.apply(message);
            }
            self.finish(id);
        }
    }

    fn finish(&mut self, id: JobId) {
        self.receiver = None;
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                self.error.get_or_insert_with(|| "worker panicked".to_string());
            }
        }
        debug!(job = %id, results = self.results.len(), "job finished");
    }

    fn status(&self, id: JobId) -> JobStatus {
        JobStatus {
            id,
            result_count: self.results.len(),
            finished: self.receiver.is_none(),
            error: self.error.clone(),
        }
    }
}

/// Runs explorations in the background and keeps their results.
#[derive(Default)]
pub struct WorkPool {
    jobs: FxHashMap<JobId, Job>,
    next_id: u64,
}

impl WorkPool {
    /// Create an empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start exploring from `base` on a new worker thread.
    pub fn start_new<E>(
        &mut self,
        base: Snapshot,
        config: ExplorerConfig,
    ) -> Result<JobId, ServiceError>
    where
        E: BattleEngine + 'static,
    {
        let id = JobId(self.next_id);
        let (tx, rx) = unbounded();
        let runner = ExplorerRunner::<E>::new(base, config);

        let handle = thread::Builder::new()
            .name(format!("explorer-job-{id}"))
            .spawn(move || {
                let outcome = runner.run(|result| {
                    // a dropped pool just stops collecting
                    let _ = tx.send(WorkerMessage::Result(Box::new(result)));
                });
                match outcome {
                    Ok(summary) => {
                        debug!(job = %id, explored = summary.explored, "worker done");
                    }
                    Err(err) => {
                        error!(job = %id, error = %err, "exploration job failed");
                        let _ = tx.send(WorkerMessage::Failed(err.to_string()));
                    }
                }
            })?;

        self.next_id += 1;
        self.jobs.insert(
            id,
            Job {
                results: Vec::new(),
                receiver: Some(rx),
                handle: Some(handle),
                error: None,
            },
        );
        info!(job = %id, "started exploration job");
        Ok(id)
    }

    /// Current status of a job.
    pub fn status(&mut self, id: JobId) -> Option<JobStatus> {
        let job = self.jobs.get_mut(&id)?;
        job.drain(id);
        Some(job.status(id))
    }

    /// Up to `count` results starting at `skip`.
    ///
    /// Returns the page along with the job's status at the time of the read.
    pub fn results(
        &mut self,
        id: JobId,
        skip: usize,
        count: usize,
    ) -> Option<(JobStatus, &[ExplorationResult])> {
        let job = self.jobs.get_mut(&id)?;
        job.drain(id);
        let start = skip.min(job.results.len());
        let end = skip.saturating_add(count).min(job.results.len());
        Some((job.status(id), &job.results[start..end]))
    }

    /// Block until a job's worker finishes.
    pub fn wait(&mut self, id: JobId) -> Option<JobStatus> {
        let job = self.jobs.get_mut(&id)?;
        job.wait(id);
        Some(job.status(id))
    }

    /// Ids of every job started so far, oldest first.
    pub fn job_ids(&self) -> Vec<JobId> {
        let mut ids: Vec<_> = self.jobs.keys().copied().collect();
        ids.sort();
        ids
    }

    /// Number of jobs started.
    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    /// Whether no job has been started.
    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}
