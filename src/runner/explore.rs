//! Explore → next → explore loop over one starting snapshot.

use std::marker::PhantomData;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::core::{EngineError, ExplorerConfig, ExplorerError};
use crate::driver::Explorer;
use crate::engine::{BattleEngine, Snapshot};
use crate::record::Path;
use crate::search::Enumerator;

/// One explored leaf.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExplorationResult {
    /// The full path that was played.
    pub path: Path,

    /// Engine state where the exploration stopped.
    pub snapshot: Snapshot,

    /// Whether the encounter reached a terminal state.
    pub ended: bool,

    /// Narration produced while playing the path.
    pub narration: Vec<String>,

    /// Commands the engine rejected as unavailable along the way.
    /// A non-zero count means the leaf may not be what the path describes.
    pub rejected_choices: usize,
}

impl ExplorationResult {
    /// Probability of the path's random draws.
    pub fn probability(&self) -> f64 {
        self.path.probability()
    }
}

/// Totals for one run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Paths explored.
    pub explored: usize,

    /// Paths that reached a terminal state.
    pub ended: usize,

    /// Whether the enumerator ran out of paths (as opposed to the run
    /// stopping at `max_results`).
    pub exhausted: bool,
}

/// Explores every path from a base snapshot.
///
/// Each exploration restores its own engine, so the runner itself holds no
/// engine state.
pub struct ExplorerRunner<E> {
    base: Snapshot,
    config: ExplorerConfig,
    enumerator: Enumerator,
    _engine: PhantomData<fn() -> E>,
}

impl<E: BattleEngine> ExplorerRunner<E> {
    /// Create a runner over a base snapshot.
    pub fn new(base: Snapshot, config: ExplorerConfig) -> Self {
        Self {
            enumerator: Enumerator::from_config(&config),
            base,
            config,
            _engine: PhantomData,
        }
    }

    /// Create a runner starting from an engine's current state.
    pub fn from_engine(engine: &E, config: ExplorerConfig) -> Result<Self, EngineError> {
        Ok(Self::new(engine.snapshot()?, config))
    }

    /// The base snapshot every exploration starts from.
    pub fn base(&self) -> &Snapshot {
        &self.base
    }

    /// Runner configuration.
    pub fn config(&self) -> &ExplorerConfig {
        &self.config
    }

    /// Play one seed path to completion.
    pub fn explore(&self, seed: Path) -> Result<ExplorationResult, ExplorerError> {
        let engine = E::restore(&self.base)?;
        let rounds = self.config.rounds_to_generate(seed.len());
        debug!(seed = %seed, rounds, "exploring");

        let mut explorer =
            Explorer::new(engine, seed, rounds).with_new_rolls(self.config.allow_new_rolls);
        let outcome = explorer.resume()?;
        let parts = explorer.into_parts();

        Ok(ExplorationResult {
            snapshot: parts.engine.snapshot()?,
            path: parts.path,
            ended: outcome.is_ended(),
            narration: parts.narration,
            rejected_choices: parts.rejected_choices,
        })
    }

    /// Explore every path, handing each result to `on_result` as it is
    /// found.
    pub fn run(
        &self,
        mut on_result: impl FnMut(ExplorationResult),
    ) -> Result<RunSummary, ExplorerError> {
        let mut summary = RunSummary::default();
        let mut next = Some(Path::new());

        while let Some(seed) = next {
            if self.config.max_results.is_some_and(|max| summary.explored >= max) {
                info!(explored = summary.explored, "result limit reached");
                return Ok(summary);
            }

            let result = self.explore(seed)?;
            next = self.enumerator.next(&result.path);

            summary.explored += 1;
            if result.ended {
                summary.ended += 1;
            }
            on_result(result);
        }

        summary.exhausted = true;
        info!(explored = summary.explored, ended = summary.ended, "exploration exhausted");
        Ok(summary)
    }

    /// Explore every path and collect the results.
    pub fn run_collect(&self) -> Result<Vec<ExplorationResult>, ExplorerError> {
        let mut results = Vec::new();
        self.run(|result| results.push(result))?;
        Ok(results)
    }

    /// Replay a result's path without fabricating rolls and check the
    /// narration matches line for line.
    pub fn verify_replay(&self, result: &ExplorationResult) -> Result<(), ExplorerError> {
        let engine = E::restore(&self.base)?;
        let mut explorer = Explorer::new(engine, result.path.clone(), 0).with_new_rolls(false);
        explorer.resume()?;

        let replayed = explorer.narration();
        let lines = result.narration.len().max(replayed.len());
        for line in 0..lines {
            let expected = result.narration.get(line);
            let actual = replayed.get(line);
            if expected != actual {
                return Err(ExplorerError::NarrationDiverged {
                    line,
                    expected: expected.cloned(),
                    actual: actual.cloned(),
                });
            }
        }
        Ok(())
    }
}
