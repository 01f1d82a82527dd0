//! Exploration and service configuration.

use serde::{Deserialize, Serialize};

/// Configuration for exhaustive exploration runs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplorerConfig {
    /// Number of rounds to explore from the start of the encounter.
    /// Paths are cut off (reported as not ended) past this depth.
    pub depth: usize,

    /// Whether the oracle may fabricate rolls past the recorded ones.
    /// Disable to require seed paths to be self-contained.
    pub allow_new_rolls: bool,

    /// Collapse `[0, 15]` range rolls to the representative values 0, 7, 15.
    pub collapse_damage_rolls: bool,

    /// Stop a run after this many results (`None` = until exhausted).
    pub max_results: Option<usize>,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            depth: 1,
            allow_new_rolls: true,
            collapse_damage_rolls: true,
            max_results: None,
        }
    }
}

impl ExplorerConfig {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the exploration depth in rounds.
    pub fn with_depth(mut self, depth: usize) -> Self {
        self.depth = depth;
        self
    }

    /// Allow or forbid fabricating new rolls.
    pub fn with_new_rolls(mut self, allow: bool) -> Self {
        self.allow_new_rolls = allow;
        self
    }

    /// Enable or disable the damage roll collapse.
    pub fn with_damage_collapse(mut self, collapse: bool) -> Self {
        self.collapse_damage_rolls = collapse;
        self
    }

    /// Cap the number of results of a run.
    pub fn with_max_results(mut self, max: usize) -> Self {
        self.max_results = Some(max);
        self
    }

    /// Rounds to generate beyond a seed path of `seed_len` rounds.
    pub fn rounds_to_generate(&self, seed_len: usize) -> usize {
        self.depth.saturating_sub(seed_len)
    }
}

/// Configuration for the job status surface.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Scheme and authority prefixed to every link, e.g. `http://localhost:8080`.
    pub host_prefix: String,

    /// Page size used when a results query has no usable `count`.
    pub default_page_size: usize,

    /// Exploration settings handed to every new job.
    pub explorer: ExplorerConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host_prefix: "http://localhost:8080".to_string(),
            default_page_size: 10,
            explorer: ExplorerConfig::default(),
        }
    }
}

impl ServiceConfig {
    /// Set the link prefix.
    pub fn with_host_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.host_prefix = prefix.into();
        self
    }

    /// Set the default results page size.
    pub fn with_default_page_size(mut self, size: usize) -> Self {
        self.default_page_size = size;
        self
    }

    /// Set the exploration settings for new jobs.
    pub fn with_explorer(mut self, explorer: ExplorerConfig) -> Self {
        self.explorer = explorer;
        self
    }
}
