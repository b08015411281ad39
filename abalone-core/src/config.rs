//! Engine configuration

use crate::eval::{Heuristics, DEFAULT_LOSS_THRESHOLD};
use crate::zobrist::DEFAULT_ZOBRIST_SEED;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Search and evaluation settings for an [`Engine`](crate::search::Engine)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Deepest iteration to search
    pub max_depth: u32,
    /// Wall-clock budget per move in milliseconds (None = unlimited)
    pub time_limit_ms: Option<u64>,
    /// Transposition table size
    pub tt_size_mb: usize,
    /// Root moves searched in parallel (None = one per rayon thread)
    pub root_tasks: Option<usize>,
    /// Evaluation weights
    pub heuristics: Heuristics,
    /// Lost marbles that end the game
    pub loss_threshold: u8,
    /// Seed for the Zobrist key table
    pub zobrist_seed: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_depth: 4,
            time_limit_ms: Some(5000),
            tt_size_mb: 64,
            root_tasks: None,
            heuristics: Heuristics::default(),
            loss_threshold: DEFAULT_LOSS_THRESHOLD,
            zobrist_seed: DEFAULT_ZOBRIST_SEED,
        }
    }
}

impl EngineConfig {
    /// Fixed-depth search with no clock
    pub fn fixed_depth(max_depth: u32) -> Self {
        Self {
            max_depth,
            time_limit_ms: None,
            ..Default::default()
        }
    }

    /// Read a JSON config file; missing fields take their defaults
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("Failed to parse config {}", path.display()))
    }

    pub fn time_limit(&self) -> Option<Duration> {
        self.time_limit_ms.map(Duration::from_millis)
    }

    /// Root task count, falling back to the rayon pool size
    pub fn root_task_count(&self) -> usize {
        self.root_tasks
            .unwrap_or_else(rayon::current_num_threads)
            .max(1)
    }

    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_time_limit_ms(mut self, time_limit_ms: Option<u64>) -> Self {
        self.time_limit_ms = time_limit_ms;
        self
    }

    pub fn with_tt_size_mb(mut self, tt_size_mb: usize) -> Self {
        self.tt_size_mb = tt_size_mb;
        self
    }

    pub fn with_root_tasks(mut self, root_tasks: usize) -> Self {
        self.root_tasks = Some(root_tasks);
        self
    }

    /// Set custom heuristics
    pub fn with_heuristics(mut self, heuristics: Heuristics) -> Self {
        self.heuristics = heuristics;
        self
    }

    pub fn with_loss_threshold(mut self, loss_threshold: u8) -> Self {
        self.loss_threshold = loss_threshold;
        self
    }

    pub fn with_zobrist_seed(mut self, seed: u64) -> Self {
        self.zobrist_seed = seed;
        self
    }
}
