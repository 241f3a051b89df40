//! Training progress reporting through `tracing`.

use std::time::Instant;

use serde::{Deserialize, Serialize};

/// How much the trainer reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verbosity {
    #[default]
    Silent,
    Warning,
    Info,
    Debug,
}

/// Emits start, per-round and end events at the configured verbosity.
#[derive(Debug)]
pub struct TrainingLogger {
    verbosity: Verbosity,
    started: Option<Instant>,
}

impl TrainingLogger {
    pub fn new(verbosity: Verbosity) -> Self {
        Self {
            verbosity,
            started: None,
        }
    }

    pub fn start_training(&mut self, n_trees: usize, n_rows: usize) {
        self.started = Some(Instant::now());
        if self.verbosity >= Verbosity::Info {
            tracing::info!(n_trees, n_rows, "training started");
        }
    }

    pub fn log_round(&self, round: usize, train_rmse: f64) {
        if self.verbosity >= Verbosity::Debug {
            tracing::debug!(round, train_rmse, "boosting round");
        }
    }

    pub fn warn(&self, message: &str) {
        if self.verbosity >= Verbosity::Warning {
            tracing::warn!("{message}");
        }
    }

    pub fn finish_training(&self, n_trees: usize, train_rmse: f64) {
        if self.verbosity >= Verbosity::Info {
            let elapsed_ms = self.started.map_or(0, |t| t.elapsed().as_millis() as u64);
            tracing::info!(n_trees, train_rmse, elapsed_ms, "training finished");
        }
    }
}
