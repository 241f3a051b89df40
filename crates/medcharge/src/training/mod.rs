//! Gradient-boosted regression training.
//!
//! - [`GBDTTrainer`], [`GBDTParams`]: the boosting loop
//! - [`TreeGrower`]: depth-wise exact greedy tree growth
//! - [`GainParams`]: split gain and leaf weight formulas
//! - [`SquaredLoss`]: the squared-error objective
//! - [`TrainingLogger`], [`Verbosity`]: progress reporting

mod gain;
mod grower;
mod logger;
pub mod metrics;
mod objective;
mod trainer;

pub use gain::GainParams;
pub use grower::{GrowerParams, SplitInfo, TreeGrower};
pub use logger::{TrainingLogger, Verbosity};
pub use objective::{Objective, SquaredLoss};
pub use trainer::{GBDTParams, GBDTTrainer, TrainedForest};
