//! medcharge: medical insurance charge estimation.
//!
//! Loads a tabular insurance dataset, fits a small gradient-boosted tree
//! ensemble on a seeded 80/20 partition, and estimates the annual charge for
//! a single applicant profile. Loaded datasets and trained models are
//! memoized so repeated estimates reuse them.
//!
//! # Key Types
//!
//! - [`Dataset`] - encoded predictors and targets
//! - [`ChargeModel`] / [`ChargeModelConfig`] - trained model and its configuration
//! - [`PredictionRequest`] - one applicant profile
//! - [`Pipeline`] - cached load / train / estimate
//!
//! # Estimating
//!
//! ```no_run
//! use medcharge::{PredictionRequest, Sex, Smoker, pipeline};
//!
//! let request = PredictionRequest::from_categories(30, Sex::Male, 30.0, 0, Smoker::No);
//! let estimate = pipeline::global().estimate("Medical_insurance.csv", &request)?;
//! println!("{}", medcharge::inference::format_estimate(estimate));
//! # Ok::<(), medcharge::ChargeError>(())
//! ```

pub mod cache;
pub mod data;
pub mod error;
pub mod inference;
pub mod model;
pub mod pipeline;
pub mod repr;
pub mod testing;
pub mod training;
pub mod utils;

// =============================================================================
// Convenience Re-exports
// =============================================================================

pub use error::{ChargeError, Result};

pub use data::{Dataset, DatasetId, DatasetSource, FileSource, Sex, Smoker};

pub use model::{ChargeModel, ChargeModelConfig, ConfigError, PipelineConfig};

pub use inference::PredictionRequest;

pub use pipeline::Pipeline;

pub use utils::{Parallelism, run_with_threads};
