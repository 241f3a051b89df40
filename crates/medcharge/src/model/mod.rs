//! The charge model and its configuration.
//!
//! - [`ChargeModel`]: trained estimator, immutable after fitting
//! - [`ChargeModelConfig`]: training configuration (validated `bon` builder)
//! - [`PipelineConfig`]: dataset location plus model configuration

mod charge;
mod config;

pub use charge::ChargeModel;
pub use config::{
    ChargeModelConfig, ChargeModelConfigBuilder, ConfigError, DEFAULT_DATASET_LOCATION,
    PipelineConfig, PipelineConfigBuilder,
};
