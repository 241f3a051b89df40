//! Model and pipeline configuration with validating builders.
//!
//! ```
//! use medcharge::model::ChargeModelConfig;
//!
//! // The fixed policy: 15 trees, depth 3, gamma 0, 80/20 split, seed 42.
//! let config = ChargeModelConfig::builder().build().unwrap();
//! assert_eq!(config.n_trees, 15);
//!
//! let config = ChargeModelConfig::builder()
//!     .n_trees(50)
//!     .learning_rate(0.1)
//!     .build()
//!     .unwrap();
//! ```

use bon::Builder;

use crate::data::split::{DEFAULT_SEED, DEFAULT_TEST_FRACTION};
use crate::training::{GBDTParams, GainParams, Verbosity};

/// Dataset file name looked up when no location is given.
pub const DEFAULT_DATASET_LOCATION: &str = "Medical_insurance.csv";

// =============================================================================
// ConfigError
// =============================================================================

/// Errors that can occur during configuration validation.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Number of trees must be at least 1.
    InvalidNTrees,
    /// Maximum depth must be at least 1.
    InvalidMaxDepth,
    /// Learning rate must be positive and finite.
    InvalidLearningRate(f32),
    /// Regularisation parameters must be non-negative and finite.
    InvalidRegularization { field: &'static str, value: f32 },
    /// Held-out fraction must lie in [0, 1).
    InvalidTestFraction(f64),
    /// Dataset location must not be empty.
    EmptyDatasetLocation,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidNTrees => write!(f, "n_trees must be at least 1"),
            Self::InvalidMaxDepth => write!(f, "max_depth must be at least 1"),
            Self::InvalidLearningRate(v) => {
                write!(f, "learning_rate must be positive, got {}", v)
            }
            Self::InvalidRegularization { field, value } => {
                write!(f, "{} must be non-negative, got {}", field, value)
            }
            Self::InvalidTestFraction(v) => {
                write!(f, "test_fraction must be in [0, 1), got {}", v)
            }
            Self::EmptyDatasetLocation => write!(f, "dataset location must not be empty"),
        }
    }
}

impl std::error::Error for ConfigError {}

// =============================================================================
// ChargeModelConfig
// =============================================================================

/// Training configuration for the charge model.
///
/// Defaults reproduce the fixed training policy; everything else follows
/// common squared-error boosting defaults.
#[derive(Debug, Clone, PartialEq, Builder)]
#[builder(
    derive(Clone, Debug),
    finish_fn(vis = "", name = __build_internal)
)]
pub struct ChargeModelConfig {
    // === Boosting ===
    /// Number of trees. Default: 15.
    #[builder(default = 15)]
    pub n_trees: u32,

    /// Maximum tree depth. Default: 3.
    #[builder(default = 3)]
    pub max_depth: u32,

    /// Learning rate (shrinkage). Default: 0.3.
    #[builder(default = 0.3)]
    pub learning_rate: f32,

    // === Regularization ===
    /// Minimum split gain (gamma). Default: 0.0.
    #[builder(default = 0.0)]
    pub min_gain: f32,

    /// L2 regularisation on leaf weights. Default: 1.0.
    #[builder(default = 1.0)]
    pub lambda: f32,

    /// Minimum hessian sum per child. Default: 1.0.
    #[builder(default = 1.0)]
    pub min_child_weight: f32,

    // === Partitioning ===
    /// Share of rows held out from training. Default: 0.2.
    #[builder(default = DEFAULT_TEST_FRACTION)]
    pub test_fraction: f64,

    /// Partition seed. Default: 42.
    #[builder(default = DEFAULT_SEED)]
    pub seed: u64,

    // === Resources ===
    /// Thread count: 0 = auto, 1 = sequential. Default: 0.
    #[builder(default = 0)]
    pub n_threads: usize,

    /// Verbosity level. Default: `Silent`.
    #[builder(default)]
    pub verbosity: Verbosity,
}

impl<S: charge_model_config_builder::IsComplete> ChargeModelConfigBuilder<S> {
    /// Build and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if any parameter is out of range.
    pub fn build(self) -> Result<ChargeModelConfig, ConfigError> {
        let config = self.__build_internal();
        config.validate()?;
        Ok(config)
    }
}

impl Default for ChargeModelConfig {
    fn default() -> Self {
        Self::builder().__build_internal()
    }
}

impl ChargeModelConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.n_trees == 0 {
            return Err(ConfigError::InvalidNTrees);
        }
        if self.max_depth == 0 {
            return Err(ConfigError::InvalidMaxDepth);
        }
        if !(self.learning_rate > 0.0 && self.learning_rate.is_finite()) {
            return Err(ConfigError::InvalidLearningRate(self.learning_rate));
        }
        for (field, value) in [
            ("min_gain", self.min_gain),
            ("lambda", self.lambda),
            ("min_child_weight", self.min_child_weight),
        ] {
            if !(value >= 0.0 && value.is_finite()) {
                return Err(ConfigError::InvalidRegularization { field, value });
            }
        }
        if !(0.0..1.0).contains(&self.test_fraction) {
            return Err(ConfigError::InvalidTestFraction(self.test_fraction));
        }
        Ok(())
    }

    /// Boosting parameters for the trainer.
    pub fn to_gbdt_params(&self) -> GBDTParams {
        GBDTParams {
            n_trees: self.n_trees,
            max_depth: self.max_depth,
            learning_rate: self.learning_rate,
            gain: GainParams {
                reg_lambda: self.lambda,
                min_gain: self.min_gain,
                min_child_weight: self.min_child_weight,
            },
            n_threads: self.n_threads,
            verbosity: self.verbosity,
        }
    }
}

// =============================================================================
// PipelineConfig
// =============================================================================

/// Where the pipeline reads its dataset and how it trains on it.
#[derive(Debug, Clone, PartialEq, Builder)]
#[builder(
    derive(Clone, Debug),
    finish_fn(vis = "", name = __build_internal)
)]
pub struct PipelineConfig {
    /// Dataset location. Default: `Medical_insurance.csv`.
    #[builder(into, default = DEFAULT_DATASET_LOCATION.to_string())]
    pub dataset_location: String,

    /// Model training configuration.
    #[builder(default)]
    pub model: ChargeModelConfig,
}

impl<S: pipeline_config_builder::IsComplete> PipelineConfigBuilder<S> {
    /// Build and validate the configuration.
    pub fn build(self) -> Result<PipelineConfig, ConfigError> {
        let config = self.__build_internal();
        config.validate()?;
        Ok(config)
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::builder().__build_internal()
    }
}

impl PipelineConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.dataset_location.trim().is_empty() {
            return Err(ConfigError::EmptyDatasetLocation);
        }
        self.model.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn defaults_match_training_policy() {
        let config = ChargeModelConfig::builder().build().unwrap();
        assert_eq!(config.n_trees, 15);
        assert_eq!(config.max_depth, 3);
        assert_eq!(config.min_gain, 0.0);
        assert_eq!(config.test_fraction, 0.2);
        assert_eq!(config.seed, 42);
        assert_eq!(config.verbosity, Verbosity::Silent);
        assert_eq!(config, ChargeModelConfig::default());
    }

    #[test]
    fn gbdt_params_carry_regularization() {
        let config = ChargeModelConfig::builder()
            .lambda(2.0)
            .min_gain(0.5)
            .build()
            .unwrap();
        let params = config.to_gbdt_params();
        assert_eq!(params.n_trees, 15);
        assert_eq!(params.gain.reg_lambda, 2.0);
        assert_eq!(params.gain.min_gain, 0.5);
    }

    #[test]
    fn zero_trees_rejected() {
        let err = ChargeModelConfig::builder().n_trees(0).build().unwrap_err();
        assert_eq!(err, ConfigError::InvalidNTrees);
    }

    #[test]
    fn zero_depth_rejected() {
        let err = ChargeModelConfig::builder().max_depth(0).build().unwrap_err();
        assert_eq!(err, ConfigError::InvalidMaxDepth);
    }

    #[rstest]
    #[case(0.0)]
    #[case(-0.1)]
    #[case(f32::NAN)]
    fn bad_learning_rate_rejected(#[case] lr: f32) {
        let result = ChargeModelConfig::builder().learning_rate(lr).build();
        assert!(matches!(result, Err(ConfigError::InvalidLearningRate(_))));
    }

    #[test]
    fn negative_lambda_rejected() {
        let err = ChargeModelConfig::builder().lambda(-1.0).build().unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidRegularization {
                field: "lambda",
                value: -1.0
            }
        );
    }

    #[rstest]
    #[case(1.0)]
    #[case(-0.2)]
    #[case(1.5)]
    fn bad_test_fraction_rejected(#[case] fraction: f64) {
        let result = ChargeModelConfig::builder().test_fraction(fraction).build();
        assert!(matches!(result, Err(ConfigError::InvalidTestFraction(_))));
    }

    #[test]
    fn pipeline_defaults() {
        let config = PipelineConfig::builder().build().unwrap();
        assert_eq!(config.dataset_location, "Medical_insurance.csv");
        assert_eq!(config.model, ChargeModelConfig::default());
    }

    #[test]
    fn pipeline_rejects_blank_location() {
        let err = PipelineConfig::builder()
            .dataset_location("  ")
            .build()
            .unwrap_err();
        assert_eq!(err, ConfigError::EmptyDatasetLocation);
    }

    #[test]
    fn config_error_messages() {
        assert_eq!(
            ConfigError::InvalidTestFraction(1.0).to_string(),
            "test_fraction must be in [0, 1), got 1"
        );
    }
}
