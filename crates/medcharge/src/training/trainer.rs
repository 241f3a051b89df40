//! Gradient boosting loop.

use ndarray::{ArrayView1, ArrayView2};

use super::gain::GainParams;
use super::grower::{GrowerParams, TreeGrower};
use super::logger::{TrainingLogger, Verbosity};
use super::metrics::rmse;
use super::objective::{Objective, SquaredLoss};
use crate::data::N_FEATURES;
use crate::error::{ChargeError, Result};
use crate::repr::Forest;
use crate::utils::{Parallelism, run_with_threads};

// =============================================================================
// GBDTParams
// =============================================================================

/// Boosting parameters.
#[derive(Debug, Clone)]
pub struct GBDTParams {
    /// Number of boosting rounds (one tree per round).
    pub n_trees: u32,
    /// Maximum tree depth (root = 0).
    pub max_depth: u32,
    /// Shrinkage applied to every leaf.
    pub learning_rate: f32,
    /// Regularisation and split constraints.
    pub gain: GainParams,
    /// Thread count: 0 = auto, 1 = sequential.
    pub n_threads: usize,
    pub verbosity: Verbosity,
}

impl Default for GBDTParams {
    fn default() -> Self {
        Self {
            n_trees: 15,
            max_depth: 3,
            learning_rate: 0.3,
            gain: GainParams::default(),
            n_threads: 0,
            verbosity: Verbosity::default(),
        }
    }
}

/// Fitted forest and its fit on the rows it was trained on.
#[derive(Debug, Clone)]
pub struct TrainedForest {
    pub forest: Forest,
    pub training_rmse: f64,
}

// =============================================================================
// GBDTTrainer
// =============================================================================

/// Fits a [`Forest`] by sequentially adding trees to the residual gradients.
#[derive(Debug, Clone)]
pub struct GBDTTrainer<O: Objective = SquaredLoss> {
    objective: O,
    params: GBDTParams,
}

impl GBDTTrainer<SquaredLoss> {
    /// Squared-error trainer.
    pub fn regression(params: GBDTParams) -> Self {
        Self::new(SquaredLoss, params)
    }
}

impl<O: Objective> GBDTTrainer<O> {
    pub fn new(objective: O, params: GBDTParams) -> Self {
        Self { objective, params }
    }

    pub fn params(&self) -> &GBDTParams {
        &self.params
    }

    /// Fit on a `[n_rows, 5]` feature matrix and matching targets.
    ///
    /// # Errors
    ///
    /// [`ChargeError::Training`] if there are no rows, the matrix is not five
    /// columns wide, the lengths differ, or any value is non-finite.
    pub fn train(
        &self,
        features: ArrayView2<'_, f32>,
        targets: ArrayView1<'_, f32>,
    ) -> Result<TrainedForest> {
        validate_inputs(features, targets)?;
        run_with_threads(self.params.n_threads, |parallelism| {
            self.train_inner(features, targets, parallelism)
        })
    }

    fn train_inner(
        &self,
        features: ArrayView2<'_, f32>,
        targets: ArrayView1<'_, f32>,
        parallelism: Parallelism,
    ) -> Result<TrainedForest> {
        let n_rows = features.nrows();
        let n_trees = self.params.n_trees as usize;

        let mut logger = TrainingLogger::new(self.params.verbosity);
        logger.start_training(n_trees, n_rows);
        if n_rows == 1 {
            logger.warn("training on a single row; every estimate will be identical");
        }

        let base_score = self.objective.base_score(targets);
        let mut forest = Forest::new(base_score);
        let mut predictions = vec![base_score; n_rows];
        let mut grads = vec![0.0f32; n_rows];
        let mut hess = vec![0.0f32; n_rows];

        let mut grower = TreeGrower::new(GrowerParams {
            max_depth: self.params.max_depth,
            learning_rate: self.params.learning_rate,
            gain: self.params.gain.clone(),
        });

        let mut row_buf = [0.0f32; N_FEATURES];
        for round in 0..n_trees {
            self.objective
                .compute_gradients(&predictions, targets, &mut grads, &mut hess);
            let tree = grower.grow(features, &grads, &hess, parallelism);

            for (pred, row) in predictions.iter_mut().zip(features.rows()) {
                for (dst, &src) in row_buf.iter_mut().zip(row.iter()) {
                    *dst = src;
                }
                *pred += tree.predict_row(&row_buf);
            }
            forest.push_tree(tree);

            logger.log_round(round, rmse(&predictions, targets));
        }

        if let Err(err) = forest.validate() {
            return Err(ChargeError::Training(format!(
                "fitted forest is invalid: {err:?}"
            )));
        }

        let training_rmse = rmse(&predictions, targets);
        logger.finish_training(forest.n_trees(), training_rmse);
        Ok(TrainedForest {
            forest,
            training_rmse,
        })
    }
}

fn validate_inputs(features: ArrayView2<'_, f32>, targets: ArrayView1<'_, f32>) -> Result<()> {
    if features.nrows() == 0 {
        return Err(ChargeError::Training("training partition is empty".into()));
    }
    if features.ncols() != N_FEATURES {
        return Err(ChargeError::Training(format!(
            "expected {N_FEATURES} predictors, got {}",
            features.ncols()
        )));
    }
    if features.nrows() != targets.len() {
        return Err(ChargeError::Training(format!(
            "{} feature rows but {} targets",
            features.nrows(),
            targets.len()
        )));
    }
    for (row, values) in features.rows().into_iter().enumerate() {
        if values.iter().any(|v| !v.is_finite()) {
            return Err(ChargeError::Training(format!(
                "non-finite predictor in training row {row}"
            )));
        }
    }
    if let Some(row) = targets.iter().position(|v| !v.is_finite()) {
        return Err(ChargeError::Training(format!(
            "non-finite target in training row {row}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::{Array1, Array2};

    fn toy_data(n_rows: usize) -> (Array2<f32>, Array1<f32>) {
        let features = Array2::from_shape_fn((n_rows, N_FEATURES), |(i, j)| match j {
            0 => 18.0 + (i % 47) as f32,
            1 => (i % 2) as f32,
            2 => 20.0 + (i % 15) as f32,
            3 => (i % 4) as f32,
            _ => ((i % 5) == 0) as u8 as f32,
        });
        let targets = Array1::from_shape_fn(n_rows, |i| {
            let row = features.row(i);
            1000.0 + 250.0 * row[0] + 20_000.0 * row[4] + 50.0 * row[2]
        });
        (features, targets)
    }

    fn sequential() -> GBDTParams {
        GBDTParams {
            n_threads: 1,
            ..GBDTParams::default()
        }
    }

    #[test]
    fn builds_requested_number_of_trees() {
        let (x, y) = toy_data(100);
        let trained = GBDTTrainer::regression(sequential())
            .train(x.view(), y.view())
            .unwrap();
        assert_eq!(trained.forest.n_trees(), 15);
        assert!(trained.forest.trees().all(|t| t.depth() <= 3));
    }

    #[test]
    fn boosting_reduces_error_below_baseline() {
        let (x, y) = toy_data(200);
        let trained = GBDTTrainer::regression(sequential())
            .train(x.view(), y.view())
            .unwrap();
        let mean = y.mean().unwrap();
        let baseline = rmse(&vec![mean; y.len()], y.view());
        assert!(trained.training_rmse < baseline * 0.5);
    }

    #[test]
    fn base_score_is_target_mean() {
        let (x, y) = toy_data(50);
        let trained = GBDTTrainer::regression(sequential())
            .train(x.view(), y.view())
            .unwrap();
        assert_relative_eq!(
            trained.forest.base_score(),
            y.mean().unwrap(),
            max_relative = 1e-5
        );
    }

    #[test]
    fn single_row_trains() {
        let x = Array2::from_shape_vec((1, 5), vec![19.0, 0.0, 27.9, 0.0, 1.0]).unwrap();
        let y = Array1::from(vec![16884.924f32]);
        let trained = GBDTTrainer::regression(sequential())
            .train(x.view(), y.view())
            .unwrap();
        let pred = trained.forest.predict_row(&[19.0, 0.0, 27.9, 0.0, 1.0]);
        assert!(pred.is_finite());
        assert_relative_eq!(pred, 16884.924, max_relative = 1e-5);
    }

    #[test]
    fn empty_input_is_a_training_error() {
        let x = Array2::<f32>::zeros((0, N_FEATURES));
        let y = Array1::<f32>::zeros(0);
        assert!(matches!(
            GBDTTrainer::regression(sequential()).train(x.view(), y.view()),
            Err(ChargeError::Training(_))
        ));
    }

    #[test]
    fn wrong_width_is_a_training_error() {
        let x = Array2::<f32>::zeros((3, 4));
        let y = Array1::<f32>::zeros(3);
        assert!(matches!(
            GBDTTrainer::regression(sequential()).train(x.view(), y.view()),
            Err(ChargeError::Training(_))
        ));
    }

    #[test]
    fn non_finite_values_are_training_errors() {
        let (mut x, y) = toy_data(10);
        x[[4, 2]] = f32::NAN;
        assert!(GBDTTrainer::regression(sequential())
            .train(x.view(), y.view())
            .is_err());

        let (x, mut y) = toy_data(10);
        y[3] = f32::INFINITY;
        assert!(GBDTTrainer::regression(sequential())
            .train(x.view(), y.view())
            .is_err());
    }

    #[test]
    fn thread_count_does_not_change_the_model() {
        let (x, y) = toy_data(120);
        let seq = GBDTTrainer::regression(sequential())
            .train(x.view(), y.view())
            .unwrap();
        let par = GBDTTrainer::regression(GBDTParams {
            n_threads: 4,
            ..GBDTParams::default()
        })
        .train(x.view(), y.view())
        .unwrap();
        for row in x.rows() {
            let row = row.to_vec();
            assert_eq!(seq.forest.predict_row(&row), par.forest.predict_row(&row));
        }
    }
}
