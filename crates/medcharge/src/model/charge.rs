//! The trained charge estimator.

use std::time::Instant;

use super::config::ChargeModelConfig;
use crate::data::{Dataset, DatasetId, split_indices};
use crate::error::Result;
use crate::inference::PredictionRequest;
use crate::repr::Forest;
use crate::training::{GBDTTrainer, metrics::rmse};

/// Boosted regression model mapping a profile to an annual charge.
///
/// Immutable after training; share it behind an `Arc`.
#[derive(Debug, Clone)]
pub struct ChargeModel {
    forest: Forest,
    config: ChargeModelConfig,
    trained_on: DatasetId,
    n_train_rows: usize,
    n_test_rows: usize,
    training_rmse: f64,
    holdout_rmse: Option<f64>,
}

impl ChargeModel {
    /// Partition `dataset` and fit on the training share.
    ///
    /// The held-out share is only scored for reporting.
    ///
    /// # Errors
    ///
    /// [`ChargeError::Training`](crate::ChargeError::Training) when the
    /// training share is empty or contains non-finite values.
    pub fn train(dataset: &Dataset, config: &ChargeModelConfig) -> Result<Self> {
        let start = Instant::now();
        let partition = split_indices(dataset.n_rows(), config.test_fraction, config.seed);
        let train = dataset.select(&partition.train);

        let trainer = GBDTTrainer::regression(config.to_gbdt_params());
        let trained = trainer.train(train.features(), train.targets())?;

        let holdout_rmse = (!partition.test.is_empty()).then(|| {
            let test = dataset.select(&partition.test);
            let predictions: Vec<f32> = test
                .features()
                .rows()
                .into_iter()
                .map(|row| trained.forest.predict_row(&row.to_vec()))
                .collect();
            rmse(&predictions, test.targets())
        });

        tracing::info!(
            dataset = %dataset.id(),
            n_train = partition.train.len(),
            n_test = partition.test.len(),
            n_trees = trained.forest.n_trees(),
            training_rmse = trained.training_rmse,
            ?holdout_rmse,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "trained charge model"
        );

        Ok(Self {
            forest: trained.forest,
            config: config.clone(),
            trained_on: dataset.id(),
            n_train_rows: partition.train.len(),
            n_test_rows: partition.test.len(),
            training_rmse: trained.training_rmse,
            holdout_rmse,
        })
    }

    /// Estimated annual charge for `request`.
    ///
    /// # Errors
    ///
    /// [`ChargeError::InvalidInput`](crate::ChargeError::InvalidInput) if any
    /// field is outside its domain.
    pub fn predict(&self, request: &PredictionRequest) -> Result<f32> {
        request.validate()?;
        Ok(self.forest.predict_row(&request.to_features()))
    }

    #[inline]
    pub fn n_trees(&self) -> usize {
        self.forest.n_trees()
    }

    #[inline]
    pub fn forest(&self) -> &Forest {
        &self.forest
    }

    #[inline]
    pub fn config(&self) -> &ChargeModelConfig {
        &self.config
    }

    /// Identity of the dataset this model was fitted from.
    #[inline]
    pub fn trained_on(&self) -> DatasetId {
        self.trained_on
    }

    #[inline]
    pub fn n_train_rows(&self) -> usize {
        self.n_train_rows
    }

    #[inline]
    pub fn n_test_rows(&self) -> usize {
        self.n_test_rows
    }

    /// RMSE on the training share.
    #[inline]
    pub fn training_rmse(&self) -> f64 {
        self.training_rmse
    }

    /// RMSE on the held-out share, `None` when nothing was held out.
    #[inline]
    pub fn holdout_rmse(&self) -> Option<f64> {
        self.holdout_rmse
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ChargeError;
    use crate::data::schema::{Record, Sex, Smoker};
    use crate::testing::synthetic_records;
    use approx::assert_relative_eq;

    fn single_row() -> Dataset {
        Dataset::from_records(&[Record {
            age: 19,
            sex: Sex::Female,
            bmi: 27.9,
            children: 0,
            smoker: Smoker::Yes,
            region: "southwest".into(),
            charges: 16884.924,
        }])
    }

    fn sequential() -> ChargeModelConfig {
        ChargeModelConfig::builder().n_threads(1).build().unwrap()
    }

    #[test]
    fn single_row_dataset_trains_and_predicts() {
        let model = ChargeModel::train(&single_row(), &sequential()).unwrap();
        assert_eq!(model.n_train_rows(), 1);
        assert_eq!(model.n_test_rows(), 0);
        assert!(model.holdout_rmse().is_none());
        let estimate = model
            .predict(&PredictionRequest::new(19, 0, 27.9, 0, 1))
            .unwrap();
        assert!(estimate.is_finite());
        assert_relative_eq!(estimate, 16884.924, max_relative = 1e-5);
    }

    #[test]
    fn empty_dataset_is_a_training_error() {
        let ds = Dataset::from_records(&[]);
        assert!(matches!(
            ChargeModel::train(&ds, &sequential()),
            Err(ChargeError::Training(_))
        ));
    }

    #[test]
    fn holds_out_twenty_percent() {
        let ds = Dataset::from_records(&synthetic_records(100, 7));
        let model = ChargeModel::train(&ds, &sequential()).unwrap();
        assert_eq!(model.n_test_rows(), 20);
        assert_eq!(model.n_train_rows(), 80);
        assert_eq!(model.n_trees(), 15);
        assert_eq!(model.trained_on(), ds.id());
        assert!(model.holdout_rmse().is_some());
    }

    #[test]
    fn training_is_deterministic() {
        let ds = Dataset::from_records(&synthetic_records(200, 3));
        let a = ChargeModel::train(&ds, &sequential()).unwrap();
        let b = ChargeModel::train(&ds, &sequential()).unwrap();
        let req = PredictionRequest::new(40, 1, 31.0, 2, 0);
        assert_eq!(a.predict(&req).unwrap(), b.predict(&req).unwrap());
        assert_eq!(a.training_rmse(), b.training_rmse());
    }

    #[test]
    fn predict_rejects_out_of_domain_request() {
        let model = ChargeModel::train(&single_row(), &sequential()).unwrap();
        assert!(matches!(
            model.predict(&PredictionRequest::new(81, 0, 27.9, 0, 1)),
            Err(ChargeError::InvalidInput { field: "age", .. })
        ));
    }

    #[test]
    fn smokers_cost_more_on_synthetic_data() {
        let ds = Dataset::from_records(&synthetic_records(400, 11));
        let model = ChargeModel::train(&ds, &sequential()).unwrap();
        let smoker = model
            .predict(&PredictionRequest::new(45, 1, 30.0, 1, 1))
            .unwrap();
        let non_smoker = model
            .predict(&PredictionRequest::new(45, 1, 30.0, 1, 0))
            .unwrap();
        assert!(smoker > non_smoker);
    }
}
