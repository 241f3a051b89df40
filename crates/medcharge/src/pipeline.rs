//! Load, train and estimate with memoized intermediate results.
//!
//! A [`Pipeline`] caches loaded datasets by location and trained models by
//! dataset identity, so repeated requests reuse both. The most recently
//! trained model is kept as the current model that [`Pipeline::predict`]
//! serves.
//!
//! [`Pipeline::invalidate`] starts a new generation. Loads and trainings
//! still running from an earlier generation return their result to their own
//! caller but neither keep it cached nor publish it as the current model.
//!
//! ```no_run
//! use medcharge::inference::PredictionRequest;
//! use medcharge::pipeline;
//!
//! let dataset = pipeline::load_dataset("Medical_insurance.csv")?;
//! let model = pipeline::train_model(&dataset)?;
//! let request = PredictionRequest::new(30, 1, 30.0, 0, 0);
//! let estimate = pipeline::predict(Some(&model), &request)?;
//! println!("{estimate:.2}");
//! # Ok::<(), medcharge::ChargeError>(())
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, LazyLock, PoisonError, RwLock};

use crate::cache::Memo;
use crate::data::{self, Dataset, DatasetId, DatasetSource, FileSource};
use crate::error::Result;
use crate::inference::{self, PredictionRequest};
use crate::model::{ChargeModel, PipelineConfig};

// =============================================================================
// Pipeline
// =============================================================================

/// Dataset source, caches and the current model.
#[derive(Debug)]
pub struct Pipeline<S> {
    source: S,
    config: PipelineConfig,
    datasets: Memo<String, Dataset>,
    models: Memo<DatasetId, ChargeModel>,
    current: RwLock<Option<Arc<ChargeModel>>>,
    generation: AtomicU64,
}

impl<S: DatasetSource> Pipeline<S> {
    pub fn new(source: S, config: PipelineConfig) -> Self {
        Self {
            source,
            config,
            datasets: Memo::new("datasets"),
            models: Memo::new("models"),
            current: RwLock::new(None),
            generation: AtomicU64::new(0),
        }
    }

    /// Pipeline over `source` with default configuration.
    pub fn with_source(source: S) -> Self {
        Self::new(source, PipelineConfig::default())
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Dataset at `location`, read from the source at most once until
    /// invalidated.
    pub fn load_dataset(&self, location: &str) -> Result<Arc<Dataset>> {
        let generation = self.generation();
        let key = location.to_string();
        let dataset = self
            .datasets
            .get_or_try_init(key.clone(), || data::load_dataset(&self.source, location))?;
        if self.generation() != generation {
            self.datasets.invalidate(&key);
        }
        Ok(dataset)
    }

    /// Dataset at the configured default location.
    pub fn load_default_dataset(&self) -> Result<Arc<Dataset>> {
        self.load_dataset(&self.config.dataset_location)
    }

    /// Model for `dataset`, trained at most once per dataset until
    /// invalidated. The result becomes the current model.
    pub fn train_model(&self, dataset: &Dataset) -> Result<Arc<ChargeModel>> {
        let generation = self.generation();
        let model = self
            .models
            .get_or_try_init(dataset.id(), || ChargeModel::train(dataset, &self.config.model))?;
        if !self.publish(&model, generation) {
            self.models.invalidate(&dataset.id());
        }
        Ok(model)
    }

    /// Make `model` current unless the pipeline was invalidated after
    /// `generation` was observed.
    fn publish(&self, model: &Arc<ChargeModel>, generation: u64) -> bool {
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        if self.generation() != generation {
            tracing::debug!(
                dataset = %model.trained_on(),
                "discarding model trained before invalidation"
            );
            return false;
        }
        *current = Some(Arc::clone(model));
        true
    }

    fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Most recently trained model, if any.
    pub fn current_model(&self) -> Option<Arc<ChargeModel>> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Estimate with the current model.
    ///
    /// Fails with [`ChargeError::ModelNotReady`](crate::ChargeError::ModelNotReady)
    /// until a model has been trained.
    pub fn predict(&self, request: &PredictionRequest) -> Result<f32> {
        inference::predict(self.current_model().as_deref(), request)
    }

    /// Load, train and estimate in one call.
    pub fn estimate(&self, location: &str, request: &PredictionRequest) -> Result<f32> {
        let dataset = self.load_dataset(location)?;
        let model = self.train_model(&dataset)?;
        inference::predict(Some(&model), request)
    }

    /// Drop every cached dataset and model, and the current model.
    ///
    /// Work already in flight finishes for its caller but is not kept.
    pub fn invalidate(&self) {
        {
            let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
            self.generation.fetch_add(1, Ordering::AcqRel);
            *current = None;
        }
        self.datasets.clear();
        self.models.clear();
        tracing::info!("pipeline caches invalidated");
    }
}

// =============================================================================
// Process-wide pipeline
// =============================================================================

static GLOBAL: LazyLock<Pipeline<FileSource>> =
    LazyLock::new(|| Pipeline::with_source(FileSource::new()));

/// Shared pipeline reading from the working directory.
pub fn global() -> &'static Pipeline<FileSource> {
    &GLOBAL
}

/// Load a dataset through the shared pipeline.
pub fn load_dataset(location: &str) -> Result<Arc<Dataset>> {
    global().load_dataset(location)
}

/// Train a model through the shared pipeline.
pub fn train_model(dataset: &Dataset) -> Result<Arc<ChargeModel>> {
    global().train_model(dataset)
}

/// Estimate with an explicitly supplied model.
pub fn predict(model: Option<&ChargeModel>, request: &PredictionRequest) -> Result<f32> {
    inference::predict(model, request)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ChargeError;
    use crate::testing::{CountingSource, SINGLE_ROW_CSV, synthetic_csv};

    fn pipeline(source: CountingSource) -> Pipeline<CountingSource> {
        let config = PipelineConfig::builder()
            .dataset_location("insurance.csv")
            .model(
                crate::model::ChargeModelConfig::builder()
                    .n_threads(1)
                    .build()
                    .unwrap(),
            )
            .build()
            .unwrap();
        Pipeline::new(source, config)
    }

    #[test]
    fn dataset_is_read_once() {
        let p = pipeline(CountingSource::new().with_file("insurance.csv", synthetic_csv(50, 1)));
        let a = p.load_default_dataset().unwrap();
        let b = p.load_dataset("insurance.csv").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(p.source().reads("insurance.csv"), 1);
    }

    #[test]
    fn model_is_trained_once_per_dataset() {
        let p = pipeline(CountingSource::new().with_file("insurance.csv", synthetic_csv(50, 1)));
        let ds = p.load_default_dataset().unwrap();
        let a = p.train_model(&ds).unwrap();
        let b = p.train_model(&ds).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn predict_before_training_is_not_ready() {
        let p = pipeline(CountingSource::new());
        let req = PredictionRequest::new(30, 1, 30.0, 0, 0);
        assert!(matches!(p.predict(&req), Err(ChargeError::ModelNotReady)));
    }

    #[test]
    fn estimate_single_row_dataset() {
        let p = pipeline(CountingSource::new().with_file("insurance.csv", SINGLE_ROW_CSV));
        let req = PredictionRequest::new(19, 0, 27.9, 0, 1);
        let estimate = p.estimate("insurance.csv", &req).unwrap();
        assert!(estimate.is_finite());
        assert_eq!(p.predict(&req).unwrap(), estimate);
    }

    #[test]
    fn missing_dataset_is_not_found_and_not_cached() {
        let p = pipeline(CountingSource::new());
        assert!(matches!(
            p.load_dataset("absent.csv"),
            Err(ChargeError::NotFound { .. })
        ));
        assert!(p.load_dataset("absent.csv").is_err());
        assert_eq!(p.source().reads("absent.csv"), 2);
    }

    #[test]
    fn invalidate_drops_everything() {
        let p = pipeline(CountingSource::new().with_file("insurance.csv", synthetic_csv(30, 2)));
        let ds = p.load_default_dataset().unwrap();
        p.train_model(&ds).unwrap();
        p.invalidate();
        assert!(p.current_model().is_none());
        p.load_default_dataset().unwrap();
        assert_eq!(p.source().reads("insurance.csv"), 2);
    }

    #[test]
    fn model_from_before_invalidation_is_not_published() {
        let p = pipeline(CountingSource::new().with_file("insurance.csv", synthetic_csv(30, 2)));
        let ds = p.load_default_dataset().unwrap();
        let stale = Arc::new(ChargeModel::train(&ds, &p.config().model).unwrap());

        let generation = p.generation();
        p.invalidate();
        assert!(!p.publish(&stale, generation));
        assert!(p.current_model().is_none());

        assert!(p.publish(&stale, p.generation()));
        assert!(p.current_model().is_some());
    }

    #[test]
    fn failed_training_is_retried() {
        let p = pipeline(CountingSource::new().with_file(
            "empty.csv",
            "age,sex,bmi,children,smoker,region,charges\n",
        ));
        let ds = p.load_dataset("empty.csv").unwrap();
        for _ in 0..2 {
            assert!(matches!(p.train_model(&ds), Err(ChargeError::Training(_))));
        }
        assert!(p.models.get(&ds.id()).is_none());
        assert!(p.models.is_empty());
    }
}
