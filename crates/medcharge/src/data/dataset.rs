//! Encoded feature matrix and target vector.

use std::sync::atomic::{AtomicU64, Ordering};

use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};

use super::schema::{N_FEATURES, Record};
use crate::error::{ChargeError, Result};

static NEXT_DATASET_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a [`Dataset`].
///
/// Assigned on construction and preserved by `clone`, so a cached dataset and
/// all handles to it share one id. The trainer's cache is keyed by it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DatasetId(u64);

impl DatasetId {
    fn next() -> Self {
        Self(NEXT_DATASET_ID.fetch_add(1, Ordering::Relaxed))
    }

    #[inline]
    pub fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for DatasetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "dataset#{}", self.0)
    }
}

/// Predictors and target, split column-wise from the encoded records.
///
/// Features have shape `[n_rows, 5]` (sample-major) in
/// [`FEATURE_NAMES`](super::FEATURE_NAMES) order.
#[derive(Debug, Clone)]
pub struct Dataset {
    id: DatasetId,
    features: Array2<f32>,
    targets: Array1<f32>,
}

impl Dataset {
    /// Create a dataset from a feature matrix and target vector.
    ///
    /// # Errors
    ///
    /// [`ChargeError::MalformedData`] if the matrix is not 5 columns wide or
    /// the row counts disagree.
    pub fn new(features: Array2<f32>, targets: Array1<f32>) -> Result<Self> {
        if features.ncols() != N_FEATURES {
            return Err(ChargeError::malformed_column(
                "features",
                format!("expected {} columns, got {}", N_FEATURES, features.ncols()),
            ));
        }
        if features.nrows() != targets.len() {
            return Err(ChargeError::malformed_column(
                "charges",
                format!(
                    "{} feature rows but {} targets",
                    features.nrows(),
                    targets.len()
                ),
            ));
        }
        Ok(Self {
            id: DatasetId::next(),
            features,
            targets,
        })
    }

    /// Encode records: drop `region`, map categories to codes, separate `charges`.
    pub fn from_records(records: &[Record]) -> Self {
        let n_rows = records.len();
        let mut features = Array2::<f32>::zeros((n_rows, N_FEATURES));
        let mut targets = Array1::<f32>::zeros(n_rows);

        for (i, record) in records.iter().enumerate() {
            features
                .row_mut(i)
                .assign(&ArrayView1::from(&record.features()[..]));
            targets[i] = record.charges;
        }

        Self {
            id: DatasetId::next(),
            features,
            targets,
        }
    }

    #[inline]
    pub fn id(&self) -> DatasetId {
        self.id
    }

    #[inline]
    pub fn n_rows(&self) -> usize {
        self.features.nrows()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.n_rows() == 0
    }

    /// Feature matrix `[n_rows, 5]`.
    #[inline]
    pub fn features(&self) -> ArrayView2<'_, f32> {
        self.features.view()
    }

    /// Target vector `[n_rows]`.
    #[inline]
    pub fn targets(&self) -> ArrayView1<'_, f32> {
        self.targets.view()
    }

    /// Feature row at `idx`.
    #[inline]
    pub fn row(&self, idx: usize) -> ArrayView1<'_, f32> {
        self.features.row(idx)
    }

    /// Materialise the rows at `indices` (in that order) as a new dataset.
    pub fn select(&self, indices: &[usize]) -> Self {
        Self {
            id: DatasetId::next(),
            features: self.features.select(Axis(0), indices),
            targets: self.targets.select(Axis(0), indices),
        }
    }
}
