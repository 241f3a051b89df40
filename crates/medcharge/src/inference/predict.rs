//! Estimates from an optionally available model.

use super::PredictionRequest;
use crate::error::{ChargeError, Result};
use crate::model::ChargeModel;

/// Estimated annual charge from `model`.
///
/// # Errors
///
/// - [`ChargeError::ModelNotReady`] if `model` is `None`
/// - [`ChargeError::InvalidInput`] if the request is out of domain
pub fn predict(model: Option<&ChargeModel>, request: &PredictionRequest) -> Result<f32> {
    let model = model.ok_or(ChargeError::ModelNotReady)?;
    let estimate = model.predict(request)?;
    tracing::debug!(?request, estimate, "estimated charge");
    Ok(estimate)
}

/// Estimates for many requests; the first invalid request fails the batch.
pub fn predict_batch(model: &ChargeModel, requests: &[PredictionRequest]) -> Result<Vec<f32>> {
    requests.iter().map(|r| model.predict(r)).collect()
}
