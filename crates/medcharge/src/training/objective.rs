//! Loss functions: per-row gradients and the initial prediction.

use ndarray::ArrayView1;

/// A twice-differentiable loss used by the booster.
pub trait Objective: Send + Sync {
    /// Fill `grads` and `hess` with first and second derivatives of the loss
    /// with respect to each prediction.
    fn compute_gradients(
        &self,
        predictions: &[f32],
        targets: ArrayView1<'_, f32>,
        grads: &mut [f32],
        hess: &mut [f32],
    );

    /// Constant prediction the ensemble starts from.
    fn base_score(&self, targets: ArrayView1<'_, f32>) -> f32;

    fn name(&self) -> &'static str;
}

// =============================================================================
// Squared Loss
// =============================================================================

/// Squared error loss for regression.
///
/// - Loss: `0.5 * (pred - target)²`
/// - Gradient: `pred - target`
/// - Hessian: `1.0`
#[derive(Debug, Clone, Copy, Default)]
pub struct SquaredLoss;

impl Objective for SquaredLoss {
    fn compute_gradients(
        &self,
        predictions: &[f32],
        targets: ArrayView1<'_, f32>,
        grads: &mut [f32],
        hess: &mut [f32],
    ) {
        debug_assert_eq!(predictions.len(), targets.len());
        for (((g, h), &pred), &target) in grads
            .iter_mut()
            .zip(hess.iter_mut())
            .zip(predictions)
            .zip(targets.iter())
        {
            *g = pred - target;
            *h = 1.0;
        }
    }

    /// Mean of the targets, accumulated in f64.
    fn base_score(&self, targets: ArrayView1<'_, f32>) -> f32 {
        if targets.is_empty() {
            return 0.0;
        }
        let sum: f64 = targets.iter().map(|&y| y as f64).sum();
        (sum / targets.len() as f64) as f32
    }

    fn name(&self) -> &'static str {
        "squared_error"
    }
}
