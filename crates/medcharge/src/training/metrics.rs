//! Regression metrics.

use ndarray::ArrayView1;

/// Root mean squared error: `sqrt(mean((pred - target)²))`.
///
/// Returns 0.0 for empty input. Lower is better.
pub fn rmse(predictions: &[f32], targets: ArrayView1<'_, f32>) -> f64 {
    debug_assert_eq!(predictions.len(), targets.len());
    if predictions.is_empty() {
        return 0.0;
    }
    let sum_sq: f64 = predictions
        .iter()
        .zip(targets.iter())
        .map(|(&p, &y)| {
            let diff = p as f64 - y as f64;
            diff * diff
        })
        .sum();
    (sum_sq / predictions.len() as f64).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn rmse_of_exact_predictions_is_zero() {
        let targets = array![1.0f32, 2.0, 3.0];
        assert_eq!(rmse(&[1.0, 2.0, 3.0], targets.view()), 0.0);
    }

    #[test]
    fn rmse_known_value() {
        let targets = array![0.0f32, 0.0];
        assert_relative_eq!(rmse(&[3.0, 4.0], targets.view()), (12.5f64).sqrt());
    }

    #[test]
    fn rmse_of_empty_is_zero() {
        let targets = ndarray::Array1::<f32>::zeros(0);
        assert_eq!(rmse(&[], targets.view()), 0.0);
    }
}
