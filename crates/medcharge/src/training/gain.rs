//! Split gain and leaf weight formulas.

// =============================================================================
// Gain Parameters
// =============================================================================

/// Regularisation and split constraints, fixed for the whole training run.
#[derive(Clone, Debug, PartialEq)]
pub struct GainParams {
    /// L2 regularisation on leaf weights (lambda).
    pub reg_lambda: f32,
    /// Minimum split gain (gamma).
    pub min_gain: f32,
    /// Minimum sum of hessians per child.
    pub min_child_weight: f32,
}

impl Default for GainParams {
    fn default() -> Self {
        Self {
            reg_lambda: 1.0,
            min_gain: 0.0,
            min_child_weight: 1.0,
        }
    }
}

impl GainParams {
    /// Split gain with gamma already subtracted.
    ///
    /// ```text
    /// gain = 0.5 * [G_L²/(H_L + λ) + G_R²/(H_R + λ) - G_P²/(H_P + λ)] - γ
    /// ```
    #[inline]
    pub fn compute_gain(
        &self,
        grad_left: f64,
        hess_left: f64,
        grad_right: f64,
        hess_right: f64,
    ) -> f64 {
        let lambda = self.reg_lambda as f64;
        let grad_parent = grad_left + grad_right;
        let hess_parent = hess_left + hess_right;

        let score_left = grad_left * grad_left / (hess_left + lambda);
        let score_right = grad_right * grad_right / (hess_right + lambda);
        let score_parent = grad_parent * grad_parent / (hess_parent + lambda);

        0.5 * (score_left + score_right - score_parent) - self.min_gain as f64
    }

    /// Both children carry at least `min_child_weight` hessian mass.
    #[inline]
    pub fn is_valid_split(&self, hess_left: f64, hess_right: f64) -> bool {
        let min_weight = self.min_child_weight as f64;
        hess_left >= min_weight && hess_right >= min_weight
    }

    /// Newton step `-G / (H + λ)`.
    #[inline]
    pub fn compute_leaf_weight(&self, grad_sum: f64, hess_sum: f64) -> f32 {
        let denom = hess_sum + self.reg_lambda as f64;
        if denom <= 0.0 {
            return 0.0;
        }
        (-grad_sum / denom) as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn gain_of_perfect_separation() {
        let params = GainParams::default();
        // Left residuals sum to -10 over 2 rows, right to +10 over 2 rows.
        let gain = params.compute_gain(-10.0, 2.0, 10.0, 2.0);
        let expected = 0.5 * (100.0 / 3.0 + 100.0 / 3.0 - 0.0);
        assert_relative_eq!(gain, expected);
    }

    #[test]
    fn gamma_is_subtracted() {
        let free = GainParams::default();
        let taxed = GainParams {
            min_gain: 5.0,
            ..GainParams::default()
        };
        let g0 = free.compute_gain(-4.0, 3.0, 6.0, 1.0);
        let g1 = taxed.compute_gain(-4.0, 3.0, 6.0, 1.0);
        assert_relative_eq!(g0 - g1, 5.0);
    }

    #[test]
    fn no_gain_when_children_agree() {
        let params = GainParams {
            reg_lambda: 0.0,
            ..GainParams::default()
        };
        assert_relative_eq!(params.compute_gain(2.0, 1.0, 2.0, 1.0), 0.0);
    }

    #[test]
    fn leaf_weight_is_newton_step() {
        let params = GainParams::default();
        assert_relative_eq!(params.compute_leaf_weight(-9.0, 2.0), 3.0);
    }

    #[test]
    fn min_child_weight_rejects_light_children() {
        let params = GainParams {
            min_child_weight: 2.0,
            ..GainParams::default()
        };
        assert!(params.is_valid_split(2.0, 3.0));
        assert!(!params.is_valid_split(1.0, 3.0));
    }
}
