//! Depth-wise tree growth with exact greedy split search.
//!
//! For each node every feature is scanned in sorted order and every boundary
//! between two distinct values is a candidate. The threshold is the midpoint
//! of the two values; rows with `value < threshold` go left.

use std::collections::VecDeque;

use ndarray::ArrayView2;

use super::gain::GainParams;
use crate::repr::{NodeId, Tree, TreeBuilder};
use crate::utils::Parallelism;

/// Best split found for one node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplitInfo {
    pub feature: u32,
    pub threshold: f32,
    pub gain: f64,
}

/// Parameters of a single tree.
#[derive(Debug, Clone)]
pub struct GrowerParams {
    pub max_depth: u32,
    pub learning_rate: f32,
    pub gain: GainParams,
}

/// Grows one regression tree from gradients and hessians.
#[derive(Debug)]
pub struct TreeGrower {
    params: GrowerParams,
    builder: TreeBuilder,
}

struct PendingNode {
    id: NodeId,
    rows: Vec<usize>,
    depth: u32,
}

impl TreeGrower {
    pub fn new(params: GrowerParams) -> Self {
        Self {
            params,
            builder: TreeBuilder::new(),
        }
    }

    /// Grow a tree over all rows of `features`.
    ///
    /// Leaf values are scaled by the learning rate.
    pub fn grow(
        &mut self,
        features: ArrayView2<'_, f32>,
        grads: &[f32],
        hess: &[f32],
        parallelism: Parallelism,
    ) -> Tree {
        let root = self.builder.init_root();
        let mut queue = VecDeque::from([PendingNode {
            id: root,
            rows: (0..features.nrows()).collect(),
            depth: 0,
        }]);

        while let Some(node) = queue.pop_front() {
            let (grad_sum, hess_sum) = sum_gradients(&node.rows, grads, hess);

            let split = if node.depth < self.params.max_depth && node.rows.len() >= 2 {
                self.find_best_split(features, &node.rows, grads, hess, parallelism)
            } else {
                None
            };

            match split {
                Some(split) if split.gain > 0.0 => {
                    let column = features.column(split.feature as usize);
                    let (left_rows, right_rows): (Vec<usize>, Vec<usize>) = node
                        .rows
                        .iter()
                        .partition(|&&row| column[row] < split.threshold);
                    let (left, right) =
                        self.builder
                            .apply_split(node.id, split.feature, split.threshold);
                    queue.push_back(PendingNode {
                        id: left,
                        rows: left_rows,
                        depth: node.depth + 1,
                    });
                    queue.push_back(PendingNode {
                        id: right,
                        rows: right_rows,
                        depth: node.depth + 1,
                    });
                }
                _ => {
                    let weight = self.params.gain.compute_leaf_weight(grad_sum, hess_sum);
                    self.builder
                        .make_leaf(node.id, weight * self.params.learning_rate);
                }
            }
        }

        std::mem::take(&mut self.builder).freeze()
    }

    /// Best split over all features; ties keep the lowest feature index.
    fn find_best_split(
        &self,
        features: ArrayView2<'_, f32>,
        rows: &[usize],
        grads: &[f32],
        hess: &[f32],
        parallelism: Parallelism,
    ) -> Option<SplitInfo> {
        let per_feature = parallelism.maybe_par_map(0..features.ncols(), |feature| {
            self.best_split_for_feature(features, feature, rows, grads, hess)
        });

        per_feature
            .into_iter()
            .flatten()
            .fold(None, |best: Option<SplitInfo>, candidate| match best {
                Some(b) if b.gain >= candidate.gain => Some(b),
                _ => Some(candidate),
            })
    }

    /// Scan one feature in ascending order; ties keep the lowest threshold.
    fn best_split_for_feature(
        &self,
        features: ArrayView2<'_, f32>,
        feature: usize,
        rows: &[usize],
        grads: &[f32],
        hess: &[f32],
    ) -> Option<SplitInfo> {
        let column = features.column(feature);
        let mut sorted: Vec<(f32, usize)> = rows.iter().map(|&r| (column[r], r)).collect();
        sorted.sort_by(|a, b| a.0.total_cmp(&b.0));

        let (grad_total, hess_total) = sum_gradients(rows, grads, hess);
        let gain_params = &self.params.gain;

        let mut best: Option<SplitInfo> = None;
        let mut grad_left = 0.0f64;
        let mut hess_left = 0.0f64;

        for pair in sorted.windows(2) {
            let (value, row) = pair[0];
            let next_value = pair[1].0;
            grad_left += grads[row] as f64;
            hess_left += hess[row] as f64;

            if value == next_value {
                continue;
            }
            let grad_right = grad_total - grad_left;
            let hess_right = hess_total - hess_left;
            if !gain_params.is_valid_split(hess_left, hess_right) {
                continue;
            }

            let gain = gain_params.compute_gain(grad_left, hess_left, grad_right, hess_right);
            if best.is_none_or(|b| gain > b.gain) {
                best = Some(SplitInfo {
                    feature: feature as u32,
                    threshold: midpoint(value, next_value),
                    gain,
                });
            }
        }
        best
    }
}

fn sum_gradients(rows: &[usize], grads: &[f32], hess: &[f32]) -> (f64, f64) {
    rows.iter().fold((0.0, 0.0), |(g, h), &row| {
        (g + grads[row] as f64, h + hess[row] as f64)
    })
}

/// Midpoint of `lo < hi` that still sends `lo` left and `hi` right.
fn midpoint(lo: f32, hi: f32) -> f32 {
    let mid = ((lo as f64 + hi as f64) / 2.0) as f32;
    if mid > lo { mid } else { hi }
}
