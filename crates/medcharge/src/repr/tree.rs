//! Regression tree storage (SoA) and its training-time builder.
//!
//! - [`Tree`]: immutable structure-of-arrays tree for traversal
//! - [`TreeBuilder`]: incremental construction while growing
//! - [`TreeValidationError`]: structural validation errors

use super::NodeId;

/// Structural validation errors for [`Tree`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeValidationError {
    /// Tree has no nodes.
    EmptyTree,
    /// A child pointer references an out-of-bounds node.
    ChildOutOfBounds { node: NodeId, child: NodeId, n_nodes: usize },
    /// A node is reachable by more than one path, or through a cycle.
    DuplicateVisit { node: NodeId },
    /// A node exists in storage but is unreachable from the root.
    UnreachableNode { node: NodeId },
    /// A leaf holds a non-finite value.
    NonFiniteLeaf { node: NodeId },
}

/// Structure-of-Arrays tree storage.
///
/// Child indices are local to this tree (0 = root). Numeric splits only:
/// a sample goes left when `value < threshold`.
#[derive(Debug, Clone)]
pub struct Tree {
    split_indices: Box<[u32]>,
    split_thresholds: Box<[f32]>,
    left_children: Box<[u32]>,
    right_children: Box<[u32]>,
    is_leaf: Box<[bool]>,
    leaf_values: Box<[f32]>,
}

impl Tree {
    /// Number of nodes.
    #[inline]
    pub fn n_nodes(&self) -> usize {
        self.is_leaf.len()
    }

    /// Number of leaves.
    pub fn n_leaves(&self) -> usize {
        self.is_leaf.iter().filter(|&&leaf| leaf).count()
    }

    #[inline]
    pub fn is_leaf(&self, node: NodeId) -> bool {
        self.is_leaf[node as usize]
    }

    #[inline]
    pub fn split_index(&self, node: NodeId) -> u32 {
        self.split_indices[node as usize]
    }

    #[inline]
    pub fn split_threshold(&self, node: NodeId) -> f32 {
        self.split_thresholds[node as usize]
    }

    #[inline]
    pub fn left_child(&self, node: NodeId) -> NodeId {
        self.left_children[node as usize]
    }

    #[inline]
    pub fn right_child(&self, node: NodeId) -> NodeId {
        self.right_children[node as usize]
    }

    #[inline]
    pub fn leaf_value(&self, node: NodeId) -> f32 {
        self.leaf_values[node as usize]
    }

    /// Depth of the deepest leaf (a single-leaf tree has depth 0).
    pub fn depth(&self) -> usize {
        let mut max_depth = 0;
        let mut stack = vec![(0 as NodeId, 0usize)];
        while let Some((node, depth)) = stack.pop() {
            if self.is_leaf(node) {
                max_depth = max_depth.max(depth);
            } else {
                stack.push((self.left_child(node), depth + 1));
                stack.push((self.right_child(node), depth + 1));
            }
        }
        max_depth
    }

    /// Walk from the root to the leaf reached by `features`.
    #[inline]
    pub fn traverse_to_leaf(&self, features: &[f32]) -> NodeId {
        let mut node = 0;
        while !self.is_leaf(node) {
            let value = features[self.split_index(node) as usize];
            node = if value < self.split_threshold(node) {
                self.left_child(node)
            } else {
                self.right_child(node)
            };
        }
        node
    }

    /// Leaf value reached by `features`.
    #[inline]
    pub fn predict_row(&self, features: &[f32]) -> f32 {
        self.leaf_value(self.traverse_to_leaf(features))
    }

    /// Validate basic structural invariants.
    pub fn validate(&self) -> Result<(), TreeValidationError> {
        let n_nodes = self.n_nodes();
        if n_nodes == 0 {
            return Err(TreeValidationError::EmptyTree);
        }

        let mut visited = vec![false; n_nodes];
        let mut stack: Vec<NodeId> = vec![0];
        while let Some(node) = stack.pop() {
            if visited[node as usize] {
                return Err(TreeValidationError::DuplicateVisit { node });
            }
            visited[node as usize] = true;

            if self.is_leaf(node) {
                if !self.leaf_value(node).is_finite() {
                    return Err(TreeValidationError::NonFiniteLeaf { node });
                }
                continue;
            }
            for child in [self.left_child(node), self.right_child(node)] {
                if child as usize >= n_nodes {
                    return Err(TreeValidationError::ChildOutOfBounds {
                        node,
                        child,
                        n_nodes,
                    });
                }
                stack.push(child);
            }
        }

        match visited.iter().position(|&v| !v) {
            Some(i) => Err(TreeValidationError::UnreachableNode { node: i as NodeId }),
            None => Ok(()),
        }
    }
}

// =============================================================================
// TreeBuilder
// =============================================================================

/// Mutable tree used while growing.
///
/// Nodes start as placeholders and become either a split or a leaf.
#[derive(Debug, Clone, Default)]
pub struct TreeBuilder {
    split_indices: Vec<u32>,
    split_thresholds: Vec<f32>,
    left_children: Vec<u32>,
    right_children: Vec<u32>,
    is_leaf: Vec<bool>,
    leaf_values: Vec<f32>,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset and allocate the root placeholder. Returns the root id (always 0).
    pub fn init_root(&mut self) -> NodeId {
        self.split_indices.clear();
        self.split_thresholds.clear();
        self.left_children.clear();
        self.right_children.clear();
        self.is_leaf.clear();
        self.leaf_values.clear();
        self.push_placeholder()
    }

    fn push_placeholder(&mut self) -> NodeId {
        let id = self.is_leaf.len() as NodeId;
        self.split_indices.push(0);
        self.split_thresholds.push(0.0);
        self.left_children.push(0);
        self.right_children.push(0);
        self.is_leaf.push(true);
        self.leaf_values.push(0.0);
        id
    }

    /// Turn `node` into a numeric split and allocate its children.
    ///
    /// Returns `(left, right)`.
    pub fn apply_split(&mut self, node: NodeId, feature: u32, threshold: f32) -> (NodeId, NodeId) {
        let left = self.push_placeholder();
        let right = self.push_placeholder();
        let i = node as usize;
        self.is_leaf[i] = false;
        self.split_indices[i] = feature;
        self.split_thresholds[i] = threshold;
        self.left_children[i] = left;
        self.right_children[i] = right;
        (left, right)
    }

    /// Set `node` as a leaf with the given value.
    pub fn make_leaf(&mut self, node: NodeId, value: f32) {
        let i = node as usize;
        self.is_leaf[i] = true;
        self.leaf_values[i] = value;
    }

    #[inline]
    pub fn n_nodes(&self) -> usize {
        self.is_leaf.len()
    }

    /// Freeze into an immutable [`Tree`].
    pub fn freeze(self) -> Tree {
        Tree {
            split_indices: self.split_indices.into_boxed_slice(),
            split_thresholds: self.split_thresholds.into_boxed_slice(),
            left_children: self.left_children.into_boxed_slice(),
            right_children: self.right_children.into_boxed_slice(),
            is_leaf: self.is_leaf.into_boxed_slice(),
            leaf_values: self.leaf_values.into_boxed_slice(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// root: x0 < 0.5 ? leaf 1.0 : (x1 < 0.3 ? leaf 2.0 : leaf 3.0)
    fn two_level_tree() -> Tree {
        let mut b = TreeBuilder::new();
        let root = b.init_root();
        let (left, right) = b.apply_split(root, 0, 0.5);
        b.make_leaf(left, 1.0);
        let (rl, rr) = b.apply_split(right, 1, 0.3);
        b.make_leaf(rl, 2.0);
        b.make_leaf(rr, 3.0);
        b.freeze()
    }

    #[test]
    fn predict_follows_thresholds() {
        let tree = two_level_tree();
        assert_eq!(tree.predict_row(&[0.3, 0.0]), 1.0);
        assert_eq!(tree.predict_row(&[0.7, 0.1]), 2.0);
        assert_eq!(tree.predict_row(&[0.7, 0.9]), 3.0);
    }

    #[test]
    fn threshold_ties_go_right() {
        let tree = two_level_tree();
        assert_eq!(tree.predict_row(&[0.5, 0.3]), 3.0);
    }

    #[test]
    fn shape_accessors() {
        let tree = two_level_tree();
        assert_eq!(tree.n_nodes(), 5);
        assert_eq!(tree.n_leaves(), 3);
        assert_eq!(tree.depth(), 2);
        assert!(tree.validate().is_ok());
    }

    #[test]
    fn single_leaf_tree() {
        let mut b = TreeBuilder::new();
        let root = b.init_root();
        b.make_leaf(root, -4.0);
        let tree = b.freeze();
        assert_eq!(tree.depth(), 0);
        assert_eq!(tree.predict_row(&[1.0, 2.0]), -4.0);
        assert!(tree.validate().is_ok());
    }

    #[test]
    fn empty_tree_fails_validation() {
        let tree = TreeBuilder::new().freeze();
        assert_eq!(tree.validate(), Err(TreeValidationError::EmptyTree));
    }

    #[test]
    fn non_finite_leaf_fails_validation() {
        let mut b = TreeBuilder::new();
        let root = b.init_root();
        b.make_leaf(root, f32::NAN);
        assert_eq!(
            b.freeze().validate(),
            Err(TreeValidationError::NonFiniteLeaf { node: 0 })
        );
    }
}
