//! Fitted model representation.
//!
//! - [`Tree`]: single regression tree (SoA storage)
//! - [`TreeBuilder`]: mutable tree used by the grower
//! - [`Forest`]: additive ensemble with a base score

mod forest;
mod tree;

/// Node index within a single tree (0 = root).
pub type NodeId = u32;

pub use forest::{Forest, ForestValidationError};
pub use tree::{Tree, TreeBuilder, TreeValidationError};
