//! Insurance dataset schema, encoding, loading and partitioning.
//!
//! # Key Types
//!
//! - [`Record`]: one typed row of the source file
//! - [`Dataset`]: encoded feature matrix `[n_rows, 5]` plus target vector
//! - [`Partition`]: seeded train/test row membership
//! - [`DatasetSource`]: where raw bytes come from

mod dataset;
pub mod io;
pub mod schema;
pub mod split;

pub use dataset::{Dataset, DatasetId};
pub use io::{DatasetSource, FileSource, load_dataset};
pub use schema::{
    DROPPED_COLUMNS, FEATURE_NAMES, N_FEATURES, REQUIRED_COLUMNS, Record, Sex, Smoker, TARGET_NAME,
};
pub use split::{Partition, split_indices};
