//! Memoization of loaded datasets and trained models.

mod memo;

pub use memo::Memo;
