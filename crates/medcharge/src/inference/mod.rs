//! Turning a validated applicant profile into an estimated charge.

mod format;
mod predict;
mod request;

pub use format::{format_amount, format_estimate};
pub use predict::{predict, predict_batch};
pub use request::{AGE_RANGE, BMI_RANGE, CHILDREN_RANGE, PredictionRequest};
