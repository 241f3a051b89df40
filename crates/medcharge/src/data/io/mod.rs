//! Dataset loading: storage access plus CSV decoding.
//!
//! [`load_dataset`] is the uncached loader. The pipeline wraps it in a
//! single-flight cache so storage is read once per location.

pub mod csv;
pub mod source;

use std::io;
use std::time::Instant;

pub use source::{DatasetSource, FileSource};

use crate::data::Dataset;
use crate::data::schema::DROPPED_COLUMNS;
use crate::error::{ChargeError, Result};

/// Read `location` from `source`, decode it and encode it into a [`Dataset`].
///
/// # Errors
///
/// - [`ChargeError::NotFound`] if the source cannot produce the bytes
/// - [`ChargeError::MalformedData`] if decoding or validation fails
pub fn load_dataset<S: DatasetSource + ?Sized>(source: &S, location: &str) -> Result<Dataset> {
    let start = Instant::now();
    let bytes = source
        .read(location)
        .map_err(|err| not_found(location, &err))?;
    let records = csv::parse_records(&bytes)?;
    let dataset = Dataset::from_records(&records);

    tracing::info!(
        location,
        rows = dataset.n_rows(),
        id = %dataset.id(),
        dropped = ?DROPPED_COLUMNS,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "loaded dataset"
    );
    Ok(dataset)
}

fn not_found(location: &str, err: &io::Error) -> ChargeError {
    tracing::warn!(location, %err, "dataset unavailable");
    ChargeError::NotFound {
        location: location.to_string(),
        reason: err.to_string(),
    }
}
