//! Fixtures shared by unit and integration tests.
//!
//! - [`SINGLE_ROW_CSV`]: the smallest dataset that trains
//! - [`synthetic_records`] / [`synthetic_csv`]: deterministic insurance-like data
//! - [`CountingSource`]: in-memory [`DatasetSource`] that counts reads

use std::collections::HashMap;
use std::io;
use std::sync::Mutex;
use std::time::Duration;

use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::data::DatasetSource;
use crate::data::schema::{REQUIRED_COLUMNS, Record, Sex, Smoker};

/// One-row dataset: a 19-year-old female smoker.
pub const SINGLE_ROW_CSV: &str =
    "age,sex,bmi,children,smoker,region,charges\n19,female,27.9,0,yes,southwest,16884.924\n";

const REGIONS: [&str; 4] = ["northeast", "northwest", "southeast", "southwest"];

// =============================================================================
// Synthetic data
// =============================================================================

/// `n_rows` records drawn deterministically from `seed`.
///
/// Charges grow with age and BMI and jump for smokers, loosely following the
/// shape of real premium data.
pub fn synthetic_records(n_rows: usize, seed: u64) -> Vec<Record> {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
    (0..n_rows)
        .map(|_| {
            let age: u32 = rng.gen_range(18..=64);
            let sex = if rng.gen_bool(0.5) { Sex::Male } else { Sex::Female };
            let bmi: f32 = (rng.gen_range(160..=480) as f32) / 10.0;
            let children: u32 = rng.gen_range(0..=5);
            let smoker = if rng.gen_bool(0.2) { Smoker::Yes } else { Smoker::No };
            let region = REGIONS[rng.gen_range(0..REGIONS.len())].to_string();
            let noise: f32 = rng.gen_range(-500.0..500.0);

            let mut charges = 2000.0 + 260.0 * age as f32 + 40.0 * bmi + 450.0 * children as f32;
            if smoker == Smoker::Yes {
                charges += 22_000.0 + if bmi > 30.0 { 15_000.0 } else { 0.0 };
            }
            Record {
                age,
                sex,
                bmi,
                children,
                smoker,
                region,
                charges: charges + noise,
            }
        })
        .collect()
}

/// [`synthetic_records`] rendered as a CSV file with a header row.
pub fn synthetic_csv(n_rows: usize, seed: u64) -> String {
    let mut out = REQUIRED_COLUMNS.join(",");
    out.push('\n');
    for r in synthetic_records(n_rows, seed) {
        out.push_str(&format!(
            "{},{},{},{},{},{},{}\n",
            r.age,
            r.sex.label(),
            r.bmi,
            r.children,
            r.smoker.label(),
            r.region,
            r.charges
        ));
    }
    out
}

// =============================================================================
// CountingSource
// =============================================================================

/// In-memory dataset source recording how often each location is read.
#[derive(Debug, Default)]
pub struct CountingSource {
    files: HashMap<String, Vec<u8>>,
    reads: Mutex<HashMap<String, usize>>,
    delay: Option<Duration>,
}

impl CountingSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `contents` at `location`.
    pub fn with_file(mut self, location: impl Into<String>, contents: impl Into<Vec<u8>>) -> Self {
        self.files.insert(location.into(), contents.into());
        self
    }

    /// Sleep for `delay` on every read, widening race windows.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of reads of `location` so far, successful or not.
    pub fn reads(&self, location: &str) -> usize {
        self.lock_reads().get(location).copied().unwrap_or(0)
    }

    /// Number of reads across all locations.
    pub fn total_reads(&self) -> usize {
        self.lock_reads().values().sum()
    }

    fn lock_reads(&self) -> std::sync::MutexGuard<'_, HashMap<String, usize>> {
        self.reads
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl DatasetSource for CountingSource {
    fn read(&self, location: &str) -> io::Result<Vec<u8>> {
        *self.lock_reads().entry(location.to_string()).or_insert(0) += 1;
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        self.files.get(location).cloned().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("no file at {location}"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::io::csv::parse_records;

    #[test]
    fn synthetic_data_is_deterministic() {
        assert_eq!(synthetic_csv(20, 5), synthetic_csv(20, 5));
        assert_ne!(synthetic_csv(20, 5), synthetic_csv(20, 6));
    }

    #[test]
    fn synthetic_csv_parses() {
        let records = parse_records(synthetic_csv(25, 9).as_bytes()).unwrap();
        assert_eq!(records.len(), 25);
        assert!(records.iter().all(|r| (18..=64).contains(&r.age)));
    }

    #[test]
    fn single_row_fixture_parses() {
        assert_eq!(parse_records(SINGLE_ROW_CSV.as_bytes()).unwrap().len(), 1);
    }

    #[test]
    fn counting_source_counts_every_read() {
        let source = CountingSource::new().with_file("a.csv", "x");
        source.read("a.csv").unwrap();
        source.read("a.csv").unwrap();
        assert!(source.read("b.csv").is_err());
        assert_eq!(source.reads("a.csv"), 2);
        assert_eq!(source.reads("b.csv"), 1);
        assert_eq!(source.total_reads(), 3);
    }
}
