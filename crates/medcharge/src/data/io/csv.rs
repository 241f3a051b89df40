//! Comma-separated dataset parsing.
//!
//! Every column is read as text through `arrow`'s CSV reader and converted
//! per column afterwards. This keeps type errors attributable to a row and a
//! column instead of surfacing as a schema inference failure.
//!
//! # Expected header
//!
//! `age, sex, bmi, children, smoker, region, charges` in any order. Names are
//! case-sensitive and must be unique; extra columns are ignored.

use std::collections::HashSet;
use std::io::Cursor;
use std::sync::Arc;

use arrow::array::{Array, StringArray};
use arrow::csv::ReaderBuilder;
use arrow::csv::reader::Format;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::error::ArrowError;
use arrow::record_batch::RecordBatch;

use crate::data::schema::{REQUIRED_COLUMNS, Record, Sex, Smoker, TARGET_NAME};
use crate::error::{ChargeError, Result};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

// =============================================================================
// Public API
// =============================================================================

/// Parse CSV bytes into typed records.
///
/// # Errors
///
/// [`ChargeError::MalformedData`] when a required column is absent, a row is
/// ragged, a cell is empty, a number does not parse, or a categorical label
/// is outside its known set.
pub fn parse_records(bytes: &[u8]) -> Result<Vec<Record>> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);

    let schema = text_schema(bytes)?;
    for column in REQUIRED_COLUMNS {
        if schema.field_with_name(column).is_err() {
            return Err(ChargeError::malformed_column(
                column,
                "required column is missing from the header",
            ));
        }
    }

    let reader = ReaderBuilder::new(schema)
        .with_header(true)
        .build(Cursor::new(bytes))
        .map_err(arrow_error)?;

    let mut records = Vec::new();
    for batch in reader {
        let batch = batch.map_err(arrow_error)?;
        let first_row = records.len() + 1;
        records.extend(BatchColumns::new(&batch)?.records(first_row)?);
    }
    Ok(records)
}

// =============================================================================
// Internal helpers
// =============================================================================

/// Read the header and declare every column as nullable text.
fn text_schema(bytes: &[u8]) -> Result<Arc<Schema>> {
    let (inferred, _) = Format::default()
        .with_header(true)
        .infer_schema(Cursor::new(bytes), Some(0))
        .map_err(arrow_error)?;

    let mut seen = HashSet::new();
    let mut fields = Vec::with_capacity(inferred.fields().len());
    for field in inferred.fields() {
        let name = field.name().trim();
        if !seen.insert(name) {
            return Err(ChargeError::malformed_column(
                name,
                "column appears more than once in the header",
            ));
        }
        fields.push(Field::new(name, DataType::Utf8, true));
    }
    Ok(Arc::new(Schema::new(fields)))
}

fn arrow_error(err: ArrowError) -> ChargeError {
    ChargeError::malformed_column("*", err.to_string())
}

/// Text columns of one record batch, resolved by name.
struct BatchColumns<'a> {
    age: &'a StringArray,
    sex: &'a StringArray,
    bmi: &'a StringArray,
    children: &'a StringArray,
    smoker: &'a StringArray,
    region: &'a StringArray,
    charges: &'a StringArray,
    n_rows: usize,
}

impl<'a> BatchColumns<'a> {
    fn new(batch: &'a RecordBatch) -> Result<Self> {
        Ok(Self {
            age: text_column(batch, "age")?,
            sex: text_column(batch, "sex")?,
            bmi: text_column(batch, "bmi")?,
            children: text_column(batch, "children")?,
            smoker: text_column(batch, "smoker")?,
            region: text_column(batch, "region")?,
            charges: text_column(batch, TARGET_NAME)?,
            n_rows: batch.num_rows(),
        })
    }

    /// Convert every row; `first_row` is the 1-based number of row 0.
    fn records(&self, first_row: usize) -> Result<Vec<Record>> {
        (0..self.n_rows)
            .map(|i| {
                let row = first_row + i;
                let sex = cell(self.sex, i, row, "sex")?;
                let smoker = cell(self.smoker, i, row, "smoker")?;
                Ok(Record {
                    age: parse_count(cell(self.age, i, row, "age")?, row, "age")?,
                    sex: Sex::from_label(sex).ok_or_else(|| unknown_category(row, "sex", sex))?,
                    bmi: parse_finite(cell(self.bmi, i, row, "bmi")?, row, "bmi")?,
                    children: parse_count(
                        cell(self.children, i, row, "children")?,
                        row,
                        "children",
                    )?,
                    smoker: Smoker::from_label(smoker)
                        .ok_or_else(|| unknown_category(row, "smoker", smoker))?,
                    region: cell(self.region, i, row, "region")?.to_string(),
                    charges: parse_finite(
                        cell(self.charges, i, row, TARGET_NAME)?,
                        row,
                        TARGET_NAME,
                    )?,
                })
            })
            .collect()
    }
}

fn text_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a StringArray> {
    batch
        .column_by_name(name)
        .ok_or_else(|| ChargeError::malformed_column(name, "required column is missing"))?
        .as_any()
        .downcast_ref::<StringArray>()
        .ok_or_else(|| ChargeError::malformed_column(name, "column was not read as text"))
}

/// Trimmed cell text; empty or null cells are missing fields.
fn cell<'a>(array: &'a StringArray, idx: usize, row: usize, column: &str) -> Result<&'a str> {
    let value = if array.is_null(idx) {
        ""
    } else {
        array.value(idx).trim()
    };
    if value.is_empty() {
        return Err(ChargeError::malformed_cell(row, column, "missing value"));
    }
    Ok(value)
}

fn parse_count(value: &str, row: usize, column: &str) -> Result<u32> {
    value.parse::<u32>().map_err(|_| {
        ChargeError::malformed_cell(
            row,
            column,
            format!("expected a non-negative integer, got '{value}'"),
        )
    })
}

fn parse_finite(value: &str, row: usize, column: &str) -> Result<f32> {
    match value.parse::<f32>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(ChargeError::malformed_cell(
            row,
            column,
            format!("expected a finite number, got '{value}'"),
        )),
    }
}

fn unknown_category(row: usize, column: &str, value: &str) -> ChargeError {
    ChargeError::malformed_cell(row, column, format!("unknown category '{value}'"))
}
