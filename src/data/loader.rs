use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use anyhow::{bail, Context, Result};
use arrow::array::{Array, StringArray};
use arrow::datatypes::DataType;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::error::SchemaError;
use super::model::{Dataset, Measurement, REQUIRED_COLUMNS};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a measurement table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row with the columns in [`REQUIRED_COLUMNS`]
/// * `.json`    – `[{ "city": "Delhi", "date": "2015-01-01", "aqi": 180, ... }, ...]`
/// * `.parquet` – one column per required field, any type castable to text
///
/// Schema problems surface as [`SchemaError`] somewhere in the error chain.
pub fn load_file(path: &Path) -> Result<Dataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let dataset = match ext.as_str() {
        "csv" => load_csv(path),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
    .with_context(|| format!("loading {}", path.display()))?;

    log::info!(
        "Loaded {} measurements for {} cities from {}",
        dataset.len(),
        dataset.cities().len(),
        path.display()
    );
    Ok(dataset)
}

// ---------------------------------------------------------------------------
// Cached handle
// ---------------------------------------------------------------------------

/// A lazily loaded, immutable dataset bound to one source file.
///
/// The first successful [`DatasetHandle::get`] parses the file; every later
/// call hands out the same `Arc`. A failed load is not remembered, so the
/// next call tries again.
#[derive(Debug)]
pub struct DatasetHandle {
    path: PathBuf,
    cell: OnceLock<Arc<Dataset>>,
}

impl DatasetHandle {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DatasetHandle {
            path: path.into(),
            cell: OnceLock::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_loaded(&self) -> bool {
        self.cell.get().is_some()
    }

    pub fn get(&self) -> Result<Arc<Dataset>> {
        if let Some(dataset) = self.cell.get() {
            log::debug!("dataset cache hit for {}", self.path.display());
            return Ok(Arc::clone(dataset));
        }
        let loaded = load_file(&self.path)?;
        Ok(Arc::clone(self.cell.get_or_init(|| Arc::new(loaded))))
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(path: &Path) -> Result<Dataset> {
    let file = std::fs::File::open(path).context("opening CSV")?;
    read_csv(file)
}

/// Parse CSV text from any reader.  Columns may appear in any order and
/// extra columns are ignored.
pub fn read_csv<R: Read>(reader: R) -> Result<Dataset> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let positions = column_positions(&headers)?;

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        let measurement = parse_row(row_no, |col| {
            record
                .get(positions[col])
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        })?;
        rows.push(measurement);
    }

    Ok(Dataset::from_rows(rows))
}

/// Index of each required column within `headers`, in [`REQUIRED_COLUMNS`]
/// order.  Reports every missing column at once.
fn column_positions(headers: &[String]) -> Result<[usize; 10], SchemaError> {
    let mut positions = [0usize; 10];
    let mut missing = Vec::new();
    for (slot, col) in REQUIRED_COLUMNS.iter().enumerate() {
        match headers.iter().position(|h| h == col) {
            Some(idx) => positions[slot] = idx,
            None => missing.push(col.to_string()),
        }
    }
    if missing.is_empty() {
        Ok(positions)
    } else {
        Err(SchemaError::MissingColumns(missing))
    }
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "city": "Delhi", "date": "2015-01-01", "aqi": 312, "pm25": 180.2, ... },
///   ...
/// ]
/// ```
fn load_json(path: &Path) -> Result<Dataset> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root
        .as_array()
        .ok_or_else(|| SchemaError::NotTabular("expected top-level JSON array".into()))?;

    if let Some(first) = records.first().and_then(|r| r.as_object()) {
        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|col| !first.contains_key(**col))
            .map(|col| col.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(SchemaError::MissingColumns(missing).into());
        }
    }

    let mut rows = Vec::with_capacity(records.len());
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .ok_or_else(|| SchemaError::NotTabular(format!("row {i} is not a JSON object")))?;

        let measurement = parse_row(i, |col| {
            match obj.get(REQUIRED_COLUMNS[col])? {
                JsonValue::Null => None,
                JsonValue::String(s) if s.is_empty() => None,
                JsonValue::String(s) => Some(s.clone()),
                other => Some(other.to_string()),
            }
        })?;
        rows.push(measurement);
    }

    Ok(Dataset::from_rows(rows))
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file of measurements.
///
/// Each required column is cast to text and then parsed like a CSV cell, so
/// `Date32`/timestamp dates and integer or float numerics are all accepted.
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<Dataset> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;

    // checked against the file metadata so zero-row files are validated too
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|col| builder.schema().index_of(col).is_err())
        .map(|col| col.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(SchemaError::MissingColumns(missing).into());
    }

    let reader = builder.build().context("building parquet reader")?;
    let mut rows = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();

        let mut text_columns = Vec::with_capacity(REQUIRED_COLUMNS.len());
        for col in REQUIRED_COLUMNS {
            let idx = schema.index_of(col)?;
            let text = arrow::compute::cast(batch.column(idx), &DataType::Utf8)
                .with_context(|| format!("casting column '{col}' to text"))?;
            text_columns.push(text);
        }
        let columns: Vec<&StringArray> = text_columns
            .iter()
            .map(|c| {
                c.as_any()
                    .downcast_ref::<StringArray>()
                    .context("expected Utf8 array after cast")
            })
            .collect::<Result<_>>()?;

        let offset = rows.len();
        for row in 0..batch.num_rows() {
            let measurement = parse_row(offset + row, |col| {
                let arr = columns[col];
                if arr.is_null(row) || arr.value(row).is_empty() {
                    None
                } else {
                    Some(arr.value(row).to_string())
                }
            })?;
            rows.push(measurement);
        }
    }

    Ok(Dataset::from_rows(rows))
}

// ---------------------------------------------------------------------------
// Cell parsing shared by every format
// ---------------------------------------------------------------------------

/// Build one measurement from a lookup of cell text by [`REQUIRED_COLUMNS`]
/// index.  `None` means the cell is absent or empty.
fn parse_row(
    row: usize,
    cell: impl Fn(usize) -> Option<String>,
) -> Result<Measurement, SchemaError> {
    let text = |col: usize| -> Result<String, SchemaError> {
        cell(col).ok_or_else(|| SchemaError::MissingValue {
            row,
            column: REQUIRED_COLUMNS[col].to_string(),
        })
    };
    let number = |col: usize| -> Result<f64, SchemaError> {
        let raw = text(col)?;
        parse_number(&raw).ok_or_else(|| SchemaError::InvalidValue {
            row,
            column: REQUIRED_COLUMNS[col].to_string(),
            value: raw,
        })
    };

    let raw_date = text(1)?;
    let Some(date) = parse_date(&raw_date) else {
        return Err(SchemaError::UnparsableDate {
            row,
            value: raw_date,
        });
    };

    Ok(Measurement {
        city: text(0)?,
        date,
        aqi: number(2)?,
        pm25: number(3)?,
        pm10: number(4)?,
        no2: number(5)?,
        so2: number(6)?,
        co: number(7)?,
        o3: number(8)?,
        aqi_category: text(9)?,
    })
}

/// Concentrations and scores are finite and non-negative.
fn parse_number(s: &str) -> Option<f64> {
    s.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v >= 0.0)
}

/// Accepts a bare ISO date or a date-time; the time of day is dropped.
pub(crate) fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date);
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive())
}
