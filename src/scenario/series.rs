//! Pre-computed scenario pathways
//!
//! One table per scenario: a `time` column (integer offset from the epoch year) and the
//! value columns the model exported. Rows are addressed by index; index 0 is the
//! aggregation start year.

use super::ColumnKey;
use crate::error::{Error, Result};
use csv::Reader;
use log::debug;
use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

pub const TIME_COLUMN: &str = "time";

/// Read-only time series of one scenario
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioSeries {
    name: String,
    time: Vec<i64>,
    columns: BTreeMap<ColumnKey, Vec<f64>>,
}

impl ScenarioSeries {
    /// Build from already-parsed columns; every column must match the length of `time`
    pub fn new(name: impl Into<String>, time: Vec<i64>, columns: BTreeMap<ColumnKey, Vec<f64>>) -> Result<Self> {
        let name = name.into();
        for (key, values) in &columns {
            if values.len() != time.len() {
                return Err(Error::schema(
                    &name,
                    format!("column {} has {} rows, time has {}", key, values.len(), time.len()),
                ));
            }
        }
        Ok(Self { name, time, columns })
    }

    /// Series indexed 0..n with the given columns
    pub fn from_columns(name: impl Into<String>, columns: Vec<(ColumnKey, Vec<f64>)>) -> Result<Self> {
        let rows = columns.first().map(|(_, v)| v.len()).unwrap_or(0);
        Self::new(name, (0..rows as i64).collect(), columns.into_iter().collect())
    }

    /// Load a scenario CSV from disk
    pub fn load(name: impl Into<String>, path: &Path) -> Result<Self> {
        let reader = Reader::from_path(path)?;
        Self::read(name.into(), reader)
    }

    /// Load a scenario CSV from any reader
    pub fn from_reader<R: Read>(name: impl Into<String>, reader: R) -> Result<Self> {
        Self::read(name.into(), Reader::from_reader(reader))
    }

    fn read<R: Read>(name: String, mut reader: Reader<R>) -> Result<Self> {
        let headers = reader.headers()?.clone();

        let time_idx = headers
            .iter()
            .position(|h| h.trim() == TIME_COLUMN)
            .ok_or_else(|| Error::schema(&name, "missing column \"time\""))?;

        let mut keyed: Vec<(usize, ColumnKey)> = Vec::new();
        for (idx, header) in headers.iter().enumerate() {
            if idx == time_idx {
                continue;
            }
            match header.parse::<ColumnKey>() {
                Ok(key) => keyed.push((idx, key)),
                Err(_) => debug!("{}: ignoring column {:?}", name, header),
            }
        }

        let mut time = Vec::new();
        let mut columns: BTreeMap<ColumnKey, Vec<f64>> = keyed.iter().map(|&(_, key)| (key, Vec::new())).collect();

        for (row_idx, result) in reader.records().enumerate() {
            let record = result?;
            let row = row_idx + 2;
            let time_cell = record.get(time_idx).unwrap_or("");
            let t = parse_cell(time_cell, &name, row, TIME_COLUMN)?;
            if !t.is_finite() || t.fract() != 0.0 {
                return Err(Error::Parse {
                    table: name.clone(),
                    row,
                    column: TIME_COLUMN.to_string(),
                    value: time_cell.to_string(),
                });
            }
            time.push(t as i64);

            for &(idx, key) in &keyed {
                let value = parse_cell(record.get(idx).unwrap_or(""), &name, row, &key.to_string())?;
                if let Some(values) = columns.get_mut(&key) {
                    values.push(value);
                }
            }
        }

        debug!("{}: {} rows, {} value columns", name, time.len(), columns.len());
        Self::new(name, time, columns)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    pub fn time(&self) -> &[i64] {
        &self.time
    }

    pub fn has_column(&self, key: ColumnKey) -> bool {
        self.columns.contains_key(&key)
    }

    pub fn column_keys(&self) -> impl Iterator<Item = ColumnKey> + '_ {
        self.columns.keys().copied()
    }

    /// Values of one column; a column the scenario does not carry is a schema error
    pub fn column(&self, key: ColumnKey) -> Result<&[f64]> {
        self.columns
            .get(&key)
            .map(Vec::as_slice)
            .ok_or_else(|| Error::schema(&self.name, format!("no column {}", key)))
    }
}

/// Empty cells read as NaN
fn parse_cell(raw: &str, table: &str, row: usize, column: &str) -> Result<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(f64::NAN);
    }
    trimmed.parse::<f64>().map_err(|_| Error::Parse {
        table: table.to_string(),
        row,
        column: column.to_string(),
        value: raw.to_string(),
    })
}
