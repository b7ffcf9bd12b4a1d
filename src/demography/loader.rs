//! Load demographic indicator sheets exported to CSV
//!
//! The World Population Prospects sheets carry a block of title rows above the header,
//! so each source declares how many rows to skip and how many data rows to read.

use super::{DemographicRecord, DemographicTable};
use crate::error::{Error, Result};
use csv::{ReaderBuilder, StringRecord};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

pub const YEAR_COLUMN: &str = "Year";
pub const TOTAL_POPULATION_COLUMN: &str = "Total Population, as of 1 January (thousands)";
pub const BIRTHS_COLUMN: &str = "Births (thousands)";
pub const LIFE_EXPECTANCY_COLUMN: &str = "Life Expectancy at Birth, both sexes (years)";
pub const INFANT_MORTALITY_COLUMN: &str = "Infant Mortality Rate (infant deaths per 1,000 live births)";
pub const UNDER5_DEATHS_COLUMN: &str = "Under-Five Deaths, under age 5 (thousands)";

/// Columns every demographic source must provide
pub const REQUIRED_COLUMNS: [&str; 6] = [
    YEAR_COLUMN,
    TOTAL_POPULATION_COLUMN,
    BIRTHS_COLUMN,
    LIFE_EXPECTANCY_COLUMN,
    INFANT_MORTALITY_COLUMN,
    UNDER5_DEATHS_COLUMN,
];

/// One demographic sheet exported to CSV
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemographicSource {
    pub path: PathBuf,

    /// Sheet label used in log and error messages ("Estimates", "Medium variant")
    pub label: String,

    /// Title rows above the header row
    #[serde(default = "default_skip_rows")]
    pub skip_rows: usize,

    /// Number of data rows to read below the header; all rows when absent
    #[serde(default)]
    pub max_rows: Option<usize>,
}

fn default_skip_rows() -> usize { 16 }

impl DemographicSource {
    /// The historical "Estimates" sheet (1950-2021)
    pub fn estimates(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            label: "Estimates".to_string(),
            skip_rows: default_skip_rows(),
            max_rows: Some(72),
        }
    }

    /// The "Medium variant" projection sheet (2022-2100)
    pub fn medium_variant(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            label: "Medium variant".to_string(),
            skip_rows: default_skip_rows(),
            max_rows: Some(79),
        }
    }

    /// Load the source, resolving a relative path against `base_dir`
    pub fn load(&self, base_dir: &Path) -> Result<Vec<DemographicRecord>> {
        let path = base_dir.join(&self.path);
        debug!("reading {} from {}", self.label, path.display());
        let file = File::open(&path)?;
        load_records_from_reader(file, &self.label, self.skip_rows, self.max_rows)
    }
}

/// Column positions of the required fields in one sheet
struct ColumnIndex {
    year: usize,
    total_population: usize,
    births: usize,
    life_expectancy: usize,
    infant_mortality: usize,
    under5_deaths: usize,
}

impl ColumnIndex {
    fn from_header(header: &StringRecord, table: &str) -> Result<Self> {
        let find = |name: &str| {
            header
                .iter()
                .position(|h| h.trim() == name)
                .ok_or_else(|| Error::schema(table, format!("missing column {:?}", name)))
        };

        Ok(Self {
            year: find(YEAR_COLUMN)?,
            total_population: find(TOTAL_POPULATION_COLUMN)?,
            births: find(BIRTHS_COLUMN)?,
            life_expectancy: find(LIFE_EXPECTANCY_COLUMN)?,
            infant_mortality: find(INFANT_MORTALITY_COLUMN)?,
            under5_deaths: find(UNDER5_DEATHS_COLUMN)?,
        })
    }
}

/// Read demographic records from any CSV reader.
///
/// Skips `skip_rows` rows, takes the next row as header, then reads at most
/// `max_rows` data rows. Rows with an empty year cell are ignored.
pub fn load_records_from_reader<R: Read>(
    reader: R,
    table: &str,
    skip_rows: usize,
    max_rows: Option<usize>,
) -> Result<Vec<DemographicRecord>> {
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut rows = csv_reader.records().skip(skip_rows);
    let header = match rows.next() {
        Some(row) => row?,
        None => return Err(Error::schema(table, "no header row after skipped title rows")),
    };
    let columns = ColumnIndex::from_header(&header, table)?;

    let mut records = Vec::new();
    for (row_idx, result) in rows.take(max_rows.unwrap_or(usize::MAX)).enumerate() {
        let row = result?;
        let cell = |idx: usize| row.get(idx).unwrap_or("");
        let row_number = skip_rows + row_idx + 2;

        if cell(columns.year).trim().is_empty() {
            debug!("{}: skipping row {} without a year", table, row_number);
            continue;
        }

        let number = |idx: usize, column: &str| parse_number(cell(idx), table, row_number, column);
        records.push(DemographicRecord {
            year: parse_year(cell(columns.year), table, row_number)?,
            total_population_thousands: number(columns.total_population, TOTAL_POPULATION_COLUMN)?,
            births_thousands: number(columns.births, BIRTHS_COLUMN)?,
            life_expectancy_years: number(columns.life_expectancy, LIFE_EXPECTANCY_COLUMN)?,
            infant_mortality_rate: number(columns.infant_mortality, INFANT_MORTALITY_COLUMN)?,
            under5_deaths_thousands: number(columns.under5_deaths, UNDER5_DEATHS_COLUMN)?,
        });
    }

    debug!("{}: read {} records", table, records.len());
    Ok(records)
}

/// Load both sources and combine them into one year-sorted table
pub fn load_demographic_table(
    estimates: &DemographicSource,
    projection: &DemographicSource,
    base_dir: &Path,
) -> Result<DemographicTable> {
    let historical = estimates.load(base_dir)?;
    let projected = projection.load(base_dir)?;
    let table = DemographicTable::combine(historical, projected);

    info!(
        "demographic table covers {:?}..={:?} ({} years)",
        table.first_year(),
        table.last_year(),
        table.len()
    );
    Ok(table)
}

/// Parse a numeric cell, tolerating thousands separators written as spaces
pub(crate) fn parse_number(raw: &str, table: &str, row: usize, column: &str) -> Result<f64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '\u{a0}')
        .collect();
    cleaned.parse::<f64>().map_err(|_| Error::Parse {
        table: table.to_string(),
        row,
        column: column.to_string(),
        value: raw.to_string(),
    })
}

pub(crate) fn parse_year(raw: &str, table: &str, row: usize) -> Result<i32> {
    let value = parse_number(raw, table, row, YEAR_COLUMN)?;
    if value.fract() != 0.0 || !value.is_finite() {
        return Err(Error::Parse {
            table: table.to_string(),
            row,
            column: YEAR_COLUMN.to_string(),
            value: raw.to_string(),
        });
    }
    Ok(value as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "Index,Variant,Year,\"Total Population, as of 1 January (thousands)\",Births (thousands),\
\"Life Expectancy at Birth, both sexes (years)\",\"Infant Mortality Rate (infant deaths per 1,000 live births)\",\
\"Under-Five Deaths, under age 5 (thousands)\"";

    fn sheet(title_rows: usize, rows: &[&str]) -> String {
        let mut text = String::new();
        for i in 0..title_rows {
            text.push_str(&format!("title line {}\n", i));
        }
        text.push_str(HEADER);
        text.push('\n');
        for row in rows {
            text.push_str(row);
            text.push('\n');
        }
        text
    }

    #[test]
    fn test_load_skips_title_rows() {
        let text = sheet(3, &[
            "1,Estimates,2020,7 841 000,140 000,72.5,27.9,5 000",
            "2,Estimates,2021,7 909 000,134 000,71.0,27.4,4 900",
        ]);
        let records = load_records_from_reader(text.as_bytes(), "Estimates", 3, None).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].year, 2020);
        assert_eq!(records[0].total_population_thousands, 7_841_000.0);
        assert_eq!(records[0].births_thousands, 140_000.0);
        assert_eq!(records[1].life_expectancy_years, 71.0);
    }

    #[test]
    fn test_max_rows_limits_data_rows() {
        let text = sheet(0, &[
            "1,Estimates,2019,1,1,70,1,1",
            "2,Estimates,2020,1,1,70,1,1",
            "3,Estimates,2021,1,1,70,1,1",
        ]);
        let records = load_records_from_reader(text.as_bytes(), "Estimates", 0, Some(2)).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].year, 2020);
    }

    #[test]
    fn test_missing_column_is_schema_error() {
        let text = "Year,Births (thousands)\n2020,140000\n";
        let err = load_records_from_reader(text.as_bytes(), "Medium variant", 0, None).unwrap_err();
        assert!(err.is_schema());
        assert!(err.to_string().contains("Total Population"));
    }

    #[test]
    fn test_bad_cell_is_parse_error() {
        let text = sheet(0, &["1,Estimates,2020,...,140000,72.5,27.9,5000"]);
        let err = load_records_from_reader(text.as_bytes(), "Estimates", 0, None).unwrap_err();
        assert!(matches!(err, Error::Parse { row: 2, .. }));
    }

    #[test]
    fn test_fractional_year_rejected() {
        assert_eq!(parse_year("1950.0", "t", 1).unwrap(), 1950);
        assert!(parse_year("1950.5", "t", 1).is_err());
    }
}
