//! Demographic records and the combined year-sorted table

use crate::error::{Error, Result};
use log::warn;
use serde::{Deserialize, Serialize};

/// One calendar year of world demographic indicators
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemographicRecord {
    pub year: i32,

    /// Total population as of 1 January (thousands)
    pub total_population_thousands: f64,

    /// Births during the year (thousands)
    pub births_thousands: f64,

    /// Life expectancy at birth, both sexes (years)
    pub life_expectancy_years: f64,

    /// Infant deaths per 1,000 live births
    pub infant_mortality_rate: f64,

    /// Deaths under age 5 (thousands)
    pub under5_deaths_thousands: f64,
}

/// Historical and projected records combined into one table, one record per year
///
/// Immutable once built; every downstream lookup goes through [`DemographicTable::record`].
#[derive(Debug, Clone, Default)]
pub struct DemographicTable {
    records: Vec<DemographicRecord>,
}

impl DemographicTable {
    /// Combine historical estimates with a projection variant.
    ///
    /// Rows are concatenated and sorted ascending by year. Where both sources carry
    /// the same year the projection record is kept.
    pub fn combine(estimates: Vec<DemographicRecord>, projection: Vec<DemographicRecord>) -> Self {
        let mut records = estimates;
        records.extend(projection);
        // stable: for equal years the projection row stays after the estimate row
        records.sort_by_key(|r| r.year);

        let mut combined: Vec<DemographicRecord> = Vec::with_capacity(records.len());
        let mut duplicates = Vec::new();
        for record in records {
            match combined.last_mut() {
                Some(last) if last.year == record.year => {
                    duplicates.push(record.year);
                    *last = record;
                }
                _ => combined.push(record),
            }
        }

        if !duplicates.is_empty() {
            warn!(
                "estimates and projection overlap in {} year(s) {:?}; keeping projection values",
                duplicates.len(),
                duplicates
            );
        }

        Self { records: combined }
    }

    /// Build directly from records (sorted and deduplicated like [`combine`](Self::combine))
    pub fn from_records(records: Vec<DemographicRecord>) -> Self {
        Self::combine(records, Vec::new())
    }

    pub fn records(&self) -> &[DemographicRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn first_year(&self) -> Option<i32> {
        self.records.first().map(|r| r.year)
    }

    pub fn last_year(&self) -> Option<i32> {
        self.records.last().map(|r| r.year)
    }

    /// Record for a calendar year
    pub fn record(&self, year: i32) -> Result<&DemographicRecord> {
        self.records
            .binary_search_by_key(&year, |r| r.year)
            .map(|idx| &self.records[idx])
            .map_err(|_| Error::lookup("demographic table", year))
    }

    pub fn total_population(&self, year: i32) -> Result<f64> {
        Ok(self.record(year)?.total_population_thousands)
    }

    pub fn births(&self, year: i32) -> Result<f64> {
        Ok(self.record(year)?.births_thousands)
    }
}

#[cfg(test)]
pub(crate) fn record(year: i32, population: f64, births: f64, life_expectancy: f64) -> DemographicRecord {
    DemographicRecord {
        year,
        total_population_thousands: population,
        births_thousands: births,
        life_expectancy_years: life_expectancy,
        infant_mortality_rate: 0.0,
        under5_deaths_thousands: 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combine_sorts_by_year() {
        let estimates = vec![record(2021, 7_900_000.0, 135_000.0, 71.0), record(2020, 7_800_000.0, 140_000.0, 72.5)];
        let projection = vec![record(2023, 8_000_000.0, 133_000.0, 73.0), record(2022, 7_950_000.0, 134_000.0, 72.8)];

        let table = DemographicTable::combine(estimates, projection);
        let years: Vec<i32> = table.records().iter().map(|r| r.year).collect();
        assert_eq!(years, vec![2020, 2021, 2022, 2023]);
        assert_eq!(table.first_year(), Some(2020));
        assert_eq!(table.last_year(), Some(2023));
    }

    #[test]
    fn test_overlapping_year_keeps_projection() {
        let estimates = vec![record(2021, 7_900_000.0, 135_000.0, 71.0)];
        let projection = vec![record(2021, 7_910_000.0, 136_000.0, 71.2)];

        let table = DemographicTable::combine(estimates, projection);
        assert_eq!(table.len(), 1);
        assert_eq!(table.births(2021).unwrap(), 136_000.0);
    }

    #[test]
    fn test_missing_year_is_lookup_error() {
        let table = DemographicTable::from_records(vec![record(2020, 7_800_000.0, 140_000.0, 72.5)]);
        let err = table.record(1949).unwrap_err();
        assert!(err.is_lookup());
        assert_eq!(table.total_population(2020).unwrap(), 7_800_000.0);
    }
}
