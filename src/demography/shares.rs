//! Share of a comparison year's population born in each earlier year
//!
//! A birth cohort counts towards comparison year `c` when it was born on or before `c`
//! and its lifetime span reaches `c`. Its share is its births divided by the total
//! population of `c`. Shares within a comparison year do not sum to one: cohorts born
//! before the first tabulated birth year are not modeled.

use super::{DemographicTable, LifetimeTable};
use crate::config::YearRange;
use crate::error::{Error, Result};
use log::debug;

/// Fraction of the population alive in `comparison_year` that was born in `birth_year`
///
/// Division by a zero population yields infinity/NaN rather than an error.
pub fn alive_share(
    demography: &DemographicTable,
    lifetimes: &LifetimeTable,
    comparison_year: i32,
    birth_year: i32,
) -> Result<f64> {
    if birth_year > comparison_year {
        return Ok(0.0);
    }
    if lifetimes.end_of_life_year(birth_year)? < comparison_year {
        return Ok(0.0);
    }
    let births = demography.births(birth_year)?;
    let total_population = demography.total_population(comparison_year)?;
    Ok(births / total_population)
}

/// Dense (birth year x comparison year) matrix of alive shares
#[derive(Debug, Clone, PartialEq)]
pub struct AliveShareTable {
    birth_years: YearRange,
    comparison_years: YearRange,
    /// Row-major: one row per birth year
    shares: Vec<f64>,
}

impl AliveShareTable {
    /// Compute every share for the given ranges
    pub fn compute(
        demography: &DemographicTable,
        lifetimes: &LifetimeTable,
        comparison_years: YearRange,
        birth_years: YearRange,
    ) -> Result<Self> {
        let mut shares = Vec::with_capacity(birth_years.len() * comparison_years.len());
        for birth_year in birth_years.iter() {
            for comparison_year in comparison_years.iter() {
                shares.push(alive_share(demography, lifetimes, comparison_year, birth_year)?);
            }
        }

        debug!(
            "computed alive shares for {} birth years x {} comparison years",
            birth_years.len(),
            comparison_years.len()
        );
        Ok(Self {
            birth_years,
            comparison_years,
            shares,
        })
    }

    /// Build from precomputed rows (one `Vec` per birth year, one entry per comparison year)
    pub fn from_rows(birth_years: YearRange, comparison_years: YearRange, rows: Vec<Vec<f64>>) -> Result<Self> {
        if rows.len() != birth_years.len() {
            return Err(Error::schema(
                "population shares",
                format!("expected {} birth-year rows, found {}", birth_years.len(), rows.len()),
            ));
        }
        let mut shares = Vec::with_capacity(birth_years.len() * comparison_years.len());
        for (row, birth_year) in rows.into_iter().zip(birth_years.iter()) {
            if row.len() != comparison_years.len() {
                return Err(Error::schema(
                    "population shares",
                    format!(
                        "birth year {} has {} values, expected {}",
                        birth_year,
                        row.len(),
                        comparison_years.len()
                    ),
                ));
            }
            shares.extend(row);
        }
        Ok(Self {
            birth_years,
            comparison_years,
            shares,
        })
    }

    pub fn birth_years(&self) -> YearRange {
        self.birth_years
    }

    pub fn comparison_years(&self) -> YearRange {
        self.comparison_years
    }

    pub fn share(&self, comparison_year: i32, birth_year: i32) -> Result<f64> {
        let row = self
            .birth_years
            .index_of(birth_year)
            .ok_or_else(|| Error::lookup("population shares (birth year)", birth_year))?;
        let col = self
            .comparison_years
            .index_of(comparison_year)
            .ok_or_else(|| Error::lookup("population shares (comparison year)", comparison_year))?;
        Ok(self.shares[row * self.comparison_years.len() + col])
    }

    /// Shares of one birth cohort across all comparison years
    pub fn cohort_row(&self, birth_year: i32) -> Result<&[f64]> {
        let row = self
            .birth_years
            .index_of(birth_year)
            .ok_or_else(|| Error::lookup("population shares (birth year)", birth_year))?;
        let width = self.comparison_years.len();
        Ok(&self.shares[row * width..(row + 1) * width])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demography::record::record;
    use crate::demography::Extrapolation;
    use approx::assert_relative_eq;

    fn fixtures() -> (DemographicTable, LifetimeTable) {
        let mut records = Vec::new();
        for year in 2000..=2060 {
            records.push(record(year, 7_800_000.0, 140_000.0, 72.5));
        }
        // a short-lived cohort
        records[5].life_expectancy_years = 10.0;
        let demography = DemographicTable::from_records(records);
        let lifetimes = LifetimeTable::from_demography(&demography, Extrapolation::StaticLastLifeExpectancy);
        (demography, lifetimes)
    }

    #[test]
    fn test_share_of_newborn_cohort() {
        let (demography, lifetimes) = fixtures();
        let share = alive_share(&demography, &lifetimes, 2020, 2020).unwrap();
        assert_relative_eq!(share, 140_000.0 / 7_800_000.0);
        assert_relative_eq!(share, 0.017949, epsilon = 1e-6);
    }

    #[test]
    fn test_unborn_cohort_has_zero_share() {
        let (demography, lifetimes) = fixtures();
        assert_eq!(alive_share(&demography, &lifetimes, 2020, 2050).unwrap(), 0.0);
        // even when the birth year is outside the table entirely
        assert_eq!(alive_share(&demography, &lifetimes, 2020, 2300).unwrap(), 0.0);
    }

    #[test]
    fn test_deceased_cohort_has_zero_share() {
        let (demography, lifetimes) = fixtures();
        // born 2005 with 10 years expectancy: alive through 2015
        assert!(alive_share(&demography, &lifetimes, 2015, 2005).unwrap() > 0.0);
        assert_eq!(alive_share(&demography, &lifetimes, 2016, 2005).unwrap(), 0.0);
    }

    #[test]
    fn test_missing_comparison_year_is_lookup_error() {
        let (demography, lifetimes) = fixtures();
        let err = alive_share(&demography, &lifetimes, 2070, 2020).unwrap_err();
        assert!(err.is_lookup());
    }

    #[test]
    fn test_table_shares_are_bounded() {
        let (demography, lifetimes) = fixtures();
        let table = AliveShareTable::compute(
            &demography,
            &lifetimes,
            YearRange::new(2015, 2040),
            YearRange::new(2000, 2041),
        )
        .unwrap();

        for birth_year in table.birth_years().iter() {
            for comparison_year in table.comparison_years().iter() {
                let share = table.share(comparison_year, birth_year).unwrap();
                assert!((0.0..=1.0).contains(&share));
                if birth_year > comparison_year {
                    assert_eq!(share, 0.0);
                }
            }
        }
        assert_eq!(table.cohort_row(2010).unwrap().len(), 25);
        assert!(table.share(2040, 2010).unwrap_err().is_lookup());
    }

    #[test]
    fn test_from_rows_checks_shape() {
        let rows = vec![vec![0.1, 0.2], vec![0.3]];
        let err = AliveShareTable::from_rows(YearRange::new(2000, 2002), YearRange::new(2015, 2017), rows).unwrap_err();
        assert!(err.is_schema());
    }
}
