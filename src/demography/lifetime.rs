//! Lifetime spans by birth year
//!
//! A cohort born in year `b` is taken to live until `b + trunc(life expectancy at birth)`.
//! Birth years past the last tabulated year reuse the last tabulated life expectancy
//! (a flat extrapolation, not a re-estimate of future longevity).

use super::DemographicTable;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Rule for birth years after the last tabulated year
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Extrapolation {
    /// Untabulated birth years are a lookup error
    None,
    /// End of life = birth year + last tabulated life expectancy
    #[default]
    StaticLastLifeExpectancy,
}

/// Derived lifetime of one birth cohort
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifetimeSpan {
    pub birth_year: i32,
    pub end_of_life_year: i32,
}

impl LifetimeSpan {
    /// Whether the cohort is alive in `year` (born on/before it, not yet past end of life)
    pub fn is_alive_in(&self, year: i32) -> bool {
        self.birth_year <= year && self.end_of_life_year >= year
    }
}

/// Birth year to life expectancy lookup with an extrapolation policy
#[derive(Debug, Clone)]
pub struct LifetimeTable {
    life_expectancy: BTreeMap<i32, f64>,
    extrapolation: Extrapolation,
}

impl LifetimeTable {
    pub fn new(life_expectancy: BTreeMap<i32, f64>, extrapolation: Extrapolation) -> Self {
        Self {
            life_expectancy,
            extrapolation,
        }
    }

    /// Use each year's life expectancy at birth as that cohort's lifetime estimate
    pub fn from_demography(table: &DemographicTable, extrapolation: Extrapolation) -> Self {
        let life_expectancy = table
            .records()
            .iter()
            .map(|r| (r.year, r.life_expectancy_years))
            .collect();
        Self::new(life_expectancy, extrapolation)
    }

    pub fn extrapolation(&self) -> Extrapolation {
        self.extrapolation
    }

    /// Tabulated (birth year, life expectancy) pairs in ascending year order
    pub fn entries(&self) -> impl Iterator<Item = (i32, f64)> + '_ {
        self.life_expectancy.iter().map(|(&year, &le)| (year, le))
    }

    pub fn last_tabulated_year(&self) -> Option<i32> {
        self.life_expectancy.keys().next_back().copied()
    }

    /// Life expectancy applied to a birth year, after extrapolation
    pub fn life_expectancy(&self, birth_year: i32) -> Result<f64> {
        if let Some(&le) = self.life_expectancy.get(&birth_year) {
            return Ok(le);
        }

        match (self.extrapolation, self.life_expectancy.iter().next_back()) {
            (Extrapolation::StaticLastLifeExpectancy, Some((&last_year, &last_le)))
                if birth_year > last_year =>
            {
                Ok(last_le)
            }
            _ => Err(Error::lookup("life expectancy by birth year", birth_year)),
        }
    }

    /// Calendar year in which the cohort's expected lifetime ends
    pub fn end_of_life_year(&self, birth_year: i32) -> Result<i32> {
        let le = self.life_expectancy(birth_year)?;
        // cast truncates towards zero
        Ok(birth_year + le as i32)
    }

    pub fn span(&self, birth_year: i32) -> Result<LifetimeSpan> {
        Ok(LifetimeSpan {
            birth_year,
            end_of_life_year: self.end_of_life_year(birth_year)?,
        })
    }
}
