//! Population-share weighted cohort exposure
//!
//! Each year of the weighting window contributes the metric weighted by the share of that
//! year's population born in the cohort's birth year; the cohort's exposure is the mean
//! of those weighted values over the window.

use super::metric::{CohortValues, Metric};
use crate::config::YearRange;
use crate::demography::AliveShareTable;
use crate::error::{Error, Result};
use crate::scenario::ScenarioSeries;

/// Averages share-weighted metric values over a window of comparison years
#[derive(Debug, Clone, Copy)]
pub struct ShareWeightedAggregator<'a> {
    shares: &'a AliveShareTable,
    weighting_years: YearRange,
}

impl<'a> ShareWeightedAggregator<'a> {
    /// Series index 0 corresponds to `weighting_years.start`
    pub fn new(shares: &'a AliveShareTable, weighting_years: YearRange) -> Self {
        Self {
            shares,
            weighting_years,
        }
    }

    /// Weighted exposure of the cohort born in `birth_year`
    ///
    /// NaN terms are left out of the mean; a window with only NaN terms yields NaN.
    pub fn aggregate(&self, series: &ScenarioSeries, metric: &Metric, birth_year: i32) -> Result<f64> {
        let resolved = metric.resolve(series)?;
        let window = self.weighting_years.len();
        if resolved.len() < window {
            return Err(Error::schema(
                series.name(),
                format!("series has {} rows, weighting window needs {}", resolved.len(), window),
            ));
        }

        let mut total = 0.0;
        let mut counted = 0usize;
        for (index, comparison_year) in self.weighting_years.iter().enumerate() {
            let weighted = resolved.point(index) * self.shares.share(comparison_year, birth_year)?;
            if !weighted.is_nan() {
                total += weighted;
                counted += 1;
            }
        }

        Ok(if counted == 0 { f64::NAN } else { total / counted as f64 })
    }

    pub fn aggregate_cohorts(&self, series: &ScenarioSeries, metric: &Metric, cohorts: YearRange) -> Result<CohortValues> {
        cohorts
            .iter()
            .map(|birth_year| Ok((birth_year, self.aggregate(series, metric, birth_year)?)))
            .collect()
    }
}
