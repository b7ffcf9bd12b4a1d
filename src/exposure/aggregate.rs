//! Lifetime aggregation of a scenario metric over each birth cohort
//!
//! A cohort born in `b` is exposed to series indices `[max(0, b - start), end_of_life(b) - start)`,
//! where `start` is the calendar year of index 0. The summed indices are clipped to the series
//! length; averages still divide by the unclipped lifetime length. A cohort whose lifetime
//! ends before `start` has an aggregate of exactly zero.

use super::metric::{CohortValues, Metric};
use crate::config::YearRange;
use crate::demography::LifetimeTable;
use crate::error::Result;
use crate::scenario::ScenarioSeries;
use serde::{Deserialize, Serialize};

/// How values inside the lifetime window are reduced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reduction {
    #[default]
    Sum,
    /// Sum divided by the lifetime length inside the window, before clipping to the series
    Average,
}

/// Half-open index window of a cohort's lifetime within a series
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LifetimeWindow {
    pub start: usize,
    pub end: usize,
    /// Years lived from the window start, not clipped to the series
    pub lifetime_years: usize,
}

impl LifetimeWindow {
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Aggregates scenario metrics over the years each cohort is alive
#[derive(Debug, Clone, Copy)]
pub struct LifetimeAggregator<'a> {
    lifetimes: &'a LifetimeTable,
    aggregation_start_year: i32,
}

impl<'a> LifetimeAggregator<'a> {
    pub fn new(lifetimes: &'a LifetimeTable, aggregation_start_year: i32) -> Self {
        Self {
            lifetimes,
            aggregation_start_year,
        }
    }

    /// Index window for a cohort in a series of `series_len` rows.
    ///
    /// `None` when the lifetime ends before the aggregation start year.
    pub fn window(&self, birth_year: i32, series_len: usize) -> Result<Option<LifetimeWindow>> {
        let end_of_life = self.lifetimes.end_of_life_year(birth_year)?;
        if end_of_life < self.aggregation_start_year {
            return Ok(None);
        }

        let start = (birth_year - self.aggregation_start_year).max(0) as usize;
        let end = (end_of_life - self.aggregation_start_year) as usize;
        Ok(Some(LifetimeWindow {
            start: start.min(series_len),
            end: end.min(series_len),
            lifetime_years: end.saturating_sub(start),
        }))
    }

    /// Aggregate of `metric` over the lifetime of the cohort born in `birth_year`
    ///
    /// Each column is summed independently with NaN counted as zero, then the column
    /// sums are added. An empty window aggregates to zero, and so does an average over a
    /// zero-length lifetime.
    pub fn aggregate(
        &self,
        series: &ScenarioSeries,
        metric: &Metric,
        reduction: Reduction,
        birth_year: i32,
    ) -> Result<f64> {
        let resolved = metric.resolve(series)?;
        let window = match self.window(birth_year, resolved.len())? {
            Some(window) if !window.is_empty() && window.lifetime_years > 0 => window,
            _ => return Ok(0.0),
        };

        let total: f64 = (0..resolved.column_count())
            .map(|column| {
                (window.start..window.end)
                    .map(|i| resolved.element(column, i))
                    .filter(|v| !v.is_nan())
                    .sum::<f64>()
            })
            .sum();
        let total = total * resolved.scale();

        Ok(match reduction {
            Reduction::Sum => total,
            Reduction::Average => total / window.lifetime_years as f64,
        })
    }

    /// Aggregate for every birth year in `cohorts`
    pub fn aggregate_cohorts(
        &self,
        series: &ScenarioSeries,
        metric: &Metric,
        reduction: Reduction,
        cohorts: YearRange,
    ) -> Result<CohortValues> {
        cohorts
            .iter()
            .map(|birth_year| Ok((birth_year, self.aggregate(series, metric, reduction, birth_year)?)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demography::Extrapolation;
    use crate::scenario::ValueColumn;
    use approx::assert_relative_eq;
    use std::collections::BTreeMap;

    fn lifetimes(entries: &[(i32, f64)]) -> LifetimeTable {
        let table: BTreeMap<i32, f64> = entries.iter().copied().collect();
        LifetimeTable::new(table, Extrapolation::StaticLastLifeExpectancy)
    }

    fn flat_series() -> ScenarioSeries {
        ScenarioSeries::from_columns(
            "DICE-2016-R",
            vec![
                (ValueColumn::CostAbatement.into(), vec![10.0; 5]),
                (ValueColumn::CostDamage.into(), vec![2.0; 5]),
                (ValueColumn::Gdp.into(), vec![100.0; 5]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_lifetime_sum_and_relative_to_gdp() {
        // born 2015, lives until 2018
        let table = lifetimes(&[(2015, 3.4)]);
        let aggregator = LifetimeAggregator::new(&table, 2015);
        let series = flat_series();

        let cost = Metric::column(ValueColumn::CostAbatement.into());
        assert_relative_eq!(aggregator.aggregate(&series, &cost, Reduction::Sum, 2015).unwrap(), 30.0);

        let relative = cost.relative_to_gdp(ValueColumn::Gdp.into(), 1.0, true);
        assert_relative_eq!(
            aggregator.aggregate(&series, &relative, Reduction::Sum, 2015).unwrap(),
            30.0,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_lifetime_before_window_is_zero() {
        let table = lifetimes(&[(1930, 70.0)]);
        let aggregator = LifetimeAggregator::new(&table, 2015);
        let series = ScenarioSeries::from_columns(
            "s",
            vec![(ValueColumn::CostDamage.into(), vec![f64::INFINITY; 5])],
        )
        .unwrap();

        let metric = Metric::column(ValueColumn::CostDamage.into());
        assert_eq!(aggregator.window(1930, 5).unwrap(), None);
        assert_eq!(aggregator.aggregate(&series, &metric, Reduction::Sum, 1930).unwrap(), 0.0);
        assert_eq!(aggregator.aggregate(&series, &metric, Reduction::Average, 1930).unwrap(), 0.0);
    }

    #[test]
    fn test_window_starts_at_birth_and_clips_to_series() {
        let table = lifetimes(&[(2000, 70.0), (2017, 72.0)]);
        let aggregator = LifetimeAggregator::new(&table, 2015);

        // born before the start year: aggregation starts at index 0
        assert_eq!(
            aggregator.window(2000, 200).unwrap(),
            Some(LifetimeWindow { start: 0, end: 55, lifetime_years: 55 })
        );
        // born after the start year: starts at its birth year
        assert_eq!(
            aggregator.window(2017, 200).unwrap(),
            Some(LifetimeWindow { start: 2, end: 74, lifetime_years: 72 })
        );
        assert_eq!(
            aggregator.window(2017, 5).unwrap(),
            Some(LifetimeWindow { start: 2, end: 5, lifetime_years: 72 })
        );
    }

    #[test]
    fn test_average_is_sum_over_window_length() {
        let table = lifetimes(&[(2015, 60.0), (2016, 3.0)]);
        let aggregator = LifetimeAggregator::new(&table, 2015);
        let series = ScenarioSeries::from_columns(
            "s",
            vec![(ValueColumn::Damage.into(), vec![1.0, 2.0, 3.0, 4.0, 5.0])],
        )
        .unwrap();
        let metric = Metric::column(ValueColumn::Damage.into());

        // 2016 + 3 = 2019: indices [1, 4)
        let sum = aggregator.aggregate(&series, &metric, Reduction::Sum, 2016).unwrap();
        let avg = aggregator.aggregate(&series, &metric, Reduction::Average, 2016).unwrap();
        assert_relative_eq!(sum, 9.0);
        assert_relative_eq!(avg, sum / 3.0);
    }

    #[test]
    fn test_average_over_lifetime_longer_than_series() {
        // born 2015, lives until 2025; the series only covers 2015-2018
        let table = lifetimes(&[(2015, 10.0)]);
        let aggregator = LifetimeAggregator::new(&table, 2015);
        let series = ScenarioSeries::from_columns("s", vec![(ValueColumn::Damage.into(), vec![4.0; 4])]).unwrap();
        let metric = Metric::column(ValueColumn::Damage.into());

        assert_relative_eq!(aggregator.aggregate(&series, &metric, Reduction::Sum, 2015).unwrap(), 16.0);
        assert_relative_eq!(aggregator.aggregate(&series, &metric, Reduction::Average, 2015).unwrap(), 1.6);
    }

    #[test]
    fn test_nan_counts_as_zero_and_columns_add() {
        let table = lifetimes(&[(2015, 80.0)]);
        let aggregator = LifetimeAggregator::new(&table, 2015);
        let series = ScenarioSeries::from_columns(
            "s",
            vec![
                (ValueColumn::CostAbatement.into(), vec![1.0, f64::NAN, 1.0]),
                (ValueColumn::CostDamage.into(), vec![2.0, 2.0, f64::NAN]),
            ],
        )
        .unwrap();
        let metric = Metric::sum_of(vec![ValueColumn::CostAbatement.into(), ValueColumn::CostDamage.into()]);

        assert_relative_eq!(aggregator.aggregate(&series, &metric, Reduction::Sum, 2015).unwrap(), 6.0);
    }

    #[test]
    fn test_zero_gdp_propagates_infinity() {
        let table = lifetimes(&[(2015, 2.0)]);
        let aggregator = LifetimeAggregator::new(&table, 2015);
        let series = ScenarioSeries::from_columns(
            "s",
            vec![
                (ValueColumn::CostDamage.into(), vec![1.0, 1.0]),
                (ValueColumn::Gdp.into(), vec![0.0, 1.0]),
            ],
        )
        .unwrap();
        let metric = Metric::column(ValueColumn::CostDamage.into()).relative_to_gdp(ValueColumn::Gdp.into(), 1.0, false);
        assert!(aggregator.aggregate(&series, &metric, Reduction::Sum, 2015).unwrap().is_infinite());
    }

    #[test]
    fn test_cohort_table_and_missing_birth_year() {
        let table = lifetimes(&[(2015, 3.0), (2016, 3.0)]);
        let aggregator = LifetimeAggregator::new(&table, 2015);
        let series = flat_series();
        let metric = Metric::column(ValueColumn::CostDamage.into());

        let values = aggregator
            .aggregate_cohorts(&series, &metric, Reduction::Sum, YearRange::new(2015, 2017))
            .unwrap();
        assert_eq!(values.len(), 2);
        assert_relative_eq!(values.get(2016).unwrap(), 6.0);

        let err = aggregator
            .aggregate_cohorts(&series, &metric, Reduction::Sum, YearRange::new(2010, 2016))
            .unwrap_err();
        assert!(err.is_lookup());
    }
}
