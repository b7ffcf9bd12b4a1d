//! Which scenario quantity is aggregated over a cohort

use crate::error::{Error, Result};
use crate::scenario::{ColumnKey, ScenarioSeries};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Divide each value by the concurrent GDP before aggregating
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GdpRelative {
    pub gdp: ColumnKey,
    /// Multiplier on GDP (share of GDP the cost is measured against)
    pub gdp_share: f64,
    /// Report in percent of GDP
    pub as_percent: bool,
}

/// One or more scenario columns, summed, optionally relative to GDP
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    pub columns: Vec<ColumnKey>,
    pub relative_to_gdp: Option<GdpRelative>,
}

impl Metric {
    pub fn column(key: ColumnKey) -> Self {
        Self::sum_of(vec![key])
    }

    pub fn sum_of(columns: Vec<ColumnKey>) -> Self {
        Self {
            columns,
            relative_to_gdp: None,
        }
    }

    pub fn relative_to_gdp(mut self, gdp: ColumnKey, gdp_share: f64, as_percent: bool) -> Self {
        self.relative_to_gdp = Some(GdpRelative {
            gdp,
            gdp_share,
            as_percent,
        });
        self
    }

    pub fn label(&self) -> String {
        let names: Vec<String> = self.columns.iter().map(ToString::to_string).collect();
        let mut label = names.join(" + ");
        if let Some(gdp) = &self.relative_to_gdp {
            label = format!("({}) / {}", label, gdp.gdp);
        }
        label
    }

    /// Borrow the needed columns out of a series
    pub(crate) fn resolve<'a>(&self, series: &'a ScenarioSeries) -> Result<ResolvedMetric<'a>> {
        if self.columns.is_empty() {
            return Err(Error::schema(series.name(), "metric names no value column"));
        }
        let columns = self
            .columns
            .iter()
            .map(|&key| series.column(key))
            .collect::<Result<Vec<_>>>()?;
        let gdp = match &self.relative_to_gdp {
            Some(rel) => Some((series.column(rel.gdp)?, rel.gdp_share)),
            None => None,
        };
        let scale = match &self.relative_to_gdp {
            Some(rel) if rel.as_percent => 100.0,
            _ => 1.0,
        };
        Ok(ResolvedMetric {
            columns,
            gdp,
            scale,
            len: series.len(),
        })
    }
}

/// Column slices of one series, ready for indexed access
#[derive(Debug)]
pub(crate) struct ResolvedMetric<'a> {
    columns: Vec<&'a [f64]>,
    gdp: Option<(&'a [f64], f64)>,
    scale: f64,
    len: usize,
}

impl ResolvedMetric<'_> {
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Value of one column at `index`, divided by GDP when requested (unscaled)
    pub fn element(&self, column: usize, index: usize) -> f64 {
        let value = self.columns[column][index];
        match self.gdp {
            Some((gdp, share)) => value / (gdp[index] * share),
            None => value,
        }
    }

    /// Scaled sum over all columns at `index`; NaN in any column propagates
    pub fn point(&self, index: usize) -> f64 {
        let total: f64 = (0..self.columns.len()).map(|c| self.element(c, index)).sum();
        total * self.scale
    }
}

/// Per-cohort values of one metric for one scenario, keyed by birth year
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CohortValues {
    values: BTreeMap<i32, f64>,
}

impl CohortValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, birth_year: i32, value: f64) {
        self.values.insert(birth_year, value);
    }

    pub fn get(&self, birth_year: i32) -> Option<f64> {
        self.values.get(&birth_year).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn birth_years(&self) -> impl Iterator<Item = i32> + '_ {
        self.values.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (i32, f64)> + '_ {
        self.values.iter().map(|(&year, &value)| (year, value))
    }

    /// Apply `f` to every value, keeping the birth years
    pub fn map(&self, mut f: impl FnMut(f64) -> f64) -> Self {
        self.iter().map(|(year, value)| (year, f(value))).collect()
    }
}

impl FromIterator<(i32, f64)> for CohortValues {
    fn from_iter<I: IntoIterator<Item = (i32, f64)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

/// Cohort values of one scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioCohorts {
    pub scenario: String,
    pub values: CohortValues,
}

impl ScenarioCohorts {
    pub fn new(scenario: impl Into<String>, values: CohortValues) -> Self {
        Self {
            scenario: scenario.into(),
            values,
        }
    }
}
