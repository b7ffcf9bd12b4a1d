//! Cross-scenario rescaling of cohort values
//!
//! Min-max pools every scenario's values so a 1 in any scenario is the pool-wide maximum.
//! Baseline mode expresses each value as percent deviation from the baseline scenario's
//! value for the same birth year; a zero baseline value yields an infinite result.

use super::metric::{CohortValues, ScenarioCohorts};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// How per-cohort values are made comparable across scenarios
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Normalization {
    #[default]
    None,
    MinMax,
    Baseline(String),
}

/// Linear map fitted on a pool of values, sending its min to 0 and max to 1
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinMaxScaler {
    min: f64,
    scale: f64,
}

impl MinMaxScaler {
    /// Fit on all finite values; `None` when there are none
    ///
    /// NaN and infinite values are left out of the fit and stay non-finite after `transform`.
    pub fn fit(values: impl IntoIterator<Item = f64>) -> Option<Self> {
        let (min, max) = values
            .into_iter()
            .filter(|v| v.is_finite())
            .fold(None, |acc: Option<(f64, f64)>, v| match acc {
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
                None => Some((v, v)),
            })?;

        let range = max - min;
        // a constant pool maps to 0
        let scale = if range == 0.0 { 1.0 } else { 1.0 / range };
        Some(Self { min, scale })
    }

    pub fn transform(&self, value: f64) -> f64 {
        (value - self.min) * self.scale
    }
}

/// Rescale all scenarios with one min-max map fitted on the pooled values
pub fn min_max(tables: &[ScenarioCohorts]) -> Vec<ScenarioCohorts> {
    let pooled = tables.iter().flat_map(|t| t.values.iter().map(|(_, v)| v));
    let Some(scaler) = MinMaxScaler::fit(pooled) else {
        return tables.to_vec();
    };

    tables
        .iter()
        .map(|t| ScenarioCohorts::new(t.scenario.clone(), t.values.map(|v| scaler.transform(v))))
        .collect()
}

/// Percent deviation of every scenario from `baseline`, per birth year
pub fn relative_to_baseline(tables: &[ScenarioCohorts], baseline: &str) -> Result<Vec<ScenarioCohorts>> {
    let reference = tables
        .iter()
        .find(|t| t.scenario == baseline)
        .ok_or_else(|| Error::UnknownScenario(baseline.to_string()))?;

    tables
        .iter()
        .map(|t| {
            let values: CohortValues = t
                .values
                .iter()
                .map(|(birth_year, value)| {
                    let base = reference
                        .values
                        .get(birth_year)
                        .ok_or_else(|| Error::lookup(format!("baseline scenario {}", baseline), birth_year))?;
                    Ok((birth_year, (value / base - 1.0) * 100.0))
                })
                .collect::<Result<_>>()?;
            Ok(ScenarioCohorts::new(t.scenario.clone(), values))
        })
        .collect()
}

/// Apply the requested normalization
pub fn normalize(tables: &[ScenarioCohorts], normalization: &Normalization) -> Result<Vec<ScenarioCohorts>> {
    match normalization {
        Normalization::None => Ok(tables.to_vec()),
        Normalization::MinMax => Ok(min_max(tables)),
        Normalization::Baseline(baseline) => relative_to_baseline(tables, baseline),
    }
}
