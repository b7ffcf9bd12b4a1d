//! Recognized scenario value columns
//!
//! Scenario CSVs name their columns by model variable, optionally suffixed with a
//! statistic for stochastic runs (`"costDamage mean"`, `"gdp 95pc"`).

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Model variable carried by a scenario pathway
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ValueColumn {
    Emission,
    Abatement,
    Damage,
    CostAbatement,
    CostDamage,
    Gdp,
}

impl ValueColumn {
    pub const ALL: [ValueColumn; 6] = [
        ValueColumn::Emission,
        ValueColumn::Abatement,
        ValueColumn::Damage,
        ValueColumn::CostAbatement,
        ValueColumn::CostDamage,
        ValueColumn::Gdp,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ValueColumn::Emission => "emission",
            ValueColumn::Abatement => "abatement",
            ValueColumn::Damage => "damage",
            ValueColumn::CostAbatement => "costAbatement",
            ValueColumn::CostDamage => "costDamage",
            ValueColumn::Gdp => "gdp",
        }
    }
}

/// Which statistic of a stochastic scenario a column holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub enum Statistic {
    /// Deterministic value (no suffix)
    #[default]
    Value,
    Mean,
    StdDev,
    P5,
    P10,
    P90,
    P95,
}

impl Statistic {
    fn suffix(&self) -> Option<&'static str> {
        match self {
            Statistic::Value => None,
            Statistic::Mean => Some("mean"),
            Statistic::StdDev => Some("stddev"),
            Statistic::P5 => Some("5pc"),
            Statistic::P10 => Some("10pc"),
            Statistic::P90 => Some("90pc"),
            Statistic::P95 => Some("95pc"),
        }
    }

    fn from_suffix(suffix: &str) -> Option<Self> {
        match suffix {
            "mean" => Some(Statistic::Mean),
            "stddev" => Some(Statistic::StdDev),
            "5pc" => Some(Statistic::P5),
            "10pc" => Some(Statistic::P10),
            "90pc" => Some(Statistic::P90),
            "95pc" => Some(Statistic::P95),
            _ => None,
        }
    }
}

/// Typed identifier of one scenario column
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ColumnKey {
    pub column: ValueColumn,
    pub statistic: Statistic,
}

impl ColumnKey {
    pub const fn new(column: ValueColumn, statistic: Statistic) -> Self {
        Self { column, statistic }
    }

    /// Deterministic column without a statistic suffix
    pub const fn value(column: ValueColumn) -> Self {
        Self::new(column, Statistic::Value)
    }

    /// Same statistic of another variable (e.g. the GDP mean matching a cost mean)
    pub fn with_column(&self, column: ValueColumn) -> Self {
        Self::new(column, self.statistic)
    }
}

impl From<ValueColumn> for ColumnKey {
    fn from(column: ValueColumn) -> Self {
        ColumnKey::value(column)
    }
}

impl fmt::Display for ColumnKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.statistic.suffix() {
            Some(suffix) => write!(f, "{} {}", self.column.name(), suffix),
            None => f.write_str(self.column.name()),
        }
    }
}

impl FromStr for ColumnKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let unknown = || Error::schema("scenario columns", format!("unrecognized column {:?}", s));

        let trimmed = s.trim();
        let (name, statistic) = match trimmed.split_once(' ') {
            Some((name, suffix)) => (name, Statistic::from_suffix(suffix.trim()).ok_or_else(unknown)?),
            None => (trimmed, Statistic::Value),
        };
        let column = ValueColumn::ALL
            .iter()
            .copied()
            .find(|c| c.name() == name)
            .ok_or_else(unknown)?;

        Ok(ColumnKey::new(column, statistic))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_and_suffixed() {
        let plain: ColumnKey = "costDamage".parse().unwrap();
        assert_eq!(plain, ColumnKey::value(ValueColumn::CostDamage));

        let mean: ColumnKey = "gdp mean".parse().unwrap();
        assert_eq!(mean, ColumnKey::new(ValueColumn::Gdp, Statistic::Mean));

        let p95: ColumnKey = "emission 95pc".parse().unwrap();
        assert_eq!(p95.statistic, Statistic::P95);
        assert_eq!(p95.to_string(), "emission 95pc");
    }

    #[test]
    fn test_unrecognized_is_schema_error() {
        assert!("consumption".parse::<ColumnKey>().unwrap_err().is_schema());
        assert!("gdp median".parse::<ColumnKey>().unwrap_err().is_schema());
    }

    #[test]
    fn test_with_column_keeps_statistic() {
        let cost: ColumnKey = "costAbatement 10pc".parse().unwrap();
        assert_eq!(cost.with_column(ValueColumn::Gdp).to_string(), "gdp 10pc");
    }
}
