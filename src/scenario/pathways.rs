//! Pathway panel: the per-year trajectories shown side by side for each scenario

use super::{ColumnKey, ScenarioSeries, ValueColumn};
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// One year of a scenario's pathway, in display units
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathwayRow {
    pub time: i64,
    /// GtCO2
    pub emission: f64,
    /// Percent of emissions abated
    pub abatement_pct: f64,
    /// Damages, percent of output
    pub damage_pct: f64,
    /// Abatement plus damage cost, percent of GDP
    pub total_cost_pct_gdp: f64,
}

/// Pathway rows for index `< time_limit`
pub fn pathway_panel(series: &ScenarioSeries, time_limit: usize) -> Result<Vec<PathwayRow>> {
    let emission = series.column(ColumnKey::value(ValueColumn::Emission))?;
    let abatement = series.column(ColumnKey::value(ValueColumn::Abatement))?;
    let damage = series.column(ColumnKey::value(ValueColumn::Damage))?;
    let cost_abatement = series.column(ColumnKey::value(ValueColumn::CostAbatement))?;
    let cost_damage = series.column(ColumnKey::value(ValueColumn::CostDamage))?;
    let gdp = series.column(ColumnKey::value(ValueColumn::Gdp))?;

    let rows = series
        .time()
        .iter()
        .take(time_limit)
        .enumerate()
        .map(|(i, &time)| PathwayRow {
            time,
            emission: emission[i],
            abatement_pct: abatement[i] * 100.0,
            damage_pct: damage[i] * 100.0,
            total_cost_pct_gdp: (cost_abatement[i] + cost_damage[i]) / gdp[i] * 100.0,
        })
        .collect();
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_panel_units_and_limit() {
        let csv = "time,emission,abatement,damage,costAbatement,costDamage,gdp\n\
                   0,40,0.03,0.002,1,2,100\n\
                   1,38,0.05,0.003,2,3,125\n\
                   2,36,0.07,0.004,3,4,150\n";
        let series = ScenarioSeries::from_reader("DICE-2016-R", csv.as_bytes()).unwrap();
        let panel = pathway_panel(&series, 2).unwrap();

        assert_eq!(panel.len(), 2);
        assert_relative_eq!(panel[0].abatement_pct, 3.0);
        assert_relative_eq!(panel[1].damage_pct, 0.3);
        assert_relative_eq!(panel[1].total_cost_pct_gdp, 4.0);
    }

    #[test]
    fn test_panel_requires_all_columns() {
        let csv = "time,emission\n0,40\n";
        let series = ScenarioSeries::from_reader("partial", csv.as_bytes()).unwrap();
        assert!(pathway_panel(&series, 250).unwrap_err().is_schema());
    }
}
