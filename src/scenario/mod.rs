//! Scenario pathways supplied by the climate-economy model

mod column;
mod series;
mod pathways;

pub use column::{ColumnKey, Statistic, ValueColumn};
pub use series::{ScenarioSeries, TIME_COLUMN};
pub use pathways::{pathway_panel, PathwayRow};
