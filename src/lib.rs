//! Cohort Exposure - generation-weighted aggregation of climate-economic cost pathways
//!
//! This library provides:
//! - Combined historical/projected demographic tables
//! - Lifetime spans by birth year, with flat life-expectancy extrapolation
//! - Share of each year's population alive by birth year
//! - Lifetime and population-share weighted aggregation of scenario pathways per cohort
//! - Min-max and baseline normalization across scenarios

pub mod error;
pub mod config;
pub mod demography;
pub mod scenario;
pub mod exposure;
pub mod runner;
pub mod tables;

// Re-export commonly used types
pub use error::{Error, Result};
pub use config::{AnalysisConfig, YearRange};
pub use demography::{AliveShareTable, DemographicTable, LifetimeTable};
pub use scenario::{ColumnKey, ScenarioSeries, ValueColumn};
pub use exposure::{CohortValues, LifetimeAggregator, Metric, Normalization, Reduction};
pub use runner::{ExposureRunner, Weighting};
