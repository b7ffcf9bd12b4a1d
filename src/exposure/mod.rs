//! Cohort exposure: lifetime aggregation, share weighting and cross-scenario normalization

mod metric;
mod aggregate;
mod weighted;
mod normalization;

pub use metric::{CohortValues, GdpRelative, Metric, ScenarioCohorts};
pub use aggregate::{LifetimeAggregator, LifetimeWindow, Reduction};
pub use weighted::ShareWeightedAggregator;
pub use normalization::{min_max, normalize, relative_to_baseline, MinMaxScaler, Normalization};
