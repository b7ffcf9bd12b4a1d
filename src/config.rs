//! Analysis configuration
//!
//! Input locations, year ranges and the aggregation epoch are passed explicitly to each
//! component instead of living in process-wide constants.

use crate::demography::{DemographicSource, Extrapolation};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Half-open range of calendar years `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearRange {
    pub start: i32,
    pub end: i32,
}

impl YearRange {
    pub fn new(start: i32, end: i32) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        (self.end - self.start).max(0) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, year: i32) -> bool {
        year >= self.start && year < self.end
    }

    /// Position of `year` within the range
    pub fn index_of(&self, year: i32) -> Option<usize> {
        if self.contains(year) {
            Some((year - self.start) as usize)
        } else {
            None
        }
    }

    pub fn iter(&self) -> std::ops::Range<i32> {
        self.start..self.end
    }
}

/// A named scenario and the CSV holding its pre-computed pathway
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioSource {
    pub name: String,
    pub path: PathBuf,
}

/// The two demographic sheets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemographySources {
    pub estimates: DemographicSource,
    pub projection: DemographicSource,
}

/// Full configuration for one analysis run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    pub demography: DemographySources,

    /// Scenarios in display order
    #[serde(default)]
    pub scenarios: Vec<ScenarioSource>,

    /// Scenario the others are expressed against in baseline normalization
    #[serde(default)]
    pub baseline: Option<String>,

    /// Calendar year of series index 0
    #[serde(default = "default_aggregation_start_year")]
    pub aggregation_start_year: i32,

    /// Comparison years the share-weighted aggregator averages over
    #[serde(default = "default_weighting_years")]
    pub weighting_years: YearRange,

    /// Comparison years of the alive-share table
    #[serde(default = "default_comparison_years")]
    pub comparison_years: YearRange,

    /// Birth years of the alive-share table
    #[serde(default = "default_share_birth_years")]
    pub share_birth_years: YearRange,

    /// Birth cohorts reported in exposure tables
    #[serde(default = "default_cohort_years")]
    pub cohort_years: YearRange,

    #[serde(default)]
    pub extrapolation: Extrapolation,

    /// Multiplier applied to GDP before dividing by it
    #[serde(default = "default_gdp_share")]
    pub gdp_share: f64,

    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Precomputed life-expectancy-by-birth-year table, read by exposure runs instead of the sheets when present
    #[serde(default)]
    pub life_expectancy_cache: Option<PathBuf>,

    /// Precomputed alive-share matrix, read by share-weighted runs instead of recomputing when present
    #[serde(default)]
    pub population_shares_cache: Option<PathBuf>,

    /// Directory relative paths resolve against; set by [`AnalysisConfig::load`]
    #[serde(skip)]
    pub base_dir: PathBuf,
}

fn default_aggregation_start_year() -> i32 { 2015 }
fn default_weighting_years() -> YearRange { YearRange::new(2015, 2100) }
fn default_comparison_years() -> YearRange { YearRange::new(2015, 2100) }
fn default_share_birth_years() -> YearRange { YearRange::new(1960, 2101) }
fn default_cohort_years() -> YearRange { YearRange::new(1975, 2075) }
fn default_gdp_share() -> f64 { 1.0 }
fn default_output_dir() -> PathBuf { PathBuf::from("material") }

impl AnalysisConfig {
    /// Configuration with the World Population Prospects 2022 sheets and default ranges
    pub fn with_demography(estimates: impl Into<PathBuf>, projection: impl Into<PathBuf>) -> Self {
        Self {
            demography: DemographySources {
                estimates: DemographicSource::estimates(estimates),
                projection: DemographicSource::medium_variant(projection),
            },
            scenarios: Vec::new(),
            baseline: None,
            aggregation_start_year: default_aggregation_start_year(),
            weighting_years: default_weighting_years(),
            comparison_years: default_comparison_years(),
            share_birth_years: default_share_birth_years(),
            cohort_years: default_cohort_years(),
            extrapolation: Extrapolation::default(),
            gdp_share: default_gdp_share(),
            output_dir: default_output_dir(),
            life_expectancy_cache: None,
            population_shares_cache: None,
            base_dir: PathBuf::new(),
        }
    }

    /// Load from a JSON file; relative paths resolve against the file's directory
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let mut config: Self = serde_json::from_reader(BufReader::new(file))?;
        config.base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Ok(config)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn resolve(&self, path: &Path) -> PathBuf {
        self.base_dir.join(path)
    }

    pub fn output_path(&self, file_name: &str) -> PathBuf {
        self.resolve(&self.output_dir).join(file_name)
    }

    pub fn scenario(&self, name: &str) -> Option<&ScenarioSource> {
        self.scenarios.iter().find(|s| s.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_year_range() {
        let range = YearRange::new(2015, 2100);
        assert_eq!(range.len(), 85);
        assert_eq!(range.index_of(2015), Some(0));
        assert_eq!(range.index_of(2099), Some(84));
        assert_eq!(range.index_of(2100), None);
        assert!(YearRange::new(2020, 2010).is_empty());
    }

    #[test]
    fn test_config_defaults() {
        let json = r#"{
            "demography": {
                "estimates": { "path": "wpp_estimates.csv", "label": "Estimates", "max_rows": 72 },
                "projection": { "path": "wpp_medium.csv", "label": "Medium variant", "max_rows": 79 }
            },
            "scenarios": [
                { "name": "DICE-2016-R", "path": "data/full.csv" },
                { "name": "GDP limit", "path": "data/non-linear-discounting-per-gdp.csv" }
            ],
            "baseline": "DICE-2016-R"
        }"#;
        let config = AnalysisConfig::from_json(json).unwrap();

        assert_eq!(config.demography.estimates.skip_rows, 16);
        assert_eq!(config.demography.projection.max_rows, Some(79));
        assert_eq!(config.aggregation_start_year, 2015);
        assert_eq!(config.weighting_years, YearRange::new(2015, 2100));
        assert_eq!(config.share_birth_years, YearRange::new(1960, 2101));
        assert_eq!(config.extrapolation, Extrapolation::StaticLastLifeExpectancy);
        assert_eq!(config.gdp_share, 1.0);
        assert_eq!(config.scenario("GDP limit").unwrap().path, PathBuf::from("data/non-linear-discounting-per-gdp.csv"));
        assert!(config.scenario("missing").is_none());
    }

    #[test]
    fn test_extrapolation_names() {
        let json = r#"{
            "demography": {
                "estimates": { "path": "a.csv", "label": "Estimates" },
                "projection": { "path": "b.csv", "label": "Medium variant" }
            },
            "extrapolation": "none"
        }"#;
        let config = AnalysisConfig::from_json(json).unwrap();
        assert_eq!(config.extrapolation, Extrapolation::None);
    }
}
