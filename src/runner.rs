//! Exposure runner for batch computation over many scenarios
//!
//! Loads the demographic tables once (or their cached forms), then computes one metric per
//! scenario and cohort. Scenarios are independent and run in parallel; a scenario that fails
//! to load or aggregate only invalidates its own table.

use crate::config::{AnalysisConfig, ScenarioSource, YearRange};
use crate::demography::{load_demographic_table, AliveShareTable, DemographicTable, LifetimeTable};
use crate::error::{Error, Result};
use crate::exposure::{CohortValues, LifetimeAggregator, Metric, Reduction, ScenarioCohorts, ShareWeightedAggregator};
use crate::scenario::ScenarioSeries;
use crate::tables;
use log::{info, warn};
use rayon::prelude::*;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// How a scenario's series is folded onto each cohort
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Weighting {
    /// Sum or average over the cohort's lifetime window
    Lifetime(Reduction),
    /// Mean over the weighting years of the metric times the cohort's alive share
    PopulationShare,
}

/// Where the lifetime and share tables are read from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableSource {
    /// Configured cache files when they exist, else the demographic sheets
    PreferCache,
    /// Always recompute from the demographic sheets
    Sheets,
}

/// Result for one scenario; failures stay attached to their scenario
#[derive(Debug)]
pub struct ScenarioOutcome {
    pub scenario: String,
    pub result: Result<CohortValues>,
}

/// Pre-loaded demographic tables plus the year settings of a run
#[derive(Debug, Clone)]
pub struct ExposureRunner {
    lifetimes: LifetimeTable,
    shares: Option<AliveShareTable>,
    aggregation_start_year: i32,
    weighting_years: YearRange,
    cohort_years: YearRange,
    base_dir: PathBuf,
}

impl ExposureRunner {
    /// `shares` is only needed for [`Weighting::PopulationShare`] runs
    pub fn new(config: &AnalysisConfig, lifetimes: LifetimeTable, shares: Option<AliveShareTable>) -> Self {
        Self {
            lifetimes,
            shares,
            aggregation_start_year: config.aggregation_start_year,
            weighting_years: config.weighting_years,
            cohort_years: config.cohort_years,
            base_dir: config.base_dir.clone(),
        }
    }

    /// Build from configuration, preferring cached tables when they exist on disk.
    ///
    /// The share table is loaded only when `weighting` reads it.
    pub fn from_config(config: &AnalysisConfig, weighting: Weighting) -> Result<Self> {
        let start = Instant::now();
        let mut demography = None;

        let lifetimes = load_lifetimes(config, TableSource::PreferCache, &mut demography)?;
        let shares = match weighting {
            Weighting::PopulationShare => Some(load_shares(
                config,
                TableSource::PreferCache,
                &lifetimes,
                &mut demography,
            )?),
            Weighting::Lifetime(_) => None,
        };

        info!("demographic inputs ready in {:?}", start.elapsed());
        Ok(Self::new(config, lifetimes, shares))
    }

    pub fn lifetimes(&self) -> &LifetimeTable {
        &self.lifetimes
    }

    pub fn shares(&self) -> Option<&AliveShareTable> {
        self.shares.as_ref()
    }

    pub fn cohort_years(&self) -> YearRange {
        self.cohort_years
    }

    /// Report a different set of birth cohorts
    pub fn with_cohort_years(mut self, cohort_years: YearRange) -> Self {
        self.cohort_years = cohort_years;
        self
    }

    /// Cohort values of one loaded scenario
    pub fn run(&self, series: &ScenarioSeries, metric: &Metric, weighting: Weighting) -> Result<CohortValues> {
        match weighting {
            Weighting::Lifetime(reduction) => LifetimeAggregator::new(&self.lifetimes, self.aggregation_start_year)
                .aggregate_cohorts(series, metric, reduction, self.cohort_years),
            Weighting::PopulationShare => {
                let shares = self
                    .shares
                    .as_ref()
                    .ok_or_else(|| Error::schema("population shares", "table not loaded for this run"))?;
                ShareWeightedAggregator::new(shares, self.weighting_years).aggregate_cohorts(
                    series,
                    metric,
                    self.cohort_years,
                )
            }
        }
    }

    /// Load and run every scenario in parallel, keeping the given order
    pub fn run_all(&self, scenarios: &[ScenarioSource], metric: &Metric, weighting: Weighting) -> Vec<ScenarioOutcome> {
        scenarios
            .par_iter()
            .map(|source| {
                let result = ScenarioSeries::load(&source.name, &self.base_dir.join(&source.path))
                    .and_then(|series| self.run(&series, metric, weighting));
                match &result {
                    Ok(values) => info!("{}: {} cohorts", source.name, values.len()),
                    Err(e) => warn!("{}: skipped ({})", source.name, e),
                }
                ScenarioOutcome {
                    scenario: source.name.clone(),
                    result,
                }
            })
            .collect()
    }

    /// Run already-loaded series in parallel, keeping the given order
    pub fn run_loaded(&self, scenarios: &[ScenarioSeries], metric: &Metric, weighting: Weighting) -> Vec<ScenarioOutcome> {
        scenarios
            .par_iter()
            .map(|series| ScenarioOutcome {
                scenario: series.name().to_string(),
                result: self.run(series, metric, weighting),
            })
            .collect()
    }
}

/// Split outcomes into successful tables and failures
pub fn partition_outcomes(outcomes: Vec<ScenarioOutcome>) -> (Vec<ScenarioCohorts>, Vec<(String, Error)>) {
    let mut succeeded = Vec::new();
    let mut failed = Vec::new();
    for outcome in outcomes {
        match outcome.result {
            Ok(values) => succeeded.push(ScenarioCohorts::new(outcome.scenario, values)),
            Err(e) => failed.push((outcome.scenario, e)),
        }
    }
    (succeeded, failed)
}

fn cached_path(config: &AnalysisConfig, source: TableSource, path: &Option<PathBuf>) -> Option<PathBuf> {
    match source {
        TableSource::PreferCache => path.as_ref().map(|p| config.resolve(p)).filter(|p| p.exists()),
        TableSource::Sheets => None,
    }
}

fn demographic_table<'a>(config: &AnalysisConfig, slot: &'a mut Option<DemographicTable>) -> Result<&'a DemographicTable> {
    let table = match slot.take() {
        Some(table) => table,
        None => load_demographic_table(
            &config.demography.estimates,
            &config.demography.projection,
            &config.base_dir,
        )?,
    };
    let table: &DemographicTable = slot.insert(table);
    Ok(table)
}

/// Lifetime table, from the cache when `source` allows it and the file exists
///
/// `slot` holds the demographic table once read so a following [`load_shares`] reuses it.
pub fn load_lifetimes(
    config: &AnalysisConfig,
    source: TableSource,
    slot: &mut Option<DemographicTable>,
) -> Result<LifetimeTable> {
    if let Some(path) = cached_path(config, source, &config.life_expectancy_cache) {
        info!("reading life expectancy cache {}", path.display());
        return tables::read_life_expectancy(File::open(path)?, config.extrapolation);
    }
    let table = demographic_table(config, slot)?;
    Ok(LifetimeTable::from_demography(table, config.extrapolation))
}

/// Share table, from the cache when `source` allows it and the file exists
pub fn load_shares(
    config: &AnalysisConfig,
    source: TableSource,
    lifetimes: &LifetimeTable,
    slot: &mut Option<DemographicTable>,
) -> Result<AliveShareTable> {
    if let Some(path) = cached_path(config, source, &config.population_shares_cache) {
        info!("reading population shares cache {}", path.display());
        return tables::read_population_shares(File::open(path)?);
    }
    let table = demographic_table(config, slot)?;
    AliveShareTable::compute(table, lifetimes, config.comparison_years, config.share_birth_years)
}

/// Write a file under the configured output directory, creating it if needed
pub fn create_output(config: &AnalysisConfig, path: Option<&Path>, default_name: &str) -> Result<(PathBuf, File)> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => config.output_path(default_name),
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let file = File::create(&path)?;
    Ok((path, file))
}
