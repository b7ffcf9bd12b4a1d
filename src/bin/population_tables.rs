//! Regenerate both demographic caches from the population sheets
//!
//! Writes LifeExpectancyByBirthYear.csv and population_shares_by_birth_year.csv into the
//! configured output directory, always recomputing from the sheets (configured caches are ignored).
//! Accepts the config path as the first argument or via COHORT_CONFIG (default: config.json).

use anyhow::{Context, Result};
use cohort_exposure::{
    demography::load_demographic_table,
    runner::{create_output, load_lifetimes, load_shares, TableSource},
    tables, AnalysisConfig,
};
use std::env;
use std::path::PathBuf;
use std::time::Instant;

fn main() -> Result<()> {
    env_logger::init();
    let start = Instant::now();

    let config_path: PathBuf = env::args()
        .nth(1)
        .or_else(|| env::var("COHORT_CONFIG").ok())
        .unwrap_or_else(|| "config.json".to_string())
        .into();
    let config = AnalysisConfig::load(&config_path)
        .with_context(|| format!("Failed to load config {}", config_path.display()))?;

    let demography = load_demographic_table(
        &config.demography.estimates,
        &config.demography.projection,
        &config.base_dir,
    )
    .context("Failed to load demographic sheets")?;
    println!(
        "Loaded {} demographic years ({:?} to {:?})",
        demography.len(),
        demography.first_year(),
        demography.last_year()
    );

    let mut demography = Some(demography);
    let lifetimes = load_lifetimes(&config, TableSource::Sheets, &mut demography)?;
    let (le_path, le_file) = create_output(&config, None, tables::LIFE_EXPECTANCY_FILE)?;
    tables::write_life_expectancy(&lifetimes, le_file)?;
    println!("Life expectancy by birth year written to: {}", le_path.display());

    let shares = load_shares(&config, TableSource::Sheets, &lifetimes, &mut demography)?;
    let (shares_path, shares_file) = create_output(&config, None, tables::POPULATION_SHARES_FILE)?;
    tables::write_population_shares(&shares, shares_file)?;
    println!("Population shares written to: {}", shares_path.display());

    println!("\nTotal time: {:?}", start.elapsed());
    Ok(())
}
