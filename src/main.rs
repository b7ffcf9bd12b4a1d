//! Cohort Exposure CLI
//!
//! Command-line interface for building the demographic tables and the per-cohort
//! exposure tables of a set of scenarios

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use cohort_exposure::{
    exposure::normalize,
    runner::{create_output, load_lifetimes, load_shares, partition_outcomes, TableSource},
    scenario::pathway_panel,
    tables, AnalysisConfig, ColumnKey, ExposureRunner, Metric, Normalization, Reduction, ScenarioSeries,
    Weighting, YearRange,
};
use log::warn;
use std::path::{Path, PathBuf};

#[derive(Debug, Parser)]
#[command(name = "cohort_exposure", version, about = "Generation-weighted climate cost exposure")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Write the life expectancy by birth year table
    LifeExpectancy(TableArgs),
    /// Write the population share by birth year and comparison year matrix
    PopulationShares(TableArgs),
    /// Aggregate a scenario metric per birth cohort for every configured scenario
    Exposure(ExposureArgs),
    /// Write emission, abatement, damage and total cost pathways for every scenario
    Pathways(PathwayArgs),
}

#[derive(Debug, Args)]
struct TableArgs {
    /// Analysis configuration (JSON)
    #[arg(long)]
    config: PathBuf,

    /// Output CSV (defaults to the configured output directory)
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum NormalizeArg {
    None,
    MinMax,
    Baseline,
}

#[derive(Debug, Args)]
struct ExposureArgs {
    #[arg(long)]
    config: PathBuf,

    /// Scenario column to aggregate; repeat to sum several (e.g. costAbatement, "costDamage mean")
    #[arg(long = "column", required = true)]
    columns: Vec<ColumnKey>,

    /// Divide by this GDP column before aggregating
    #[arg(long)]
    gdp: Option<ColumnKey>,

    /// Express GDP-relative values in percent
    #[arg(long, requires = "gdp")]
    percent: bool,

    /// Average over the lifetime window instead of summing
    #[arg(long, conflicts_with = "weighted")]
    average: bool,

    /// Weight by the share of each year's population born in the cohort's year
    #[arg(long)]
    weighted: bool,

    #[arg(long, value_enum, default_value_t = NormalizeArg::None)]
    normalize: NormalizeArg,

    /// First and last (exclusive) birth year reported; defaults to the configured cohorts
    #[arg(long, num_args = 2, value_names = ["START", "END"])]
    cohorts: Option<Vec<i32>>,

    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct PathwayArgs {
    #[arg(long)]
    config: PathBuf,

    /// Number of series rows to include
    #[arg(long, default_value_t = 250)]
    time_limit: usize,

    #[arg(long)]
    output: Option<PathBuf>,
}

fn load_config(path: &Path) -> Result<AnalysisConfig> {
    AnalysisConfig::load(path).with_context(|| format!("Failed to load config {}", path.display()))
}

fn main() -> Result<()> {
    env_logger::init();

    match Cli::parse().command {
        Command::LifeExpectancy(args) => life_expectancy(args),
        Command::PopulationShares(args) => population_shares(args),
        Command::Exposure(args) => exposure(args),
        Command::Pathways(args) => pathways(args),
    }
}

fn life_expectancy(args: TableArgs) -> Result<()> {
    let config = load_config(&args.config)?;
    let lifetimes = load_lifetimes(&config, TableSource::Sheets, &mut None)?;

    let (path, file) = create_output(&config, args.output.as_deref(), tables::LIFE_EXPECTANCY_FILE)?;
    tables::write_life_expectancy(&lifetimes, file)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    println!("Life expectancy by birth year written to: {}", path.display());
    Ok(())
}

fn population_shares(args: TableArgs) -> Result<()> {
    let config = load_config(&args.config)?;
    let mut demography = None;
    let lifetimes = load_lifetimes(&config, TableSource::Sheets, &mut demography)?;
    let shares = load_shares(&config, TableSource::Sheets, &lifetimes, &mut demography)?;

    let (path, file) = create_output(&config, args.output.as_deref(), tables::POPULATION_SHARES_FILE)?;
    tables::write_population_shares(&shares, file)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    println!(
        "Population shares ({} birth years x {} comparison years) written to: {}",
        shares.birth_years().len(),
        shares.comparison_years().len(),
        path.display()
    );
    Ok(())
}

fn exposure(args: ExposureArgs) -> Result<()> {
    let config = load_config(&args.config)?;
    if config.scenarios.is_empty() {
        bail!("No scenarios configured in {}", args.config.display());
    }

    let mut metric = Metric::sum_of(args.columns.clone());
    if let Some(gdp) = args.gdp {
        metric = metric.relative_to_gdp(gdp, config.gdp_share, args.percent);
    }

    let weighting = if args.weighted {
        Weighting::PopulationShare
    } else if args.average {
        Weighting::Lifetime(Reduction::Average)
    } else {
        Weighting::Lifetime(Reduction::Sum)
    };

    let normalization = match args.normalize {
        NormalizeArg::None => Normalization::None,
        NormalizeArg::MinMax => Normalization::MinMax,
        NormalizeArg::Baseline => match &config.baseline {
            Some(baseline) => Normalization::Baseline(baseline.clone()),
            None => bail!("--normalize baseline needs \"baseline\" in the config"),
        },
    };

    let mut runner = ExposureRunner::from_config(&config, weighting)?;
    if let Some(bounds) = &args.cohorts {
        runner = runner.with_cohort_years(YearRange::new(bounds[0], bounds[1]));
    }

    println!("Metric: {} ({:?})", metric.label(), weighting);
    let outcomes = runner.run_all(&config.scenarios, &metric, weighting);
    let (succeeded, failed) = partition_outcomes(outcomes);

    for (scenario, error) in &failed {
        println!("  {} failed: {}", scenario, error);
    }
    if succeeded.is_empty() {
        bail!("All {} scenarios failed", failed.len());
    }

    let normalized = normalize(&succeeded, &normalization)?;

    let (path, file) = create_output(&config, args.output.as_deref(), "cohort_exposure.csv")?;
    tables::write_cohort_table(&normalized, file).with_context(|| format!("Failed to write {}", path.display()))?;

    println!(
        "{} scenarios x {} cohorts written to: {}",
        normalized.len(),
        runner.cohort_years().len(),
        path.display()
    );
    Ok(())
}

fn pathways(args: PathwayArgs) -> Result<()> {
    let config = load_config(&args.config)?;

    let mut panels = Vec::new();
    for source in &config.scenarios {
        let panel = ScenarioSeries::load(&source.name, &config.resolve(&source.path))
            .and_then(|series| pathway_panel(&series, args.time_limit));
        match panel {
            Ok(rows) => panels.push((source.name.clone(), rows)),
            Err(e) => warn!("{}: skipped ({})", source.name, e),
        }
    }

    let (path, file) = create_output(&config, args.output.as_deref(), "pathways.csv")?;
    tables::write_pathways(&panels, file).with_context(|| format!("Failed to write {}", path.display()))?;

    println!("{} scenario pathways written to: {}", panels.len(), path.display());
    Ok(())
}
