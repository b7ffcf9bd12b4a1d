//! CSV persistence of derived tables
//!
//! Writes the life-expectancy-by-birth-year and population-share tables (and reads them
//! back as caches), plus the per-cohort exposure and pathway tables.

use crate::config::YearRange;
use crate::demography::loader::{parse_number, parse_year, YEAR_COLUMN};
use crate::demography::{AliveShareTable, Extrapolation, LifetimeTable};
use crate::error::{Error, Result};
use crate::exposure::ScenarioCohorts;
use crate::scenario::PathwayRow;
use csv::{Reader, Writer};
use std::collections::{BTreeMap, BTreeSet};
use std::io::{Read, Write};

pub const LIFE_EXPECTANCY_ESTIMATE_COLUMN: &str = "Birth Year Life Expectancy Estimate";
pub const BIRTH_YEAR_COLUMN: &str = "BirthYear";

pub const LIFE_EXPECTANCY_FILE: &str = "LifeExpectancyByBirthYear.csv";
pub const POPULATION_SHARES_FILE: &str = "population_shares_by_birth_year.csv";

/// `Year,Birth Year Life Expectancy Estimate`, one row per tabulated birth year
pub fn write_life_expectancy<W: Write>(lifetimes: &LifetimeTable, writer: W) -> Result<()> {
    let mut csv = Writer::from_writer(writer);
    csv.write_record([YEAR_COLUMN, LIFE_EXPECTANCY_ESTIMATE_COLUMN])?;
    for (year, le) in lifetimes.entries() {
        csv.write_record([year.to_string(), le.to_string()])?;
    }
    csv.flush()?;
    Ok(())
}

/// Read a life-expectancy cache: first column year, second column estimate
pub fn read_life_expectancy<R: Read>(reader: R, extrapolation: Extrapolation) -> Result<LifetimeTable> {
    const TABLE: &str = "life expectancy cache";
    let mut csv = Reader::from_reader(reader);
    let headers = csv.headers()?.clone();
    if headers.len() < 2 {
        return Err(Error::schema(TABLE, "expected a year column and an estimate column"));
    }
    let estimate_column = headers[1].to_string();

    let mut life_expectancy = BTreeMap::new();
    for (idx, result) in csv.records().enumerate() {
        let record = result?;
        let row = idx + 2;
        let year = parse_year(&record[0], TABLE, row)?;
        let le = parse_number(&record[1], TABLE, row, &estimate_column)?;
        life_expectancy.insert(year, le);
    }
    Ok(LifetimeTable::new(life_expectancy, extrapolation))
}

/// Birth year rows by comparison year columns
pub fn write_population_shares<W: Write>(shares: &AliveShareTable, writer: W) -> Result<()> {
    let mut csv = Writer::from_writer(writer);

    let mut header = vec![BIRTH_YEAR_COLUMN.to_string()];
    header.extend(shares.comparison_years().iter().map(|y| y.to_string()));
    csv.write_record(&header)?;

    for birth_year in shares.birth_years().iter() {
        let mut row = vec![birth_year.to_string()];
        row.extend(shares.cohort_row(birth_year)?.iter().map(|v| v.to_string()));
        csv.write_record(&row)?;
    }
    csv.flush()?;
    Ok(())
}

/// Read a population-share cache written by [`write_population_shares`]
///
/// Birth years and comparison years must each be consecutive.
pub fn read_population_shares<R: Read>(reader: R) -> Result<AliveShareTable> {
    const TABLE: &str = "population shares cache";
    let mut csv = Reader::from_reader(reader);
    let headers = csv.headers()?.clone();

    let comparison: Vec<i32> = headers
        .iter()
        .skip(1)
        .map(|h| parse_year(h, TABLE, 1))
        .collect::<Result<_>>()?;
    let comparison_years = consecutive(&comparison, "comparison years")?;

    let mut birth = Vec::new();
    let mut rows = Vec::new();
    for (idx, result) in csv.records().enumerate() {
        let record = result?;
        let row = idx + 2;
        birth.push(parse_year(&record[0], TABLE, row)?);
        let values = record
            .iter()
            .skip(1)
            .zip(comparison.iter())
            .map(|(cell, year)| parse_number(cell, TABLE, row, &year.to_string()))
            .collect::<Result<Vec<f64>>>()?;
        rows.push(values);
    }
    let birth_years = consecutive(&birth, "birth years")?;

    AliveShareTable::from_rows(birth_years, comparison_years, rows)
}

fn consecutive(years: &[i32], what: &str) -> Result<YearRange> {
    let Some(&first) = years.first() else {
        return Err(Error::schema("population shares cache", format!("no {}", what)));
    };
    for (offset, &year) in years.iter().enumerate() {
        if year != first + offset as i32 {
            return Err(Error::schema(
                "population shares cache",
                format!("{} are not consecutive at {}", what, year),
            ));
        }
    }
    Ok(YearRange::new(first, first + years.len() as i32))
}

/// Wide table: `BirthYear` then one column per scenario, in the given order
///
/// Birth years missing from a scenario are left blank.
pub fn write_cohort_table<W: Write>(tables: &[ScenarioCohorts], writer: W) -> Result<()> {
    let mut csv = Writer::from_writer(writer);

    let mut header = vec![BIRTH_YEAR_COLUMN.to_string()];
    header.extend(tables.iter().map(|t| t.scenario.clone()));
    csv.write_record(&header)?;

    let birth_years: BTreeSet<i32> = tables.iter().flat_map(|t| t.values.birth_years()).collect();
    for birth_year in birth_years {
        let mut row = vec![birth_year.to_string()];
        row.extend(
            tables
                .iter()
                .map(|t| t.values.get(birth_year).map(|v| v.to_string()).unwrap_or_default()),
        );
        csv.write_record(&row)?;
    }
    csv.flush()?;
    Ok(())
}

/// Long table of pathway rows: `scenario,time,emission,...`
pub fn write_pathways<W: Write>(panels: &[(String, Vec<PathwayRow>)], writer: W) -> Result<()> {
    let mut csv = Writer::from_writer(writer);
    csv.write_record(["scenario", "time", "emission", "abatement_pct", "damage_pct", "total_cost_pct_gdp"])?;
    for (scenario, rows) in panels {
        for row in rows {
            csv.write_record([
                scenario.clone(),
                row.time.to_string(),
                row.emission.to_string(),
                row.abatement_pct.to_string(),
                row.damage_pct.to_string(),
                row.total_cost_pct_gdp.to_string(),
            ])?;
        }
    }
    csv.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exposure::CohortValues;

    #[test]
    fn test_life_expectancy_cache_reads_back() {
        let source: BTreeMap<i32, f64> = [(1950, 46.5), (1951, 47.25)].into_iter().collect();
        let lifetimes = LifetimeTable::new(source, Extrapolation::None);

        let mut buffer = Vec::new();
        write_life_expectancy(&lifetimes, &mut buffer).unwrap();
        let text = String::from_utf8(buffer.clone()).unwrap();
        assert!(text.starts_with("Year,Birth Year Life Expectancy Estimate\n1950,46.5\n"));

        let cached = read_life_expectancy(buffer.as_slice(), Extrapolation::StaticLastLifeExpectancy).unwrap();
        assert_eq!(cached.end_of_life_year(1951).unwrap(), 1998);
        assert_eq!(cached.end_of_life_year(2000).unwrap(), 2047);
    }

    #[test]
    fn test_population_shares_cache() {
        let csv = "BirthYear,2015,2016\n2000,0.02,0.019\n2001,0.021,0.0205\n";
        let shares = read_population_shares(csv.as_bytes()).unwrap();
        assert_eq!(shares.birth_years(), YearRange::new(2000, 2002));
        assert_eq!(shares.share(2016, 2001).unwrap(), 0.0205);

        let mut buffer = Vec::new();
        write_population_shares(&shares, &mut buffer).unwrap();
        assert_eq!(String::from_utf8(buffer).unwrap(), csv);
    }

    #[test]
    fn test_population_shares_cache_rejects_gaps() {
        let csv = "BirthYear,2015,2017\n2000,0.02,0.019\n";
        assert!(read_population_shares(csv.as_bytes()).unwrap_err().is_schema());
        let header_only = "BirthYear,label\n";
        assert!(read_population_shares(header_only.as_bytes()).is_err());
    }

    #[test]
    fn test_cohort_table_is_wide() {
        let a: CohortValues = [(1975, 1.5), (1976, 2.0)].into_iter().collect();
        let b: CohortValues = [(1976, 0.25)].into_iter().collect();
        let tables = vec![ScenarioCohorts::new("DICE-2016-R", a), ScenarioCohorts::new("GDP limit", b)];

        let mut buffer = Vec::new();
        write_cohort_table(&tables, &mut buffer).unwrap();
        assert_eq!(
            String::from_utf8(buffer).unwrap(),
            "BirthYear,DICE-2016-R,GDP limit\n1975,1.5,\n1976,2,0.25\n"
        );
    }
}
