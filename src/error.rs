//! Error taxonomy for table loading and cohort aggregation

use thiserror::Error;

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while loading tables or aggregating over cohorts
///
/// Numeric degeneracies (zero population, zero GDP, zero baseline) are not errors:
/// they propagate as infinity/NaN into the output tables.
#[derive(Debug, Error)]
pub enum Error {
    /// An input table is missing an expected column or has an unexpected shape
    #[error("schema error in {table}: {detail}")]
    Schema { table: String, detail: String },

    /// A requested year has no record and no extrapolation rule applies
    #[error("no entry for year {year} in {table}")]
    Lookup { table: String, year: i32 },

    /// A named scenario is not part of the comparison set
    #[error("unknown scenario: {0}")]
    UnknownScenario(String),

    /// A cell could not be read as a number
    #[error("{table}: cannot parse {value:?} in column {column:?} (row {row})")]
    Parse {
        table: String,
        row: usize,
        column: String,
        value: String,
    },

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Config(#[from] serde_json::Error),
}

impl Error {
    pub fn schema(table: impl Into<String>, detail: impl Into<String>) -> Self {
        Error::Schema {
            table: table.into(),
            detail: detail.into(),
        }
    }

    pub fn lookup(table: impl Into<String>, year: i32) -> Self {
        Error::Lookup {
            table: table.into(),
            year,
        }
    }

    /// True for the schema family (missing columns, unparseable cells)
    pub fn is_schema(&self) -> bool {
        matches!(self, Error::Schema { .. } | Error::Parse { .. })
    }

    /// True for the lookup family (missing years, unknown scenarios)
    pub fn is_lookup(&self) -> bool {
        matches!(self, Error::Lookup { .. } | Error::UnknownScenario(_))
    }
}
