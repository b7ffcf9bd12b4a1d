//! Demographic inputs: combined indicator table, lifetime spans and alive shares

mod record;
mod lifetime;
mod shares;
pub mod loader;

pub use record::{DemographicRecord, DemographicTable};
pub use lifetime::{Extrapolation, LifetimeSpan, LifetimeTable};
pub use shares::{alive_share, AliveShareTable};
pub use loader::{load_demographic_table, load_records_from_reader, DemographicSource};
