//! CSV loading for federal and regional bracket tables.

pub mod loader;

pub use loader::{FederalBracketRecord, LoaderError, RegionalBracketRecord, ScheduleLoader};
