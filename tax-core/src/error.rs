use rust_decimal::Decimal;
use thiserror::Error;

use crate::models::{Jurisdiction, RegionCode};

/// Errors surfaced by table construction and tax queries.
///
/// None of these are recovered internally; every failure is returned to the
/// caller instead of a numeric answer that might be silently wrong.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaxError {
    /// The region identifier has no bracket table in the schedule.
    #[error("no bracket table for region '{0}'")]
    UnknownRegion(String),

    /// A negative amount was passed where only non-negative amounts make sense.
    #[error("{field} must not be negative, got {value}")]
    NegativeInput { field: &'static str, value: Decimal },

    /// The inverse solve target is above the tax reachable at the search ceiling.
    #[error(
        "target tax {target} exceeds {ceiling_tax} owed at the search ceiling {ceiling}; \
         raise max_income"
    )]
    OutOfRange {
        target: Decimal,
        ceiling: Decimal,
        ceiling_tax: Decimal,
    },

    /// A bracket table violates the ordering or coverage invariants.
    #[error("malformed bracket table for {jurisdiction}: {defect}")]
    MalformedTable {
        jurisdiction: Jurisdiction,
        defect: TableDefect,
    },

    /// Two regional tables were supplied for the same region.
    #[error("more than one bracket table for region '{0}'")]
    DuplicateRegion(RegionCode),

    /// A table was supplied in the wrong slot of a schedule.
    #[error("expected a {expected} table, got one for {actual}")]
    JurisdictionMismatch {
        expected: &'static str,
        actual: Jurisdiction,
    },

    /// Region identifiers must contain at least one non-whitespace character.
    #[error("region code must not be empty")]
    InvalidRegionCode,

    #[error("invalid solver configuration: {0}")]
    InvalidSolverConfig(String),

    /// Bisection hit its iteration cap before the bracket shrank to the tolerance.
    #[error("income search did not converge within {iterations} iterations")]
    NotConverged { iterations: u32 },
}

/// The specific way a bracket table breaks the table invariants.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TableDefect {
    #[error("table has no rows")]
    Empty,

    #[error("first bracket starts at {0}, expected 0")]
    NonZeroStart(Decimal),

    #[error("row {index} has rate {rate} outside [0, 1]")]
    RateOutOfRange { index: usize, rate: Decimal },

    #[error("row {index} has high bound {high} not above low bound {low}")]
    EmptyRange {
        index: usize,
        low: Decimal,
        high: Decimal,
    },

    #[error("row {index} starts at {low} but the previous row ends at {previous_high}")]
    NotContiguous {
        index: usize,
        low: Decimal,
        previous_high: Decimal,
    },

    #[error("row {index} is unbounded but is not the last row")]
    UnboundedBeforeEnd { index: usize },

    #[error("last row ends at {0}; the top bracket must be unbounded")]
    BoundedTop(Decimal),
}
