//! Two-tier (federal + regional) marginal income tax.
//!
//! Bracket tables are validated when they are built, so the calculators in
//! [`calculations`] can assume ordered, contiguous rows covering every
//! non-negative income.

pub mod calculations;
pub mod error;
pub mod models;

pub use error::{TableDefect, TaxError};
pub use models::*;
