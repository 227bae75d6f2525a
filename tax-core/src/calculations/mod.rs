//! Tax calculations over validated bracket tables.
//!
//! [`marginal`] evaluates a single table, [`combined`] adds the federal and
//! regional results together, and [`inverse`] searches for the income that
//! produced a given total.

pub mod combined;
pub mod common;
pub mod inverse;
pub mod marginal;

pub use combined::CombinedTaxCalculator;
pub use inverse::{InverseIncomeSolver, SolverConfig};
