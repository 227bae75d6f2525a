//! Single-table marginal tax evaluation and bracket lookup.
//!
//! Both functions walk the rows of one [`BracketTable`]. Because a table is
//! contiguous and covers `[0, ∞)`, the evaluator is continuous,
//! piecewise-linear and non-decreasing in income, and every non-negative
//! income falls in exactly one bracket.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use tax_core::calculations::marginal::{bracket_rate, evaluate};
//! use tax_core::{BracketRow, BracketTable, Jurisdiction};
//!
//! let table = BracketTable::new(
//!     Jurisdiction::Federal,
//!     vec![
//!         BracketRow::new(dec!(0), Some(dec!(50000)), dec!(0.15)),
//!         BracketRow::new(dec!(50000), None, dec!(0.26)),
//!     ],
//! )
//! .unwrap();
//!
//! // 50000 * 0.15 + 10000 * 0.26
//! assert_eq!(evaluate(dec!(60000), &table), dec!(10100));
//! assert_eq!(bracket_rate(dec!(60000), &table), Some(dec!(0.26)));
//! ```

use rust_decimal::Decimal;

use crate::BracketTable;

/// Tax owed on `income` under a single table.
///
/// Every bracket whose lower bound is below `income` contributes its rate
/// times the part of `income` that falls inside it. Brackets at or above
/// `income` contribute nothing, so zero or negative income owes zero.
pub fn evaluate(
    income: Decimal,
    table: &BracketTable,
) -> Decimal {
    table
        .rows()
        .iter()
        .filter(|row| income > row.low)
        .map(|row| {
            let top = row.high.map_or(income, |high| income.min(high));
            (top - row.low) * row.rate
        })
        .sum()
}

/// Marginal rate of the bracket containing `income`.
///
/// Brackets are inclusive on both bounds and scanned in order, so an income
/// exactly on a boundary gets the lower bracket's rate.
///
/// Returns `None` when no bracket matches, which for a validated table only
/// happens for negative income. `None` is deliberately distinct from
/// `Some(0)`, a genuine 0% bracket.
pub fn bracket_rate(
    income: Decimal,
    table: &BracketTable,
) -> Option<Decimal> {
    table
        .rows()
        .iter()
        .find(|row| row.contains(income))
        .map(|row| row.rate)
}
