use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{TableDefect, TaxError};
use crate::models::Jurisdiction;

/// One marginal tier: `rate` applies to the part of income between `low` and `high`.
///
/// `high` is `None` for the top bracket, which has no upper limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketRow {
    pub low: Decimal,
    pub high: Option<Decimal>,
    pub rate: Decimal,
}

impl BracketRow {
    pub fn new(
        low: Decimal,
        high: Option<Decimal>,
        rate: Decimal,
    ) -> Self {
        Self { low, high, rate }
    }

    /// Inclusive on both ends, so a boundary income belongs to the lower bracket
    /// when the table is scanned in order.
    pub fn contains(
        &self,
        income: Decimal,
    ) -> bool {
        income >= self.low && self.high.is_none_or(|high| income <= high)
    }
}

/// The ordered, contiguous bracket rows of one jurisdiction.
///
/// The only way to build a table is [`BracketTable::new`], which checks that
/// the rows start at zero, are contiguous and end with an unbounded bracket.
/// Every calculation in this crate relies on that.
///
/// ```
/// use rust_decimal_macros::dec;
/// use tax_core::{BracketRow, BracketTable, Jurisdiction};
///
/// let table = BracketTable::new(
///     Jurisdiction::Federal,
///     vec![
///         BracketRow::new(dec!(0), Some(dec!(50000)), dec!(0.15)),
///         BracketRow::new(dec!(50000), None, dec!(0.26)),
///     ],
/// )
/// .unwrap();
///
/// assert_eq!(table.rows().len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BracketTable {
    jurisdiction: Jurisdiction,
    rows: Vec<BracketRow>,
}

impl BracketTable {
    /// Validates `rows` and wraps them in a table.
    ///
    /// # Errors
    ///
    /// Returns [`TaxError::MalformedTable`] naming the first [`TableDefect`]
    /// found.
    pub fn new(
        jurisdiction: Jurisdiction,
        rows: Vec<BracketRow>,
    ) -> Result<Self, TaxError> {
        if let Err(defect) = check_rows(&rows) {
            return Err(TaxError::MalformedTable {
                jurisdiction,
                defect,
            });
        }
        Ok(Self { jurisdiction, rows })
    }

    pub fn jurisdiction(&self) -> &Jurisdiction {
        &self.jurisdiction
    }

    pub fn rows(&self) -> &[BracketRow] {
        &self.rows
    }

    /// Rate of the unbounded top bracket.
    pub fn top_rate(&self) -> Decimal {
        // Non-empty by construction.
        self.rows.last().map_or(Decimal::ZERO, |row| row.rate)
    }
}

fn check_rows(rows: &[BracketRow]) -> Result<(), TableDefect> {
    let first = rows.first().ok_or(TableDefect::Empty)?;
    if !first.low.is_zero() {
        return Err(TableDefect::NonZeroStart(first.low));
    }

    let mut previous_high: Option<Decimal> = None;
    for (index, row) in rows.iter().enumerate() {
        if row.rate < Decimal::ZERO || row.rate > Decimal::ONE {
            return Err(TableDefect::RateOutOfRange {
                index,
                rate: row.rate,
            });
        }
        if let Some(previous_high) = previous_high {
            if row.low != previous_high {
                return Err(TableDefect::NotContiguous {
                    index,
                    low: row.low,
                    previous_high,
                });
            }
        }
        match row.high {
            Some(high) if high <= row.low => {
                return Err(TableDefect::EmptyRange {
                    index,
                    low: row.low,
                    high,
                });
            }
            Some(high) => previous_high = Some(high),
            None if index + 1 < rows.len() => {
                return Err(TableDefect::UnboundedBeforeEnd { index });
            }
            None => previous_high = None,
        }
    }

    match previous_high {
        Some(high) => Err(TableDefect::BoundedTop(high)),
        None => Ok(()),
    }
}
