//! Per-run session state for the estimator.
//!
//! The session remembers the last income the user entered and the last
//! income estimated from tax paid, so the two can be compared to suggest a
//! savings contribution. It is owned by the caller and passed explicitly to
//! whatever needs it.

use rust_decimal::Decimal;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    /// Income most recently entered for a forward estimate.
    pub entered_income: Option<Decimal>,

    /// Income most recently estimated from an amount of tax paid.
    pub estimated_income: Option<Decimal>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_entered_income(
        &mut self,
        income: Decimal,
    ) {
        self.entered_income = Some(income);
    }

    pub fn record_estimated_income(
        &mut self,
        income: Decimal,
    ) {
        self.estimated_income = Some(income);
    }

    /// Suggested savings contribution, `entered - estimated` floored at zero.
    ///
    /// `None` until both incomes are known.
    pub fn suggested_contribution(&self) -> Option<Decimal> {
        let entered = self.entered_income?;
        let estimated = self.estimated_income?;
        Some((entered - estimated).max(Decimal::ZERO))
    }

    /// Forget both incomes.
    pub fn clear(&mut self) {
        self.entered_income = None;
        self.estimated_income = None;
    }
}
